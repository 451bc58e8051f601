#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter predicate builder and aggregation engine over DELIT dataset
//! views.
//!
//! A [`DatasetView`] borrows an immutable [`Dataset`](delit_dataset::Dataset)
//! and holds the row indices currently in scope. Filtering narrows the
//! *current* view, so hierarchical drill-downs (neighborhood, then
//! neighborhood + date, then + crime type) never re-filter the full
//! dataset. Every aggregation tolerates an empty view — the caller gets
//! an explicit empty result, never a panic.

mod aggregate;
mod view;

pub use view::DatasetView;
