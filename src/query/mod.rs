//! Translation of request parameters into store queries

pub mod filter;
pub mod pager;
pub mod sort;

pub use filter::RecordFilter;
pub use pager::Pager;
pub use sort::{SortDirection, SortKey, SortSpec};
