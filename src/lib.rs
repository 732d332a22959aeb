//! Sales dashboard core: load, clean, filter and aggregate a sales table,
//! and render the download artifacts.

pub mod data;
pub mod report;
