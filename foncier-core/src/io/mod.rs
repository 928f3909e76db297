//! File ingestion: DVF transaction CSVs and GeoJSON boundary layers.
//!
//! Both readers accept plain and gzip-compressed files, detected by the
//! `.gz` suffix.

pub mod boundaries;
pub mod transactions;

pub use boundaries::read_boundaries;
pub use transactions::read_transactions;
