//! foncier core library
//!
//! Administrative hierarchy construction, price-per-m2 aggregation and
//! recursive choropleth map generation for French real-estate (DVF) data.

pub mod aggregate;
pub mod boundary;
pub mod driver;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod regions;
pub mod render;
pub mod scale;
pub mod types;

// Re-export commonly used types
pub use aggregate::{GroupField, PriceRow, PriceTable, Transactions};
pub use boundary::BoundaryCatalog;
pub use driver::{MapDriver, ScopeRule};
pub use error::{CoreError, CoreResult};
pub use hierarchy::{Hierarchy, HierarchyBuilder};
pub use io::{read_boundaries, read_transactions};
pub use regions::DeptRegionTable;
pub use render::{JoinKey, MapRenderer};
pub use scale::ColorScale;
pub use types::{AdminLevel, CommuneCode, DepartmentCode, TransactionRecord};

/// Version information for the foncier core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
