//! Subcommand implementations.

pub mod aggregate;
pub mod hierarchy;
pub mod maps;
pub mod run;

/// Exported hierarchy document, consumed by the front end.
pub const HIERARCHY_FILE: &str = "region_dept_commune_map.json";

/// Aggregate table file for one grouping level.
pub fn aggregate_file(level: &str) -> String {
    format!("price_per_m2_by_{}.json", level)
}
