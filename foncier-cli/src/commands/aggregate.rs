//! Aggregate command - derive price-per-m2 and write the per-level tables

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use foncier_core::{read_transactions, DeptRegionTable, GroupField, PriceTable};

use crate::config::Config;

pub fn execute(config: &Config, dvf: Option<PathBuf>, out_dir: Option<PathBuf>) -> Result<()> {
    let dvf = dvf.unwrap_or_else(|| config.data.dvf.clone());
    let out_dir = out_dir.unwrap_or_else(|| config.output.dir.clone());

    let tables = aggregate(&dvf)?;
    std::fs::create_dir_all(&out_dir)?;
    for (level, table) in &tables {
        let path = out_dir.join(super::aggregate_file(level));
        table
            .write_json(&path)
            .with_context(|| format!("Failed to write aggregate table {}", path.display()))?;
    }

    Ok(())
}

/// Run the aggregation passes and group at each administrative level,
/// once per level and once per (level, property kind) pair. Returns
/// (table name, table) pairs; the name is the `aggregate_file` stem.
pub fn aggregate(dvf: &Path) -> Result<Vec<(&'static str, PriceTable)>> {
    let mut transactions = read_transactions(dvf)
        .with_context(|| format!("Failed to load transactions from {}", dvf.display()))?;

    transactions.attach_regions(&DeptRegionTable::standard());
    transactions.compute_price_per_m2();

    let by_commune = transactions.group_by(&[GroupField::CommuneCode])?;
    let by_department = transactions.group_by(&[GroupField::DepartmentCode])?;
    let by_region = transactions.group_by(&[GroupField::Region])?;
    log::info!(
        "Aggregated {} communes, {} departments, {} regions",
        by_commune.len(),
        by_department.len(),
        by_region.len()
    );

    Ok(vec![
        ("commune", by_commune),
        ("department", by_department),
        ("region", by_region),
        (
            "commune_and_kind",
            transactions.group_by(&[GroupField::CommuneCode, GroupField::PropertyKind])?,
        ),
        (
            "department_and_kind",
            transactions.group_by(&[GroupField::DepartmentCode, GroupField::PropertyKind])?,
        ),
        (
            "region_and_kind",
            transactions.group_by(&[GroupField::Region, GroupField::PropertyKind])?,
        ),
    ])
}
