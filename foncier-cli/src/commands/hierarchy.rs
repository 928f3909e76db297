//! Hierarchy command - build and export the administrative containment tree

use anyhow::{Context, Result};
use std::path::PathBuf;

use foncier_core::{read_boundaries, DeptRegionTable, Hierarchy, HierarchyBuilder};

use crate::config::Config;

pub fn execute(
    config: &Config,
    regions: Option<PathBuf>,
    departments: Option<PathBuf>,
    communes: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let out = out.unwrap_or_else(|| config.output.dir.join(super::HIERARCHY_FILE));

    let hierarchy = build(config, regions, departments, communes)?;
    log::info!(
        "Built hierarchy: {} regions, {} communes",
        hierarchy.regions().len(),
        hierarchy.commune_count()
    );

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    hierarchy
        .write_json(&out)
        .with_context(|| format!("Failed to write hierarchy to {}", out.display()))?;

    Ok(())
}

/// Build the tree from the three boundary layers, taking paths from the
/// configuration when not given on the command line.
pub fn build(
    config: &Config,
    regions: Option<PathBuf>,
    departments: Option<PathBuf>,
    communes: Option<PathBuf>,
) -> Result<Hierarchy> {
    let regions_path = regions.unwrap_or_else(|| config.data.regions.clone());
    let departments_path = departments.unwrap_or_else(|| config.data.departments.clone());
    let communes_path = communes.unwrap_or_else(|| config.data.communes.clone());

    let regions = read_boundaries(&regions_path)
        .with_context(|| format!("Failed to load region boundaries from {}", regions_path.display()))?;
    let departments = read_boundaries(&departments_path).with_context(|| {
        format!(
            "Failed to load department boundaries from {}",
            departments_path.display()
        )
    })?;
    let communes = read_boundaries(&communes_path).with_context(|| {
        format!(
            "Failed to load commune boundaries from {}",
            communes_path.display()
        )
    })?;

    Ok(HierarchyBuilder::new(DeptRegionTable::standard()).build(
        &regions,
        &departments,
        &communes,
    ))
}
