//! Run command - the full pipeline in one invocation

use anyhow::{Context, Result};
use std::path::PathBuf;

use foncier_core::{read_boundaries, AdminLevel, GroupField, MapDriver, PriceTable};

use crate::config::Config;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    dvf: Option<PathBuf>,
    regions: Option<PathBuf>,
    departments: Option<PathBuf>,
    communes: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    property_kind: Option<String>,
) -> Result<()> {
    let dvf = dvf.unwrap_or_else(|| config.data.dvf.clone());
    let out_dir = out_dir.unwrap_or_else(|| config.output.dir.clone());
    let property_kind = property_kind.or_else(|| config.maps.property_kind.clone());

    let regions_path = regions.unwrap_or_else(|| config.data.regions.clone());
    let departments_path = departments.unwrap_or_else(|| config.data.departments.clone());
    let communes_path = communes.unwrap_or_else(|| config.data.communes.clone());

    std::fs::create_dir_all(&out_dir)?;

    // boundaries are loaded once and shared by the hierarchy and the maps
    let region_boundaries = read_boundaries(&regions_path)?;
    let department_boundaries = read_boundaries(&departments_path)?;
    let commune_boundaries = read_boundaries(&communes_path)?;

    let hierarchy = foncier_core::HierarchyBuilder::new(foncier_core::DeptRegionTable::standard())
        .build(&region_boundaries, &department_boundaries, &commune_boundaries);
    hierarchy.write_json(out_dir.join(super::HIERARCHY_FILE))?;

    let tables = super::aggregate::aggregate(&dvf)?;
    for (name, table) in &tables {
        table.write_json(out_dir.join(super::aggregate_file(name)))?;
    }

    let with_kind = property_kind.is_some();
    let pick = |field: GroupField| -> Result<&PriceTable> {
        tables
            .iter()
            .find(|(_, t)| {
                t.fields.first() == Some(&field) && (t.fields.len() == 2) == with_kind
            })
            .map(|(_, t)| t)
            .context("aggregation did not produce the expected table")
    };

    let driver = MapDriver::new(&hierarchy, &out_dir);
    let kind = property_kind.as_deref();
    let mut total = 0usize;
    total += driver
        .generate(AdminLevel::Country, pick(GroupField::Region)?, &region_boundaries, kind)?
        .len();
    total += driver
        .generate(
            AdminLevel::Region,
            pick(GroupField::DepartmentCode)?,
            &department_boundaries,
            kind,
        )?
        .len();
    total += driver
        .generate(
            AdminLevel::Department,
            pick(GroupField::CommuneCode)?,
            &commune_boundaries,
            kind,
        )?
        .len();

    log::info!("Pipeline complete: {} maps under {}", total, out_dir.display());
    Ok(())
}
