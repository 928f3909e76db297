//! Maps command - render choropleth artifacts from the aggregate tables

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use foncier_core::{read_boundaries, AdminLevel, BoundaryCatalog, MapDriver, PriceTable};

use crate::config::Config;
use crate::LevelArg;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    level: LevelArg,
    aggregates_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    regions: Option<PathBuf>,
    departments: Option<PathBuf>,
    communes: Option<PathBuf>,
    property_kind: Option<String>,
) -> Result<()> {
    let aggregates_dir = aggregates_dir.unwrap_or_else(|| config.output.dir.clone());
    let out_dir = out_dir.unwrap_or_else(|| config.output.dir.clone());
    let property_kind = property_kind.or_else(|| config.maps.property_kind.clone());

    let regions_path = regions.clone().unwrap_or_else(|| config.data.regions.clone());
    let departments_path = departments
        .clone()
        .unwrap_or_else(|| config.data.departments.clone());
    let communes_path = communes.clone().unwrap_or_else(|| config.data.communes.clone());

    let hierarchy = super::hierarchy::build(config, regions, departments, communes)?;
    let driver = MapDriver::new(&hierarchy, &out_dir);

    let levels: Vec<AdminLevel> = match level {
        LevelArg::Country => vec![AdminLevel::Country],
        LevelArg::Region => vec![AdminLevel::Region],
        LevelArg::Department => vec![AdminLevel::Department],
        LevelArg::All => vec![
            AdminLevel::Country,
            AdminLevel::Region,
            AdminLevel::Department,
        ],
    };

    let progress = ProgressBar::new(levels.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );

    let mut total = 0usize;
    for level in levels {
        progress.set_message(format!("{} maps", level));

        let table = load_table(&aggregates_dir, level, property_kind.is_some())?;
        let boundaries = match level {
            AdminLevel::Country => read_boundaries(&regions_path)?,
            AdminLevel::Region => read_boundaries(&departments_path)?,
            AdminLevel::Department => read_boundaries(&communes_path)?,
            AdminLevel::Commune => BoundaryCatalog::default(),
        };

        let paths = driver.generate(level, &table, &boundaries, property_kind.as_deref())?;
        total += paths.len();
        progress.set_message(format!("{} maps written", total));
        progress.inc(1);
    }
    progress.finish_with_message(format!("{} maps written to {}", total, out_dir.display()));

    Ok(())
}

/// The aggregate table a map at `level` joins against: the child level's
/// table, with the per-kind variant when a property-kind filter is active.
fn load_table(dir: &Path, level: AdminLevel, with_kind: bool) -> Result<PriceTable> {
    let child = match level {
        AdminLevel::Country => "region",
        AdminLevel::Region => "department",
        AdminLevel::Department => "commune",
        AdminLevel::Commune => anyhow::bail!("no aggregate table below the commune level"),
    };
    let name = if with_kind {
        super::aggregate_file(&format!("{}_and_kind", child))
    } else {
        super::aggregate_file(child)
    };
    let path = dir.join(name);
    PriceTable::read_json(&path)
        .with_context(|| format!("Failed to load aggregate table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_table_names_child_level() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(dir.path(), AdminLevel::Department, false).unwrap_err();
        assert!(err.to_string().contains("price_per_m2_by_commune.json"));

        let err = load_table(dir.path(), AdminLevel::Country, true).unwrap_err();
        assert!(err
            .to_string()
            .contains("price_per_m2_by_region_and_kind.json"));
    }
}
