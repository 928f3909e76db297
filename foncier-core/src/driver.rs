//! Recursive per-unit map generation.
//!
//! Walks the hierarchy at a requested level, scopes the aggregate table and
//! the boundary layer to each unit's descendants and renders one artifact
//! per unit. Units are independent (disjoint output files, read-only shared
//! inputs) so rendering is parallelized across them.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::aggregate::{GroupField, PriceTable};
use crate::boundary::BoundaryCatalog;
use crate::error::{CoreError, CoreResult};
use crate::hierarchy::Hierarchy;
use crate::render::{JoinKey, MapRenderer};
use crate::scale::ColorScale;
use crate::types::AdminLevel;

/// How a unit's descendants are matched, unifying the per-level filtering
/// paths: exact membership for department-in-region, INSEE prefix for
/// commune-in-department.
#[derive(Debug, Clone)]
pub enum ScopeRule {
    Members(HashSet<String>),
    Prefix(String),
}

impl ScopeRule {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            ScopeRule::Members(set) => set.contains(code),
            ScopeRule::Prefix(prefix) => code.starts_with(prefix.as_str()),
        }
    }
}

/// One scoped rendering unit, fully prepared before the parallel pass.
struct UnitJob {
    level: AdminLevel,
    identifier: String,
    table: PriceTable,
    boundaries: BoundaryCatalog,
    join_field: GroupField,
    join_key: JoinKey,
}

/// Drives [`MapRenderer`] over every administrative unit at a level.
pub struct MapDriver<'a> {
    hierarchy: &'a Hierarchy,
    renderer: MapRenderer,
    output_dir: PathBuf,
}

impl<'a> MapDriver<'a> {
    pub fn new<P: Into<PathBuf>>(hierarchy: &'a Hierarchy, output_dir: P) -> Self {
        Self {
            hierarchy,
            renderer: MapRenderer::new(),
            output_dir: output_dir.into(),
        }
    }

    /// Deterministic artifact path for a unit; the front end reconstructs
    /// this exact name, so it is part of the output contract.
    pub fn artifact_path(&self, level: AdminLevel, identifier: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_maps", level.as_str()))
            .join(format!(
                "price_per_unit_{}_{}.html",
                level.as_str(),
                identifier.replace(' ', "_")
            ))
    }

    /// Generate one artifact per unit at `level`. Returns the paths of the
    /// artifacts actually written; units with an empty scoped aggregate or
    /// boundary subset are skipped with a log line, never failed.
    ///
    /// `property_kind` optionally narrows the aggregate to one property
    /// type before scoping; naming a kind on a table without that field is
    /// a configuration error.
    pub fn generate(
        &self,
        level: AdminLevel,
        table: &PriceTable,
        boundaries: &BoundaryCatalog,
        property_kind: Option<&str>,
    ) -> CoreResult<Vec<PathBuf>> {
        let table = match property_kind {
            Some(kind) => table.filter_by(GroupField::PropertyKind, |k| k == kind)?,
            None => table.clone(),
        };

        let jobs = match level {
            AdminLevel::Country => self.country_jobs(&table, boundaries)?,
            AdminLevel::Region => self.region_jobs(&table, boundaries)?,
            AdminLevel::Department => self.department_jobs(&table, boundaries)?,
            AdminLevel::Commune => {
                return Err(CoreError::config(
                    "maps are generated down to the department level; \
                     there is no per-commune map",
                ));
            }
        };

        if jobs.is_empty() {
            log::info!("No units with data at level '{}'", level);
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(self.output_dir.join(format!("{}_maps", level.as_str())))?;

        let paths = jobs
            .par_iter()
            .map(|job| self.render_job(job))
            .collect::<CoreResult<Vec<PathBuf>>>()?;
        Ok(paths)
    }

    fn render_job(&self, job: &UnitJob) -> CoreResult<PathBuf> {
        let scale = ColorScale::from_averages(&job.table.averages()).ok_or_else(|| {
            // jobs are only built for non-empty scoped tables
            CoreError::render(format!("empty scale for unit '{}'", job.identifier))
        })?;
        let path = self.artifact_path(job.level, &job.identifier);
        self.renderer.render(
            &job.table,
            job.join_field,
            &job.boundaries,
            job.join_key,
            job.level,
            &scale,
            &path,
        )?;
        Ok(path)
    }

    /// Country level: one map over all regions. The country-level boundary
    /// layer is keyed by region display name, hence [`JoinKey::Name`].
    fn country_jobs(
        &self,
        table: &PriceTable,
        boundaries: &BoundaryCatalog,
    ) -> CoreResult<Vec<UnitJob>> {
        let known_regions = self.hierarchy.region_names();
        // aggregate rows for regions the hierarchy does not know are
        // excluded from map generation, not errored
        let scoped = table.filter_by(GroupField::Region, |name| known_regions.contains(name))?;

        if scoped.is_empty() || boundaries.is_empty() {
            log::info!("No data for the country map, skipping...");
            return Ok(Vec::new());
        }

        Ok(vec![UnitJob {
            level: AdminLevel::Country,
            identifier: "france".to_string(),
            table: scoped,
            boundaries: boundaries.clone(),
            join_field: GroupField::Region,
            join_key: JoinKey::Name,
        }])
    }

    /// Region level: one map per region, scoped to its departments by
    /// exact code membership.
    fn region_jobs(
        &self,
        table: &PriceTable,
        boundaries: &BoundaryCatalog,
    ) -> CoreResult<Vec<UnitJob>> {
        let mut jobs = Vec::new();
        for region in self.hierarchy.regions() {
            let members: HashSet<String> = region
                .department_codes()
                .into_iter()
                .map(str::to_string)
                .collect();
            let rule = ScopeRule::Members(members);

            let scoped = table.filter_by(GroupField::DepartmentCode, |code| rule.matches(code))?;
            let scoped_boundaries =
                boundaries.filter_by_codes(&region.department_codes().into_iter().collect());

            if scoped.is_empty() || scoped_boundaries.is_empty() {
                log::info!("No data for region {}, skipping...", region.name);
                continue;
            }

            jobs.push(UnitJob {
                level: AdminLevel::Region,
                identifier: region.name.clone(),
                table: scoped,
                boundaries: scoped_boundaries,
                join_field: GroupField::DepartmentCode,
                join_key: JoinKey::Code,
            });
        }
        Ok(jobs)
    }

    /// Department level: one map per department under every region, scoped
    /// to its communes by INSEE code prefix.
    fn department_jobs(
        &self,
        table: &PriceTable,
        boundaries: &BoundaryCatalog,
    ) -> CoreResult<Vec<UnitJob>> {
        let mut jobs = Vec::new();
        for region in self.hierarchy.regions() {
            for department in &region.departments {
                let rule = ScopeRule::Prefix(department.code.as_str().to_string());

                let scoped =
                    table.filter_by(GroupField::CommuneCode, |code| rule.matches(code))?;
                let scoped_boundaries = boundaries.filter_by_prefix(department.code.as_str());

                if scoped.is_empty() || scoped_boundaries.is_empty() {
                    log::info!(
                        "No data for department {}, skipping...",
                        department.code
                    );
                    continue;
                }

                jobs.push(UnitJob {
                    level: AdminLevel::Department,
                    identifier: department.code.as_str().to_string(),
                    table: scoped,
                    boundaries: scoped_boundaries,
                    join_field: GroupField::CommuneCode,
                    join_key: JoinKey::Code,
                });
            }
        }
        Ok(jobs)
    }
}
