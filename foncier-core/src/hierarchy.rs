//! Three-level administrative containment tree.
//!
//! Built once from the boundary catalogs and a department→region table,
//! immutable afterwards. The tree is what drives per-unit map generation
//! and is exported as one nested JSON document for the front end.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;

use crate::boundary::BoundaryCatalog;
use crate::error::CoreResult;
use crate::regions::DeptRegionTable;
use crate::types::{CommuneCode, DepartmentCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commune {
    pub code: CommuneCode,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub code: DepartmentCode,
    pub name: String,
    pub region_name: String,
    pub communes: Vec<Commune>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region boundary code; None for the synthetic "Unknown" bucket.
    pub code: Option<String>,
    pub name: String,
    pub departments: Vec<Department>,
}

impl Region {
    pub fn department_codes(&self) -> Vec<&str> {
        self.departments.iter().map(|d| d.code.as_str()).collect()
    }
}

/// The complete region → department → commune tree, in deterministic
/// (name-sorted) order at every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub regions: Vec<Region>,
}

impl Hierarchy {
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region_names(&self) -> HashSet<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn department(&self, code: &str) -> Option<&Department> {
        self.regions
            .iter()
            .flat_map(|r| r.departments.iter())
            .find(|d| d.code.as_str() == code)
    }

    pub fn commune_count(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|r| r.departments.iter())
            .map(|d| d.communes.len())
            .sum()
    }

    /// Nested JSON document: region name → { code, departments:
    /// department name → { code, communes: [{code, name}] } }.
    pub fn to_json(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        for region in &self.regions {
            let mut departments = serde_json::Map::new();
            for dept in &region.departments {
                let communes: Vec<serde_json::Value> = dept
                    .communes
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "code": c.code.as_str(),
                            "name": c.name,
                        })
                    })
                    .collect();
                departments.insert(
                    dept.name.clone(),
                    serde_json::json!({
                        "code": dept.code.as_str(),
                        "communes": communes,
                    }),
                );
            }
            root.insert(
                region.name.clone(),
                serde_json::json!({
                    "code": region.code,
                    "departments": departments,
                }),
            );
        }
        serde_json::Value::Object(root)
    }

    /// Write the nested JSON document, overwriting any previous export.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, &self.to_json())?;
        log::info!(
            "Saved region-department-commune map to {}",
            path.as_ref().display()
        );
        Ok(())
    }
}

/// Builds a [`Hierarchy`] from the three boundary catalogs.
///
/// The department→region table is injected at construction time; there is
/// no global lookup state.
pub struct HierarchyBuilder {
    table: DeptRegionTable,
}

impl HierarchyBuilder {
    pub fn new(table: DeptRegionTable) -> Self {
        Self { table }
    }

    pub fn build(
        &self,
        regions: &BoundaryCatalog,
        departments: &BoundaryCatalog,
        communes: &BoundaryCatalog,
    ) -> Hierarchy {
        // code → name for regions, inverted for name → code resolution
        let region_code_by_name: BTreeMap<&str, &str> = regions
            .features
            .iter()
            .map(|f| (f.name.as_str(), f.code.as_str()))
            .collect();

        // department code → (name, region bucket)
        let mut dept_index: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
        for feature in &departments.features {
            let region_name = self.table.region_of_or_unknown(&feature.code);
            dept_index.insert(feature.code.as_str(), (feature.name.as_str(), region_name));
        }

        // region name → department code → communes
        let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<Commune>>> = BTreeMap::new();
        let mut skipped = 0usize;

        for feature in &communes.features {
            let commune_code = CommuneCode::new(feature.code.clone());
            let dept_code = commune_code.department();

            let Some((dept_key, &(_, region_name))) = dept_index.get_key_value(dept_code.as_str())
            else {
                skipped += 1;
                continue;
            };
            let dept_key: &str = *dept_key;

            tree.entry(region_name)
                .or_default()
                .entry(dept_key)
                .or_default()
                .push(Commune {
                    code: commune_code,
                    name: feature.name.clone(),
                });
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {} communes whose department code has no boundary entry",
                skipped
            );
        }

        let mut out_regions = Vec::with_capacity(tree.len());
        for (region_name, dept_map) in tree {
            let mut out_departments = Vec::with_capacity(dept_map.len());
            for (dept_code, mut communes) in dept_map {
                communes.sort_by(|a, b| a.name.cmp(&b.name));
                let (dept_name, _) = dept_index[dept_code];
                out_departments.push(Department {
                    code: DepartmentCode::new(dept_code),
                    name: dept_name.to_string(),
                    region_name: region_name.to_string(),
                    communes,
                });
            }
            out_departments.sort_by(|a, b| a.name.cmp(&b.name));
            out_regions.push(Region {
                code: region_code_by_name.get(region_name).map(|c| c.to_string()),
                name: region_name.to_string(),
                departments: out_departments,
            });
        }
        out_regions.sort_by(|a, b| a.name.cmp(&b.name));

        Hierarchy {
            regions: out_regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::polygon_feature;

    fn ring() -> Vec<Vec<f64>> {
        vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]]
    }

    fn catalogs() -> (BoundaryCatalog, BoundaryCatalog, BoundaryCatalog) {
        let regions = BoundaryCatalog::new(vec![
            polygon_feature("75R", "Île-de-France", ring()),
            polygon_feature("NAQ", "Nouvelle-Aquitaine", ring()),
        ]);
        let departments = BoundaryCatalog::new(vec![
            polygon_feature("75", "Paris", ring()),
            polygon_feature("33", "Gironde", ring()),
            polygon_feature("98", "Hors table", ring()),
        ]);
        let communes = BoundaryCatalog::new(vec![
            polygon_feature("75056", "Paris", ring()),
            polygon_feature("33002", "Andernos-les-Bains", ring()),
            polygon_feature("33001", "Arcachon", ring()),
            polygon_feature("98001", "Nulle-Part", ring()),
            polygon_feature("66666", "Orpheline", ring()),
        ]);
        (regions, departments, communes)
    }

    #[test]
    fn test_build_attaches_communes_to_departments() {
        let (regions, departments, communes) = catalogs();
        let hierarchy = HierarchyBuilder::new(DeptRegionTable::standard())
            .build(&regions, &departments, &communes);

        let gironde = hierarchy.department("33").unwrap();
        assert_eq!(gironde.region_name, "Nouvelle-Aquitaine");
        let names: Vec<&str> = gironde.communes.iter().map(|c| c.name.as_str()).collect();
        // sorted by commune name
        assert_eq!(names, vec!["Andernos-les-Bains", "Arcachon"]);
    }

    #[test]
    fn test_unresolved_department_goes_to_unknown_bucket() {
        let (regions, departments, communes) = catalogs();
        let hierarchy = HierarchyBuilder::new(DeptRegionTable::standard())
            .build(&regions, &departments, &communes);

        let unknown = hierarchy
            .regions()
            .iter()
            .find(|r| r.name == "Unknown")
            .expect("department 98 must land in the Unknown bucket");
        assert_eq!(unknown.code, None);
        assert_eq!(unknown.departments.len(), 1);
        assert_eq!(unknown.departments[0].code.as_str(), "98");
    }

    #[test]
    fn test_commune_without_department_is_skipped() {
        let (regions, departments, communes) = catalogs();
        let hierarchy = HierarchyBuilder::new(DeptRegionTable::standard())
            .build(&regions, &departments, &communes);

        // "66666" derives department "66" which has no boundary entry
        assert!(hierarchy.department("66").is_none());
        assert_eq!(hierarchy.commune_count(), 4);
    }

    #[test]
    fn test_membership_round_trip() {
        let (regions, departments, communes) = catalogs();
        let hierarchy = HierarchyBuilder::new(DeptRegionTable::standard())
            .build(&regions, &departments, &communes);

        // every commune in the tree re-derives exactly its department
        for region in hierarchy.regions() {
            for dept in &region.departments {
                let mut seen = HashSet::new();
                for commune in &dept.communes {
                    assert_eq!(commune.code.department(), dept.code);
                    assert!(seen.insert(commune.code.as_str()), "no duplicates");
                }
            }
        }
    }

    #[test]
    fn test_json_export_shape() {
        let (regions, departments, communes) = catalogs();
        let hierarchy = HierarchyBuilder::new(DeptRegionTable::standard())
            .build(&regions, &departments, &communes);

        let json = hierarchy.to_json();
        let idf = &json["Île-de-France"];
        assert_eq!(idf["code"], "75R");
        assert_eq!(idf["departments"]["Paris"]["code"], "75");
        assert_eq!(
            idf["departments"]["Paris"]["communes"][0]["code"],
            "75056"
        );
    }
}
