//! Static department-code to region-name mapping.
//!
//! Covers the 96 metropolitan and 5 overseas department codes. The table is
//! a constant data asset injected into [`HierarchyBuilder`] and the
//! aggregator at construction time rather than consulted as a global.
//!
//! [`HierarchyBuilder`]: crate::hierarchy::HierarchyBuilder

use std::collections::HashMap;

/// Department code → region name, one entry per official department.
pub const DEPT_TO_REGION: &[(&str, &str)] = &[
    ("01", "Auvergne-Rhône-Alpes"),
    ("02", "Hauts-de-France"),
    ("03", "Auvergne-Rhône-Alpes"),
    ("04", "Provence-Alpes-Côte d'Azur"),
    ("05", "Provence-Alpes-Côte d'Azur"),
    ("06", "Provence-Alpes-Côte d'Azur"),
    ("07", "Auvergne-Rhône-Alpes"),
    ("08", "Grand Est"),
    ("09", "Occitanie"),
    ("10", "Grand Est"),
    ("11", "Occitanie"),
    ("12", "Occitanie"),
    ("13", "Provence-Alpes-Côte d'Azur"),
    ("14", "Normandie"),
    ("15", "Auvergne-Rhône-Alpes"),
    ("16", "Nouvelle-Aquitaine"),
    ("17", "Nouvelle-Aquitaine"),
    ("18", "Centre-Val de Loire"),
    ("19", "Nouvelle-Aquitaine"),
    ("2A", "Corse"),
    ("2B", "Corse"),
    ("21", "Bourgogne-Franche-Comté"),
    ("22", "Bretagne"),
    ("23", "Nouvelle-Aquitaine"),
    ("24", "Nouvelle-Aquitaine"),
    ("25", "Bourgogne-Franche-Comté"),
    ("26", "Auvergne-Rhône-Alpes"),
    ("27", "Normandie"),
    ("28", "Centre-Val de Loire"),
    ("29", "Bretagne"),
    ("30", "Occitanie"),
    ("31", "Occitanie"),
    ("32", "Nouvelle-Aquitaine"),
    ("33", "Nouvelle-Aquitaine"),
    ("34", "Occitanie"),
    ("35", "Bretagne"),
    ("36", "Centre-Val de Loire"),
    ("37", "Centre-Val de Loire"),
    ("38", "Auvergne-Rhône-Alpes"),
    ("39", "Bourgogne-Franche-Comté"),
    ("40", "Nouvelle-Aquitaine"),
    ("41", "Centre-Val de Loire"),
    ("42", "Auvergne-Rhône-Alpes"),
    ("43", "Auvergne-Rhône-Alpes"),
    ("44", "Pays de la Loire"),
    ("45", "Centre-Val de Loire"),
    ("46", "Occitanie"),
    ("47", "Nouvelle-Aquitaine"),
    ("48", "Occitanie"),
    ("49", "Pays de la Loire"),
    ("50", "Normandie"),
    ("51", "Grand Est"),
    ("52", "Grand Est"),
    ("53", "Pays de la Loire"),
    ("54", "Grand Est"),
    ("55", "Grand Est"),
    ("56", "Bretagne"),
    ("57", "Grand Est"),
    ("58", "Bourgogne-Franche-Comté"),
    ("59", "Hauts-de-France"),
    ("60", "Hauts-de-France"),
    ("61", "Normandie"),
    ("62", "Hauts-de-France"),
    ("63", "Auvergne-Rhône-Alpes"),
    ("64", "Nouvelle-Aquitaine"),
    ("65", "Occitanie"),
    ("66", "Occitanie"),
    ("67", "Grand Est"),
    ("68", "Grand Est"),
    ("69", "Auvergne-Rhône-Alpes"),
    ("70", "Bourgogne-Franche-Comté"),
    ("71", "Bourgogne-Franche-Comté"),
    ("72", "Pays de la Loire"),
    ("73", "Auvergne-Rhône-Alpes"),
    ("74", "Auvergne-Rhône-Alpes"),
    ("75", "Île-de-France"),
    ("76", "Normandie"),
    ("77", "Île-de-France"),
    ("78", "Île-de-France"),
    ("79", "Nouvelle-Aquitaine"),
    ("80", "Hauts-de-France"),
    ("81", "Occitanie"),
    ("82", "Occitanie"),
    ("83", "Provence-Alpes-Côte d'Azur"),
    ("84", "Provence-Alpes-Côte d'Azur"),
    ("85", "Pays de la Loire"),
    ("86", "Nouvelle-Aquitaine"),
    ("87", "Nouvelle-Aquitaine"),
    ("88", "Grand Est"),
    ("89", "Bourgogne-Franche-Comté"),
    ("90", "Bourgogne-Franche-Comté"),
    ("91", "Île-de-France"),
    ("92", "Île-de-France"),
    ("93", "Île-de-France"),
    ("94", "Île-de-France"),
    ("95", "Île-de-France"),
    ("971", "Guadeloupe"),
    ("972", "Martinique"),
    ("973", "Guyane"),
    ("974", "La Réunion"),
    ("976", "Mayotte"),
];

/// Region bucket assigned when a department code has no table entry.
/// Unresolved departments are bucketed, never dropped, so downstream
/// aggregation keeps their data.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Immutable department→region lookup, injected where needed.
#[derive(Debug, Clone)]
pub struct DeptRegionTable {
    map: HashMap<String, String>,
}

impl DeptRegionTable {
    /// The standard 101-entry French table.
    pub fn standard() -> Self {
        Self::from_pairs(
            DEPT_TO_REGION
                .iter()
                .map(|(d, r)| (d.to_string(), r.to_string())),
        )
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    pub fn region_of(&self, dept_code: &str) -> Option<&str> {
        self.map.get(dept_code).map(String::as_str)
    }

    /// Region name with the `"Unknown"` fallback bucket.
    pub fn region_of_or_unknown(&self, dept_code: &str) -> &str {
        self.region_of(dept_code).unwrap_or(UNKNOWN_REGION)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for DeptRegionTable {
    fn default() -> Self {
        Self::standard()
    }
}
