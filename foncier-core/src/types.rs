use serde::{Deserialize, Serialize};

/// One administrative level of the French containment hierarchy.
///
/// A map generated "at" a level colors that level's child units: a country
/// map shades regions, a region map shades departments, a department map
/// shades communes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Country,
    Region,
    Department,
    Commune,
}

impl AdminLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::Country => "country",
            AdminLevel::Region => "region",
            AdminLevel::Department => "department",
            AdminLevel::Commune => "commune",
        }
    }

    /// The level shaded on a map generated at this level.
    pub fn child(&self) -> Option<AdminLevel> {
        match self {
            AdminLevel::Country => Some(AdminLevel::Region),
            AdminLevel::Region => Some(AdminLevel::Department),
            AdminLevel::Department => Some(AdminLevel::Commune),
            AdminLevel::Commune => None,
        }
    }

    /// Initial Leaflet zoom for a map generated at this level.
    pub fn zoom_start(&self) -> u8 {
        match self {
            AdminLevel::Country => 6,
            AdminLevel::Region => 7,
            AdminLevel::Department => 9,
            AdminLevel::Commune => 8,
        }
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// INSEE commune code. The department is encoded as a prefix of the code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommuneCode(pub String);

impl CommuneCode {
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the parent department code from the INSEE structure.
    ///
    /// Overseas departments start with "97" and use a 3-character code;
    /// Corsican codes start with "2A"/"2B" which are the department codes
    /// themselves; everything else uses the first two characters.
    pub fn department(&self) -> DepartmentCode {
        let code = &self.0;
        if code.starts_with("97") {
            DepartmentCode::new(code.chars().take(3).collect::<String>())
        } else {
            DepartmentCode::new(code.chars().take(2).collect::<String>())
        }
    }
}

impl std::fmt::Display for CommuneCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Department code ("01".."95", "2A", "2B", or a 3-character overseas code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentCode(pub String);

impl DepartmentCode {
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Membership by INSEE code structure: a department's communes all
    /// carry the department code as a prefix.
    pub fn contains(&self, commune: &CommuneCode) -> bool {
        commune.as_str().starts_with(&self.0)
    }
}

impl std::fmt::Display for DepartmentCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw DVF transaction row, consumed once by the aggregator.
///
/// `value` and `area` stay optional: the source CSV leaves both blank on a
/// sizeable share of rows and those rows are filtered, not errored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub commune_code: CommuneCode,
    pub department_code: DepartmentCode,
    pub property_kind: Option<String>,
    pub value: Option<f64>,
    pub area: Option<f64>,
    /// Region name, attached from the department table after ingestion.
    #[serde(default)]
    pub region: Option<String>,
    /// Derived metric, populated by the aggregator's validity pass.
    #[serde(default)]
    pub price_per_m2: Option<f64>,
}

impl TransactionRecord {
    pub fn new(
        commune_code: CommuneCode,
        department_code: DepartmentCode,
        property_kind: Option<String>,
        value: Option<f64>,
        area: Option<f64>,
    ) -> Self {
        Self {
            commune_code,
            department_code,
            property_kind,
            value,
            area,
            region: None,
            price_per_m2: None,
        }
    }
}
