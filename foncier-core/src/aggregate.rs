//! Price aggregation: derives price-per-m2 from raw transactions and
//! averages it per administrative group.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::regions::DeptRegionTable;
use crate::types::TransactionRecord;

/// Typed grouping key. Replaces the string column aliasing of ad-hoc
/// tabular grouping: a caller can only name fields the record actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    CommuneCode,
    DepartmentCode,
    Region,
    PropertyKind,
}

impl GroupField {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupField::CommuneCode => "commune_code",
            GroupField::DepartmentCode => "department_code",
            GroupField::Region => "region",
            GroupField::PropertyKind => "property_kind",
        }
    }
}

/// The transaction table between ingestion and aggregation.
///
/// Regions and the derived price column are attached in explicit passes so
/// that grouping can tell a missing pass (configuration error) apart from a
/// bad row (filtered).
#[derive(Debug, Clone)]
pub struct Transactions {
    records: Vec<TransactionRecord>,
    regions_attached: bool,
    prices_computed: bool,
}

impl Transactions {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            regions_attached: false,
            prices_computed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Attach the region name to every record from the department table.
    /// Records whose department has no table entry keep `region: None` and
    /// are excluded from region-level grouping. Returns the unresolved count.
    pub fn attach_regions(&mut self, table: &DeptRegionTable) -> usize {
        let mut unresolved = 0usize;
        for record in &mut self.records {
            match table.region_of(record.department_code.as_str()) {
                Some(region) => record.region = Some(region.to_string()),
                None => {
                    record.region = None;
                    unresolved += 1;
                }
            }
        }
        if unresolved > 0 {
            log::warn!("{} records have missing region information", unresolved);
        }
        self.regions_attached = true;
        unresolved
    }

    /// Compute `price_per_m2 = value / area` and drop invalid rows.
    ///
    /// A row survives iff the price is finite and > 0 and the area is
    /// present and > 0. Zero or missing areas never raise; the row is
    /// filtered. Returns the number of removed rows.
    pub fn compute_price_per_m2(&mut self) -> usize {
        log::info!("Calculating price_per_m2...");
        let initial = self.records.len();

        self.records.retain_mut(|record| {
            let (Some(value), Some(area)) = (record.value, record.area) else {
                return false;
            };
            if area <= 0.0 {
                return false;
            }
            let price = value / area;
            if !price.is_finite() || price <= 0.0 {
                return false;
            }
            record.price_per_m2 = Some(price);
            true
        });

        let removed = initial - self.records.len();
        log::info!(
            "Removed {} invalid records based on price_per_m2 and area",
            removed
        );
        self.prices_computed = true;
        removed
    }

    /// Group by one or more typed fields and average `price_per_m2`.
    ///
    /// Preconditions are configuration errors: at least one field, the
    /// price pass must have run, and grouping by [`GroupField::Region`]
    /// requires [`attach_regions`](Self::attach_regions) first. Records
    /// with a missing optional key (no region, no property kind) are
    /// excluded from the grouping, not errored.
    pub fn group_by(&self, fields: &[GroupField]) -> CoreResult<PriceTable> {
        if fields.is_empty() {
            return Err(CoreError::config("group_by requires at least one field"));
        }
        if !self.prices_computed {
            return Err(CoreError::config(
                "price_per_m2 has not been computed; run compute_price_per_m2 first",
            ));
        }
        if fields.contains(&GroupField::Region) && !self.regions_attached {
            return Err(CoreError::config(
                "grouping field 'region' does not exist; run attach_regions first",
            ));
        }

        log::info!(
            "Grouping data by [{}]...",
            fields
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut groups: BTreeMap<Vec<String>, (f64, u64)> = BTreeMap::new();
        'records: for record in &self.records {
            let mut keys = Vec::with_capacity(fields.len());
            for field in fields {
                let key = match field {
                    GroupField::CommuneCode => Some(record.commune_code.as_str().to_string()),
                    GroupField::DepartmentCode => {
                        Some(record.department_code.as_str().to_string())
                    }
                    GroupField::Region => record.region.clone(),
                    GroupField::PropertyKind => record.property_kind.clone(),
                };
                match key {
                    Some(key) => keys.push(key),
                    None => continue 'records,
                }
            }
            // retained records always carry a price after the validity pass
            let price = record.price_per_m2.unwrap_or_default();
            let entry = groups.entry(keys).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }

        let rows = groups
            .into_iter()
            .map(|(keys, (sum, count))| PriceRow {
                keys,
                average_price_per_m2: sum / count as f64,
            })
            .collect();

        Ok(PriceTable {
            fields: fields.to_vec(),
            rows,
        })
    }
}

/// One averaged group: the grouping key values (parallel to the table's
/// fields) and the mean price-per-m2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub keys: Vec<String>,
    pub average_price_per_m2: f64,
}

impl PriceRow {
    pub fn key(&self, index: usize) -> &str {
        &self.keys[index]
    }
}

/// A per-level aggregate table: group fields plus exactly one averaged
/// value column, in deterministic key-sorted row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub fields: Vec<GroupField>,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field_index(&self, field: GroupField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Rows whose value for `field` satisfies the predicate. The field
    /// must exist in this table; a miss is a configuration error.
    pub fn filter_by<F>(&self, field: GroupField, keep: F) -> CoreResult<PriceTable>
    where
        F: Fn(&str) -> bool,
    {
        let index = self.field_index(field).ok_or_else(|| {
            CoreError::config(format!(
                "field '{}' does not exist in this aggregate table",
                field.as_str()
            ))
        })?;
        Ok(PriceTable {
            fields: self.fields.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.key(index)))
                .cloned()
                .collect(),
        })
    }

    /// Join map from a field's key value to the averaged price. When a key
    /// appears in several rows (e.g. one per property kind), the last row
    /// wins, matching the lookup-dict behavior maps were built with.
    pub fn join_map(&self, field: GroupField) -> CoreResult<HashMap<String, f64>> {
        let index = self.field_index(field).ok_or_else(|| {
            CoreError::config(format!(
                "join field '{}' does not exist in this aggregate table",
                field.as_str()
            ))
        })?;
        Ok(self
            .rows
            .iter()
            .map(|row| (row.key(index).to_string(), row.average_price_per_m2))
            .collect())
    }

    pub fn averages(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.average_price_per_m2).collect()
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        log::info!("Saved aggregate table to {}", path.as_ref().display());
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> CoreResult<PriceTable> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CoreError::file_not_found(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
