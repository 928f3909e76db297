//! DVF transaction CSV reader.
//!
//! Reads the "demandes de valeurs foncières" open-data CSV by header name,
//! so column order and extra columns do not matter. Rows are deduplicated
//! by parcel id (first occurrence wins) and rows without a commune code are
//! dropped with a warning.

use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::aggregate::Transactions;
use crate::error::{CoreError, CoreResult};
use crate::types::{CommuneCode, DepartmentCode, TransactionRecord};

/// The DVF columns this pipeline consumes. Everything is optional at the
/// wire level; the aggregator decides what an invalid row is.
#[derive(Debug, Deserialize)]
struct DvfRow {
    id_parcelle: Option<String>,
    code_commune: Option<String>,
    code_departement: Option<String>,
    type_local: Option<String>,
    valeur_fonciere: Option<f64>,
    surface_reelle_bati: Option<f64>,
}

/// Load a DVF CSV (optionally gzip-compressed) into a transaction set.
pub fn read_transactions<P: AsRef<Path>>(path: P) -> CoreResult<Transactions> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CoreError::file_not_found(path.to_path_buf()));
    }
    log::info!("Loading transactions from {}", path.display());

    let file = File::open(path)?;
    if path.to_string_lossy().ends_with(".gz") {
        read_from(BufReader::new(GzDecoder::new(file)))
    } else {
        read_from(BufReader::new(file))
    }
}

fn read_from<R: Read>(reader: R) -> CoreResult<Transactions> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    let mut seen_parcels: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;
    let mut missing_commune = 0usize;

    for row in csv_reader.deserialize::<DvfRow>() {
        let row = row?;

        if let Some(parcel) = row.id_parcelle {
            if !seen_parcels.insert(parcel) {
                duplicates += 1;
                continue;
            }
        }

        let Some(commune) = row.code_commune else {
            missing_commune += 1;
            continue;
        };
        let commune = CommuneCode::new(commune);
        // trust the explicit department column when present, otherwise
        // derive it from the INSEE commune code
        let department = match row.code_departement {
            Some(code) => DepartmentCode::new(code),
            None => commune.department(),
        };

        records.push(TransactionRecord::new(
            commune,
            department,
            row.type_local,
            row.valeur_fonciere,
            row.surface_reelle_bati,
        ));
    }

    if duplicates > 0 {
        log::info!("Dropped {} duplicate parcel rows", duplicates);
    }
    if missing_commune > 0 {
        log::warn!("Skipped {} rows without a commune code", missing_commune);
    }
    log::info!("Loaded {} transaction records", records.len());

    Ok(Transactions::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "id_parcelle,code_commune,code_departement,type_local,valeur_fonciere,surface_reelle_bati\n";

    fn read_str(body: &str) -> Transactions {
        let csv = format!("{}{}", HEADER, body);
        read_from(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_rows_by_header_name() {
        let txs = read_str(
            "p1,75056,75,Appartement,500000,50\n\
             p2,33001,33,Maison,200000,100\n",
        );
        assert_eq!(txs.len(), 2);
        let record = &txs.records()[0];
        assert_eq!(record.commune_code.as_str(), "75056");
        assert_eq!(record.department_code.as_str(), "75");
        assert_eq!(record.property_kind.as_deref(), Some("Appartement"));
        assert_eq!(record.value, Some(500_000.0));
        assert_eq!(record.area, Some(50.0));
    }

    #[test]
    fn test_blank_fields_become_none() {
        let txs = read_str("p1,75056,75,,,\n");
        let record = &txs.records()[0];
        assert_eq!(record.property_kind, None);
        assert_eq!(record.value, None);
        assert_eq!(record.area, None);
    }

    #[test]
    fn test_duplicate_parcels_keep_first() {
        let txs = read_str(
            "p1,75056,75,Maison,100000,50\n\
             p1,75056,75,Maison,999999,50\n\
             p2,75056,75,Maison,200000,50\n",
        );
        assert_eq!(txs.len(), 2);
        assert_eq!(txs.records()[0].value, Some(100_000.0));
    }

    #[test]
    fn test_rows_without_commune_are_skipped() {
        let txs = read_str(
            "p1,,75,Maison,100000,50\n\
             p2,75056,75,Maison,200000,50\n",
        );
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn test_department_derived_when_column_blank() {
        let txs = read_str("p1,97411,,Maison,100000,50\n");
        assert_eq!(txs.records()[0].department_code.as_str(), "974");
    }

    #[test]
    fn test_reads_gzipped_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dvf.csv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder
            .write_all(format!("{}p1,75056,75,Maison,100000,50\n", HEADER).as_bytes())
            .unwrap();
        encoder.finish().unwrap();

        let txs = read_transactions(&path).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn test_missing_file_is_reported_with_path() {
        let err = read_transactions("/nonexistent/dvf.csv").unwrap_err();
        assert!(matches!(err, CoreError::FileNotFound { .. }));
    }
}
