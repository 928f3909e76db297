//! End-to-end pipeline test: ingest a synthetic DVF extract and boundary
//! layers, build the hierarchy, aggregate per level and drive map
//! generation into a temporary directory.

use foncier_core::*;

use std::collections::HashSet;
use std::path::Path;

fn write_boundaries(path: &Path, features: &[(&str, &str)]) {
    let features: Vec<serde_json::Value> = features
        .iter()
        .enumerate()
        .map(|(i, (code, name))| {
            let origin = i as f64;
            serde_json::json!({
                "type": "Feature",
                "properties": {"code": code, "nom": name},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [origin, origin],
                        [origin + 1.0, origin],
                        [origin + 1.0, origin + 1.0],
                        [origin, origin + 1.0]
                    ]]
                }
            })
        })
        .collect();
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    });
    std::fs::write(path, serde_json::to_string(&collection).unwrap()).unwrap();
}

fn write_transactions(path: &Path) {
    let csv = "\
id_parcelle,code_commune,code_departement,type_local,valeur_fonciere,surface_reelle_bati
p01,33001,33,Maison,200000,100
p02,33001,33,Maison,400000,100
p03,33002,33,Appartement,250000,50
p04,45010,45,Maison,180000,100
p04,45010,45,Maison,999999,100
p05,45010,45,,150000,
p06,45010,45,Maison,0,100
";
    std::fs::write(path, csv).unwrap();
}

struct Fixture {
    regions: BoundaryCatalog,
    departments: BoundaryCatalog,
    communes: BoundaryCatalog,
    transactions: Transactions,
}

fn fixture(dir: &Path) -> Fixture {
    let regions_path = dir.join("regions.geojson");
    let departments_path = dir.join("departements.geojson");
    let communes_path = dir.join("communes.geojson");
    let dvf_path = dir.join("dvf.csv");

    write_boundaries(
        &regions_path,
        &[
            ("75", "Nouvelle-Aquitaine"),
            ("24", "Centre-Val de Loire"),
        ],
    );
    write_boundaries(
        &departments_path,
        &[
            ("33", "Gironde"),
            ("45", "Loiret"),
            ("04", "Alpes-de-Haute-Provence"),
        ],
    );
    write_boundaries(
        &communes_path,
        &[
            ("33001", "Arcachon"),
            ("33002", "Andernos-les-Bains"),
            ("45010", "Artenay"),
            ("04001", "Aiglun"),
        ],
    );
    write_transactions(&dvf_path);

    Fixture {
        regions: read_boundaries(&regions_path).unwrap(),
        departments: read_boundaries(&departments_path).unwrap(),
        communes: read_boundaries(&communes_path).unwrap(),
        transactions: read_transactions(&dvf_path).unwrap(),
    }
}

#[test]
fn test_full_pipeline_produces_expected_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path());

    // ingest: 7 raw rows, 1 duplicate parcel dropped on read
    assert_eq!(fx.transactions.len(), 6);

    let table = DeptRegionTable::standard();
    let hierarchy =
        HierarchyBuilder::new(table.clone()).build(&fx.regions, &fx.departments, &fx.communes);
    assert_eq!(hierarchy.commune_count(), 4);
    assert_eq!(hierarchy.department("33").unwrap().region_name, "Nouvelle-Aquitaine");

    let mut txs = fx.transactions;
    txs.attach_regions(&table);
    // zero-value p06 and blank-area p05 rows are filtered here
    assert_eq!(txs.compute_price_per_m2(), 2);
    assert_eq!(txs.len(), 4);

    let by_commune = txs.group_by(&[GroupField::CommuneCode]).unwrap();
    let by_department = txs.group_by(&[GroupField::DepartmentCode]).unwrap();
    let by_region = txs.group_by(&[GroupField::Region]).unwrap();

    // 33001 averages its two valid sales
    let join = by_commune.join_map(GroupField::CommuneCode).unwrap();
    assert!((join["33001"] - 3000.0).abs() < 1e-9);
    assert!((join["33002"] - 5000.0).abs() < 1e-9);
    assert!((join["45010"] - 1800.0).abs() < 1e-9);

    let out = dir.path().join("maps");
    let driver = MapDriver::new(&hierarchy, &out);

    let country = driver
        .generate(AdminLevel::Country, &by_region, &fx.regions, None)
        .unwrap();
    assert_eq!(country.len(), 1);
    assert!(country[0].ends_with("country_maps/price_per_unit_country_france.html"));

    let regions = driver
        .generate(AdminLevel::Region, &by_department, &fx.departments, None)
        .unwrap();
    assert_eq!(regions.len(), 2);

    let departments = driver
        .generate(AdminLevel::Department, &by_commune, &fx.communes, None)
        .unwrap();
    // department 04 exists in every input but has no transactions: skipped
    assert_eq!(departments.len(), 2);
    let names: HashSet<String> = departments
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert!(names.contains("price_per_unit_department_33.html"));
    assert!(names.contains("price_per_unit_department_45.html"));

    for path in country.iter().chain(&regions).chain(&departments) {
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("L.geoJSON"));
        assert!(html.contains("average_price_per_m2"));
    }
}

#[test]
fn test_aggregate_tables_round_trip_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path());

    let mut txs = fx.transactions;
    txs.attach_regions(&DeptRegionTable::standard());
    txs.compute_price_per_m2();
    let table = txs.group_by(&[GroupField::CommuneCode]).unwrap();

    let path = dir.path().join("price_per_m2_by_commune.json");
    table.write_json(&path).unwrap();
    let restored = PriceTable::read_json(&path).unwrap();
    assert_eq!(table, restored);
}

#[test]
fn test_hierarchy_export_matches_front_end_shape() {
    let dir = tempfile::tempdir().unwrap();
    let fx = fixture(dir.path());

    let hierarchy = HierarchyBuilder::new(DeptRegionTable::standard()).build(
        &fx.regions,
        &fx.departments,
        &fx.communes,
    );
    let path = dir.path().join("region_dept_commune_map.json");
    hierarchy.write_json(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
    let gironde = &json["Nouvelle-Aquitaine"]["departments"]["Gironde"];
    assert_eq!(gironde["code"], "33");
    assert_eq!(gironde["communes"][0]["name"], "Andernos-les-Bains");
    assert_eq!(gironde["communes"][1]["name"], "Arcachon");
}
