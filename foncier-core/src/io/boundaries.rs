//! GeoJSON boundary layer reader.

use flate2::read::GzDecoder;
use geojson::GeoJson;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::boundary::{catalog_from_geojson, BoundaryCatalog};
use crate::error::{CoreError, CoreResult};

/// Load one administrative level's boundaries from a GeoJSON
/// FeatureCollection file (optionally gzip-compressed).
pub fn read_boundaries<P: AsRef<Path>>(path: P) -> CoreResult<BoundaryCatalog> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CoreError::file_not_found(path.to_path_buf()));
    }
    log::info!("Loading boundaries from {}", path.display());

    let file = File::open(path)?;
    let geojson = if path.to_string_lossy().ends_with(".gz") {
        GeoJson::from_reader(BufReader::new(GzDecoder::new(file)))?
    } else {
        GeoJson::from_reader(BufReader::new(file))?
    };

    let catalog = catalog_from_geojson(geojson)?;
    log::info!("Loaded {} boundary features", catalog.len());
    Ok(catalog)
}
