//! Boundary catalog: administrative boundary geometry for one level.
//!
//! Wraps a GeoJSON FeatureCollection into (code, name, geometry) entries and
//! provides the subset and centroid operations the map driver needs.

use geojson::{Feature, FeatureCollection, Geometry, Value};
use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};

/// Geographic center of metropolitan France, used when a boundary subset
/// has no usable coordinates.
pub const FRANCE_CENTROID: (f64, f64) = (46.603354, 1.888334);

/// One administrative boundary: INSEE code, display name, geometry.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub code: String,
    pub name: String,
    pub geometry: Geometry,
}

/// All boundaries of one administrative level, in source feature order.
#[derive(Debug, Clone, Default)]
pub struct BoundaryCatalog {
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryCatalog {
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        Self { features }
    }

    /// Build a catalog from a GeoJSON FeatureCollection with `code` and
    /// `nom` properties per feature. Features missing a code, name or
    /// geometry are skipped with a warning rather than failing the load.
    pub fn from_feature_collection(collection: FeatureCollection) -> CoreResult<Self> {
        let mut features = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for feature in collection.features {
            let code = feature
                .property("code")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let name = feature
                .property("nom")
                .and_then(|v| v.as_str())
                .map(str::to_string);

            match (code, name, feature.geometry) {
                (Some(code), Some(name), Some(geometry)) => {
                    features.push(BoundaryFeature {
                        code,
                        name,
                        geometry,
                    });
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {} boundary features without code, name or geometry",
                skipped
            );
        }

        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.code.as_str())
    }

    /// Subset of features whose code is in the given set.
    pub fn filter_by_codes(&self, codes: &HashSet<&str>) -> Self {
        Self {
            features: self
                .features
                .iter()
                .filter(|f| codes.contains(f.code.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Subset of features whose code starts with the given prefix
    /// (INSEE department-to-commune containment).
    pub fn filter_by_prefix(&self, prefix: &str) -> Self {
        Self {
            features: self
                .features
                .iter()
                .filter(|f| f.code.starts_with(prefix))
                .cloned()
                .collect(),
        }
    }

    /// Centroid of the catalog as (latitude, longitude), computed by
    /// averaging every ring vertex of Polygon and MultiPolygon geometries.
    /// Other geometry types are ignored; an empty result falls back to the
    /// national centroid.
    pub fn centroid(&self) -> (f64, f64) {
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        let mut count = 0usize;

        let mut accumulate_ring = |ring: &Vec<Vec<f64>>| {
            for coord in ring {
                if coord.len() >= 2 {
                    lon_sum += coord[0];
                    lat_sum += coord[1];
                    count += 1;
                }
            }
        };

        for feature in &self.features {
            match &feature.geometry.value {
                Value::Polygon(rings) => {
                    for ring in rings {
                        accumulate_ring(ring);
                    }
                }
                Value::MultiPolygon(polygons) => {
                    for polygon in polygons {
                        for ring in polygon {
                            accumulate_ring(ring);
                        }
                    }
                }
                _ => continue,
            }
        }

        if count == 0 {
            FRANCE_CENTROID
        } else {
            (lat_sum / count as f64, lon_sum / count as f64)
        }
    }
}

/// Parse a GeoJSON document into a catalog. Only FeatureCollections are
/// accepted; bare features or geometries are a format error.
pub fn catalog_from_geojson(geojson: geojson::GeoJson) -> CoreResult<BoundaryCatalog> {
    match geojson {
        geojson::GeoJson::FeatureCollection(collection) => {
            BoundaryCatalog::from_feature_collection(collection)
        }
        other => Err(CoreError::parse(
            "geojson".to_string(),
            format!("expected a FeatureCollection, got {:?}", other.to_string()),
        )),
    }
}

/// Convenience constructor for a polygon boundary, used by the renderer's
/// feature export and throughout the tests.
pub fn polygon_feature(code: &str, name: &str, ring: Vec<Vec<f64>>) -> BoundaryFeature {
    BoundaryFeature {
        code: code.to_string(),
        name: name.to_string(),
        geometry: Geometry::new(Value::Polygon(vec![ring])),
    }
}

impl From<&BoundaryFeature> for Feature {
    fn from(boundary: &BoundaryFeature) -> Self {
        let mut properties = serde_json::Map::new();
        properties.insert("code".to_string(), boundary.code.clone().into());
        properties.insert("nom".to_string(), boundary.name.clone().into());
        Feature {
            bbox: None,
            geometry: Some(boundary.geometry.clone()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}
