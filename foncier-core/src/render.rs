//! Choropleth map artifact renderer.
//!
//! Binds an already-scoped aggregate table, a boundary subset and a
//! precomputed color scale into one self-contained Leaflet HTML document,
//! the artifact consumed by the front end.

use geojson::{Feature, FeatureCollection};
use std::path::Path;

use crate::aggregate::{GroupField, PriceTable};
use crate::boundary::{BoundaryCatalog, BoundaryFeature};
use crate::error::CoreResult;
use crate::scale::ColorScale;
use crate::types::AdminLevel;

/// YlOrRd four-class ramp, one color per scale class.
pub const FILL_COLORS: [&str; 4] = ["#ffffb2", "#fecc5c", "#fd8d3c", "#e31a1c"];

/// Fill for features the aggregate has no value for.
pub const NO_DATA_COLOR: &str = "#d9d9d9";

/// Which boundary property joins aggregate rows to features.
///
/// Commune and department layers are keyed by INSEE `code`; the
/// country-level region layer is keyed by display name. The asymmetry is a
/// property of the source boundary data and is configured per level, never
/// inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    Code,
    Name,
}

impl JoinKey {
    pub fn property(&self) -> &'static str {
        match self {
            JoinKey::Code => "code",
            JoinKey::Name => "nom",
        }
    }

    fn value_of<'a>(&self, feature: &'a BoundaryFeature) -> &'a str {
        match self {
            JoinKey::Code => &feature.code,
            JoinKey::Name => &feature.name,
        }
    }
}

/// Renders one map artifact per call. Stateless; all inputs are scoped and
/// precomputed by the driver.
#[derive(Debug, Default)]
pub struct MapRenderer;

impl MapRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Write one choropleth HTML document. A feature with no matching
    /// aggregate row renders as "no data" rather than failing; a map where
    /// *nothing* matched is a join-key mismatch and is logged, not raised.
    pub fn render(
        &self,
        table: &PriceTable,
        join_field: GroupField,
        boundaries: &BoundaryCatalog,
        join_key: JoinKey,
        level: AdminLevel,
        scale: &ColorScale,
        path: &Path,
    ) -> CoreResult<()> {
        let prices = table.join_map(join_field)?;
        let (center_lat, center_lon) = boundaries.centroid();

        let mut features = Vec::with_capacity(boundaries.len());
        let mut matched = 0usize;
        for boundary in &boundaries.features {
            let price = prices.get(join_key.value_of(boundary)).copied();
            if price.is_some() {
                matched += 1;
            }
            features.push(annotated_feature(boundary, price, scale));
        }

        if matched == 0 && !boundaries.is_empty() {
            log::warn!(
                "No aggregate row matched any boundary feature on '{}' (join key '{}'); \
                 the map will render entirely as no-data",
                path.display(),
                join_key.property()
            );
        }

        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        let geojson_data = serde_json::to_string(&collection)?;

        let html = render_html(
            &geojson_data,
            center_lat,
            center_lon,
            level.zoom_start(),
            scale,
        );
        std::fs::write(path, html)?;
        log::info!("Map has been saved as {}", path.display());
        Ok(())
    }
}

/// Boundary feature with the joined average price and fill color attached
/// as properties, mirroring the properties the tooltip and style read.
fn annotated_feature(
    boundary: &BoundaryFeature,
    price: Option<f64>,
    scale: &ColorScale,
) -> Feature {
    let mut feature = Feature::from(boundary);
    let properties = feature
        .properties
        .get_or_insert_with(serde_json::Map::new);
    match price {
        Some(price) => {
            properties.insert("average_price_per_m2".to_string(), price.into());
            let class = scale.class_of(price.ln_1p());
            properties.insert("fill".to_string(), FILL_COLORS[class].into());
        }
        None => {
            properties.insert("average_price_per_m2".to_string(), serde_json::Value::Null);
            properties.insert("fill".to_string(), NO_DATA_COLOR.into());
        }
    }
    feature
}

fn render_html(
    geojson_data: &str,
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    scale: &ColorScale,
) -> String {
    let legend_rows: String = (0..FILL_COLORS.len())
        .map(|class| {
            // breakpoints are log1p values; show them back in euros
            let lo = scale.breakpoints[class].exp_m1();
            let hi = scale.breakpoints[class + 1].exp_m1();
            format!(
                "<div><i style=\"background:{}\"></i> {:.0} &ndash; {:.0} &euro;/m&sup2;</div>",
                FILL_COLORS[class], lo, hi
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>Average price per m&sup2;</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
  html, body, #map {{ height: 100%; margin: 0; }}
  .legend {{ background: white; padding: 8px 10px; font: 12px sans-serif; line-height: 18px; }}
  .legend i {{ width: 14px; height: 14px; float: left; margin-right: 6px; opacity: 0.7; }}
</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{center_lat}, {center_lon}], {zoom});
L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);

var data = {geojson_data};

L.geoJSON(data, {{
  style: function (feature) {{
    return {{
      fillColor: feature.properties.fill,
      fillOpacity: 0.7,
      color: '#555',
      weight: 1,
      opacity: 0.2
    }};
  }},
  onEachFeature: function (feature, layer) {{
    var price = feature.properties.average_price_per_m2;
    var label = price === null
      ? 'no data'
      : price.toFixed(0) + ' €/m²';
    layer.bindTooltip(
      '<b>' + feature.properties.nom + '</b> (' + feature.properties.code + ')<br/>' + label,
      {{ sticky: false }}
    );
  }}
}}).addTo(map);

var legend = L.control({{position: 'bottomright'}});
legend.onAdd = function () {{
  var div = L.DomUtil.create('div', 'legend');
  div.innerHTML = '<b>Log-scaled price per m&sup2;</b>{legend_rows}'
    + '<div><i style="background:{no_data}"></i> no data</div>';
  return div;
}};
legend.addTo(map);
</script>
</body>
</html>
"#,
        center_lat = center_lat,
        center_lon = center_lon,
        zoom = zoom,
        geojson_data = geojson_data,
        legend_rows = legend_rows,
        no_data = NO_DATA_COLOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PriceRow;
    use crate::boundary::polygon_feature;

    fn table_for(codes: &[(&str, f64)]) -> PriceTable {
        PriceTable {
            fields: vec![GroupField::CommuneCode],
            rows: codes
                .iter()
                .map(|(code, avg)| PriceRow {
                    keys: vec![code.to_string()],
                    average_price_per_m2: *avg,
                })
                .collect(),
        }
    }

    fn boundaries() -> BoundaryCatalog {
        BoundaryCatalog::new(vec![
            polygon_feature(
                "33001",
                "Arcachon",
                vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]],
            ),
            polygon_feature(
                "33002",
                "Andernos",
                vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![2.0, 2.0]],
            ),
        ])
    }

    #[test]
    fn test_render_writes_artifact_with_tooltip_data() {
        let table = table_for(&[("33001", 4000.0), ("33002", 2500.0)]);
        let scale = ColorScale::from_averages(&table.averages()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");

        MapRenderer::new()
            .render(
                &table,
                GroupField::CommuneCode,
                &boundaries(),
                JoinKey::Code,
                AdminLevel::Department,
                &scale,
                &path,
            )
            .unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("L.geoJSON"));
        assert!(html.contains("\"33001\""));
        assert!(html.contains("Arcachon"));
        assert!(html.contains("average_price_per_m2"));
        // department-level zoom
        assert!(html.contains("], 9);"));
    }

    #[test]
    fn test_unmatched_feature_renders_as_no_data() {
        let table = table_for(&[("33001", 4000.0)]);
        let scale = ColorScale::from_averages(&table.averages()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");

        MapRenderer::new()
            .render(
                &table,
                GroupField::CommuneCode,
                &boundaries(),
                JoinKey::Code,
                AdminLevel::Department,
                &scale,
                &path,
            )
            .unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(NO_DATA_COLOR));
    }

    #[test]
    fn test_join_key_mismatch_degrades_silently() {
        // joining codes against the name property matches nothing but must
        // still produce a valid artifact
        let table = table_for(&[("33001", 4000.0), ("33002", 2500.0)]);
        let scale = ColorScale::from_averages(&table.averages()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");

        let result = MapRenderer::new().render(
            &table,
            GroupField::CommuneCode,
            &boundaries(),
            JoinKey::Name,
            AdminLevel::Department,
            &scale,
            &path,
        );
        assert!(result.is_ok());
        let html = std::fs::read_to_string(&path).unwrap();
        // every feature carries the no-data fill, none a class color
        for color in FILL_COLORS {
            assert!(!html.contains(&format!("\"fill\":\"{}\"", color)));
        }
        assert!(html.contains(&format!("\"fill\":\"{}\"", NO_DATA_COLOR)));
    }

    #[test]
    fn test_degenerate_scale_still_renders() {
        let table = table_for(&[("33001", 4000.0)]);
        let scale = ColorScale::from_averages(&table.averages()).unwrap();
        assert!(scale.is_degenerate());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");

        MapRenderer::new()
            .render(
                &table,
                GroupField::CommuneCode,
                &BoundaryCatalog::new(vec![polygon_feature(
                    "33001",
                    "Arcachon",
                    vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]],
                )]),
                JoinKey::Code,
                AdminLevel::Department,
                &scale,
                &path,
            )
            .unwrap();
        assert!(path.exists());
    }
}
