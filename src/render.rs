use std::fs;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::errors::PipelineError;
use crate::segments::ResolvedSegment;

/// Per-segment payload handed to the Leaflet side. Coordinates here are
/// (lat, lon) pairs in Leaflet's axis order, flipped from the internal
/// x = lon / y = lat points.
#[derive(Debug, Serialize)]
struct SegmentFeature {
    path: Vec<[f64; 2]>,
    color: &'static str,
    tooltip: String,
    popup: String,
    mid: [f64; 2],
    /// CSS rotation for the arrow glyph, bearing minus 90.
    rotation: f64,
}

/// Lat/lon bounding box over every rendered path point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

pub fn data_bounds(segments: &[ResolvedSegment]) -> Bounds {
    let mut bounds = Bounds {
        min_lat: f64::INFINITY,
        min_lon: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        max_lon: f64::NEG_INFINITY,
    };
    for segment in segments {
        for point in &segment.path {
            bounds.min_lat = bounds.min_lat.min(point.y());
            bounds.max_lat = bounds.max_lat.max(point.y());
            bounds.min_lon = bounds.min_lon.min(point.x());
            bounds.max_lon = bounds.max_lon.max(point.x());
        }
    }
    bounds
}

/// Writes the interactive map artifact: one self-contained HTML file with
/// coverage, side-colored, and direction-arrow layers.
pub fn write_map(path: &Path, segments: &[ResolvedSegment]) -> Result<(), PipelineError> {
    let html = render_html(segments)?;
    fs::write(path, html)?;
    info!("Map saved to {}", path.display());
    Ok(())
}

fn render_html(segments: &[ResolvedSegment]) -> Result<String, PipelineError> {
    let bounds = data_bounds(segments);
    let features: Vec<SegmentFeature> = segments
        .iter()
        .map(|segment| SegmentFeature {
            path: segment.path.iter().map(|p| [p.y(), p.x()]).collect(),
            color: segment.color,
            tooltip: segment.tooltip(),
            popup: segment.popup_html(),
            mid: [segment.midpoint.y(), segment.midpoint.x()],
            rotation: segment.bearing - 90.0,
        })
        .collect();

    // "</" must not appear inside the inline <script> block.
    let data = serde_json::to_string(&features)?.replace("</", "<\\/");
    let bounds_json = serde_json::to_string(&[
        [bounds.min_lat, bounds.min_lon],
        [bounds.max_lat, bounds.max_lon],
    ])?;

    Ok(MAP_TEMPLATE
        .replace("__SEGMENTS__", &data)
        .replace("__BOUNDS__", &bounds_json))
}

const MAP_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Walk Log</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
    .dir-arrow {
      font-size: 18px;
      transform-origin: center;
      text-shadow: -1px 0 #fff, 0 1px #fff, 1px 0 #fff, 0 -1px #fff;
    }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const SEGMENTS = __SEGMENTS__;
    const BOUNDS = __BOUNDS__;

    const map = L.map('map');
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
      maxZoom: 19,
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);
    L.control.scale().addTo(map);

    const coverage = L.featureGroup();
    const sideColored = L.featureGroup();
    const arrows = L.featureGroup();

    for (const seg of SEGMENTS) {
      L.polyline(seg.path, { weight: 8, opacity: 0.85 })
        .bindTooltip(seg.tooltip)
        .bindPopup(seg.popup, { maxWidth: 350 })
        .addTo(coverage);

      L.polyline(seg.path, { weight: 6, opacity: 0.95, color: seg.color })
        .bindTooltip(seg.tooltip)
        .bindPopup(seg.popup, { maxWidth: 350 })
        .addTo(sideColored);

      const icon = L.divIcon({
        className: '',
        html: '<div class="dir-arrow" style="color:' + seg.color +
              ';transform:rotate(' + seg.rotation + 'deg)">➤</div>'
      });
      L.marker(seg.mid, { icon }).bindTooltip(seg.tooltip).addTo(arrows);
    }

    coverage.addTo(map);
    sideColored.addTo(map);
    arrows.addTo(map);
    L.control.layers(null, {
      'Coverage (all segments)': coverage,
      'Side-colored segments': sideColored,
      'Direction arrows': arrows
    }, { collapsed: false }).addTo(map);

    map.fitBounds(BOUNDS);
  </script>
</body>
</html>
"#;
