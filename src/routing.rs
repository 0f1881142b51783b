use std::time::Duration;

use anyhow::{Result, anyhow};
use geo::Point;
use log::debug;
use serde::Deserialize;

/// Walking-path lookup between two coordinates. Implementations perform the
/// outbound network call; `resolve_path` applies the straight-line fallback,
/// so route errors never travel further up.
pub trait Router {
    async fn route(&self, start: Point<f64>, end: Point<f64>) -> Result<Vec<Point<f64>>>;
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Client for an OSRM-compatible HTTP routing service, queried with the
/// walking profile.
pub struct OsrmRouter {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmRouter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl Router for OsrmRouter {
    async fn route(&self, start: Point<f64>, end: Point<f64>) -> Result<Vec<Point<f64>>> {
        let url = format!(
            "{}/route/v1/foot/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            start.x(),
            start.y(),
            end.x(),
            end.y()
        );
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_route_response(&body)
    }
}

/// Extracts the first route's geometry. OSRM emits (lon, lat) pairs, which is
/// exactly Point's x/y axis order.
fn parse_route_response(body: &str) -> Result<Vec<Point<f64>>> {
    let response: OsrmResponse = serde_json::from_str(body)?;
    if response.code != "Ok" {
        return Err(anyhow!("routing service returned code {}", response.code));
    }
    let route = response
        .routes
        .first()
        .ok_or_else(|| anyhow!("routing service returned no routes"))?;
    let path: Vec<Point<f64>> = route
        .geometry
        .coordinates
        .iter()
        .map(|&[lon, lat]| Point::new(lon, lat))
        .collect();
    if path.len() < 2 {
        return Err(anyhow!("routing service returned a degenerate geometry"));
    }
    Ok(path)
}

/// Resolves the rendered path for one walk: the street-snapped polyline when
/// the routing service cooperates, the straight start-end line otherwise.
/// Returns the path and whether it was snapped.
pub async fn resolve_path<R: Router>(
    router: &R,
    start: Point<f64>,
    end: Point<f64>,
) -> (Vec<Point<f64>>, bool) {
    match router.route(start, end).await {
        Ok(path) => (path, true),
        Err(e) => {
            debug!("Routing fell back to straight line: {e}");
            (vec![start, end], false)
        }
    }
}
