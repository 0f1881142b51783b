use geo::Point;

/// Initial great-circle compass bearing from `start` to `end` in degrees,
/// normalized to [0, 360). North is 0, east is 90. Identical endpoints have
/// no defined heading and yield 0.0.
pub fn initial_bearing(start: Point<f64>, end: Point<f64>) -> f64 {
    let phi1 = start.y().to_radians();
    let phi2 = end.y().to_radians();
    let dlon = (end.x() - start.x()).to_radians();

    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    if y == 0.0 && x == 0.0 {
        return 0.0;
    }

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Midpoint of the straight line between two points, used to place the
/// direction marker. Good enough at walking distances; no great-circle
/// interpolation.
pub fn midpoint(start: Point<f64>, end: Point<f64>) -> Point<f64> {
    Point::new(
        (start.x() + end.x()) / 2.0,
        (start.y() + end.y()) / 2.0,
    )
}
