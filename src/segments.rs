use geo::Point;

use crate::geometry::{initial_bearing, midpoint};
use crate::validate::{Side, ValidatedWalk};

/// A walk with its renderable geometry and styling resolved.
#[derive(Debug, Clone)]
pub struct ResolvedSegment {
    pub walk: ValidatedWalk,
    /// At least two points; the routed polyline or the straight line.
    pub path: Vec<Point<f64>>,
    pub color: &'static str,
    /// Initial compass bearing start to end, independent of the path shape.
    pub bearing: f64,
    /// Where the direction marker sits.
    pub midpoint: Point<f64>,
}

/// Side-of-street color table. Total over `Side`; gray doubles as the
/// fallback for anything that failed to parse.
pub fn color_for(side: Side) -> &'static str {
    match side {
        Side::North => "blue",
        Side::South => "red",
        Side::East => "green",
        Side::West => "purple",
        Side::Both => "orange",
        Side::Unknown => "gray",
    }
}

/// Merges a validated walk with its resolved path into a renderable segment.
pub fn assemble(walk: ValidatedWalk, path: Vec<Point<f64>>) -> ResolvedSegment {
    let bearing = initial_bearing(walk.start, walk.end);
    let mid = midpoint(walk.start, walk.end);
    ResolvedSegment {
        color: color_for(walk.side),
        bearing,
        midpoint: mid,
        path,
        walk,
    }
}

fn text_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

impl ResolvedSegment {
    pub fn tooltip(&self) -> String {
        let walk = &self.walk;
        format!(
            "{}: {} → {} | Side {} | Dir {}",
            text_or(&walk.street_name, "Unknown St"),
            text_or(&walk.from_cross, "Unknown"),
            text_or(&walk.to_cross, "Unknown"),
            walk.side,
            text_or(&walk.direction, "UNKNOWN"),
        )
    }

    pub fn popup_html(&self) -> String {
        let walk = &self.walk;
        let date = text_or(&walk.local_time, text_or(&walk.timestamp, "N/A"));
        format!(
            "<b>{}</b><br>{} → {}<br>Side: {}<br>Direction: {}<br>\
             Date: {}<br>Mode: {}<br>Confidence: {}<br>Key: {}",
            text_or(&walk.street_name, "Unknown St"),
            text_or(&walk.from_cross, "Unknown"),
            text_or(&walk.to_cross, "Unknown"),
            walk.side,
            text_or(&walk.direction, "UNKNOWN"),
            date,
            text_or(&walk.mode, "Walk"),
            text_or(&walk.confidence, "High"),
            text_or(&walk.id, "N/A"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(side: Side) -> ValidatedWalk {
        ValidatedWalk {
            id: "w-17".to_string(),
            start: Point::new(-73.9855, 40.7580),
            end: Point::new(-73.9845, 40.7590),
            side,
            direction: "NB".to_string(),
            street_name: "7th Ave".to_string(),
            from_cross: "W 42nd St".to_string(),
            to_cross: "W 43rd St".to_string(),
            mode: "Walk".to_string(),
            confidence: "High".to_string(),
            timestamp: "1/5/2026 9:12:43".to_string(),
            local_time: "Jan 5, 9:12 AM".to_string(),
        }
    }

    #[test]
    fn colors_follow_the_side_table() {
        assert_eq!(color_for(Side::North), "blue");
        assert_eq!(color_for(Side::South), "red");
        assert_eq!(color_for(Side::East), "green");
        assert_eq!(color_for(Side::West), "purple");
        assert_eq!(color_for(Side::Both), "orange");
        assert_eq!(color_for(Side::Unknown), "gray");
    }

    #[test]
    fn unrecognized_side_text_ends_up_gray() {
        assert_eq!(color_for(Side::parse("XYZ")), "gray");
        assert_eq!(color_for(Side::parse("n")), "blue");
    }

    #[test]
    fn assemble_keeps_path_and_derives_styling() {
        let w = walk(Side::North);
        let path = vec![w.start, w.end];
        let segment = assemble(w, path.clone());
        assert_eq!(segment.path, path);
        assert_eq!(segment.color, "blue");
        assert!((0.0..360.0).contains(&segment.bearing));
        assert_eq!(segment.midpoint.y(), 40.7585);
    }

    #[test]
    fn tooltip_includes_street_and_crossings() {
        let segment = assemble(walk(Side::North), vec![
            Point::new(-73.9855, 40.7580),
            Point::new(-73.9845, 40.7590),
        ]);
        assert_eq!(
            segment.tooltip(),
            "7th Ave: W 42nd St → W 43rd St | Side N | Dir NB"
        );
    }

    #[test]
    fn empty_metadata_falls_back_to_fixed_text() {
        let mut w = walk(Side::Unknown);
        w.street_name = String::new();
        w.from_cross = String::new();
        w.to_cross = String::new();
        w.direction = String::new();
        w.mode = String::new();
        w.confidence = String::new();
        w.local_time = String::new();
        w.timestamp = String::new();
        w.id = String::new();
        let segment = assemble(w, vec![
            Point::new(-73.9855, 40.7580),
            Point::new(-73.9845, 40.7590),
        ]);
        assert_eq!(
            segment.tooltip(),
            "Unknown St: Unknown → Unknown | Side UNKNOWN | Dir UNKNOWN"
        );
        let popup = segment.popup_html();
        assert!(popup.contains("Mode: Walk"));
        assert!(popup.contains("Confidence: High"));
        assert!(popup.contains("Date: N/A"));
        assert!(popup.contains("Key: N/A"));
    }

    #[test]
    fn popup_prefers_local_time_over_raw_timestamp() {
        let segment = assemble(walk(Side::North), vec![
            Point::new(-73.9855, 40.7580),
            Point::new(-73.9845, 40.7590),
        ]);
        assert!(segment.popup_html().contains("Date: Jan 5, 9:12 AM"));
    }
}
