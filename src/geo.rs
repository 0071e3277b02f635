//! Polygon geometry helpers for farm and mortgage boundaries.
//!
//! Coordinates are stored as JSON text columns: an array of rings, each ring
//! an array of `[longitude, latitude]` pairs. The map client renders these
//! directly; the server only derives the polygon center for initial viewport
//! placement.

/// A polygon as longitude/latitude coordinate rings.
pub type Coordinates = Vec<Vec<[f64; 2]>>;

/// Parse a coordinates JSON column. Empty column means no geometry.
pub fn parse_coordinates(raw: &str) -> Option<Coordinates> {
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}

/// Serialize coordinates back into the TEXT column representation.
pub fn coordinates_to_string(coords: &Coordinates) -> String {
    serde_json::to_string(coords).unwrap_or_else(|_| "[]".to_string())
}

/// Center of the polygon's bounding box across all rings.
///
/// Returns `[lng, lat]`, or None for empty/degenerate geometry.
pub fn center(coords: &Coordinates) -> Option<[f64; 2]> {
    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut seen = false;

    for ring in coords {
        for point in ring {
            seen = true;
            min_lng = min_lng.min(point[0]);
            max_lng = max_lng.max(point[0]);
            min_lat = min_lat.min(point[1]);
            max_lat = max_lat.max(point[1]);
        }
    }

    if !seen {
        return None;
    }

    Some([(min_lng + max_lng) / 2.0, (min_lat + max_lat) / 2.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of_square() {
        let coords: Coordinates = vec![vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 2.0],
            [0.0, 0.0],
        ]];
        assert_eq!(center(&coords), Some([1.0, 1.0]));
    }

    #[test]
    fn test_center_spans_all_rings() {
        let coords: Coordinates = vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
            vec![[3.0, 3.0], [4.0, 3.0], [4.0, 4.0], [3.0, 3.0]],
        ];
        assert_eq!(center(&coords), Some([2.0, 2.0]));
    }

    #[test]
    fn test_center_empty_geometry() {
        assert_eq!(center(&vec![]), None);
        assert_eq!(center(&vec![vec![]]), None);
    }

    #[test]
    fn test_parse_roundtrip() {
        let coords: Coordinates =
            vec![vec![[124.747, 7.745], [124.748, 7.745], [124.748, 7.746], [124.747, 7.745]]];
        let raw = coordinates_to_string(&coords);
        assert_eq!(parse_coordinates(&raw), Some(coords));
    }

    #[test]
    fn test_parse_empty_column() {
        assert_eq!(parse_coordinates(""), None);
        assert_eq!(parse_coordinates("not json"), None);
    }
}
