use crate::models::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Google encoded polylines carry five decimal places.
pub const POLYLINE_PRECISION: u32 = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed polyline: {0}")]
pub struct PolylineError(String);

/// Decode a Google encoded polyline into `(lat, lon)` coordinates.
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
        .map_err(|err| PolylineError(err.to_string()))?;
    Ok(line
        .coords()
        .map(|coord| Coordinate::new(coord.y, coord.x))
        .collect())
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn path_length_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}
