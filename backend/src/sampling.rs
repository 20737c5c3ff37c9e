use crate::models::Coordinate;

/// Step between sampled polyline vertices for a path of `len` points.
///
/// Long paths keep roughly ten vertices, medium ones roughly five, and short
/// ones every other vertex.
pub fn sampling_stride(len: usize) -> usize {
    if len > 20 {
        (len / 10).max(1)
    } else if len > 10 {
        (len / 5).max(1)
    } else {
        2
    }
}

/// Reduce a decoded route path to the waypoints that get an air-quality
/// lookup.
///
/// The result is `start`, then `path[0]`, `path[stride]`, `path[2 * stride]`,
/// ... in path order, then `end`. The true endpoints are always included even
/// when they duplicate the first or last polyline vertex.
pub fn sample_waypoints(path: &[Coordinate], start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    let stride = sampling_stride(path.len());
    let mut waypoints = Vec::with_capacity(path.len().div_ceil(stride) + 2);
    waypoints.push(start);
    waypoints.extend(path.iter().step_by(stride).copied());
    waypoints.push(end);
    waypoints
}
