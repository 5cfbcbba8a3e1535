use crate::models::rider::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance between two points.
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let (from_lat, to_lat) = (from.lat.to_radians(), to.lat.to_radians());
    let half_dlat = ((to.lat - from.lat).to_radians() / 2.0).sin();
    let half_dlng = ((to.lng - from.lng).to_radians() / 2.0).sin();

    let a = half_dlat.powi(2) + from_lat.cos() * to_lat.cos() * half_dlng.powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
