use serde::Serialize;

use crate::models::rider::GeoPoint;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceLocation {
    pub id: &'static str,
    pub name: &'static str,
    pub point: GeoPoint,
}

pub const SERVICE_LOCATIONS: &[ServiceLocation] = &[
    ServiceLocation {
        id: "downtown",
        name: "Downtown Kitchen",
        point: GeoPoint {
            lat: 52.5200,
            lng: 13.4050,
        },
    },
    ServiceLocation {
        id: "riverside",
        name: "Riverside Kitchen",
        point: GeoPoint {
            lat: 52.5065,
            lng: 13.4430,
        },
    },
    ServiceLocation {
        id: "airport",
        name: "Airport Kitchen",
        point: GeoPoint {
            lat: 52.3667,
            lng: 13.5033,
        },
    },
];

pub fn find_location(id: &str) -> Option<&'static ServiceLocation> {
    SERVICE_LOCATIONS.iter().find(|location| location.id == id)
}
