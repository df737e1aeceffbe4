//! Great-circle distance between coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{NanjilError, Result};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees.
///
/// Construction rejects non-finite values and values outside
/// `[-90, 90]` latitude and `[-180, 180]` longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = NanjilError;

    fn try_from(raw: RawCoordinates) -> Result<Self> {
        Coordinates::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(NanjilError::InvalidCoordinate(format!(
                "({}, {}) is not finite",
                latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(NanjilError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(NanjilError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Haversine distance in kilometers.
pub fn distance_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn test_quarter_circumference() {
        let d = distance_km(&point(0.0, 0.0), &point(0.0, 90.0));
        assert!((d - 10007.543).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_zero_for_identical_points() {
        for p in [point(0.0, 0.0), point(8.1833, 77.4119), point(-33.9, 151.2)] {
            assert_eq!(distance_km(&p, &p), 0.0);
        }
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            (point(8.1833, 77.4119), point(13.0827, 80.2707)),
            (point(-33.9, 151.2), point(51.5, -0.12)),
            (point(90.0, 0.0), point(-90.0, 180.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
        }
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = distance_km(&point(0.0, 0.0), &point(0.0, 180.0));
        assert!((d - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(
            Coordinates::new(f64::NAN, 0.0),
            Err(NanjilError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, f64::INFINITY),
            Err(NanjilError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinates::new(90.5, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinates = serde_yaml::from_str("latitude: 8.18\nlongitude: 77.41").unwrap();
        assert_eq!(ok.latitude(), 8.18);

        let bad = serde_yaml::from_str::<Coordinates>("latitude: 91\nlongitude: 0");
        assert!(bad.is_err());
    }
}
