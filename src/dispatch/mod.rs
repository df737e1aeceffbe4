//! Technician dispatch estimates: distance between the technician and the
//! customer, and the time it takes to get there.

mod eta;
mod geo;

pub use eta::{estimate_arrival, format_arrival, ArrivalEstimate, AVERAGE_SPEED_KMH};
pub use geo::{distance_km, Coordinates, EARTH_RADIUS_KM};

use serde::Serialize;

use crate::error::Result;

/// Distance and arrival estimate between two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchEstimate {
    pub distance_km: f64,
    pub arrival: ArrivalEstimate,
}

/// Estimate the trip from `origin` to `destination`.
pub fn estimate(origin: &Coordinates, destination: &Coordinates) -> Result<DispatchEstimate> {
    let distance_km = distance_km(origin, destination);
    let arrival = estimate_arrival(distance_km)?;
    Ok(DispatchEstimate {
        distance_km,
        arrival,
    })
}
