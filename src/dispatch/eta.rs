//! Arrival time estimates.

use serde::Serialize;

use crate::error::{NanjilError, Result};

/// Assumed average travel speed of a technician, km/h.
pub const AVERAGE_SPEED_KMH: f64 = 25.0;

/// Travel time in whole minutes and its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalEstimate {
    pub minutes: u64,
    pub text: String,
}

/// Estimate the arrival time for a trip of `distance_km`.
///
/// Minutes are rounded up. Negative or non-finite distances are rejected.
pub fn estimate_arrival(distance_km: f64) -> Result<ArrivalEstimate> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(NanjilError::InvalidDistance(distance_km));
    }

    let minutes = (distance_km / AVERAGE_SPEED_KMH * 60.0).ceil() as u64;
    Ok(ArrivalEstimate {
        minutes,
        text: format_arrival(minutes),
    })
}

/// Render a travel time.
///
/// Up to an hour is shown in minutes. Longer trips are shown as hours plus
/// the leftover minutes; a whole number of hours keeps the separating space
/// with nothing after it, e.g. `"2 hours "`. Consumers match on that text.
pub fn format_arrival(minutes: u64) -> String {
    if minutes <= 60 {
        return format!("{} minutes", minutes);
    }

    let hours = minutes / 60;
    let remainder = minutes % 60;
    let unit = if hours > 1 { "hours" } else { "hour" };
    let tail = if remainder > 0 {
        format!("{} minutes", remainder)
    } else {
        String::new()
    };

    format!("{} {} {}", hours, unit, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_hour_stays_in_minutes() {
        let estimate = estimate_arrival(25.0).unwrap();
        assert_eq!(estimate.minutes, 60);
        assert_eq!(estimate.text, "60 minutes");
    }

    #[test]
    fn test_just_over_an_hour() {
        let estimate = estimate_arrival(25.25).unwrap();
        assert_eq!(estimate.minutes, 61);
        assert_eq!(estimate.text, "1 hour 1 minutes");
    }

    #[test]
    fn test_multiple_hours() {
        let estimate = estimate_arrival(52.0).unwrap();
        assert_eq!(estimate.minutes, 125);
        assert_eq!(estimate.text, "2 hours 5 minutes");
    }

    #[test]
    fn test_whole_hours_keep_trailing_space() {
        assert_eq!(estimate_arrival(50.0).unwrap().text, "2 hours ");
        assert_eq!(format_arrival(120), "2 hours ");
        assert_eq!(format_arrival(180), "3 hours ");
    }

    #[test]
    fn test_minutes_round_up() {
        assert_eq!(estimate_arrival(0.01).unwrap().minutes, 1);
        assert_eq!(estimate_arrival(0.0).unwrap().text, "0 minutes");
        assert_eq!(estimate_arrival(12.5).unwrap().text, "30 minutes");
    }

    #[test]
    fn test_rejects_invalid_distance() {
        assert!(matches!(
            estimate_arrival(f64::NAN),
            Err(NanjilError::InvalidDistance(_))
        ));
        assert!(matches!(
            estimate_arrival(f64::INFINITY),
            Err(NanjilError::InvalidDistance(_))
        ));
        assert!(matches!(
            estimate_arrival(-1.0),
            Err(NanjilError::InvalidDistance(_))
        ));
    }
}
