// Filtering, ordering and downsampling of a device's readings
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::reading::{FrequencyStatus, Phase, Reading};
use super::time_range::{Interval, RangeToken};

/// Total chronological order: by timestamp, ties broken by reading id.
pub fn chronological(a: &Reading, b: &Reading) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.id.cmp(&b.id))
}

/// Readings selected by an interval, borrowed from the caller's collection.
///
/// The selection keeps the input order; `ascending` and `descending` each
/// return a fresh vector so neither view can disturb the other.
#[derive(Debug, Clone)]
pub struct FilteredReadings<'a> {
    readings: Vec<&'a Reading>,
}

impl<'a> FilteredReadings<'a> {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a Reading] {
        &self.readings
    }

    pub fn ascending(&self) -> Vec<&'a Reading> {
        let mut view = self.readings.clone();
        view.sort_by(|a, b| chronological(a, b));
        view
    }

    pub fn descending(&self) -> Vec<&'a Reading> {
        let mut view = self.readings.clone();
        view.sort_by(|a, b| chronological(b, a));
        view
    }
}

/// Select the readings whose timestamp lies in `interval` (inclusive).
/// `None` selects everything.
pub fn filter_readings<'a>(
    readings: &'a [Reading],
    interval: Option<&Interval>,
) -> FilteredReadings<'a> {
    let readings = readings
        .iter()
        .filter(|r| interval.is_none_or(|i| i.contains(r.timestamp)))
        .collect();
    FilteredReadings { readings }
}

/// Chart point budget for the active range.
pub fn max_chart_points(token: Option<&RangeToken>) -> usize {
    match token {
        Some(RangeToken::Hour1) => 60,
        Some(RangeToken::Hours6) => 100,
        _ => 500,
    }
}

/// Keep the most recent `max_points` entries of an ascending sequence.
pub fn downsample<T>(ascending: &[T], max_points: usize) -> &[T] {
    let skip = ascending.len().saturating_sub(max_points);
    &ascending[skip..]
}

/// One chart sample. Channel magnitudes are `None` when the reading did not
/// carry that channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub frequency: f64,
    pub frequency_status: FrequencyStatus,
    pub va_voltage: Option<f64>,
    pub vb_voltage: Option<f64>,
    pub vc_voltage: Option<f64>,
    pub ia_current: Option<f64>,
    pub ib_current: Option<f64>,
    pub ic_current: Option<f64>,
}

impl From<&Reading> for ChartPoint {
    fn from(reading: &Reading) -> Self {
        let m = &reading.measurements;
        Self {
            timestamp: reading.timestamp,
            frequency: m.frequency,
            frequency_status: FrequencyStatus::classify(m.frequency),
            va_voltage: m.voltage.magnitude(Phase::A),
            vb_voltage: m.voltage.magnitude(Phase::B),
            vc_voltage: m.voltage.magnitude(Phase::C),
            ia_current: m.current.magnitude(Phase::A),
            ib_current: m.current.magnitude(Phase::B),
            ic_current: m.current.magnitude(Phase::C),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::device::{Device, Location};
    use crate::domain::reading::{Measurements, PhaseSet, Phasor};
    use chrono::{Duration, TimeZone};

    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    pub fn device(id: &str, created_minutes_ago: i64) -> Device {
        Device {
            id: id.to_string(),
            name: format!("PMU {}", id),
            substation: "North".to_string(),
            location: Location {
                longitude: 77.59,
                latitude: 12.97,
            },
            created_at: base_time() - Duration::minutes(created_minutes_ago),
        }
    }

    pub fn phasor(magnitude: f64) -> Option<Phasor> {
        Some(Phasor {
            magnitude,
            angle: 0.0,
        })
    }

    pub fn reading(id: &str, minutes_ago: i64, frequency: f64) -> Reading {
        reading_for("dev-1", id, minutes_ago, frequency)
    }

    pub fn reading_for(device_id: &str, id: &str, minutes_ago: i64, frequency: f64) -> Reading {
        Reading {
            id: id.to_string(),
            device_id: device_id.to_string(),
            timestamp: base_time() - Duration::minutes(minutes_ago),
            measurements: Measurements {
                voltage: PhaseSet {
                    a: phasor(230.0),
                    b: phasor(231.0),
                    c: phasor(229.0),
                },
                current: PhaseSet {
                    a: phasor(10.0),
                    b: phasor(11.0),
                    c: phasor(12.0),
                },
                frequency,
            },
        }
    }
}
