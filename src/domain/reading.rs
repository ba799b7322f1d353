// Reading and measurement domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::device::DeviceSummary;

/// Nominal grid frequency in Hz.
pub const NOMINAL_FREQUENCY_HZ: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    fn letter(self) -> char {
        match self {
            Phase::A => 'A',
            Phase::B => 'B',
            Phase::C => 'C',
        }
    }
}

/// Which signal a phasor set describes; decides the channel prefix (V or I).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Voltage,
    Current,
}

impl Quantity {
    fn prefix(self) -> char {
        match self {
            Quantity::Voltage => 'V',
            Quantity::Current => 'I',
        }
    }

    pub fn channel_name(self, phase: Phase) -> String {
        format!("{}{}", self.prefix(), phase.letter())
    }

    pub fn parse_channel(self, channel: &str) -> Option<Phase> {
        Phase::ALL
            .into_iter()
            .find(|phase| self.channel_name(*phase) == channel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phasor {
    pub magnitude: f64,
    pub angle: f64,
}

/// One phasor per phase, each of which may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseSet {
    pub a: Option<Phasor>,
    pub b: Option<Phasor>,
    pub c: Option<Phasor>,
}

impl PhaseSet {
    pub fn get(&self, phase: Phase) -> Option<&Phasor> {
        match phase {
            Phase::A => self.a.as_ref(),
            Phase::B => self.b.as_ref(),
            Phase::C => self.c.as_ref(),
        }
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut Option<Phasor> {
        match phase {
            Phase::A => &mut self.a,
            Phase::B => &mut self.b,
            Phase::C => &mut self.c,
        }
    }

    pub fn magnitude(&self, phase: Phase) -> Option<f64> {
        self.get(phase).map(|p| p.magnitude)
    }

    /// Magnitudes of the phasors that are present, in A, B, C order.
    pub fn magnitudes(&self) -> impl Iterator<Item = f64> + '_ {
        Phase::ALL
            .into_iter()
            .filter_map(move |phase| self.magnitude(phase))
    }

    fn from_entries(quantity: Quantity, entries: Vec<PhasorEntry>) -> Result<Self, MeasurementError> {
        let mut set = PhaseSet::default();
        for entry in entries {
            let phase = quantity
                .parse_channel(&entry.channel)
                .ok_or_else(|| MeasurementError::UnknownChannel(entry.channel.clone()))?;
            if !entry.magnitude.is_finite() || !entry.angle.is_finite() {
                return Err(MeasurementError::NonFinite(entry.channel));
            }
            let slot = set.slot_mut(phase);
            if slot.is_some() {
                return Err(MeasurementError::DuplicateChannel(entry.channel));
            }
            *slot = Some(Phasor {
                magnitude: entry.magnitude,
                angle: entry.angle,
            });
        }
        Ok(set)
    }

    fn to_entries(self, quantity: Quantity) -> Vec<PhasorEntry> {
        Phase::ALL
            .into_iter()
            .filter_map(|phase| {
                self.get(phase).map(|p| PhasorEntry {
                    channel: quantity.channel_name(phase),
                    magnitude: p.magnitude,
                    angle: p.angle,
                })
            })
            .collect()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MeasurementError {
    #[error("unknown phasor channel '{0}'")]
    UnknownChannel(String),
    #[error("phasor channel '{0}' appears more than once")]
    DuplicateChannel(String),
    #[error("phasor channel '{0}' has a non-finite magnitude or angle")]
    NonFinite(String),
    #[error("frequency must be a finite number")]
    InvalidFrequency,
}

/// Wire shape of a single phasor: `{channel, magnitude, angle}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhasorEntry {
    pub channel: String,
    pub magnitude: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementsPayload {
    #[serde(default)]
    pub voltage_phasors: Vec<PhasorEntry>,
    #[serde(default)]
    pub current_phasors: Vec<PhasorEntry>,
    pub frequency: f64,
}

/// A validated measurement bundle. Serialized in the payload's list form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeasurementsPayload", into = "MeasurementsPayload")]
pub struct Measurements {
    pub voltage: PhaseSet,
    pub current: PhaseSet,
    pub frequency: f64,
}

impl TryFrom<MeasurementsPayload> for Measurements {
    type Error = MeasurementError;

    fn try_from(payload: MeasurementsPayload) -> Result<Self, Self::Error> {
        if !payload.frequency.is_finite() {
            return Err(MeasurementError::InvalidFrequency);
        }
        Ok(Self {
            voltage: PhaseSet::from_entries(Quantity::Voltage, payload.voltage_phasors)?,
            current: PhaseSet::from_entries(Quantity::Current, payload.current_phasors)?,
            frequency: payload.frequency,
        })
    }
}

impl From<Measurements> for MeasurementsPayload {
    fn from(measurements: Measurements) -> Self {
        Self {
            voltage_phasors: measurements.voltage.to_entries(Quantity::Voltage),
            current_phasors: measurements.current.to_entries(Quantity::Current),
            frequency: measurements.frequency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub measurements: Measurements,
}

/// A reading joined with its device summary. `device` is `None` when the
/// reading outlived its device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRecord {
    #[serde(flatten)]
    pub reading: Reading,
    pub device: Option<DeviceSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyStatus {
    Nominal,
    Warning,
    Critical,
}

impl FrequencyStatus {
    pub fn classify(frequency: f64) -> Self {
        let deviation = (frequency - NOMINAL_FREQUENCY_HZ).abs();
        if deviation <= 0.1 {
            FrequencyStatus::Nominal
        } else if deviation <= 0.5 {
            FrequencyStatus::Warning
        } else {
            FrequencyStatus::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_payload_into_phase_sets() {
        let measurements: Measurements = serde_json::from_value(json!({
            "voltage_phasors": [
                {"channel": "VC", "magnitude": 229.0, "angle": 120.0},
                {"channel": "VA", "magnitude": 231.0, "angle": 0.0}
            ],
            "current_phasors": [{"channel": "IB", "magnitude": 10.5, "angle": -119.0}],
            "frequency": 50.01
        }))
        .unwrap();

        assert_eq!(measurements.voltage.magnitude(Phase::A), Some(231.0));
        assert_eq!(measurements.voltage.magnitude(Phase::B), None);
        assert_eq!(measurements.voltage.magnitude(Phase::C), Some(229.0));
        assert_eq!(measurements.current.magnitudes().count(), 1);
        assert_eq!(measurements.current.magnitude(Phase::B), Some(10.5));
    }

    #[test]
    fn test_rejects_bad_channels() {
        let wrong_quantity = MeasurementsPayload {
            voltage_phasors: vec![PhasorEntry {
                channel: "IA".to_string(),
                magnitude: 1.0,
                angle: 0.0,
            }],
            current_phasors: vec![],
            frequency: 50.0,
        };
        assert_eq!(
            Measurements::try_from(wrong_quantity),
            Err(MeasurementError::UnknownChannel("IA".to_string()))
        );

        let duplicate = MeasurementsPayload {
            voltage_phasors: vec![],
            current_phasors: vec![
                PhasorEntry {
                    channel: "IA".to_string(),
                    magnitude: 1.0,
                    angle: 0.0,
                },
                PhasorEntry {
                    channel: "IA".to_string(),
                    magnitude: 2.0,
                    angle: 0.0,
                },
            ],
            frequency: 50.0,
        };
        assert_eq!(
            Measurements::try_from(duplicate),
            Err(MeasurementError::DuplicateChannel("IA".to_string()))
        );
    }

    #[test]
    fn test_serializes_back_to_channel_list() {
        let measurements = Measurements {
            voltage: PhaseSet {
                a: Some(Phasor {
                    magnitude: 230.0,
                    angle: 0.0,
                }),
                b: None,
                c: None,
            },
            current: PhaseSet::default(),
            frequency: 49.98,
        };
        let value = serde_json::to_value(&measurements).unwrap();
        assert_eq!(value["voltage_phasors"][0]["channel"], "VA");
        assert_eq!(value["current_phasors"], json!([]));
        assert_eq!(value["frequency"], 49.98);
    }

    #[test]
    fn test_frequency_status_bands() {
        assert_eq!(FrequencyStatus::classify(50.05), FrequencyStatus::Nominal);
        assert_eq!(FrequencyStatus::classify(49.7), FrequencyStatus::Warning);
        assert_eq!(FrequencyStatus::classify(51.0), FrequencyStatus::Critical);
    }
}
