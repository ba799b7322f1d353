// Summary statistics over a filtered set of readings
use serde::Serialize;

use super::reading::Reading;
use super::series::chronological;

/// Aggregate figures for a set of readings. Every field is `None` for an
/// empty set; the voltage/current averages are also `None` when no reading
/// carried a phasor of that kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReadingSummary {
    pub avg_frequency: Option<f64>,
    pub min_frequency: Option<f64>,
    pub max_frequency: Option<f64>,
    pub avg_voltage: Option<f64>,
    pub avg_current: Option<f64>,
    pub latest_reading: Option<Reading>,
}

#[cfg(test)]
impl ReadingSummary {
    pub fn is_empty(&self) -> bool {
        self.latest_reading.is_none()
    }
}

#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Summarise `readings`. Voltage and current averages pool every phasor of
/// every reading rather than averaging per channel.
pub fn summarize<'a, I>(readings: I) -> ReadingSummary
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut frequency = Mean::default();
    let mut voltage = Mean::default();
    let mut current = Mean::default();
    let mut min_frequency: Option<f64> = None;
    let mut max_frequency: Option<f64> = None;
    let mut latest: Option<&Reading> = None;

    for reading in readings {
        let m = &reading.measurements;
        frequency.push(m.frequency);
        min_frequency = Some(min_frequency.map_or(m.frequency, |v| v.min(m.frequency)));
        max_frequency = Some(max_frequency.map_or(m.frequency, |v| v.max(m.frequency)));
        m.voltage.magnitudes().for_each(|v| voltage.push(v));
        m.current.magnitudes().for_each(|c| current.push(c));

        if latest.is_none_or(|l| chronological(reading, l).is_gt()) {
            latest = Some(reading);
        }
    }

    ReadingSummary {
        avg_frequency: frequency.value(),
        min_frequency,
        max_frequency,
        avg_voltage: voltage.value(),
        avg_current: current.value(),
        latest_reading: latest.cloned(),
    }
}
