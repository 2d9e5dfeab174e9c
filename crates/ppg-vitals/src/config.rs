use max30102::SAMPLE_BUFFER_CAPACITY;
use serde::{Deserialize, Serialize};

/// Limits that raise the alarm flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmThresholds {
    /// Alarm below this rate (bpm, exclusive)
    pub heart_rate_low: u16,
    /// Alarm above this rate (bpm, exclusive)
    pub heart_rate_high: u16,
    /// Alarm below this saturation (%, exclusive)
    pub spo2_low: u8,
}

impl Default for AlarmThresholds {
    fn default() -> Self {
        Self {
            heart_rate_low: 50,
            heart_rate_high: 120,
            spo2_low: 90,
        }
    }
}

/// Tunables of the acquisition, estimation and alarm stages.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VitalsConfig {
    // Acquisition
    pub batch_size: usize,
    /// Batches shorter than this are discarded.
    pub min_batch: usize,
    /// Rate the sensor delivers samples at, in Hz.
    pub sample_rate_hz: u16,

    // Peak detection
    /// Smallest red max-min swing treated as a pulse.
    pub min_amplitude: u32,
    /// Samples between two accepted peaks, inclusive.
    pub min_peak_distance: usize,

    // Validity ranges
    pub heart_rate_min: u16,
    pub heart_rate_max: u16,
    pub spo2_min: u8,
    pub spo2_max: u8,

    // SpO2 = intercept - slope * R
    pub spo2_intercept: f32,
    pub spo2_slope: f32,

    pub alarms: AlarmThresholds,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            batch_size: SAMPLE_BUFFER_CAPACITY,
            min_batch: 50,
            sample_rate_hz: 100,

            min_amplitude: 1000,
            min_peak_distance: 20,

            heart_rate_min: 40,
            heart_rate_max: 200,
            spo2_min: 70,
            spo2_max: 100,

            spo2_intercept: 110.0,
            spo2_slope: 25.0,

            alarms: AlarmThresholds::default(),
        }
    }
}
