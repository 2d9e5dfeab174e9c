use crate::config::AlarmThresholds;
use crate::reading::VitalsReading;

/// Refresh the alarm flags from the valid readings. A flag whose reading is
/// invalid keeps its previous state.
pub fn evaluate(reading: &mut VitalsReading, thresholds: &AlarmThresholds) {
    if let Some(bpm) = reading.heart_rate() {
        reading.heart_rate_alarm = bpm < thresholds.heart_rate_low
            || bpm > thresholds.heart_rate_high;
    }

    if let Some(spo2) = reading.spo2() {
        reading.spo2_alarm = spo2 < thresholds.spo2_low;
    }
}
