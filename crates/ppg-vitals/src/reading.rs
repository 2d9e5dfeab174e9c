use serde::{Deserialize, Serialize};

/// Latest vitals as exposed to reporting.
///
/// A value is only meaningful while its `*_valid` flag is set; the accessors
/// [`heart_rate`](Self::heart_rate) and [`spo2`](Self::spo2) enforce that.
/// Alarm flags keep their last state across invalid runs.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VitalsReading {
    /// Beats per minute
    pub heart_rate: u16,
    /// Percent saturation
    pub spo2: u8,
    pub heart_rate_valid: bool,
    pub spo2_valid: bool,
    pub heart_rate_alarm: bool,
    pub spo2_alarm: bool,
}

impl VitalsReading {
    pub const fn heart_rate(&self) -> Option<u16> {
        match self.heart_rate_valid {
            true => Some(self.heart_rate),
            false => None,
        }
    }

    pub const fn spo2(&self) -> Option<u8> {
        match self.spo2_valid {
            true => Some(self.spo2),
            false => None,
        }
    }

    /// Take the outcome of one estimate. Values are only replaced when
    /// valid; the flags always follow.
    pub fn update(&mut self, heart_rate: Option<u16>, spo2: Option<u8>) {
        self.heart_rate_valid = heart_rate.is_some();
        if let Some(bpm) = heart_rate {
            self.heart_rate = bpm;
        }

        self.spo2_valid = spo2.is_some();
        if let Some(spo2) = spo2 {
            self.spo2 = spo2;
        }
    }

    pub const fn any_alarm(&self) -> bool {
        self.heart_rate_alarm || self.spo2_alarm
    }
}
