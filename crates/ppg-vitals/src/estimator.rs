//! Heart rate from peak spacing on the red channel, SpO2 from the ratio of
//! ratios between the red and infrared channels.

use max30102::SampleBuffer;
use micromath::F32Ext;

use crate::config::VitalsConfig;
use crate::filter::FilterState;

/// Smallest and largest value of one channel over a batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Span {
    pub min: u32,
    pub max: u32,
}

impl Span {
    pub fn of(values: &[u32]) -> Option<Self> {
        let first = *values.first()?;
        let span = values.iter().fold(
            Span {
                min: first,
                max: first,
            },
            |span, &v| Span {
                min: span.min.min(v),
                max: span.max.max(v),
            },
        );
        Some(span)
    }

    /// Pulsatile component, peak to peak.
    pub const fn ac(&self) -> u32 {
        self.max - self.min
    }

    /// Midpoint of the swing. Doubles as the peak threshold.
    pub const fn dc(&self) -> u32 {
        self.min + (self.max - self.min) / 2
    }
}

/// Outcome of one batch. `None` marks an invalid reading.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Estimate {
    pub heart_rate: Option<u16>,
    pub spo2: Option<u8>,
    /// Peaks accepted on the red channel.
    pub peaks: usize,
}

/// Counts interior local maxima strictly above `threshold`. A peak closer
/// than `min_distance` samples to the last accepted one is skipped.
pub fn count_peaks(
    values: &[u32],
    threshold: u32,
    min_distance: usize,
) -> usize {
    let mut peaks = 0;
    let mut last: Option<usize> = None;

    for (i, w) in values.windows(3).enumerate() {
        let index = i + 1;
        let v = w[1];
        if v <= threshold || v <= w[0] || v <= w[2] {
            continue;
        }
        if last.map_or(true, |last| index - last >= min_distance) {
            peaks += 1;
            last = Some(index);
        }
    }
    peaks
}

/// `intercept - slope * R`, clamped, then truncated to whole percent. `None`
/// when a ratio would divide by zero.
pub fn spo2_from_spans(
    red: Span,
    ir: Span,
    config: &VitalsConfig,
) -> Option<u8> {
    if red.dc() == 0 || ir.dc() == 0 || ir.ac() == 0 {
        return None;
    }

    let red_ratio = red.ac() as f32 / red.dc() as f32;
    let ir_ratio = ir.ac() as f32 / ir.dc() as f32;
    let r = red_ratio / ir_ratio;

    let spo2 = (config.spo2_intercept - config.spo2_slope * r)
        .max(config.spo2_min as f32)
        .min(config.spo2_max as f32);
    Some(spo2 as u8)
}

/// Runs peak detection over one batch, feeds the raw rate through `filter`
/// and derives SpO2 when the filtered rate is plausible.
///
/// Short batches and flat signals return early without touching `filter`.
pub fn estimate(
    buffer: &SampleBuffer,
    filter: &mut FilterState,
    config: &VitalsConfig,
) -> Estimate {
    let mut estimate = Estimate::default();

    if buffer.len() < config.min_batch {
        return estimate;
    }
    let Some(red) = Span::of(buffer.red()) else {
        return estimate;
    };
    if red.ac() < config.min_amplitude {
        trace!("flat red channel, swing {=u32}", red.ac());
        return estimate;
    }

    estimate.peaks =
        count_peaks(buffer.red(), red.dc(), config.min_peak_distance);
    if estimate.peaks < 2 {
        return estimate;
    }

    // Seconds per beat
    let spacing = buffer.len() as f32
        / estimate.peaks as f32
        / config.sample_rate_hz as f32;
    let raw = 60.0 / spacing;
    let filtered = filter.apply(raw);
    let bpm = F32Ext::round(filtered) as u16;
    trace!("raw {=f32} bpm, filtered {=u16} bpm", raw, bpm);

    if bpm < config.heart_rate_min || bpm > config.heart_rate_max {
        return estimate;
    }
    estimate.heart_rate = Some(bpm);

    estimate.spo2 = Span::of(buffer.ir())
        .and_then(|ir| spo2_from_spans(red, ir, config));
    estimate
}
