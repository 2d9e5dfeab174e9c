use embassy_sync::watch::DynSender;
use embedded_hal::delay::DelayNs;
use max30102::{BusLines, DeviceConfig, Error, Max30102, SampleBuffer};

use crate::alarm;
use crate::config::VitalsConfig;
use crate::estimator::{estimate, Estimate};
use crate::filter::FilterState;
use crate::reading::VitalsReading;
use crate::source::SampleSource;

/// Periodic unit driven by an external scheduler.
///
/// Each [`run`](Self::run) drains one batch from the source, estimates,
/// filters and checks alarms, then publishes the snapshot. Filter history
/// and the snapshot carry over from run to run.
pub struct VitalsTask<'a, S> {
    source: S,
    config: VitalsConfig,
    buffer: SampleBuffer,
    filter: FilterState,
    reading: VitalsReading,
    sender: DynSender<'a, VitalsReading>,
}

impl<'a, S: SampleSource> VitalsTask<'a, S> {
    pub fn new(
        source: S,
        config: VitalsConfig,
        sender: DynSender<'a, VitalsReading>,
    ) -> Self {
        Self {
            source,
            config,
            buffer: SampleBuffer::new(),
            filter: FilterState::new(),
            reading: VitalsReading::default(),
            sender,
        }
    }

    pub fn run(&mut self) {
        let count = self
            .source
            .read_batch(&mut self.buffer, self.config.batch_size);

        if count >= self.config.min_batch {
            let Estimate {
                heart_rate, spo2, ..
            } = estimate(&self.buffer, &mut self.filter, &self.config);
            self.reading.update(heart_rate, spo2);
            alarm::evaluate(&mut self.reading, &self.config.alarms);
        } else {
            warn!(
                "short batch: {=usize} of {=usize} samples",
                count, self.config.min_batch
            );
        }
        self.buffer.clear();

        self.sender.send(self.reading);

        info!(
            "MAX30102: HR={=u16} bpm, SpO2={=u8}%, Alarms={=bool}/{=bool}",
            self.reading.heart_rate().unwrap_or(0),
            self.reading.spo2().unwrap_or(0),
            self.reading.heart_rate_alarm,
            self.reading.spo2_alarm
        );
    }

    /// Snapshot from the last run.
    pub fn reading(&self) -> VitalsReading {
        self.reading
    }

    pub fn config(&self) -> &VitalsConfig {
        &self.config
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

/// Run the full init sequence up to `attempts` times, returning the error of
/// the last attempt when none succeeds.
pub fn bring_up<L, D>(
    sensor: &mut Max30102<L, D>,
    config: &DeviceConfig,
    attempts: usize,
) -> Result<(), Error<L::Error>>
where
    L: BusLines,
    D: DelayNs,
{
    let mut attempt = 1;
    loop {
        match sensor.init(config) {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= attempts => {
                error!(
                    "MAX30102 not responding after {=usize} attempts",
                    attempt
                );
                return Err(e);
            }
            Err(_) => {
                info!(
                    "Retry connection attempt {=usize} to MAX30102...",
                    attempt
                );
                attempt += 1;
            }
        }
    }
}
