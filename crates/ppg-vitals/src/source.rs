use embedded_hal::delay::DelayNs;
use max30102::{BusLines, Max30102, SampleBuffer};

/// Anything that can refill a [`SampleBuffer`] on demand.
pub trait SampleSource {
    /// Clear `buffer`, store up to `max_samples` samples and return how many
    /// were stored.
    fn read_batch(&mut self, buffer: &mut SampleBuffer, max_samples: usize)
        -> usize;
}

impl<L, D> SampleSource for Max30102<L, D>
where
    L: BusLines,
    D: DelayNs,
{
    fn read_batch(
        &mut self,
        buffer: &mut SampleBuffer,
        max_samples: usize,
    ) -> usize {
        Max30102::read_batch(self, buffer, max_samples)
    }
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read_batch(
        &mut self,
        buffer: &mut SampleBuffer,
        max_samples: usize,
    ) -> usize {
        (**self).read_batch(buffer, max_samples)
    }
}
