use heapless::Vec;

/// Most samples one batch can hold.
pub const SAMPLE_BUFFER_CAPACITY: usize = 100;

/// One FIFO entry: an 18-bit reading per LED channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Channel A, red LED
    pub red: u32,
    /// Channel B, infrared LED
    pub ir: u32,
}

/// Fixed-capacity batch of samples kept as two parallel channel sequences.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    red: Vec<u32, SAMPLE_BUFFER_CAPACITY>,
    ir: Vec<u32, SAMPLE_BUFFER_CAPACITY>,
}

impl SampleBuffer {
    pub const fn new() -> Self {
        Self { red: Vec::new(), ir: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.red.clear();
        self.ir.clear();
    }

    /// Appends a sample, handing it back when the buffer is full.
    pub fn push(&mut self, sample: Sample) -> Result<(), Sample> {
        if self.is_full() {
            return Err(sample);
        }
        // Both channels always hold the same number of entries, so neither
        // push can fail once the capacity check passed.
        let _ = self.red.push(sample.red);
        let _ = self.ir.push(sample.ir);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.red.len() == SAMPLE_BUFFER_CAPACITY
    }

    pub fn red(&self) -> &[u32] {
        &self.red
    }

    pub fn ir(&self) -> &[u32] {
        &self.ir
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.red
            .iter()
            .zip(self.ir.iter())
            .map(|(&red, &ir)| Sample { red, ir })
    }
}
