#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use max30102::{BusLines, Register, ADDR, EXPECTED_PART_ID};

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// Records every wait instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub us_calls: Vec<u32>,
    pub ms_calls: Vec<u32>,
    pub ns_total: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns_total += ns as u64;
    }

    fn delay_us(&mut self, us: u32) {
        self.us_calls.push(us);
        self.ns_total += us as u64 * 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms_calls.push(ms);
        self.ns_total += ms as u64 * 1_000_000;
    }
}

// ---------------------------------------------------------------------------
// Simulated target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Target shifts bytes in from the controller.
    Receive,
    /// Target shifts bytes out to the controller.
    Transmit,
}

/// MAX30102 modelled at the level of the two wires.
///
/// Every call to [`BusLines`] is decoded into start/stop conditions and clock
/// edges, and the target answers the way the part does: address matching,
/// register pointer with auto-increment, a FIFO data register that pops
/// queued bytes, a self-clearing reset bit and a one-shot temperature sensor.
pub struct SimMax30102 {
    // Lines. The wire is low when either side pulls it.
    master_sda: bool,
    master_scl: bool,
    target_pulls_sda: bool,

    // Protocol decoder
    phase: Phase,
    in_transaction: bool,
    expect_address: bool,
    pointer_pending: bool,
    read_after_ack: bool,
    nacked: bool,
    shift: u8,
    bit: u8,
    ack_clocked: bool,
    tx_byte: u8,
    controller_acked: bool,
    byte_in_transaction: usize,

    // Device model
    pub registers: [u8; 256],
    pub pointer: u8,
    pub fifo: VecDeque<u8>,
    /// Mode register reads that still report the reset bit; `None` once the
    /// bit is stuck.
    reset_reads_left: Option<u32>,
    pub reset_never_clears: bool,
    pub reset_duration: u32,
    pub temperature: (i8, u8),

    // Fault injection
    /// `(transaction, byte)` at which the target answers NACK.
    pub nack_at: Option<(usize, usize)>,
    /// Every transaction from this index on is refused at its address byte.
    pub absent_from: Option<usize>,
    pub pin_fault: bool,
    /// Fails the next attempt to pull the clock low, once.
    pub fail_next_scl_low: bool,

    // Observations
    /// Bytes the controller sent, one entry per start..stop.
    pub transactions: Vec<Vec<u8>>,
    /// Register writes in the order they were accepted.
    pub writes: Vec<(u8, u8)>,
    pub mode_reads: usize,
    /// Data line level at each rising clock edge.
    pub sda_at_rising: Vec<bool>,
    pub starts: usize,
    pub stops: usize,
}

impl SimMax30102 {
    pub fn new() -> Self {
        let mut registers = [0u8; 256];
        registers[Register::PART_ID as usize] = EXPECTED_PART_ID;
        registers[Register::REV_ID as usize] = 0x03;

        Self {
            master_sda: true,
            master_scl: true,
            target_pulls_sda: false,
            phase: Phase::Idle,
            in_transaction: false,
            expect_address: false,
            pointer_pending: false,
            read_after_ack: false,
            nacked: false,
            shift: 0,
            bit: 0,
            ack_clocked: false,
            tx_byte: 0,
            controller_acked: false,
            byte_in_transaction: 0,
            registers,
            pointer: 0,
            fifo: VecDeque::new(),
            reset_reads_left: None,
            reset_never_clears: false,
            reset_duration: 3,
            temperature: (0, 0),
            nack_at: None,
            absent_from: None,
            pin_fault: false,
            fail_next_scl_low: false,
            transactions: Vec::new(),
            writes: Vec::new(),
            mode_reads: 0,
            sda_at_rising: Vec::new(),
            starts: 0,
            stops: 0,
        }
    }

    pub fn with_part_id(mut self, id: u8) -> Self {
        self.registers[Register::PART_ID as usize] = id;
        self
    }

    /// Queue one FIFO entry; each channel is sent as its 24-bit word.
    pub fn push_sample(&mut self, red: u32, ir: u32) {
        for word in [red, ir] {
            let [_, b2, b1, b0] = word.to_be_bytes();
            self.fifo.extend([b2, b1, b0]);
        }
    }

    pub fn register(&self, reg: Register) -> u8 {
        self.registers[reg as usize]
    }

    pub fn set_register(&mut self, reg: Register, value: u8) {
        self.registers[reg as usize] = value;
    }

    /// Both lines released, as required between transactions.
    pub fn is_at_rest(&self) -> bool {
        self.master_scl && self.sda()
    }

    fn sda(&self) -> bool {
        self.master_sda && !self.target_pulls_sda
    }

    fn transaction_index(&self) -> usize {
        self.transactions.len().saturating_sub(1)
    }

    fn on_start(&mut self) {
        self.starts += 1;
        if !self.in_transaction {
            self.in_transaction = true;
            self.transactions.push(Vec::new());
            self.byte_in_transaction = 0;
        }
        self.phase = Phase::Receive;
        self.expect_address = true;
        self.read_after_ack = false;
        self.nacked = false;
        self.shift = 0;
        self.bit = 0;
        self.ack_clocked = false;
        self.target_pulls_sda = false;
    }

    fn on_stop(&mut self) {
        self.stops += 1;
        self.in_transaction = false;
        self.phase = Phase::Idle;
        self.target_pulls_sda = false;
    }

    /// Returns whether the target acknowledges `byte`.
    fn accept_byte(&mut self, byte: u8) -> bool {
        let index = self.transaction_index();
        if let Some(entry) = self.transactions.last_mut() {
            entry.push(byte);
        }
        let position = self.byte_in_transaction;
        self.byte_in_transaction += 1;

        if self.nack_at == Some((index, position)) {
            return false;
        }

        if self.expect_address {
            self.expect_address = false;
            if self.absent_from.is_some_and(|from| index >= from) {
                return false;
            }
            if byte >> 1 != ADDR {
                return false;
            }
            if byte & 0x01 == 0x01 {
                self.read_after_ack = true;
            } else {
                self.pointer_pending = true;
            }
            return true;
        }

        if self.pointer_pending {
            self.pointer_pending = false;
            self.pointer = byte;
            return true;
        }

        self.write(self.pointer, byte);
        if self.pointer != Register::FIFO_DATA as u8 {
            self.pointer = self.pointer.wrapping_add(1);
        }
        true
    }

    fn write(&mut self, reg: u8, value: u8) {
        self.writes.push((reg, value));

        if reg == Register::MODE_CONFIG as u8 && value & 0x40 != 0 {
            let part_id = self.register(Register::PART_ID);
            let rev_id = self.register(Register::REV_ID);
            self.registers = [0; 256];
            self.set_register(Register::PART_ID, part_id);
            self.set_register(Register::REV_ID, rev_id);
            self.reset_reads_left = Some(self.reset_duration);
            return;
        }

        if reg == Register::TEMP_CONFIG as u8 && value & 0x01 != 0 {
            let (integer, fraction) = self.temperature;
            self.set_register(Register::TEMP_INT, integer as u8);
            self.set_register(Register::TEMP_FRAC, fraction);
            return;
        }

        self.registers[reg as usize] = value;
    }

    fn read_next(&mut self) -> u8 {
        let reg = self.pointer;

        if reg == Register::FIFO_DATA as u8 {
            return self.fifo.pop_front().unwrap_or(0);
        }
        self.pointer = self.pointer.wrapping_add(1);

        let value = self.registers[reg as usize];
        if reg == Register::MODE_CONFIG as u8 {
            self.mode_reads += 1;
            if self.reset_never_clears {
                return value | 0x40;
            }
            if let Some(left) = self.reset_reads_left {
                if left > 0 {
                    self.reset_reads_left = Some(left - 1);
                    return value | 0x40;
                }
                self.reset_reads_left = None;
            }
        }
        value
    }

    fn load_tx_byte(&mut self) {
        self.tx_byte = self.read_next();
        self.bit = 0;
        self.ack_clocked = false;
        self.present_bit(7);
    }

    fn present_bit(&mut self, index: u8) {
        self.target_pulls_sda = self.tx_byte & (1 << index) == 0;
    }

    fn on_scl_rising(&mut self) {
        self.sda_at_rising.push(self.sda());

        match self.phase {
            Phase::Idle => {}
            Phase::Receive => {
                if self.bit < 8 {
                    self.shift = (self.shift << 1) | self.sda() as u8;
                    self.bit += 1;
                } else {
                    self.ack_clocked = true;
                }
            }
            Phase::Transmit => {
                if self.bit < 8 {
                    self.bit += 1;
                } else {
                    self.controller_acked = !self.sda();
                    self.ack_clocked = true;
                }
            }
        }
    }

    fn on_scl_falling(&mut self) {
        match self.phase {
            Phase::Idle => {}
            Phase::Receive => {
                if self.bit < 8 {
                    return;
                }
                if !self.ack_clocked {
                    let byte = self.shift;
                    let ack = self.accept_byte(byte);
                    self.nacked = !ack;
                    self.target_pulls_sda = ack;
                    return;
                }

                self.target_pulls_sda = false;
                if self.nacked {
                    self.phase = Phase::Idle;
                } else if self.read_after_ack {
                    self.phase = Phase::Transmit;
                    self.load_tx_byte();
                } else {
                    self.shift = 0;
                    self.bit = 0;
                    self.ack_clocked = false;
                }
            }
            Phase::Transmit => {
                if (1..8).contains(&self.bit) {
                    self.present_bit(7 - self.bit);
                } else if self.bit == 8 && !self.ack_clocked {
                    self.target_pulls_sda = false;
                } else if self.bit == 8 {
                    if self.controller_acked {
                        self.load_tx_byte();
                    } else {
                        self.target_pulls_sda = false;
                        self.phase = Phase::Idle;
                    }
                }
            }
        }
    }
}

impl Default for SimMax30102 {
    fn default() -> Self {
        Self::new()
    }
}

impl BusLines for SimMax30102 {
    type Error = SimPinError;

    fn set_sda(&mut self, high: bool) -> Result<(), Self::Error> {
        if self.pin_fault {
            return Err(SimPinError);
        }
        let was = self.master_sda;
        self.master_sda = high;

        if self.master_scl && was != high {
            if high {
                self.on_stop();
            } else {
                self.on_start();
            }
        }
        Ok(())
    }

    fn set_scl(&mut self, high: bool) -> Result<(), Self::Error> {
        if self.pin_fault {
            return Err(SimPinError);
        }
        if !high && self.fail_next_scl_low {
            self.fail_next_scl_low = false;
            return Err(SimPinError);
        }
        let was = self.master_scl;
        self.master_scl = high;

        match (was, high) {
            (false, true) => self.on_scl_rising(),
            (true, false) => self.on_scl_falling(),
            _ => {}
        }
        Ok(())
    }

    fn sda_is_high(&mut self) -> Result<bool, Self::Error> {
        if self.pin_fault {
            return Err(SimPinError);
        }
        Ok(self.sda())
    }
}
