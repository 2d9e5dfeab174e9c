#![cfg_attr(not(test), no_std)]
//! Heart-rate and SpO2 pipeline for the MAX30102: batch acquisition, peak
//! detection, smoothing and threshold alarms, published as a
//! [`VitalsReading`] snapshot.

#[macro_use]
mod fmt;

pub mod alarm;
pub mod config;
pub mod estimator;
pub mod filter;
pub mod reading;
pub mod source;
pub mod task;

pub use crate::config::{AlarmThresholds, VitalsConfig};
pub use crate::estimator::{estimate, Estimate, Span};
pub use crate::filter::FilterState;
pub use crate::reading::VitalsReading;
pub use crate::source::SampleSource;
pub use crate::task::{bring_up, VitalsTask};
