//! Charge estimation for a single Li-ion cell measured through a voltage
//! divider on an ADC pin.
//!
//! The pipeline is deliberately simple: average a burst of raw ADC reads,
//! scale the average to volts, then map the voltage onto a 0-100% charge
//! level with either a polynomial fitted to an 18650 discharge curve or a
//! lookup-table walk. Hardware access goes through the [`adc::AdcSampler`]
//! trait, so the estimator itself runs anywhere, including on the host in
//! tests.

#![no_std]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

pub mod adc;
pub mod config;
pub mod curve;
pub mod gauge;
pub mod table;

pub use adc::{AdcSampler, OneShotSampler};
pub use config::{Config, ConfigError};
pub use gauge::{BatteryGauge, Estimator};
