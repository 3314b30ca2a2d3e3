//! Gauge configuration: one struct, documented defaults, validated once.

use thiserror::Error;

/// ADC pin the reference divider hangs off (GPIO35 on the usual ESP32
/// dev boards).
pub const DEFAULT_PIN: u8 = 35;
/// Raw reads averaged per measurement.
pub const DEFAULT_SAMPLE_COUNT: u16 = 20;
/// Millivolts per ADC count, for a 12-bit ADC behind a 1:2 divider.
pub const DEFAULT_CONVERSION_FACTOR: f64 = 1.702;
/// Cell voltage reported as 100% charged.
pub const DEFAULT_MAX_VOLTAGE: f64 = 4.20;
/// Cell voltage reported as empty.
pub const DEFAULT_MIN_VOLTAGE: f64 = 3.20;

/// Everything the gauge needs to know about the board it runs on.
///
/// Fields are plain and public; fill in what differs from [`Default`] with
/// struct update syntax:
///
/// ```
/// use cell_gauge::Config;
///
/// let config = Config {
///     pin: 34,
///     conversion_factor: 1.78,
///     ..Config::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Pin identifier handed to the sampler on every read. The gauge does
    /// not check it; whether the number means anything is between the
    /// sampler and the board.
    pub pin: u8,
    /// How many raw reads go into one averaged measurement. Must be at
    /// least 1.
    pub sample_count: u16,
    /// Millivolts represented by one raw ADC count. Depends on the ADC
    /// reference and the divider ratio, so it is board-specific.
    pub conversion_factor: f64,
    /// Voltage corresponding to 100% charge. Must exceed `min_voltage`.
    pub max_voltage: f64,
    /// Voltage corresponding to 0% charge.
    pub min_voltage: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pin: DEFAULT_PIN,
            sample_count: DEFAULT_SAMPLE_COUNT,
            conversion_factor: DEFAULT_CONVERSION_FACTOR,
            max_voltage: DEFAULT_MAX_VOLTAGE,
            min_voltage: DEFAULT_MIN_VOLTAGE,
        }
    }
}

impl Config {
    /// Checks the two settings that would otherwise corrupt every later
    /// measurement: a zero sample count divides by zero, and inverted
    /// voltage bounds flip both estimators upside down.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::ZeroSampleCount);
        }
        if self.min_voltage >= self.max_voltage {
            return Err(ConfigError::InvertedVoltageBounds);
        }
        Ok(())
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("sample count must be at least 1")]
    ZeroSampleCount,
    #[error("min voltage must be below max voltage")]
    InvertedVoltageBounds,
}
