//! The measurement pipeline: sample, average, scale, estimate.

use crate::adc::AdcSampler;
use crate::config::{Config, ConfigError};
use crate::curve;
use crate::table::ConversionTable;

/// Which estimate backs [`BatteryGauge::charge_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Estimator {
    /// Piecewise polynomial fitted to the 18650 discharge curve. See
    /// [`curve`].
    Curve,
    /// Walk over the lazily built voltage ramp. See
    /// [`ConversionTable`].
    Table,
}

impl Default for Estimator {
    fn default() -> Self {
        Estimator::Curve
    }
}

/// Charge gauge for one cell behind one divider.
///
/// Owns its sampler and configuration for its whole life; nothing is
/// shared and no measurement history is kept, so every call starts from
/// fresh hardware reads.
pub struct BatteryGauge<A> {
    sampler: A,
    config: Config,
    table: Option<ConversionTable>,
}

impl<A: AdcSampler> BatteryGauge<A> {
    /// Builds a gauge over `sampler`, rejecting configurations that would
    /// divide by zero or invert the charge ramp.
    pub fn new(sampler: A, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(BatteryGauge {
            sampler,
            config,
            table: None,
        })
    }

    /// Gauge with the stock divider configuration ([`Config::default`]).
    pub fn with_defaults(sampler: A) -> Self {
        BatteryGauge {
            sampler,
            config: Config::default(),
            table: None,
        }
    }

    /// The configuration this gauge was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Averaged raw reading, for calibrating the conversion factor against
    /// a bench meter.
    pub fn raw_sample(&mut self) -> u16 {
        self.averaged_sample()
    }

    /// Averaged cell voltage.
    pub fn volts(&mut self) -> f64 {
        let raw = self.averaged_sample();
        let volts = self.to_volts(raw);
        #[cfg(feature = "defmt")]
        defmt::trace!("raw avg {} -> {} V", raw, volts);
        volts
    }

    /// Estimated charge percentage, always in `0..=100`.
    ///
    /// Voltages at or past the configured bounds short-circuit to 0 or 100
    /// before either estimator runs, so divider noise beyond the bounds
    /// cannot push the result out of band.
    pub fn charge_level(&mut self, estimator: Estimator) -> u8 {
        let volts = self.volts();

        if volts >= self.config.max_voltage {
            return 100;
        }
        if volts <= self.config.min_voltage {
            return 0;
        }

        match estimator {
            Estimator::Curve => curve::charge_percent(volts),
            Estimator::Table => {
                let config = &self.config;
                let table = self.table.get_or_insert_with(|| {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("building conversion table");
                    ConversionTable::new(config.min_voltage, config.max_voltage)
                });
                table.charge_percent(volts)
            }
        }
    }

    /// Hands the sampler back, e.g. to reuse the ADC elsewhere.
    pub fn release(self) -> A {
        self.sampler
    }

    /// `sample_count` back-to-back reads, integer-truncated mean. Every
    /// call hits the hardware; nothing is cached between measurements.
    fn averaged_sample(&mut self) -> u16 {
        let mut total: u32 = 0;
        for _ in 0..self.config.sample_count {
            total += u32::from(self.sampler.read_raw(self.config.pin));
        }
        (total / u32::from(self.config.sample_count)) as u16
    }

    fn to_volts(&self, raw: u16) -> f64 {
        f64::from(raw) * self.config.conversion_factor / 1000.0
    }

    #[cfg(test)]
    fn table_is_built(&self) -> bool {
        self.table.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Sampler that replays a scripted sequence of raw readings, cycling
    /// if asked for more than it holds.
    struct ScriptedAdc<'a> {
        samples: &'a [u16],
        reads: usize,
        last_pin: Option<u8>,
    }

    impl<'a> ScriptedAdc<'a> {
        fn new(samples: &'a [u16]) -> Self {
            ScriptedAdc {
                samples,
                reads: 0,
                last_pin: None,
            }
        }
    }

    impl AdcSampler for ScriptedAdc<'_> {
        fn read_raw(&mut self, pin: u8) -> u16 {
            let value = self.samples[self.reads % self.samples.len()];
            self.reads += 1;
            self.last_pin = Some(pin);
            value
        }
    }

    fn steady(samples: &'static [u16]) -> BatteryGauge<ScriptedAdc<'static>> {
        BatteryGauge::with_defaults(ScriptedAdc::new(samples))
    }

    #[test]
    fn averaging_is_deterministic_over_a_steady_signal() {
        let mut gauge = steady(&[2048]);
        assert_eq!(gauge.raw_sample(), 2048);
        // One measurement issues exactly sample_count reads on the
        // configured pin.
        assert_eq!(gauge.release().reads, 20);
    }

    #[test]
    fn averaging_truncates_the_remainder() {
        let config = Config {
            sample_count: 2,
            ..Config::default()
        };
        let mut gauge = BatteryGauge::new(ScriptedAdc::new(&[1, 2]), config).unwrap();
        // (1 + 2) / 2 = 1 in integer arithmetic.
        assert_eq!(gauge.raw_sample(), 1);
    }

    #[test]
    fn reads_go_to_the_configured_pin() {
        let config = Config {
            pin: 34,
            ..Config::default()
        };
        let mut gauge = BatteryGauge::new(ScriptedAdc::new(&[1000]), config).unwrap();
        gauge.raw_sample();
        assert_eq!(gauge.release().last_pin, Some(34));
    }

    #[test]
    fn volts_scale_linearly_and_zero_maps_to_zero() {
        let gauge = steady(&[2000]);
        assert_eq!(gauge.to_volts(0), 0.0);
        let one = gauge.to_volts(1000);
        let two = gauge.to_volts(2000);
        assert!((two - 2.0 * one).abs() < 1e-12);
    }

    #[test]
    fn steady_2000_raw_reads_as_3v404() {
        let mut gauge = steady(&[2000]);
        // 2000 * 1.702 / 1000
        assert!((gauge.volts() - 3.404).abs() < 1e-9);
    }

    #[test]
    fn over_full_voltage_clamps_to_100_in_both_modes() {
        // 2500 * 1.702 / 1000 = 4.255 V, past the 4.20 V bound.
        let mut gauge = steady(&[2500]);
        assert_eq!(gauge.charge_level(Estimator::Curve), 100);
        assert_eq!(gauge.charge_level(Estimator::Table), 100);
    }

    #[test]
    fn under_empty_voltage_clamps_to_0_in_both_modes() {
        // 1500 * 1.702 / 1000 = 2.553 V, below the 3.20 V bound.
        let mut gauge = steady(&[1500]);
        assert_eq!(gauge.charge_level(Estimator::Curve), 0);
        assert_eq!(gauge.charge_level(Estimator::Table), 0);
    }

    #[test]
    fn mid_range_voltage_lands_strictly_inside_the_scale() {
        // 3.404 V sits between the bounds, so neither estimator may clamp.
        let mut gauge = steady(&[2000]);

        let curve = gauge.charge_level(Estimator::Curve);
        assert!(curve > 0 && curve < 100, "curve gave {}", curve);
        // Linear tail: 20 * 3.404 - 64, truncated.
        assert_eq!(curve, 4);

        let table = gauge.charge_level(Estimator::Table);
        assert!(table > 0 && table < 100, "table gave {}", table);
    }

    #[test]
    fn table_is_built_once_and_only_on_demand() {
        let mut gauge = steady(&[2000]);
        assert!(!gauge.table_is_built());

        // Curve mode never touches the table.
        gauge.charge_level(Estimator::Curve);
        assert!(!gauge.table_is_built());

        let first = gauge.charge_level(Estimator::Table);
        assert!(gauge.table_is_built());
        let second = gauge.charge_level(Estimator::Table);
        assert_eq!(first, second);
    }

    #[test]
    fn clamped_measurements_skip_table_construction() {
        let mut gauge = steady(&[2500]);
        gauge.charge_level(Estimator::Table);
        // 4.255 V clamps before the table branch is reached.
        assert!(!gauge.table_is_built());
    }

    #[test]
    fn invalid_configs_never_build_a_gauge() {
        let zero_reads = Config {
            sample_count: 0,
            ..Config::default()
        };
        assert_eq!(
            BatteryGauge::new(ScriptedAdc::new(&[0]), zero_reads).err(),
            Some(ConfigError::ZeroSampleCount)
        );

        let swapped = Config {
            max_voltage: 3.0,
            min_voltage: 4.0,
            ..Config::default()
        };
        assert_eq!(
            BatteryGauge::new(ScriptedAdc::new(&[0]), swapped).err(),
            Some(ConfigError::InvertedVoltageBounds)
        );
    }
}
