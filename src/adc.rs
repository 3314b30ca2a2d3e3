//! The seam between the gauge and whatever is doing the actual sampling.

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

/// One raw sample from an ADC-capable pin.
///
/// The gauge calls this once per read in its averaging loop and trusts the
/// result as-is: there is no error channel, and a failed or noisy
/// conversion is indistinguishable from a genuinely low cell. Callers that
/// need fault detection should wrap their sampler with it before handing
/// it to the gauge.
pub trait AdcSampler {
    /// Returns one raw reading from `pin`. Expected to block only as long
    /// as a single conversion takes.
    fn read_raw(&mut self, pin: u8) -> u16;
}

impl<S: AdcSampler + ?Sized> AdcSampler for &mut S {
    fn read_raw(&mut self, pin: u8) -> u16 {
        (**self).read_raw(pin)
    }
}

/// [`AdcSampler`] over an `embedded-hal` one-shot ADC and a channel pin.
///
/// The typed channel decides what gets sampled; the pin number passed down
/// by the gauge is Arduino-style bookkeeping and is ignored here. A
/// conversion error reads as 0, consistent with the no-error-channel
/// contract of [`AdcSampler`].
pub struct OneShotSampler<Adc, Pin, ADC, Word> {
    adc: Adc,
    pin: Pin,
    _marker: PhantomData<(ADC, Word)>,
}

impl<Adc, Pin, ADC, Word> OneShotSampler<Adc, Pin, ADC, Word>
where
    Adc: OneShot<ADC, Word, Pin>,
    Pin: Channel<ADC>,
    Word: Into<u16>,
{
    /// Takes ownership of the ADC peripheral and the channel pin.
    pub fn new(adc: Adc, pin: Pin) -> Self {
        OneShotSampler {
            adc,
            pin,
            _marker: PhantomData,
        }
    }

    /// Hands the peripheral and pin back, e.g. to share the ADC with
    /// another sensor.
    pub fn release(self) -> (Adc, Pin) {
        (self.adc, self.pin)
    }
}

impl<Adc, Pin, ADC, Word> AdcSampler for OneShotSampler<Adc, Pin, ADC, Word>
where
    Adc: OneShot<ADC, Word, Pin>,
    Pin: Channel<ADC>,
    Word: Into<u16>,
{
    fn read_raw(&mut self, _pin: u8) -> u16 {
        match nb::block!(self.adc.read(&mut self.pin)) {
            Ok(word) => word.into(),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal_mock::adc::{Mock, MockChan1, Transaction};

    #[test]
    fn one_shot_sampler_reads_through_the_hal() {
        let expectations = [Transaction::read(1, 614u16)];
        let adc = Mock::new(&expectations);
        let mut sampler = OneShotSampler::new(adc, MockChan1 {});

        // The numeric pin is advisory; the typed channel wins.
        assert_eq!(sampler.read_raw(35), 614);

        let (mut adc, _pin) = sampler.release();
        adc.done();
    }
}
