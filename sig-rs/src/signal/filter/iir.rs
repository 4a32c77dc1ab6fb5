//! Stateful IIR execution.

use crate::kernel::{
    ensure_finite, ensure_positive, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
    SampleStream, Write1D,
};
use crate::signal::fft::Complex64;
use crate::signal::traits::StreamFilter1D;
use crate::Result;
use core::f64::consts::PI;

use super::delay_line::DelayLine;
use super::design::{FilterConfig, FilterType, IirCoefficients};

/// Complex response of a filter sampled at a set of frequencies.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterResponse {
    /// Evaluation frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// `|H(e^{jω})|`.
    pub magnitudes: Vec<f64>,
    /// `arg H(e^{jω})` in radians.
    pub phases: Vec<f64>,
}

/// Direct form I filter with ring-buffer delay lines.
///
/// The filter is designed once at construction. Every processed sample
/// advances its history, so consecutive calls continue a single stream until
/// [`DigitalFilter::reset`] clears the history.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use sig_rs::signal::filter::{lowpass, DigitalFilter};
///
/// let mut filter = lowpass(10.0, 100.0).unwrap();
/// let batch = filter.process_data(&[1.0; 4]);
///
/// filter.reset();
/// let one_by_one: Vec<f64> = (0..4).map(|_| filter.process_sample(1.0)).collect();
/// assert_eq!(batch, one_by_one);
/// assert_abs_diff_eq!(batch[0], filter.coefficients().b[0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalFilter {
    config: FilterConfig,
    coefficients: IirCoefficients,
    inputs: DelayLine,
    outputs: DelayLine,
}

impl KernelLifecycle for DigitalFilter {
    type Config = FilterConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        let coefficients = IirCoefficients::design(&config)?;
        Ok(Self {
            inputs: DelayLine::new(coefficients.b.len()),
            outputs: DelayLine::new(coefficients.a.len() - 1),
            config,
            coefficients,
        })
    }
}

impl DigitalFilter {
    /// Design a filter from `config`.
    pub fn new(config: FilterConfig) -> Result<Self> {
        Ok(Self::try_new(config)?)
    }

    /// Configuration the filter was designed from.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Designed coefficients.
    pub fn coefficients(&self) -> &IirCoefficients {
        &self.coefficients
    }

    /// Filter one sample, `y = Σ b[i] x[n-i] - Σ a[i+1] y[n-1-i]`.
    pub fn process_sample(&mut self, x: f64) -> f64 {
        self.inputs.push(x);
        let feed_forward: f64 = self
            .coefficients
            .b
            .iter()
            .zip(self.inputs.iter())
            .map(|(b, x)| b * x)
            .sum();
        let feedback: f64 = self.coefficients.a[1..]
            .iter()
            .zip(self.outputs.iter())
            .map(|(a, y)| a * y)
            .sum();
        let y = feed_forward - feedback;
        self.outputs.push(y);
        y
    }

    /// Filter a block of samples, continuing from the current state.
    pub fn process_data(&mut self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Drain `stream` through the filter.
    pub fn process_stream<S>(&mut self, stream: &mut S) -> Vec<f64>
    where
        S: SampleStream<f64> + ?Sized,
    {
        let mut out = Vec::new();
        while let Some(x) = stream.next_sample() {
            out.push(self.process_sample(x));
        }
        out
    }

    /// Zero the delay lines. Coefficients are kept.
    pub fn reset(&mut self) {
        self.inputs.reset();
        self.outputs.reset();
    }

    /// Evaluate `H(z) = B(z) / A(z)` at `z = e^{jω}`, `ω = 2π f / sample_rate`.
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use sig_rs::signal::filter::lowpass;
    ///
    /// let filter = lowpass(10.0, 100.0).unwrap();
    /// let response = filter.frequency_response(&[0.0, 10.0]);
    /// assert_relative_eq!(response.magnitudes[0], 1.0, epsilon = 1e-12);
    /// assert_relative_eq!(response.magnitudes[1], core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    /// ```
    pub fn frequency_response(&self, frequencies: &[f64]) -> FilterResponse {
        let eval = |coeffs: &[f64], omega: f64| -> Complex64 {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| Complex64::from_polar(c, -omega * k as f64))
                .sum()
        };
        let (magnitudes, phases) = frequencies
            .iter()
            .map(|f| {
                let omega = 2.0 * PI * f / self.config.sample_rate;
                let h = eval(&self.coefficients.b, omega) / eval(&self.coefficients.a, omega);
                (h.norm(), h.arg())
            })
            .unzip();
        FilterResponse {
            frequencies: frequencies.to_vec(),
            magnitudes,
            phases,
        }
    }
}

impl StreamFilter1D<f64> for DigitalFilter {
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> core::result::Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out.len(),
            });
        }
        out.iter_mut()
            .zip(input.iter())
            .for_each(|(y, &x)| *y = self.process_sample(x));
        Ok(())
    }

    fn run_alloc<I>(&mut self, input: &I) -> core::result::Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        Ok(self.process_data(input))
    }
}

/// Second-order Butterworth lowpass.
pub fn lowpass(cutoff: f64, sample_rate: f64) -> Result<DigitalFilter> {
    DigitalFilter::new(FilterConfig::new(FilterType::Lowpass, cutoff, sample_rate))
}

/// Second-order Butterworth highpass.
pub fn highpass(cutoff: f64, sample_rate: f64) -> Result<DigitalFilter> {
    DigitalFilter::new(FilterConfig::new(FilterType::Highpass, cutoff, sample_rate))
}

/// Band-pass biquad between `low` and `high`.
pub fn bandpass(low: f64, high: f64, sample_rate: f64) -> Result<DigitalFilter> {
    DigitalFilter::new(FilterConfig::band(FilterType::Bandpass, low, high, sample_rate))
}

/// Band-stop biquad between `low` and `high`.
pub fn bandstop(low: f64, high: f64, sample_rate: f64) -> Result<DigitalFilter> {
    DigitalFilter::new(FilterConfig::band(FilterType::Bandstop, low, high, sample_rate))
}

/// Band-stop biquad `bandwidth` Hz wide centred on `frequency`.
///
/// ```
/// use sig_rs::signal::filter::notch;
///
/// let filter = notch(50.0, 1000.0, 10.0).unwrap();
/// let response = filter.frequency_response(&[5.0, 50.0]);
/// assert!(response.magnitudes[1] < 0.1 * response.magnitudes[0]);
/// ```
pub fn notch(frequency: f64, sample_rate: f64, bandwidth: f64) -> Result<DigitalFilter> {
    ensure_finite("frequency", frequency)?;
    ensure_positive("bandwidth", bandwidth)?;
    bandstop(
        frequency - bandwidth / 2.0,
        frequency + bandwidth / 2.0,
        sample_rate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::measure::rms;
    use crate::signal::wave::{sine, SignalConfig};
    use approx::assert_relative_eq;

    fn tone(frequency: f64) -> Vec<f64> {
        sine(SignalConfig::new(100.0, 4.0).with_frequency(frequency)).expect("tone")
    }

    #[test]
    fn impulse_response_matches_difference_equation() {
        let mut filter = lowpass(10.0, 100.0).expect("lowpass");
        let mut impulse = vec![0.0; 6];
        impulse[0] = 1.0;
        let y = filter.process_data(&impulse);
        let expected = [
            0.0674552738890719,
            0.21201061062684184,
            0.2819336233057059,
            0.23472631556874185,
            0.15190495187045572,
            0.07672900004518605,
        ];
        y.iter()
            .zip(expected.iter())
            .for_each(|(a, b)| assert_relative_eq!(a, b, epsilon = 1e-12));
    }

    #[test]
    fn lowpass_attenuates_high_tone_more_than_low_tone() {
        let mut filter = lowpass(10.0, 100.0).expect("lowpass");
        let low = filter.process_data(&tone(2.0));
        filter.reset();
        let high = filter.process_data(&tone(40.0));

        // skip the start-up transient
        let low_gain = rms(&low[100..]).expect("rms") / rms(&tone(2.0)[100..]).expect("rms");
        let high_gain = rms(&high[100..]).expect("rms") / rms(&tone(40.0)[100..]).expect("rms");
        assert!(high_gain < low_gain);
        assert!(high_gain < 0.05);
        assert!(low_gain > 0.95);
    }

    #[test]
    fn state_carries_across_calls_until_reset() {
        let mut filter = highpass(5.0, 100.0).expect("highpass");
        let x = tone(20.0);
        let whole = filter.process_data(&x);

        filter.reset();
        let mut split = filter.process_data(&x[..150]);
        split.extend(filter.process_data(&x[150..]));
        assert_eq!(whole, split);

        let mut stream = x.iter().copied();
        filter.reset();
        assert_eq!(filter.process_stream(&mut stream), whole);
    }

    #[test]
    fn stream_filter_trait_writes_into_buffers() {
        let mut filter = bandpass(40.0, 60.0, 1000.0).expect("bandpass");
        let x: Vec<f64> = (0..32).map(|i| (i % 5) as f64).collect();
        let mut out = vec![0.0; x.len()];
        filter.run_into(&x, &mut out).expect("run_into");
        filter.reset();
        assert_eq!(filter.run_alloc(&x).expect("run_alloc"), out);

        let mut short = vec![0.0; 3];
        assert!(matches!(
            filter.run_into(&x, &mut short),
            Err(ExecInvariantViolation::LengthMismatch { arg: "out", .. })
        ));
    }

    #[test]
    fn band_responses_peak_and_dip_inside_band() {
        let pass = bandpass(40.0, 60.0, 1000.0).expect("bandpass");
        let stop = bandstop(40.0, 60.0, 1000.0).expect("bandstop");
        let freqs = [0.0, 49.0, 200.0];
        let p = pass.frequency_response(&freqs).magnitudes;
        let s = stop.frequency_response(&freqs).magnitudes;

        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-3);
        assert!(p[2] < 0.1);
        assert_relative_eq!(s[0], 1.0, epsilon = 1e-12);
        assert!(s[1] < 1e-2);
        assert!(s[2] > 0.99);
    }

    #[test]
    fn highpass_phase_leads() {
        let filter = highpass(10.0, 100.0).expect("highpass");
        let r = filter.frequency_response(&[10.0]);
        assert_relative_eq!(r.magnitudes[0], core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(r.phases[0], PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn notch_requires_positive_bandwidth() {
        assert!(notch(50.0, 1000.0, 0.0).is_err());
        assert!(notch(3.0, 1000.0, 10.0).is_err());
    }
}
