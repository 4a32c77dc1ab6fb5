//! Spectrum analysis built on [`Radix2Fft`].
//!
//! All spectra are one-sided: a real input of padded length `N` yields the
//! first `N / 2` bins, spaced `sample_rate / N` apart.

use crate::kernel::{
    ensure_finite, ensure_positive, read_non_empty, ConfigError, ExecInvariantViolation,
    KernelLifecycle, Read1D,
};
use crate::signal::fft::{Complex64, FftConfig, FftDirection, Radix2Fft};
use crate::signal::traits::{PowerSpectrum1D, SpectralPeaks1D, Spectrogram1D, Transform1D};
use crate::signal::windows::{get_window, WindowType};
use crate::Result;
use sig_rs_core::num_rs::{next_pow2, zero_pad_pow2};
use tracing::{debug, trace};

/// One-sided spectrum of a real signal.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FftResult {
    /// Bin centre frequencies in Hz, `k * sample_rate / N`.
    pub frequencies: Vec<f64>,
    /// `|X[k]|`.
    pub magnitudes: Vec<f64>,
    /// `arg X[k]` in radians.
    pub phases: Vec<f64>,
    /// `|X[k]|²`.
    pub power_spectrum: Vec<f64>,
    /// Sample rate the spectrum was computed for.
    pub sample_rate: f64,
    /// Bin spacing `sample_rate / N`.
    pub frequency_resolution: f64,
}

impl FftResult {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True when the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// A local maximum of the magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectralPeak {
    /// Bin frequency in Hz.
    pub frequency: f64,
    /// Bin magnitude.
    pub magnitude: f64,
    /// Bin phase in radians.
    pub phase: f64,
}

/// Short-time power spectra.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrogramResult {
    /// Segment start times in seconds.
    pub time_axis: Vec<f64>,
    /// Bin frequencies in Hz.
    pub frequency_axis: Vec<f64>,
    /// Power in time-major layout `[segment][bin]`.
    pub power_matrix: Vec<Vec<f64>>,
}

/// Window, transform and fold an already power-of-two sized buffer.
fn one_sided_spectrum(
    plan: &Radix2Fft,
    padded: &[f64],
    window: &[f64],
    sample_rate: f64,
) -> core::result::Result<FftResult, ExecInvariantViolation> {
    let mut buf: Vec<Complex64> = padded
        .iter()
        .zip(window.iter())
        .map(|(x, w)| Complex64::new(x * w, 0.0))
        .collect();
    plan.run_in_place(&mut buf)?;

    let n = plan.len();
    let half = &buf[..n / 2];
    let magnitudes: Vec<f64> = half.iter().map(|c| c.norm()).collect();
    Ok(FftResult {
        frequencies: (0..n / 2).map(|k| k as f64 * sample_rate / n as f64).collect(),
        phases: half.iter().map(|c| c.arg()).collect(),
        power_spectrum: magnitudes.iter().map(|m| m * m).collect(),
        magnitudes,
        sample_rate,
        frequency_resolution: sample_rate / n as f64,
    })
}

fn forward_plan(len: usize) -> core::result::Result<Radix2Fft, ExecInvariantViolation> {
    Ok(Radix2Fft::try_new(FftConfig {
        len,
        direction: FftDirection::Forward,
    })?)
}

/// Constructor config for [`PsdKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsdConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Taper applied after zero padding.
    pub window: WindowType,
}

/// Trait-first power spectral density kernel.
///
/// Input is zero-padded to the next power of two, tapered with the configured
/// window over the padded length and transformed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsdKernel {
    sample_rate: f64,
    window: WindowType,
}

impl KernelLifecycle for PsdKernel {
    type Config = PsdConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        ensure_positive("sample_rate", config.sample_rate)?;
        Ok(Self {
            sample_rate: config.sample_rate,
            window: config.window,
        })
    }
}

impl PowerSpectrum1D<f64> for PsdKernel {
    fn run<I>(&self, input: &I) -> core::result::Result<FftResult, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
        let padded = zero_pad_pow2(input);
        let n = padded.len();
        let window = get_window(self.window, n);
        one_sided_spectrum(&forward_plan(n)?, &padded, &window, self.sample_rate)
    }
}

/// Constructor config for [`SpectralPeaksKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectralPeaksConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Minimum magnitude relative to the largest bin, e.g. `0.1`.
    pub threshold: f64,
    /// Taper used for the underlying spectrum.
    pub window: WindowType,
}

/// Trait-first spectral peak finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeaksKernel {
    psd: PsdKernel,
    threshold: f64,
}

impl KernelLifecycle for SpectralPeaksKernel {
    type Config = SpectralPeaksConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        ensure_finite("threshold", config.threshold)?;
        if config.threshold < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "threshold",
                reason: "threshold must be non-negative",
            });
        }
        Ok(Self {
            psd: PsdKernel::try_new(PsdConfig {
                sample_rate: config.sample_rate,
                window: config.window,
            })?,
            threshold: config.threshold,
        })
    }
}

impl SpectralPeaks1D<f64> for SpectralPeaksKernel {
    fn run<I>(&self, input: &I) -> core::result::Result<Vec<SpectralPeak>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let spectrum = self.psd.run(input)?;
        let mags = &spectrum.magnitudes;
        let max = mags.iter().copied().fold(0.0, f64::max);
        let floor = max * self.threshold;

        let mut peaks: Vec<SpectralPeak> = (1..mags.len().saturating_sub(1))
            .filter(|&i| mags[i] > mags[i - 1] && mags[i] > mags[i + 1] && mags[i] > floor)
            .map(|i| SpectralPeak {
                frequency: spectrum.frequencies[i],
                magnitude: mags[i],
                phase: spectrum.phases[i],
            })
            .collect();
        peaks.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        Ok(peaks)
    }
}

/// Constructor config for [`SpectrogramKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrogramConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Samples per segment, at least 2.
    pub window_size: usize,
    /// Fraction of each segment shared with the next, in `[0, 1)`.
    pub overlap: f64,
}

impl SpectrogramConfig {
    /// 256-sample segments with 50% overlap.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            window_size: 256,
            overlap: 0.5,
        }
    }
}

/// Trait-first spectrogram kernel.
///
/// Segments start every `floor(window_size * (1 - overlap))` samples and
/// continue until the whole signal is covered; the final segment is
/// zero-padded. Each segment is Hanning-tapered.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramKernel {
    sample_rate: f64,
    window_size: usize,
    hop: usize,
    plan: Radix2Fft,
    taper: Vec<f64>,
}

impl SpectrogramKernel {
    /// Distance between segment starts.
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of segments produced for a signal of `len` samples.
    pub fn segment_count(&self, len: usize) -> usize {
        if len <= self.window_size {
            1
        } else {
            (len - self.window_size).div_ceil(self.hop) + 1
        }
    }
}

impl KernelLifecycle for SpectrogramKernel {
    type Config = SpectrogramConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        ensure_positive("sample_rate", config.sample_rate)?;
        if config.window_size < 2 {
            return Err(ConfigError::InvalidArgument {
                arg: "window_size",
                reason: "window_size must be at least 2",
            });
        }
        if !(0.0..1.0).contains(&config.overlap) {
            return Err(ConfigError::InvalidArgument {
                arg: "overlap",
                reason: "overlap must be in [0, 1)",
            });
        }
        let hop = (config.window_size as f64 * (1.0 - config.overlap)).floor() as usize;
        if hop == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "overlap",
                reason: "overlap leaves a hop of zero samples",
            });
        }
        let n = next_pow2(config.window_size);
        let plan = Radix2Fft::try_new(FftConfig {
            len: n,
            direction: FftDirection::Forward,
        })?;
        debug!(
            window_size = config.window_size,
            hop,
            nfft = n,
            "configured spectrogram"
        );
        Ok(Self {
            sample_rate: config.sample_rate,
            window_size: config.window_size,
            hop,
            plan,
            taper: get_window(WindowType::Hanning, n),
        })
    }
}

impl Spectrogram1D<f64> for SpectrogramKernel {
    fn run<I>(&self, input: &I) -> core::result::Result<SpectrogramResult, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
        let segments = self.segment_count(input.len());
        let mut result = SpectrogramResult {
            time_axis: Vec::with_capacity(segments),
            frequency_axis: Vec::new(),
            power_matrix: Vec::with_capacity(segments),
        };

        let mut padded = vec![0.0; self.plan.len()];
        for s in 0..segments {
            let start = s * self.hop;
            let end = (start + self.window_size).min(input.len());
            padded.fill(0.0);
            padded[..end - start].copy_from_slice(&input[start..end]);

            let spectrum = one_sided_spectrum(&self.plan, &padded, &self.taper, self.sample_rate)?;
            if result.frequency_axis.is_empty() {
                result.frequency_axis = spectrum.frequencies;
            }
            result.time_axis.push(start as f64 / self.sample_rate);
            result.power_matrix.push(spectrum.power_spectrum);
        }
        Ok(result)
    }
}

/// Power spectral density with the given taper.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::signal::spectral::power_spectral_density;
/// use sig_rs::signal::windows::WindowType;
///
/// let x = vec![1.0; 100];
/// let psd = power_spectral_density(&x, 1000.0, WindowType::Rectangular).unwrap();
/// assert_eq!(psd.len(), 64);
/// assert_relative_eq!(psd.frequency_resolution, 1000.0 / 128.0);
/// assert_relative_eq!(psd.magnitudes[0], 100.0, epsilon = 1e-9);
/// ```
pub fn power_spectral_density(
    data: &[f64],
    sample_rate: f64,
    window: WindowType,
) -> Result<FftResult> {
    let kernel = PsdKernel::try_new(PsdConfig {
        sample_rate,
        window,
    })?;
    Ok(kernel.run(data)?)
}

/// Local maxima of the Hanning-tapered magnitude spectrum above `threshold * max`.
///
/// ```
/// use sig_rs::signal::spectral::find_peaks;
/// use sig_rs::signal::wave::{composite, sine, SignalConfig};
///
/// let base = SignalConfig::new(1024.0, 1.0);
/// let x = composite(&[
///     sine(base.with_frequency(50.0)).unwrap(),
///     sine(base.with_frequency(200.0).with_amplitude(0.5)).unwrap(),
/// ]);
/// let peaks = find_peaks(&x, 1024.0, 0.1).unwrap();
/// assert_eq!(peaks.len(), 2);
/// assert_eq!(peaks[0].frequency, 50.0);
/// assert_eq!(peaks[1].frequency, 200.0);
/// ```
pub fn find_peaks(data: &[f64], sample_rate: f64, threshold: f64) -> Result<Vec<SpectralPeak>> {
    let kernel = SpectralPeaksKernel::try_new(SpectralPeaksConfig {
        sample_rate,
        threshold,
        window: WindowType::Hanning,
    })?;
    Ok(kernel.run(data)?)
}

/// Spectrogram of `data` in `window_size` segments overlapping by `overlap`.
///
/// ```
/// use sig_rs::signal::spectral::spectrogram;
///
/// let x: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.3).sin()).collect();
/// let s = spectrogram(&x, 1000.0, 256, 0.5).unwrap();
/// assert_eq!(s.time_axis.len(), 7);
/// assert_eq!(s.power_matrix[0].len(), 128);
/// assert_eq!(s.frequency_axis.len(), 128);
/// ```
pub fn spectrogram(
    data: &[f64],
    sample_rate: f64,
    window_size: usize,
    overlap: f64,
) -> Result<SpectrogramResult> {
    let kernel = SpectrogramKernel::try_new(SpectrogramConfig {
        sample_rate,
        window_size,
        overlap,
    })?;
    Ok(kernel.run(data)?)
}

/// Total harmonic distortion in percent.
///
/// `100 * sqrt(Σ |H_k|²) / |H_1|` over harmonics `2..=harmonics` of
/// `fundamental` that lie below Nyquist, taken from the Hanning-tapered
/// magnitude spectrum. Each harmonic is the largest bin within one bin of its
/// nominal frequency. A silent fundamental yields `0.0`.
///
/// ```
/// use sig_rs::signal::spectral::thd;
/// use sig_rs::signal::wave::{composite, sine, SignalConfig};
///
/// let base = SignalConfig::new(4096.0, 1.0);
/// let clean = sine(base.with_frequency(64.0)).unwrap();
/// assert!(thd(&clean, 4096.0, 64.0, 5).unwrap() < 0.1);
///
/// let distorted = composite(&[
///     clean.clone(),
///     sine(base.with_frequency(192.0).with_amplitude(0.1)).unwrap(),
/// ]);
/// let pct = thd(&distorted, 4096.0, 64.0, 5).unwrap();
/// assert!((pct - 10.0).abs() < 0.5);
/// ```
pub fn thd(data: &[f64], sample_rate: f64, fundamental: f64, harmonics: usize) -> Result<f64> {
    ensure_positive("fundamental", fundamental)?;
    if fundamental >= sample_rate / 2.0 {
        return Err(crate::Error::invalid_arg(
            "fundamental",
            "fundamental must lie below the Nyquist frequency",
        ));
    }
    if harmonics < 2 {
        return Err(crate::Error::invalid_arg(
            "harmonics",
            "at least the second harmonic is required",
        ));
    }

    let spectrum = power_spectral_density(data, sample_rate, WindowType::Hanning)?;
    let mags = &spectrum.magnitudes;
    let bin_peak = |freq: f64| -> Option<f64> {
        let centre = (freq / spectrum.frequency_resolution).round() as usize;
        if centre >= mags.len() {
            return None;
        }
        let lo = centre.saturating_sub(1);
        let hi = (centre + 1).min(mags.len() - 1);
        mags[lo..=hi].iter().copied().reduce(f64::max)
    };

    let Some(h1) = bin_peak(fundamental).filter(|m| *m > 0.0) else {
        trace!(fundamental, "fundamental bin is silent, THD defined as 0");
        return Ok(0.0);
    };
    let harmonic_power: f64 = (2..=harmonics)
        .map_while(|k| bin_peak(fundamental * k as f64))
        .map(|m| m * m)
        .sum();
    Ok(100.0 * harmonic_power.sqrt() / h1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ExecInvariantViolation;
    use approx::assert_relative_eq;
    use core::f64::consts::PI;

    fn tone(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn psd_zero_pads_to_power_of_two() {
        let psd = power_spectral_density(&tone(10.0, 100.0, 100), 100.0, WindowType::Hanning)
            .expect("psd");
        assert_eq!(psd.len(), 64);
        assert_eq!(psd.frequencies.len(), 64);
        assert_eq!(psd.phases.len(), 64);
        assert_relative_eq!(psd.frequencies[1], 100.0 / 128.0);
        psd.magnitudes
            .iter()
            .zip(psd.power_spectrum.iter())
            .for_each(|(m, p)| assert_relative_eq!(m * m, *p));
    }

    #[test]
    fn psd_rejects_empty_input_and_bad_rate() {
        let kernel = PsdKernel::try_new(PsdConfig {
            sample_rate: 1000.0,
            window: WindowType::Hanning,
        })
        .expect("kernel");
        let empty: [f64; 0] = [];
        assert_eq!(
            kernel.run(&empty).expect_err("empty"),
            ExecInvariantViolation::Config(ConfigError::EmptyInput { arg: "data" })
        );
        assert!(power_spectral_density(&[1.0], -1.0, WindowType::Hanning).is_err());
    }

    #[test]
    fn peaks_are_sorted_by_magnitude() {
        let fs = 512.0;
        let x: Vec<f64> = tone(40.0, fs, 512)
            .iter()
            .zip(tone(100.0, fs, 512).iter())
            .map(|(a, b)| 0.3 * a + b)
            .collect();
        let peaks = find_peaks(&x, fs, 0.1).expect("peaks");
        assert_eq!(peaks.len(), 2);
        assert_relative_eq!(peaks[0].frequency, 100.0);
        assert_relative_eq!(peaks[1].frequency, 40.0);
        assert!(peaks[0].magnitude > peaks[1].magnitude);
    }

    #[test]
    fn short_signal_gives_single_zero_padded_segment() {
        let s = spectrogram(&[1.0; 100], 1000.0, 256, 0.5).expect("spectrogram");
        assert_eq!(s.time_axis, vec![0.0]);
        assert_eq!(s.power_matrix.len(), 1);
        assert_eq!(s.power_matrix[0].len(), 128);
    }

    #[test]
    fn spectrogram_covers_the_tail() {
        let kernel = SpectrogramKernel::try_new(SpectrogramConfig {
            sample_rate: 100.0,
            window_size: 64,
            overlap: 0.75,
        })
        .expect("kernel");
        assert_eq!(kernel.hop(), 16);
        // Starts at 0, 16, ..., 80; the segment at 80 reaches sample 143 > 129.
        assert_eq!(kernel.segment_count(130), 6);
        let s = kernel.run(&vec![0.5; 130]).expect("run");
        assert_eq!(s.time_axis.len(), 6);
        assert_relative_eq!(s.time_axis[5], 0.8);
    }

    #[test]
    fn spectrogram_tracks_a_frequency_step() {
        let fs = 1024.0;
        let mut x = tone(64.0, fs, 1024);
        x.extend(tone(256.0, fs, 1024));
        let s = spectrogram(&x, fs, 256, 0.0).expect("spectrogram");
        let argmax = |row: &Vec<f64>| {
            row.iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(k, _)| s.frequency_axis[k])
                .expect("row")
        };
        assert_relative_eq!(argmax(&s.power_matrix[0]), 64.0);
        assert_relative_eq!(argmax(&s.power_matrix[7]), 256.0);
    }

    #[test]
    fn spectrogram_rejects_full_overlap() {
        for overlap in [1.0, -0.1, 0.999] {
            assert!(spectrogram(&[0.0; 512], 100.0, 256, overlap).is_err());
        }
    }

    #[test]
    fn thd_ignores_harmonics_above_nyquist() {
        let fs = 1024.0;
        let x = tone(200.0, fs, 1024);
        // Third harmonic at 600 Hz is above Nyquist; only the 400 Hz bin is examined.
        let pct = thd(&x, fs, 200.0, 5).expect("thd");
        assert!(pct < 0.1);
        assert!(thd(&x, fs, 600.0, 5).is_err());
        assert!(thd(&x, fs, 200.0, 1).is_err());
    }
}
