//! Bilinear-transform Butterworth design for first and second order sections.

use crate::kernel::{ensure_positive, ConfigError};
use core::f64::consts::{PI, SQRT_2};
use tracing::debug;

/// Response family of a designed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterType {
    /// Pass below the cutoff.
    #[default]
    Lowpass,
    /// Pass above the cutoff.
    Highpass,
    /// Pass between the two cutoffs.
    Bandpass,
    /// Reject between the two cutoffs.
    Bandstop,
}

impl FilterType {
    /// True for the two-cutoff families.
    pub fn is_band(self) -> bool {
        matches!(self, FilterType::Bandpass | FilterType::Bandstop)
    }
}

/// Filter parameters consumed by [`IirCoefficients::design`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Response family.
    pub filter_type: FilterType,
    /// Cutoff in Hz, or one band edge for band filters.
    pub cutoff_frequency: f64,
    /// Other band edge in Hz. Required for band filters, ignored otherwise.
    pub cutoff_frequency2: Option<f64>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Prototype order, 1 or 2. Band filters are always a single biquad and require 2.
    pub order: usize,
}

impl FilterConfig {
    /// Second-order single-cutoff filter.
    pub fn new(filter_type: FilterType, cutoff_frequency: f64, sample_rate: f64) -> Self {
        Self {
            filter_type,
            cutoff_frequency,
            cutoff_frequency2: None,
            sample_rate,
            order: 2,
        }
    }

    /// Second-order band filter between `low` and `high`.
    pub fn band(filter_type: FilterType, low: f64, high: f64, sample_rate: f64) -> Self {
        Self {
            filter_type,
            cutoff_frequency: low,
            cutoff_frequency2: Some(high),
            sample_rate,
            order: 2,
        }
    }

    /// Set the prototype order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

/// Transfer function `B(z) / A(z)` with `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IirCoefficients {
    /// Feed-forward coefficients.
    pub b: Vec<f64>,
    /// Feedback coefficients.
    pub a: Vec<f64>,
}

fn ensure_cutoff(arg: &'static str, f: f64, nyquist: f64) -> Result<(), ConfigError> {
    if !f.is_finite() || f <= 0.0 || f >= nyquist {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "cutoff must lie strictly between 0 and sample_rate / 2",
        });
    }
    Ok(())
}

/// Prewarped analog frequency for a cutoff normalized to Nyquist.
fn prewarp(normalized: f64) -> f64 {
    (PI * normalized / 2.0).tan()
}

impl IirCoefficients {
    /// Validate `config` and compute its coefficients.
    ///
    /// ```
    /// use approx::assert_relative_eq;
    /// use sig_rs::signal::filter::{FilterConfig, FilterType, IirCoefficients};
    ///
    /// let c = IirCoefficients::design(&FilterConfig::new(FilterType::Lowpass, 10.0, 100.0)).unwrap();
    /// assert_eq!(c.a[0], 1.0);
    /// // unity gain at DC
    /// assert_relative_eq!(c.b.iter().sum::<f64>() / c.a.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    /// ```
    pub fn design(config: &FilterConfig) -> Result<Self, ConfigError> {
        ensure_positive("sample_rate", config.sample_rate)?;
        let nyquist = config.sample_rate / 2.0;
        ensure_cutoff("cutoff_frequency", config.cutoff_frequency, nyquist)?;
        if !(1..=2).contains(&config.order) {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "only first and second order prototypes are supported",
            });
        }

        let coeffs = if config.filter_type.is_band() {
            let f2 = config.cutoff_frequency2.ok_or(ConfigError::MissingArgument {
                arg: "cutoff_frequency2",
            })?;
            ensure_cutoff("cutoff_frequency2", f2, nyquist)?;
            if f2 == config.cutoff_frequency {
                return Err(ConfigError::InvalidArgument {
                    arg: "cutoff_frequency2",
                    reason: "band edges must differ",
                });
            }
            if config.order != 2 {
                return Err(ConfigError::InvalidArgument {
                    arg: "order",
                    reason: "band filters are second order",
                });
            }
            let (lo, hi) = if config.cutoff_frequency < f2 {
                (config.cutoff_frequency, f2)
            } else {
                (f2, config.cutoff_frequency)
            };
            Self::band(config.filter_type, lo / nyquist, hi / nyquist)
        } else {
            let k = prewarp(config.cutoff_frequency / nyquist);
            match (config.filter_type, config.order) {
                (FilterType::Lowpass, 1) => Self::first_order(k, [k, k]),
                (_, 1) => Self::first_order(k, [1.0, -1.0]),
                (filter_type, _) => Self::second_order(filter_type, k),
            }
        };
        debug!(
            filter_type = ?config.filter_type,
            order = config.order,
            b = ?coeffs.b,
            a = ?coeffs.a,
            "designed IIR section"
        );
        Ok(coeffs)
    }

    fn first_order(k: f64, numerator: [f64; 2]) -> Self {
        let norm = 1.0 + k;
        Self {
            b: numerator.iter().map(|v| v / norm).collect(),
            a: vec![1.0, (k - 1.0) / norm],
        }
    }

    fn second_order(filter_type: FilterType, k: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 + SQRT_2 * k + k2;
        let b = match filter_type {
            FilterType::Highpass => vec![1.0 / norm, -2.0 / norm, 1.0 / norm],
            _ => vec![k2 / norm, 2.0 * k2 / norm, k2 / norm],
        };
        Self {
            b,
            a: vec![1.0, 2.0 * (k2 - 1.0) / norm, (1.0 - SQRT_2 * k + k2) / norm],
        }
    }

    /// Band biquad from edges normalized to Nyquist, `lo < hi`.
    fn band(filter_type: FilterType, lo: f64, hi: f64) -> Self {
        let wc = prewarp((lo * hi).sqrt());
        let bw = prewarp(hi - lo);
        let wc2 = wc * wc;
        let norm = 1.0 + bw + wc2;
        let b = match filter_type {
            FilterType::Bandstop => vec![
                (1.0 + wc2) / norm,
                2.0 * (wc2 - 1.0) / norm,
                (1.0 + wc2) / norm,
            ],
            _ => vec![bw / norm, 0.0, -bw / norm],
        };
        Self {
            b,
            a: vec![1.0, 2.0 * (wc2 - 1.0) / norm, (1.0 - bw + wc2) / norm],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn second_order_lowpass_matches_reference() {
        let c = IirCoefficients::design(&FilterConfig::new(FilterType::Lowpass, 10.0, 100.0))
            .expect("design");
        let b = [0.0674552738890719, 0.1349105477781438, 0.0674552738890719];
        let a = [1.0, -1.1429805025399011, 0.4128015980961886];
        c.b.iter()
            .zip(b.iter())
            .for_each(|(x, y)| assert_relative_eq!(x, y, epsilon = 1e-12));
        c.a.iter()
            .zip(a.iter())
            .for_each(|(x, y)| assert_relative_eq!(x, y, epsilon = 1e-12));
    }

    #[test]
    fn band_edges_are_sorted() {
        let forward =
            IirCoefficients::design(&FilterConfig::band(FilterType::Bandpass, 40.0, 60.0, 1000.0))
                .expect("design");
        let reversed =
            IirCoefficients::design(&FilterConfig::band(FilterType::Bandpass, 60.0, 40.0, 1000.0))
                .expect("design");
        assert_eq!(forward, reversed);
        assert_relative_eq!(forward.b[0], 0.05788019828256558, epsilon = 1e-12);
        assert_eq!(forward.b[1], 0.0);
        assert_relative_eq!(forward.a[2], 0.8842396034348688, epsilon = 1e-12);
    }

    #[test]
    fn band_filter_without_second_cutoff_fails() {
        let mut config = FilterConfig::new(FilterType::Bandstop, 40.0, 1000.0);
        assert_eq!(
            IirCoefficients::design(&config).expect_err("missing edge"),
            ConfigError::MissingArgument {
                arg: "cutoff_frequency2"
            }
        );
        config.cutoff_frequency2 = Some(40.0);
        assert!(matches!(
            IirCoefficients::design(&config),
            Err(ConfigError::InvalidArgument {
                arg: "cutoff_frequency2",
                ..
            })
        ));
    }

    #[test]
    fn cutoffs_outside_nyquist_are_rejected() {
        for fc in [0.0, -5.0, 50.0, 75.0, f64::NAN] {
            let err = IirCoefficients::design(&FilterConfig::new(FilterType::Highpass, fc, 100.0))
                .expect_err("bad cutoff");
            assert!(matches!(
                err,
                ConfigError::InvalidArgument {
                    arg: "cutoff_frequency",
                    ..
                }
            ));
        }
    }

    #[test]
    fn unsupported_orders_are_rejected() {
        for order in [0, 3, 8] {
            let config = FilterConfig::new(FilterType::Lowpass, 10.0, 100.0).with_order(order);
            assert!(matches!(
                IirCoefficients::design(&config),
                Err(ConfigError::InvalidArgument { arg: "order", .. })
            ));
        }
        let band = FilterConfig::band(FilterType::Bandpass, 10.0, 20.0, 100.0).with_order(1);
        assert!(IirCoefficients::design(&band).is_err());
    }

    #[test]
    fn first_order_sections_are_normalized() {
        let lp = IirCoefficients::design(
            &FilterConfig::new(FilterType::Lowpass, 10.0, 100.0).with_order(1),
        )
        .expect("lowpass");
        let hp = IirCoefficients::design(
            &FilterConfig::new(FilterType::Highpass, 10.0, 100.0).with_order(1),
        )
        .expect("highpass");
        assert_eq!(lp.a.len(), 2);
        assert_eq!(lp.a[0], 1.0);
        assert_eq!(lp.a, hp.a);
        assert_relative_eq!(lp.b.iter().sum::<f64>(), 1.0 + lp.a[1], epsilon = 1e-12);
        assert_relative_eq!(hp.b.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_survives_json() {
        let config = FilterConfig::band(FilterType::Bandstop, 45.0, 55.0, 1000.0);
        let text = serde_json::to_string(&config).expect("serialize");
        let back: FilterConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, config);
        assert_eq!(
            IirCoefficients::design(&back).expect("design"),
            IirCoefficients::design(&config).expect("design")
        );
    }
}
