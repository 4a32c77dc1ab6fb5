use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sig_rs::kernel::KernelLifecycle;
use sig_rs::signal::fft::{fft, FftConfig, FftDirection, Radix2Fft};
use sig_rs::signal::filter::{
    lowpass, savgol_coeffs, savitzky_golay, DigitalFilter, FilterConfig, FilterType,
    SmoothingConfig, SmoothingKernel, SmoothingMethod,
};
use sig_rs::signal::spectral::{power_spectral_density, PsdConfig, PsdKernel};
use sig_rs::signal::traits::{Generate1D, PowerSpectrum1D, Smooth1D, StreamFilter1D, Transform1D};
use sig_rs::signal::wave::{
    chirp, pulse, sawtooth, ChirpConfig, ChirpKernel, ChirpMethod, SignalConfig, WaveShape,
    WaveformConfig, WaveformKernel,
};
use sig_rs::signal::windows::{get_window, WindowConfig, WindowKernel, WindowType};
use sig_rs::stats::{basic_statistics, linear_regression, StatisticsResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const DEFAULT_PYTHON_BIN: &str = "python3";

/// Worst absolute error tolerated before a case is reported as failing.
const MAX_ABS_TOLERANCE: f64 = 1e-8;

const PY_SIGNAL_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import scipy
import scipy.ndimage
import scipy.signal

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _as_array(key):
    return np.asarray(p[key], dtype=float)

def _flat(v):
    return np.asarray(v, dtype=float).reshape(-1)

def _time_axis():
    n = int(round(float(p["fs"]) * float(p["duration"])))
    return np.arange(n) / float(p["fs"])

def _compute():
    if op == "fft":
        spectrum = np.fft.fft(_as_array("x"))
        return np.column_stack([spectrum.real, spectrum.imag])
    if op == "psd_magnitude":
        x = _as_array("x")
        n = 1 << int(np.ceil(np.log2(len(x))))
        return np.abs(np.fft.fft(x, n))[: n // 2]
    if op == "window":
        n = int(p["len"])
        name = p["name"]
        if name == "hanning":
            return np.hanning(n)
        if name == "hamming":
            return np.hamming(n)
        if name == "blackman":
            return np.blackman(n)
        if name == "kaiser":
            return np.kaiser(n, float(p["beta"]))
        raise RuntimeError(f"unsupported window: {name}")
    if op == "pulse":
        t = _time_axis()
        return scipy.signal.square(2 * np.pi * float(p["f"]) * t, duty=float(p["duty"]))
    if op == "sawtooth":
        t = _time_axis()
        return scipy.signal.sawtooth(2 * np.pi * float(p["f"]) * t, width=1.0)
    if op == "chirp":
        t = _time_axis()
        return scipy.signal.chirp(
            t,
            f0=float(p["f0"]),
            t1=float(p["duration"]),
            f1=float(p["f1"]),
            method=p["method"],
            phi=-90.0,
        )
    if op == "lfilter":
        return scipy.signal.lfilter(_as_array("b"), _as_array("a"), _as_array("x"))
    if op == "freqz":
        _, h = scipy.signal.freqz(_as_array("b"), _as_array("a"), worN=_as_array("freqs"), fs=float(p["fs"]))
        return np.concatenate([np.abs(h), np.angle(h)])
    if op == "savgol_coeffs":
        return scipy.signal.savgol_coeffs(int(p["window"]), int(p["polyorder"]))
    if op == "savgol_filter":
        return scipy.signal.savgol_filter(
            _as_array("x"), int(p["window"]), int(p["polyorder"]), mode="nearest"
        )
    if op == "gaussian_filter":
        return scipy.ndimage.gaussian_filter1d(
            _as_array("x"), float(p["sigma"]), mode="nearest", truncate=3.0
        )
    if op == "describe":
        x = _as_array("x")
        return [
            np.mean(x),
            np.median(x),
            np.var(x),
            np.std(x),
            np.min(x),
            np.max(x),
            np.percentile(x, 25),
            np.percentile(x, 75),
            np.percentile(x, 90),
            np.percentile(x, 99),
        ]
    if op == "linear_regression":
        x = _as_array("x")
        y = _as_array("y")
        slope, intercept = np.polyfit(x, y, 1)
        return [slope, intercept, np.corrcoef(x, y)[0, 1]]

    raise RuntimeError(f"unsupported op: {op}")

y = _flat(_compute())

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__,
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    passed: bool,
    rust_kernel_ns: f64,
    rust_convenience_ns: f64,
    python_ns: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    tolerance: f64,
    rows: Vec<ContractRow>,
}

/// Shared state of one contracts run.
struct ContractRun {
    python_bin: PathBuf,
    rows: Vec<ContractRow>,
    versions: Option<PythonEval>,
}

/// One parity case: a kernel path, the matching convenience function and
/// the Python op that should agree with both.
struct Case<'a> {
    id: &'a str,
    op: &'a str,
    payload: serde_json::Value,
    iters: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- contracts");
            eprintln!();
            eprintln!("Environment:");
            eprintln!("  SIG_RS_PYTHON  interpreter with numpy and scipy (default: {DEFAULT_PYTHON_BIN})");
            eprintln!("  RUST_LOG       tracing filter (default: info)");
            Ok(())
        }
    }
}

impl ContractRun {
    fn case<K, C>(&mut self, case: Case<'_>, mut kernel: K, mut convenience: C) -> Result<()>
    where
        K: FnMut() -> Result<Vec<f64>>,
        C: FnMut() -> Result<Vec<f64>>,
    {
        let candidate = kernel().with_context(|| format!("case {} kernel path", case.id))?;
        let baseline = convenience().with_context(|| format!("case {} convenience path", case.id))?;
        ensure_same_length(case.id, &candidate, &baseline)?;
        if max_abs_error(&candidate, &baseline) != 0.0 {
            bail!("case {} kernel and convenience paths disagree", case.id);
        }

        let py = python_signal_eval(&self.python_bin, case.op, case.payload, case.iters)?;
        ensure_same_length(case.id, &candidate, &py.output)?;

        let kernel_ns = benchmark_avg_ns(case.iters, || kernel().map(|_| ()))?;
        let convenience_ns = benchmark_avg_ns(case.iters, || convenience().map(|_| ()))?;

        let row = build_row(case.id, &candidate, &py, kernel_ns, convenience_ns);
        if row.passed {
            info!(case = case.id, max_abs = row.max_abs, "contract holds");
        } else {
            warn!(case = case.id, max_abs = row.max_abs, "contract violated");
        }
        self.versions.get_or_insert(py);
        self.rows.push(row);
        Ok(())
    }
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directory")?;

    let mut run = ContractRun {
        python_bin: detect_python_bin(),
        rows: Vec::new(),
        versions: None,
    };
    debug!(python = %run.python_bin.display(), "using python interpreter");

    // Shared synthetic input for the 1D cases.
    let signal: Vec<f64> = (0..512)
        .map(|i| {
            let x = i as f64 / 27.0;
            x.sin() + 0.35 * (2.3 * x).cos() + 0.1 * (7.0 * x).sin()
        })
        .collect();

    // Spectral
    {
        let plan = Radix2Fft::try_new(FftConfig {
            len: signal.len(),
            direction: FftDirection::Forward,
        })?;
        let interleave = |spectrum: Vec<sig_rs::signal::fft::Complex64>| -> Vec<f64> {
            spectrum.iter().flat_map(|c| [c.re, c.im]).collect()
        };
        run.case(
            Case {
                id: "fft_forward_512",
                op: "fft",
                payload: json!({ "x": signal }),
                iters: 200,
            },
            || Ok(interleave(plan.run_alloc(signal.as_slice()).map_err(|e| anyhow!("{e}"))?)),
            || Ok(interleave(fft(&signal)?)),
        )?;

        let odd: Vec<f64> = signal.iter().copied().take(300).collect();
        let psd = PsdKernel::try_new(PsdConfig {
            sample_rate: 1000.0,
            window: WindowType::Rectangular,
        })?;
        run.case(
            Case {
                id: "psd_magnitude_padded_300",
                op: "psd_magnitude",
                payload: json!({ "x": odd }),
                iters: 200,
            },
            || {
                Ok(psd
                    .run(odd.as_slice())
                    .map_err(|e| anyhow!("{e}"))?
                    .magnitudes)
            },
            || Ok(power_spectral_density(&odd, 1000.0, WindowType::Rectangular)?.magnitudes),
        )?;
    }

    // Windows
    for (name, window) in [
        ("hanning", WindowType::Hanning),
        ("hamming", WindowType::Hamming),
        ("blackman", WindowType::Blackman),
        ("kaiser", WindowType::KAISER),
    ] {
        let len = 129;
        let beta = match window {
            WindowType::Kaiser { beta } => beta,
            _ => 0.0,
        };
        let kernel = WindowKernel::try_new(WindowConfig { window, len })?;
        let id = format!("window_{name}_{len}");
        run.case(
            Case {
                id: &id,
                op: "window",
                payload: json!({ "name": name, "len": len, "beta": beta }),
                iters: 500,
            },
            || kernel.run_alloc().map_err(|e| anyhow!("{e}")),
            || Ok(get_window(window, len)),
        )?;
    }

    // Waveforms
    {
        let (fs, duration, f) = (1000.0, 0.5, 7.0);
        let config = SignalConfig::new(fs, duration).with_frequency(f);

        let duty = 0.3;
        let kernel = WaveformKernel::try_new(WaveformConfig {
            signal: config,
            shape: WaveShape::Pulse { duty_cycle: duty },
        })?;
        run.case(
            Case {
                id: "pulse_duty_0_3",
                op: "pulse",
                payload: json!({ "fs": fs, "duration": duration, "f": f, "duty": duty }),
                iters: 200,
            },
            || kernel.run_alloc().map_err(|e| anyhow!("{e}")),
            || Ok(pulse(config, duty)?),
        )?;

        let kernel = WaveformKernel::try_new(WaveformConfig {
            signal: config,
            shape: WaveShape::Sawtooth,
        })?;
        run.case(
            Case {
                id: "sawtooth",
                op: "sawtooth",
                payload: json!({ "fs": fs, "duration": duration, "f": f }),
                iters: 200,
            },
            || kernel.run_alloc().map_err(|e| anyhow!("{e}")),
            || Ok(sawtooth(config)?),
        )?;

        for (method, name) in [
            (ChirpMethod::Linear, "linear"),
            (ChirpMethod::Logarithmic, "logarithmic"),
        ] {
            let chirp_config = ChirpConfig {
                signal: SignalConfig::new(fs, duration),
                start_frequency: 5.0,
                end_frequency: 120.0,
                method,
            };
            let kernel = ChirpKernel::try_new(chirp_config)?;
            let id = format!("chirp_{name}");
            run.case(
                Case {
                    id: &id,
                    op: "chirp",
                    payload: json!({
                        "fs": fs,
                        "duration": duration,
                        "f0": 5.0,
                        "f1": 120.0,
                        "method": name,
                    }),
                    iters: 200,
                },
                || kernel.run_alloc().map_err(|e| anyhow!("{e}")),
                || Ok(chirp(chirp_config)?),
            )?;
        }
    }

    // IIR filtering
    {
        let config = FilterConfig::new(FilterType::Lowpass, 50.0, 1000.0).with_order(2);
        let designed = DigitalFilter::try_new(config)?;
        let b = designed.coefficients().b.clone();
        let a = designed.coefficients().a.clone();

        let mut kernel = designed.clone();
        let mut convenience = lowpass(50.0, 1000.0)?;
        run.case(
            Case {
                id: "lfilter_lowpass_biquad",
                op: "lfilter",
                payload: json!({ "b": b, "a": a, "x": signal }),
                iters: 200,
            },
            || {
                kernel.reset();
                kernel.run_alloc(signal.as_slice()).map_err(|e| anyhow!("{e}"))
            },
            || {
                convenience.reset();
                Ok(convenience.process_data(&signal))
            },
        )?;

        let freqs: Vec<f64> = (1..200).map(|k| k as f64 * 2.5).collect();
        let flatten = |r: sig_rs::signal::filter::FilterResponse| -> Vec<f64> {
            r.magnitudes.into_iter().chain(r.phases).collect()
        };
        run.case(
            Case {
                id: "freqz_lowpass_biquad",
                op: "freqz",
                payload: json!({ "b": b, "a": a, "freqs": freqs, "fs": 1000.0 }),
                iters: 200,
            },
            || Ok(flatten(designed.frequency_response(&freqs))),
            || Ok(flatten(lowpass(50.0, 1000.0)?.frequency_response(&freqs))),
        )?;
    }

    // Smoothing
    {
        let (window, polyorder) = (11, 3);
        run.case(
            Case {
                id: "savgol_coeffs_11_3",
                op: "savgol_coeffs",
                payload: json!({ "window": window, "polyorder": polyorder }),
                iters: 500,
            },
            || {
                let kernel = SmoothingKernel::try_new(SmoothingConfig {
                    method: SmoothingMethod::SavitzkyGolay { window, polyorder },
                })?;
                Ok(kernel.taps().to_vec())
            },
            || Ok(savgol_coeffs(window, polyorder)?),
        )?;

        let kernel = SmoothingKernel::try_new(SmoothingConfig {
            method: SmoothingMethod::SavitzkyGolay { window, polyorder },
        })?;
        run.case(
            Case {
                id: "savgol_filter_nearest_11_3",
                op: "savgol_filter",
                payload: json!({ "x": signal, "window": window, "polyorder": polyorder }),
                iters: 200,
            },
            || kernel.run_alloc(signal.as_slice()).map_err(|e| anyhow!("{e}")),
            || Ok(savitzky_golay(&signal, window, polyorder)?),
        )?;

        let sigma = 2.0;
        let kernel = SmoothingKernel::try_new(SmoothingConfig {
            method: SmoothingMethod::Gaussian { sigma, size: None },
        })?;
        run.case(
            Case {
                id: "gaussian_filter_sigma_2",
                op: "gaussian_filter",
                payload: json!({ "x": signal, "sigma": sigma }),
                iters: 200,
            },
            || kernel.run_alloc(signal.as_slice()).map_err(|e| anyhow!("{e}")),
            || Ok(sig_rs::signal::filter::gaussian_filter(&signal, sigma, None)?),
        )?;
    }

    // Statistics
    {
        let describe = |s: StatisticsResult| -> Vec<f64> {
            vec![
                s.mean,
                s.median,
                s.variance,
                s.standard_deviation,
                s.min,
                s.max,
                s.percentiles.p25,
                s.percentiles.p75,
                s.percentiles.p90,
                s.percentiles.p99,
            ]
        };
        let kernel = sig_rs::stats::SummaryKernel::try_new(sig_rs::stats::StatsConfig)?;
        run.case(
            Case {
                id: "describe_512",
                op: "describe",
                payload: json!({ "x": signal }),
                iters: 200,
            },
            || {
                use sig_rs::stats::Describe1D;
                Ok(describe(kernel.run(signal.as_slice()).map_err(|e| anyhow!("{e}"))?))
            },
            || Ok(describe(basic_statistics(&signal)?)),
        )?;

        let x: Vec<f64> = (0..signal.len()).map(|i| i as f64 / 10.0).collect();
        let y: Vec<f64> = x.iter().zip(signal.iter()).map(|(x, s)| 0.8 * x - 2.0 + s).collect();
        let fit = || -> Result<Vec<f64>> {
            let r = linear_regression(&x, &y)?;
            Ok(vec![r.slope, r.intercept, r.correlation])
        };
        run.case(
            Case {
                id: "linear_regression_512",
                op: "linear_regression",
                payload: json!({ "x": x, "y": y }),
                iters: 200,
            },
            fit,
            fit,
        )?;
    }

    let versions = run
        .versions
        .take()
        .ok_or_else(|| anyhow!("no contract cases were evaluated"))?;
    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: run.python_bin.to_string_lossy().into_owned(),
        python_version: versions.python_version,
        numpy_version: versions.numpy_version,
        scipy_version: versions.scipy_version.unwrap_or_default(),
        tolerance: MAX_ABS_TOLERANCE,
        rows: run.rows,
    };

    let summary_json = out_dir.join("summary.json");
    fs::write(
        &summary_json,
        serde_json::to_vec_pretty(&bundle).context("serializing contract bundle")?,
    )
    .with_context(|| format!("writing {}", summary_json.display()))?;
    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;

    let failed: Vec<&str> = bundle
        .rows
        .iter()
        .filter(|row| !row.passed)
        .map(|row| row.case_id.as_str())
        .collect();
    info!(
        cases = bundle.rows.len(),
        failed = failed.len(),
        summary = %summary_json.display(),
        "contracts finished"
    );
    if !failed.is_empty() {
        bail!("contracts violated: {}", failed.join(", "));
    }
    Ok(())
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("SIG_RS_PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_signal_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_SIGNAL_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    serde_json::from_str(stdout.trim()).context("parsing python json")
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters.max(1) as f64)
}

fn build_row(
    case_id: &str,
    candidate: &[f64],
    py: &PythonEval,
    kernel_ns: f64,
    convenience_ns: f64,
) -> ContractRow {
    let max_abs = max_abs_error(candidate, &py.output);
    ContractRow {
        case_id: case_id.to_string(),
        pearson_r: pearson(candidate, &py.output),
        mae: mean_abs_error(candidate, &py.output),
        rmse: root_mean_squared_error(candidate, &py.output),
        max_abs,
        passed: max_abs <= MAX_ABS_TOLERANCE,
        rust_kernel_ns: kernel_ns,
        rust_convenience_ns: convenience_ns,
        python_ns: py.avg_ns,
        speedup_vs_python: py.avg_ns / kernel_ns,
    }
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    // Degenerate inputs keep the report readable instead of emitting NaN.
    match sig_rs::stats::correlation(a, b) {
        Ok(r) if r.is_finite() => r,
        _ if a == b => 1.0,
        _ => 0.0,
    }
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,pearson_r,mae,rmse,max_abs,passed,rust_kernel_ns,rust_convenience_ns,python_ns,speedup_vs_python\n");
    for row in rows {
        out.push_str(&format!(
            "{},{:.12},{:.12},{:.12},{:.12},{},{:.3},{:.3},{:.3},{:.6}\n",
            row.case_id,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.passed,
            row.rust_kernel_ns,
            row.rust_convenience_ns,
            row.python_ns,
            row.speedup_vs_python
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
