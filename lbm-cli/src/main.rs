mod sink;

use anyhow::{Context, bail};
use clap::Parser;
use lbm_core::{Comparison, ErrorSummary, LbmSolver, Parameters};
use serde::Serialize;
use sink::{CsvSink, PngPlot, ProfileSink};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "1D heat conduction with a D1Q2 lattice Boltzmann solver")]
struct Args {
    /// Number of lattice points
    #[arg(long, default_value_t = 101)]
    nx: usize,

    /// Number of iterations (guideline: nx^2 / alpha to reach steady state)
    #[arg(long, default_value_t = 10_000)]
    nt: usize,

    /// Thermal diffusivity in lattice units (tau = 0.5 + alpha)
    #[arg(long, default_value_t = 0.25)]
    alpha: f64,

    /// Fixed temperature at x = 0
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    t_left: f64,

    /// Fixed temperature at x = 1
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    t_right: f64,

    /// JSON parameter file; replaces the parameter flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a PNG plot of simulated vs analytical profiles
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Write the profiles as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON run record (parameters, errors, profile)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Exit with an error if the max absolute error exceeds this value
    #[arg(long)]
    max_error: Option<f64>,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn parameters(&self) -> anyhow::Result<Parameters> {
        match &self.config {
            Some(path) => load_parameters(path),
            None => Ok(Parameters::new(
                self.nx,
                self.nt,
                self.alpha,
                self.t_left,
                self.t_right,
            )),
        }
    }
}

#[derive(Serialize)]
struct RunRecord<'a> {
    params: &'a Parameters,
    tau: f64,
    recommended_nt: usize,
    steps: usize,
    summary: ErrorSummary,
    profile: &'a Comparison,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let params = args.parameters()?;
    let solver = LbmSolver::new(params).context("invalid solver parameters")?;
    info!(
        nx = params.nx,
        nt = params.nt,
        tau = solver.tau(),
        "running D1Q2 heat conduction"
    );

    let solution = solver.run();
    let comparison = solution.compare()?;

    println!("{}", comparison.summary);

    if let Some(path) = &args.plot {
        PngPlot::new(path).write(&comparison)?;
        info!(path = %path.display(), "wrote plot");
    }
    if let Some(path) = &args.csv {
        CsvSink::new(path).write(&comparison)?;
        info!(path = %path.display(), "wrote csv");
    }
    if let Some(path) = &args.json {
        let record = RunRecord {
            params: solution.params(),
            tau: params.tau(),
            recommended_nt: params.recommended_iterations(),
            steps: solution.steps(),
            summary: comparison.summary,
            profile: &comparison,
        };
        write_json(path, &record)?;
        info!(path = %path.display(), "wrote run record");
    }

    if let Some(tol) = args.max_error {
        if comparison.summary.max_abs_error > tol {
            bail!(
                "max absolute error {} exceeds tolerance {}",
                comparison.summary.max_abs_error,
                tol
            );
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_parameters(path: &Path) -> anyhow::Result<Parameters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let params: Parameters = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(path = %path.display(), "loaded parameters");
    Ok(params)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    sink::ensure_parent(path)?;
    let mut w = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut w, value)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let args = Args::try_parse_from(["lbm-cli"]).unwrap();
        assert_eq!(args.parameters().unwrap(), Parameters::default());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn flags_override_parameters() {
        let args = Args::try_parse_from([
            "lbm-cli", "--nx", "21", "--nt", "500", "--alpha", "0.5", "--t-left", "-5",
            "--t-right", "12.5", "-vv",
        ])
        .unwrap();
        let p = args.parameters().unwrap();
        assert_eq!(p, Parameters::new(21, 500, 0.5, -5.0, 12.5));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn config_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(&path, r#"{ "nx": 33, "alpha": 0.5 }"#).unwrap();
        let args =
            Args::try_parse_from(["lbm-cli", "--config", path.to_str().unwrap()]).unwrap();
        let p = args.parameters().unwrap();
        assert_eq!(p.nx, 33);
        assert_eq!(p.alpha, 0.5);
        assert_eq!(p.nt, Parameters::default().nt);
        assert_eq!(p.t_left, 100.0);
    }

    #[test]
    fn config_with_scaled_lattice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        fs::write(&path, r#"{ "dx": 7 }"#).unwrap();
        let args =
            Args::try_parse_from(["lbm-cli", "--config", path.to_str().unwrap()]).unwrap();
        let p = args.parameters().unwrap();
        assert!(LbmSolver::new(p).is_err());
    }

    #[test]
    fn missing_config_is_an_error() {
        let args =
            Args::try_parse_from(["lbm-cli", "--config", "/nonexistent/lbm.json"]).unwrap();
        let err = args.parameters().unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }

    #[test]
    fn run_record_serializes() {
        let params = Parameters::new(5, 10, 0.25, 1.0, 0.0);
        let solution = LbmSolver::new(params).unwrap().run();
        let comparison = solution.compare().unwrap();
        let record = RunRecord {
            params: solution.params(),
            tau: params.tau(),
            recommended_nt: params.recommended_iterations(),
            steps: solution.steps(),
            summary: comparison.summary,
            profile: &comparison,
        };
        let v: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(v["params"]["nx"], 5);
        assert_eq!(v["steps"], 10);
        assert_eq!(v["profile"]["x"].as_array().unwrap().len(), 5);
        assert!(v["summary"]["max_abs_error"].is_number());
    }
}
