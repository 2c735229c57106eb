//! Comparison of a computed profile against the steady-state linear profile.

use std::fmt;

use serde::Serialize;

use crate::error::{LbmError, Result};

/// Lattice positions scaled to [0, 1].
pub fn positions(nx: usize) -> Vec<f64> {
    if nx < 2 {
        return vec![0.0; nx];
    }
    let last = (nx - 1) as f64;
    (0..nx).map(|p| p as f64 / last).collect()
}

/// Steady 1D conduction with no source: a straight line between the ends.
/// With `t_right = 0` this is `t_left * (1 - x)`.
pub fn analytical_profile(x: &[f64], t_left: f64, t_right: f64) -> Vec<f64> {
    x.iter().map(|&x| t_left + (t_right - t_left) * x).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub max_abs_error: f64,
    pub mean_abs_error: f64,
}

impl ErrorSummary {
    pub fn from_abs_errors(abs_error: &[f64]) -> ErrorSummary {
        let max_abs_error = abs_error.iter().copied().fold(0.0, f64::max);
        let mean_abs_error = if abs_error.is_empty() {
            0.0
        } else {
            abs_error.iter().sum::<f64>() / abs_error.len() as f64
        };
        ErrorSummary {
            max_abs_error,
            mean_abs_error,
        }
    }
}

impl fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Max Absolute Error: {}", Sci(self.max_abs_error))?;
        write!(f, "Mean Absolute Error: {}", Sci(self.mean_abs_error))
    }
}

/// Simulated and analytical profiles side by side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    pub x: Vec<f64>,
    pub simulated: Vec<f64>,
    pub analytical: Vec<f64>,
    pub abs_error: Vec<f64>,
    pub summary: ErrorSummary,
}

impl Comparison {
    pub fn new(temperature: &[f64], t_left: f64, t_right: f64) -> Result<Comparison> {
        let nx = temperature.len();
        if nx < 2 {
            return Err(LbmError::GridTooSmall(nx));
        }
        let x = positions(nx);
        let analytical = analytical_profile(&x, t_left, t_right);
        let abs_error: Vec<f64> = temperature
            .iter()
            .zip(&analytical)
            .map(|(t, a)| (t - a).abs())
            .collect();
        let summary = ErrorSummary::from_abs_errors(&abs_error);

        Ok(Comparison {
            x,
            simulated: temperature.to_vec(),
            analytical,
            abs_error,
            summary,
        })
    }

    /// Same as [`Comparison::new`] but checks the field against an expected
    /// lattice size first.
    pub fn for_lattice(
        nx: usize,
        temperature: &[f64],
        t_left: f64,
        t_right: f64,
    ) -> Result<Comparison> {
        if temperature.len() != nx {
            return Err(LbmError::LengthMismatch {
                expected: nx,
                actual: temperature.len(),
            });
        }
        Comparison::new(temperature, t_left, t_right)
    }
}

/// Scientific notation with six fractional digits and a signed, at least
/// two-digit exponent, e.g. `5.268585e+00`.
#[derive(Clone, Copy, Debug)]
pub struct Sci(pub f64);

impl fmt::Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_finite() {
            return write!(f, "{}", self.0);
        }
        let raw = format!("{:.6e}", self.0);
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().map_err(|_| fmt::Error)?;
                let sign = if exp < 0 { '-' } else { '+' };
                write!(f, "{mantissa}e{sign}{:02}", exp.abs())
            }
            None => f.write_str(&raw),
        }
    }
}
