use serde::{Deserialize, Serialize};

use crate::error::{LbmError, Result};

/// Number of discrete velocities in the D1Q2 model.
pub const Q: usize = 2;

/// Lattice weights. Equal weighting is what recovers the diffusion limit.
pub const WEIGHTS: [f64; Q] = [0.5, 0.5];

/// Run configuration in lattice units. Populations move one cell per step,
/// so `dx` and `dt` are pinned to 1.0; they are kept as fields so a config
/// file that spells them out still loads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub nx: usize,
    pub nt: usize,
    pub dx: f64,
    pub dt: f64,
    pub alpha: f64,
    pub t_left: f64,
    pub t_right: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            nx: 101,
            nt: 10_000,
            dx: 1.0,
            dt: 1.0,
            alpha: 0.25,
            t_left: 100.0,
            t_right: 0.0,
        }
    }
}

impl Parameters {
    pub fn new(nx: usize, nt: usize, alpha: f64, t_left: f64, t_right: f64) -> Self {
        Parameters {
            nx,
            nt,
            alpha,
            t_left,
            t_right,
            ..Parameters::default()
        }
    }

    /// BGK relaxation time, `0.5 + alpha / dt`.
    pub fn tau(&self) -> f64 {
        0.5 + self.alpha / self.dt
    }

    /// Rough number of iterations needed to approach steady state,
    /// `nx^2 / alpha`.
    pub fn recommended_iterations(&self) -> usize {
        let n = self.nx as f64;
        (n * n / self.alpha).ceil() as usize
    }

    /// True when a fixed-length run stops short of the guideline.
    /// `nt == 0` means the caller steps manually and is never flagged.
    pub fn under_iterated(&self) -> bool {
        self.nt != 0 && self.nt < self.recommended_iterations()
    }

    pub fn validate(&self) -> Result<()> {
        if self.nx < 2 {
            return Err(LbmError::GridTooSmall(self.nx));
        }
        for (name, value) in [("dx", self.dx), ("dt", self.dt)] {
            if value != 1.0 {
                return Err(LbmError::NonUnitLattice { name, value });
            }
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(LbmError::InvalidParameter {
                name: "alpha",
                value: self.alpha,
            });
        }
        for (name, value) in [("t_left", self.t_left), ("t_right", self.t_right)] {
            if !value.is_finite() {
                return Err(LbmError::NonFiniteBoundary { name, value });
            }
        }
        // BGK stability bound
        let tau = self.tau();
        if tau <= 0.5 {
            return Err(LbmError::UnstableRelaxation(tau));
        }
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn reference_defaults() {
        let p = Parameters::default();
        assert_eq!(p.nx, 101);
        assert_eq!(p.nt, 10_000);
        assert_approx_eq!(f64, p.tau(), 0.75);
        assert!(p.validate().is_ok());
        assert_approx_eq!(f64, WEIGHTS.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn rejects_tiny_grid() {
        let p = Parameters::new(1, 10, 0.25, 1.0, 0.0);
        assert_eq!(p.validate(), Err(LbmError::GridTooSmall(1)));
        assert!(Parameters::new(2, 10, 0.25, 1.0, 0.0).validate().is_ok());
    }

    #[test]
    fn rejects_bad_diffusivity() {
        for alpha in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let p = Parameters::new(11, 10, alpha, 1.0, 0.0);
            assert!(matches!(
                p.validate(),
                Err(LbmError::InvalidParameter { name: "alpha", .. })
            ));
        }
    }

    #[test]
    fn rejects_non_finite_boundary() {
        let p = Parameters::new(11, 10, 0.25, f64::NAN, 0.0);
        assert!(matches!(
            p.validate(),
            Err(LbmError::NonFiniteBoundary { name: "t_left", .. })
        ));
    }

    #[test]
    fn recommended_iterations_guideline() {
        let p = Parameters::default();
        assert_eq!(p.recommended_iterations(), 40_804);
    }

    #[test]
    fn lattice_spacing_and_step_are_pinned() {
        for dx in [7.0, 0.5, 0.0, f64::NAN] {
            let p = Parameters {
                dx,
                ..Parameters::default()
            };
            assert!(matches!(
                p.validate(),
                Err(LbmError::NonUnitLattice { name: "dx", .. })
            ));
        }
        let p = Parameters {
            dt: 2.0,
            ..Parameters::default()
        };
        assert!(matches!(
            p.validate(),
            Err(LbmError::NonUnitLattice { name: "dt", .. })
        ));
    }

    #[test]
    fn open_ended_runs_are_not_under_iterated() {
        assert!(Parameters::default().under_iterated());
        assert!(!Parameters::new(101, 0, 0.25, 100.0, 0.0).under_iterated());
        assert!(!Parameters::new(101, 40_804, 0.25, 100.0, 0.0).under_iterated());
    }
}
