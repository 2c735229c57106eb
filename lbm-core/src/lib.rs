pub mod error;
pub mod params;
pub mod report;

pub use error::{LbmError, Result};
pub use params::{Parameters, Q, WEIGHTS};
pub use report::{Comparison, ErrorSummary};

use tracing::{debug, warn};

/// Lattice direction of a population, named by where streaming moves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Index 0, streamed toward increasing position.
    Forward = 0,
    /// Index 1, streamed toward decreasing position.
    Backward = 1,
}

impl Direction {
    pub const ALL: [Direction; Q] = [Direction::Forward, Direction::Backward];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// D1Q2 BGK solver for 1D heat conduction with fixed-temperature ends.
///
/// `f` holds the live populations indexed by [`Direction`], `scratch` is the
/// streaming target that gets swapped in after each shift.
#[derive(Clone, Debug)]
pub struct LbmSolver {
    params: Parameters,
    tau: f64,
    f: [Vec<f64>; Q],
    scratch: [Vec<f64>; Q],
    temperature: Vec<f64>,
    steps: usize,
}

impl LbmSolver {
    pub fn new(params: Parameters) -> Result<LbmSolver> {
        params.validate()?;

        let nx = params.nx;
        let tau = params.tau();

        let mut temperature = vec![0.0; nx];
        temperature[0] = params.t_left;
        temperature[nx - 1] = params.t_right;

        let f = WEIGHTS.map(|w| temperature.iter().map(|&t| w * t).collect::<Vec<f64>>());

        if params.under_iterated() {
            warn!(
                nt = params.nt,
                recommended = params.recommended_iterations(),
                "iteration count is below the nx^2/alpha guideline; profile may not reach steady state"
            );
        }
        debug!(nx, nt = params.nt, alpha = params.alpha, tau, "initialized D1Q2 solver");

        Ok(LbmSolver {
            params,
            tau,
            f,
            scratch: [vec![0.0; nx], vec![0.0; nx]],
            temperature,
            steps: 0,
        })
    }

    // ---- Accessors ----

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn nx(&self) -> usize {
        self.params.nx
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Temperature as of the last recompute (or the initial profile).
    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    pub fn distribution(&self, dir: Direction) -> &[f64] {
        &self.f[dir.index()]
    }

    // ---- Time loop ----

    /// Runs the configured `nt` iterations and finalizes.
    pub fn run(mut self) -> Solution {
        self.advance(self.params.nt);
        self.finish()
    }

    pub fn advance(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// One iteration: temperature, collision, streaming, boundaries.
    pub fn step(&mut self) {
        self.update_temperature();
        self.collide();
        self.stream();
        self.apply_boundaries();
        self.steps += 1;
    }

    /// Recomputes the temperature once more, since the last streaming and
    /// boundary pass came after the last in-loop read.
    pub fn finish(mut self) -> Solution {
        self.update_temperature();
        debug!(steps = self.steps, "finalized D1Q2 solver");
        Solution {
            params: self.params,
            steps: self.steps,
            temperature: self.temperature,
        }
    }

    // ---- Sub-steps ----

    pub fn update_temperature(&mut self) {
        macroscopic(&self.f, &self.params, &mut self.temperature);
    }

    /// Temperature implied by the populations right now, leaving the stored
    /// field alone.
    pub fn current_temperature(&self) -> Vec<f64> {
        let mut t = vec![0.0; self.params.nx];
        macroscopic(&self.f, &self.params, &mut t);
        t
    }

    /// BGK relaxation toward `w[i] * T`. Leaves the temperature untouched.
    pub fn collide(&mut self) {
        let tau = self.tau;
        for (f, w) in self.f.iter_mut().zip(WEIGHTS) {
            for (fp, &t) in f.iter_mut().zip(&self.temperature) {
                let feq = w * t;
                *fp += -(*fp - feq) / tau;
            }
        }
    }

    /// Shifts both directions by one cell, reading only from the
    /// pre-stream buffer.
    pub fn stream(&mut self) {
        let n = self.params.nx;
        let [src0, src1] = &self.f;
        let [dst0, dst1] = &mut self.scratch;

        dst0[1..].copy_from_slice(&src0[..n - 1]);
        dst1[..n - 1].copy_from_slice(&src1[1..]);

        // vacated by the shift, overwritten in apply_boundaries
        dst0[0] = src0[0];
        dst1[n - 1] = src1[n - 1];

        std::mem::swap(&mut self.f, &mut self.scratch);
    }

    /// Re-injects the equilibrium populations of the fixed end temperatures.
    pub fn apply_boundaries(&mut self) {
        let n = self.params.nx;
        for (f, w) in self.f.iter_mut().zip(WEIGHTS) {
            f[0] = w * self.params.t_left;
            f[n - 1] = w * self.params.t_right;
        }
    }
}

/// Sums the populations; the two ends are pinned to the boundary values.
fn macroscopic(f: &[Vec<f64>; Q], params: &Parameters, out: &mut [f64]) {
    let [f0, f1] = f;
    for ((t, a), b) in out.iter_mut().zip(f0).zip(f1) {
        *t = a + b;
    }
    let n = params.nx;
    out[0] = params.t_left;
    out[n - 1] = params.t_right;
}

/// Final state of a run. Produced by [`LbmSolver::finish`].
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    params: Parameters,
    steps: usize,
    temperature: Vec<f64>,
}

impl Solution {
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    pub fn into_temperature(self) -> Vec<f64> {
        self.temperature
    }

    pub fn compare(&self) -> Result<Comparison> {
        let p = &self.params;
        Comparison::for_lattice(p.nx, &self.temperature, p.t_left, p.t_right)
    }
}
