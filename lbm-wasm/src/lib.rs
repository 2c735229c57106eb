use lbm_core::{Comparison, LbmSolver, Parameters};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct Solver {
    inner: LbmSolver,
}

#[wasm_bindgen]
impl Solver {
    #[wasm_bindgen(constructor)]
    pub fn new(nx: usize, alpha: f64, t_left: f64, t_right: f64) -> Result<Solver, JsValue> {
        // nt = 0: the run length is driven from JS through step()
        let params = Parameters::new(nx, 0, alpha, t_left, t_right);
        let inner = LbmSolver::new(params).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Solver { inner })
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.inner =
            LbmSolver::new(*self.inner.params()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    pub fn nx(&self) -> usize { self.inner.nx() }
    pub fn tau(&self) -> f64 { self.inner.tau() }
    pub fn steps_taken(&self) -> usize { self.inner.steps_taken() }

    // Copy-based JS access (reliable)
    pub fn temperature(&self) -> Vec<f64> {
        self.inner.current_temperature()
    }

    pub fn max_error(&self) -> Result<f64, JsValue> {
        Ok(self.compare()?.summary.max_abs_error)
    }

    pub fn mean_error(&self) -> Result<f64, JsValue> {
        Ok(self.compare()?.summary.mean_abs_error)
    }

    // Step + timing (WASM-only)
    pub fn step(&mut self, n: usize) -> StepInfo {
        let t0 = now_ms();
        self.inner.advance(n);
        let t1 = now_ms();
        StepInfo { steps: n, compute_ms: t1 - t0 }
    }
}

impl Solver {
    fn compare(&self) -> Result<Comparison, JsValue> {
        let p = self.inner.params();
        Comparison::for_lattice(p.nx, &self.temperature(), p.t_left, p.t_right)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[wasm_bindgen]
pub struct StepInfo {
    steps: usize,
    compute_ms: f64,
}

#[wasm_bindgen]
impl StepInfo {
    pub fn steps(&self) -> usize { self.steps }
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
}


fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
