//! Figures of merit: weighted sums over coordinate projections, evaluated
//! either via the t-value engine (digital nets) or a coordinate-uniform
//! kernel (rank-1 lattices), plus the closed-form norm bounds fast-CBC
//! prunes candidates with.
//!
//! The evaluator state machine of spec §4.6 (`Idle -> Building -> Complete`,
//! with an `Aborted` escape on early abortion) is [`EvalState`]; a
//! [`MeritObserver`] is the cooperative abort hook the search driver's
//! `MinimumObserver` implements.

pub mod kernel;

use tracing::{trace, warn};

use crate::bitmatrix::GF2Matrix;
use crate::error::{Error, Result};
use crate::tvalue::single_net_t_value;
use crate::weights::Weights;
use kernel::Kernel;

/// The evaluator state machine of spec §4.6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvalState {
    Idle,
    Building,
    Complete,
    Aborted,
}

/// Cooperative progress/abort hook, invoked at each coordinate or
/// projection boundary during evaluation.
pub trait MeritObserver {
    /// Reports a partial (lower-bounded) merit; returning `false` signals
    /// early abortion.
    fn on_progress(&mut self, partial: f64) -> bool;
    /// Called when a candidate is abandoned due to abort.
    fn on_abort(&mut self, net_id: usize);
}

/// An observer that never aborts, for callers that just want a plain
/// evaluation.
pub struct NullObserver;

impl MeritObserver for NullObserver {
    fn on_progress(&mut self, _partial: f64) -> bool {
        true
    }
    fn on_abort(&mut self, _net_id: usize) {}
}

fn combinations(d: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > d {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut acc = Vec::with_capacity(k);
    fn go(start: usize, d: usize, k: usize, acc: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if acc.len() == k {
            out.push(acc.clone());
            return;
        }
        for j in start..d {
            acc.push(j);
            go(j + 1, d, k, acc, out);
            acc.pop();
        }
    }
    go(0, d, k, &mut acc, &mut out);
    out
}

/// `Merit(Net) = [ Σ_P γ(P)^q · (C - t(Net|P))^q ]^{1/q}`, or the max over
/// `P` when `q = ∞` (spec §4.6a).
pub struct TValueFigure {
    pub weights: Weights,
    pub q: f64,
}

impl TValueFigure {
    pub fn evaluate(&self, matrices: &[GF2Matrix], net_id: usize, observer: &mut dyn MeritObserver) -> Result<f64> {
        let d = matrices.len();
        let c = matrices.first().map(|m| m.n_cols()).unwrap_or(0);
        let max_card = self.weights.max_card(d).min(d);
        let is_max_norm = !self.q.is_finite();

        let mut total = 0.0_f64;
        for card in 1..=max_card {
            for projection in combinations(d, card) {
                let gamma = self.weights.gamma(&projection);
                if gamma <= 0.0 {
                    continue;
                }
                let sub_matrices: Vec<GF2Matrix> = projection.iter().map(|&j| matrices[j].clone()).collect();
                let t = single_net_t_value(&sub_matrices)?;
                let term = (c as f64 - t as f64).max(0.0);
                let contribution = if is_max_norm { gamma * term } else { (gamma * term).powf(self.q) };
                trace!(?projection, t, contribution, "t-value figure projection evaluated");
                if is_max_norm {
                    total = total.max(contribution);
                } else {
                    total += contribution;
                }
                if !observer.on_progress(total) {
                    warn!(net_id, "t-value figure evaluation aborted");
                    observer.on_abort(net_id);
                    return Err(Error::Aborted);
                }
            }
        }
        Ok(if is_max_norm { total } else { total.powf(1.0 / self.q) })
    }
}

/// A source of rank-1 lattice points: `x_{i,j} = frac(i * z_j / n)`.
pub trait CoordinateUniformPoints {
    fn n_points(&self) -> usize;
    fn dimension(&self) -> usize;
    /// The coordinate-`j` value of point `i`, in `[0, 1)`.
    fn coordinate(&self, point: usize, coord: usize) -> f64;
}

pub struct RankOneLatticePoints {
    pub n: usize,
    pub generator: Vec<u64>,
}

impl CoordinateUniformPoints for RankOneLatticePoints {
    fn n_points(&self) -> usize {
        self.n
    }

    fn dimension(&self) -> usize {
        self.generator.len()
    }

    fn coordinate(&self, point: usize, coord: usize) -> f64 {
        let numerator = (point as u128 * self.generator[coord] as u128) % self.n as u128;
        numerator as f64 / self.n as f64
    }
}

/// `Merit(Lattice) = [ (1/n) Σ_i Σ_P γ(P) Π_{j∈P} ω(x_{i,j}) ]^{1/q}` (spec §4.6b).
pub struct CoordUniformFigure {
    pub kernel: Kernel,
    pub weights: Weights,
    pub q: f64,
}

impl CoordUniformFigure {
    pub fn evaluate(&self, points: &dyn CoordinateUniformPoints, net_id: usize, observer: &mut dyn MeritObserver) -> Result<f64> {
        let n = points.n_points();
        let d = points.dimension();
        let mut states: Vec<_> = (0..n).map(|_| self.weights.init(d)).collect();

        for coord in 0..d {
            for i in 0..n {
                let row = self.kernel.apply(points.coordinate(i, coord))?;
                let state = std::mem::replace(&mut states[i], self.weights.init(0));
                states[i] = self.weights.update(state, coord, row);
            }
            let partial: f64 = states.iter().map(|s| self.weights.query(s)).sum::<f64>() / n as f64;
            trace!(coord, partial, "coordinate-uniform figure coordinate folded in");
            if !observer.on_progress(partial) {
                warn!(net_id, "coordinate-uniform figure evaluation aborted");
                observer.on_abort(net_id);
                return Err(Error::Aborted);
            }
        }

        let mean: f64 = states.iter().map(|s| self.weights.query(s)).sum::<f64>() / n as f64;
        Ok(mean.powf(1.0 / self.q))
    }
}

/// Closed-form upper bound on `Σ_P γ(P) · bound^{|P|}` used by fast-CBC to
/// prune candidates before a full kernel evaluation (spec §4.6c). Reuses
/// the weights `init`/`update`/`query` recurrence against a single
/// constant kernel value per coordinate, since `bound` already stands in
/// for the kernel's worst-case per-coordinate contribution.
pub fn norm_bound(weights: &Weights, bound: f64, dimension: usize) -> f64 {
    let mut state = weights.init(dimension);
    for coord in 0..dimension {
        state = weights.update(state, coord, bound);
    }
    weights.query(&state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::ProductWeights;

    fn identity(n: usize) -> GF2Matrix {
        GF2Matrix::from_row_indices(n, (0..n).map(|i| vec![i]).collect()).unwrap()
    }

    #[test]
    fn t_value_figure_is_finite_for_identity_matrices() {
        let weights = Weights::Product(ProductWeights { gammas: vec![1.0, 1.0] });
        let figure = TValueFigure { weights, q: 2.0 };
        let matrices = vec![identity(3), identity(3)];
        let mut observer = NullObserver;
        let merit = figure.evaluate(&matrices, 0, &mut observer).unwrap();
        assert!(merit.is_finite());
        assert!(merit >= 0.0);
    }

    #[test]
    fn t_value_figure_aborts_when_observer_refuses() {
        struct AlwaysAbort;
        impl MeritObserver for AlwaysAbort {
            fn on_progress(&mut self, _partial: f64) -> bool {
                false
            }
            fn on_abort(&mut self, _net_id: usize) {}
        }
        let weights = Weights::Product(ProductWeights { gammas: vec![1.0, 1.0] });
        let figure = TValueFigure { weights, q: 2.0 };
        let matrices = vec![identity(3), identity(3)];
        let mut observer = AlwaysAbort;
        assert!(matches!(figure.evaluate(&matrices, 0, &mut observer), Err(Error::Aborted)));
    }

    #[test]
    fn norm_bound_matches_product_closed_form() {
        let weights = Weights::Product(ProductWeights { gammas: vec![0.5, 0.5] });
        let bound = norm_bound(&weights, 2.0, 2);
        // (1 + 0.5*2)^2 - 1 = 3
        assert!((bound - 3.0).abs() < 1e-12);
    }
}
