//! The generic search skeleton of spec §4.7: Exhaustive, Random, CBC and
//! Fast-CBC strategies layered over a common [`MinimumObserver`].
//!
//! None of these strategies know about `NetConstruction` or `FigureOfMerit`
//! directly; each takes a plain `evaluate` closure so the same driver code
//! serves both digital-net t-value figures and lattice kernel figures.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::merit::kernel::Kernel;
use crate::merit::MeritObserver;
use crate::weights::{KernelState, Weights};

/// Tracks the best candidate seen so far and doubles as the cooperative
/// abort hook: any partial merit at or above the current best signals
/// early abortion of that candidate (spec §4.7 `onProgress`).
pub struct MinimumObserver<T> {
    best_merit: f64,
    best_candidate: Option<T>,
    aborts: usize,
}

impl<T> Default for MinimumObserver<T> {
    fn default() -> Self {
        Self {
            best_merit: f64::INFINITY,
            best_candidate: None,
            aborts: 0,
        }
    }
}

impl<T: Clone> MinimumObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `candidate` as the new best if `merit` improves on it.
    pub fn consider(&mut self, candidate: T, merit: f64) {
        if merit.is_finite() && merit < self.best_merit {
            debug!(merit, "new best candidate");
            self.best_merit = merit;
            self.best_candidate = Some(candidate);
        }
    }

    pub fn best(&self) -> Option<(&T, f64)> {
        self.best_candidate.as_ref().map(|c| (c, self.best_merit))
    }

    pub fn into_best(self) -> Option<(T, f64)> {
        self.best_candidate.map(|c| (c, self.best_merit))
    }

    pub fn abort_count(&self) -> usize {
        self.aborts
    }
}

impl<T> MeritObserver for MinimumObserver<T> {
    fn on_progress(&mut self, partial: f64) -> bool {
        partial < self.best_merit
    }

    fn on_abort(&mut self, net_id: usize) {
        self.aborts += 1;
        debug!(net_id, "candidate aborted by early abortion");
    }
}

/// Exhaustively evaluates the full cartesian product of `value_spaces`,
/// one coordinate's space per entry.
pub fn exhaustive<V, F>(value_spaces: &[Vec<V>], mut evaluate: F, observer: &mut MinimumObserver<Vec<V>>) -> Result<()>
where
    V: Clone,
    F: FnMut(&[V], &mut dyn MeritObserver) -> Result<f64>,
{
    fn go<V, F>(
        value_spaces: &[Vec<V>],
        idx: usize,
        acc: &mut Vec<V>,
        evaluate: &mut F,
        observer: &mut MinimumObserver<Vec<V>>,
    ) -> Result<()>
    where
        V: Clone,
        F: FnMut(&[V], &mut dyn MeritObserver) -> Result<f64>,
    {
        if idx == value_spaces.len() {
            match evaluate(acc, observer) {
                Ok(merit) => observer.consider(acc.clone(), merit),
                Err(Error::Aborted) => {}
                Err(e) => return Err(e),
            }
            return Ok(());
        }
        for v in &value_spaces[idx] {
            acc.push(v.clone());
            go(value_spaces, idx + 1, acc, evaluate, observer)?;
            acc.pop();
        }
        Ok(())
    }

    let mut acc = Vec::with_capacity(value_spaces.len());
    go(value_spaces, 0, &mut acc, &mut evaluate, observer)?;
    if observer.best().is_none() {
        return Err(Error::NoCandidate);
    }
    info!("exhaustive search complete");
    Ok(())
}

/// Samples `n_tries` candidates, one per coordinate per try, via `sample`.
pub fn random<V, F, S>(n_tries: usize, seed: u64, mut sample: S, mut evaluate: F, observer: &mut MinimumObserver<Vec<V>>) -> Result<()>
where
    V: Clone,
    S: FnMut(&mut ChaCha8Rng) -> Vec<V>,
    F: FnMut(&[V], &mut dyn MeritObserver) -> Result<f64>,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..n_tries {
        let candidate = sample(&mut rng);
        match evaluate(&candidate, observer) {
            Ok(merit) => observer.consider(candidate, merit),
            Err(Error::Aborted) => {}
            Err(e) => return Err(e),
        }
    }
    if observer.best().is_none() {
        return Err(Error::NoCandidate);
    }
    info!(n_tries, "random search complete");
    Ok(())
}

/// Grows one coordinate at a time: for coordinate `d`, holds
/// `0..d` fixed at the running-best prefix and scans `value_spaces[d]`
/// for the minimizer, then moves on.
pub fn cbc<V, F>(value_spaces: &[Vec<V>], mut evaluate: F) -> Result<(Vec<V>, f64)>
where
    V: Clone,
    F: FnMut(&[V], &mut dyn MeritObserver) -> Result<f64>,
{
    let mut prefix: Vec<V> = Vec::with_capacity(value_spaces.len());
    let mut prefix_merit = 0.0_f64;

    for (d, space) in value_spaces.iter().enumerate() {
        let mut observer: MinimumObserver<V> = MinimumObserver::new();
        let mut candidate = prefix.clone();
        candidate.push(space[0].clone());
        for value in space {
            *candidate.last_mut().unwrap() = value.clone();
            match evaluate(&candidate, &mut observer) {
                Ok(merit) => observer.consider(value.clone(), merit),
                Err(Error::Aborted) => {}
                Err(e) => return Err(e),
            }
        }
        let Some((best_value, best_merit)) = observer.into_best() else {
            return Err(Error::NoCandidate);
        };
        debug!(coord = d, best_merit, "CBC coordinate resolved");
        prefix.push(best_value);
        prefix_merit = best_merit;
    }
    info!("CBC search complete");
    Ok((prefix, prefix_merit))
}

/// Fast-CBC for coordinate-uniform kernel figures: at each coordinate,
/// evaluates every candidate generator value via a direct cyclic
/// correlation against the kernel table, rather than recomputing the
/// weighted kernel fold from scratch per candidate.
///
/// Per-point state is threaded through the same `Weights::init`/`update`/
/// `query` recurrence `CoordUniformFigure` folds over, so this handles
/// every weight shape (`Product`, `OrderDependent`, `Pod`,
/// `ProjectionDependent`, `Combined`), not just product weights: trying a
/// candidate `z` at `coord` clones each point's running state, folds in
/// that candidate's kernel row, and queries the trial without committing
/// it, so the O(n) scan per candidate never mutates the real states.
///
/// Only lattice sizes this crate can build a cyclic index table for
/// (prime or a power of two) are supported; anything else is a
/// `ConfigurationError`, matching the fallback spec §4.7 requires for
/// non-coordinate-uniform figures.
pub fn fast_cbc(n: usize, dimension: usize, kernel: &Kernel, weights: &Weights, q: f64) -> Result<(Vec<u64>, f64)> {
    if n < 2 || !(is_prime(n) || n.is_power_of_two()) {
        return Err(Error::Configuration(format!(
            "fast-CBC only supports prime or power-of-two lattice sizes, got {n}"
        )));
    }

    let kernel_table: Vec<f64> = (0..n).map(|k| kernel.apply(k as f64 / n as f64)).collect::<Result<_>>()?;

    let mut generator = Vec::with_capacity(dimension);
    let mut states: Vec<KernelState> = (0..n).map(|_| weights.init(dimension)).collect();
    let mut prefix_merit = 0.0;

    for coord in 0..dimension {
        let mut best_z = 1u64;
        let mut best_merit = f64::INFINITY;
        for z in 1..n as u64 {
            if gcd(z as usize, n) != 1 {
                continue;
            }
            let mut total = 0.0;
            for i in 0..n {
                let k = (i * z as usize) % n;
                let trial = weights.update(states[i].clone(), coord, kernel_table[k]);
                total += weights.query(&trial);
            }
            let merit = (total / n as f64).max(0.0).powf(1.0 / q);
            if merit < best_merit {
                best_merit = merit;
                best_z = z;
            }
        }
        generator.push(best_z);
        prefix_merit = best_merit;
        for i in 0..n {
            let k = (i * best_z as usize) % n;
            let state = std::mem::replace(&mut states[i], weights.init(0));
            states[i] = weights.update(state, coord, kernel_table[k]);
        }
        debug!(coord, best_z, best_merit, "fast-CBC coordinate resolved");
    }

    if !prefix_merit.is_finite() {
        return Err(Error::NoCandidate);
    }
    info!("fast-CBC search complete");
    Ok((generator, prefix_merit))
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_finds_minimum_over_declared_space() {
        let value_spaces = vec![vec![1, 2, 3], vec![10, 20]];
        let mut observer = MinimumObserver::new();
        exhaustive(
            &value_spaces,
            |candidate, _obs| Ok((candidate[0] + candidate[1]) as f64),
            &mut observer,
        )
        .unwrap();
        let (best, merit) = observer.best().unwrap();
        assert_eq!(best, &vec![1, 10]);
        assert_eq!(merit, 11.0);
    }

    #[test]
    fn exhaustive_reports_no_candidate_when_everything_aborts() {
        let value_spaces = vec![vec![1, 2]];
        let mut observer = MinimumObserver::new();
        let result = exhaustive(&value_spaces, |_candidate, _obs| Err(Error::Aborted), &mut observer);
        assert!(matches!(result, Err(Error::NoCandidate)));
    }

    #[test]
    fn random_search_is_deterministic_for_fixed_seed() {
        let sample = |rng: &mut ChaCha8Rng| vec![rand::Rng::gen_range(rng, 0..100)];
        let mut observer_a = MinimumObserver::new();
        random(20, 7, sample, |c, _obs| Ok(c[0] as f64), &mut observer_a).unwrap();
        let mut observer_b = MinimumObserver::new();
        random(20, 7, sample, |c, _obs| Ok(c[0] as f64), &mut observer_b).unwrap();
        assert_eq!(observer_a.best().unwrap().0, observer_b.best().unwrap().0);
    }

    #[test]
    fn cbc_picks_greedy_minimizer_per_coordinate() {
        let value_spaces = vec![vec![3, 1, 2], vec![5, 4]];
        let (best, merit) = cbc(&value_spaces, |candidate, _obs| Ok(candidate.iter().sum::<i32>() as f64)).unwrap();
        assert_eq!(best, vec![1, 4]);
        assert_eq!(merit, 5.0);
    }

    #[test]
    fn fast_cbc_rejects_unsupported_size() {
        let weights = Weights::Product(crate::weights::ProductWeights { gammas: vec![1.0] });
        let kernel = Kernel::PAlpha(2);
        assert!(fast_cbc(6, 1, &kernel, &weights, 2.0).is_err());
    }

    #[test]
    fn fast_cbc_matches_cbc_for_order_dependent_weights() {
        // Property #6: fast-CBC must agree with plain CBC even when the
        // weight shape isn't Product, since both greedily minimize the
        // same coordinate-uniform figure one coordinate at a time.
        let n = 5usize;
        let dimension = 2;
        let weights = Weights::OrderDependent(crate::weights::OrderDependentWeights { gammas: vec![1.0, 1.0] });
        let kernel = Kernel::PAlpha(2);
        let q = 2.0;

        let candidates: Vec<u64> = (1..n as u64).filter(|&z| gcd(z as usize, n) == 1).collect();
        let value_spaces = vec![candidates.clone(), candidates.clone()];

        let figure = crate::merit::CoordUniformFigure {
            kernel,
            weights: weights.clone(),
            q,
        };
        let (cbc_generator, cbc_merit) = cbc(&value_spaces, |candidate, obs| {
            let points = crate::merit::RankOneLatticePoints {
                n,
                generator: candidate.to_vec(),
            };
            figure.evaluate(&points, 0, obs)
        })
        .unwrap();

        let (fast_generator, fast_merit) = fast_cbc(n, dimension, &kernel, &weights, q).unwrap();

        assert_eq!(cbc_generator, fast_generator);
        assert!((cbc_merit - fast_merit).abs() < 1e-9);
    }
}
