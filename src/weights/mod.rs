//! The weights taxonomy of spec §4.6: a non-negative function γ on
//! coordinate projections, factoring according to one of four recognized
//! shapes (or a sum of them). [`Weights`] is a closed sum type dispatched
//! by `match`, mirroring the crate's preference (per the design notes) for
//! a visitor-free enum over a runtime dispatcher.
//!
//! Two views are exposed:
//! - [`Weights::gamma`] — γ(P) for an explicit projection, used by the
//!   t-value figure.
//! - [`KernelState`] — the `init`/`update`/`query` recurrence used by the
//!   coordinate-uniform kernel figure and the fast-CBC norm bounds, so the
//!   weighted sum over projections never needs to be enumerated explicitly
//!   except for the projection-dependent shape.

use hashbrown::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductWeights {
    /// `gammas[j]` is γ_{j+1} (1-indexed in the math, 0-indexed here).
    pub gammas: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDependentWeights {
    /// `gammas[k]` is Γ_{k+1}.
    pub gammas: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodWeights {
    pub order: OrderDependentWeights,
    pub product: ProductWeights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDependentWeights {
    /// Projections are stored sorted to make lookups order-independent.
    pub entries: HashMap<Vec<usize>, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    Product(ProductWeights),
    OrderDependent(OrderDependentWeights),
    Pod(PodWeights),
    ProjectionDependent(ProjectionDependentWeights),
    Combined(Vec<Weights>),
}

impl Weights {
    /// Rejects shapes whose trailing ("default") weight is nonzero, which
    /// would imply every projection beyond the listed ones is active —
    /// infinite-cardinality support the search driver cannot enumerate.
    pub fn validate(&self) -> Result<()> {
        match self {
            Weights::Product(_) | Weights::OrderDependent(_) => Ok(()),
            Weights::Pod(pod) => {
                pod.order.validate_shape()?;
                pod.product.validate_shape()
            }
            Weights::ProjectionDependent(_) => Ok(()),
            Weights::Combined(children) => children.iter().try_for_each(Weights::validate),
        }
    }

    /// γ(P) for an explicit set of (0-indexed) coordinates.
    pub fn gamma(&self, projection: &[usize]) -> f64 {
        match self {
            Weights::Product(w) => projection.iter().map(|&j| w.gammas.get(j).copied().unwrap_or(0.0)).product(),
            Weights::OrderDependent(w) => w.gammas.get(projection.len().saturating_sub(1)).copied().unwrap_or(0.0),
            Weights::Pod(pod) => {
                let order = pod.order.gammas.get(projection.len().saturating_sub(1)).copied().unwrap_or(0.0);
                let product: f64 = projection.iter().map(|&j| pod.product.gammas.get(j).copied().unwrap_or(0.0)).product();
                order * product
            }
            Weights::ProjectionDependent(w) => {
                let mut sorted = projection.to_vec();
                sorted.sort_unstable();
                w.entries.get(&sorted).copied().unwrap_or(0.0)
            }
            Weights::Combined(children) => children.iter().map(|c| c.gamma(projection)).sum(),
        }
    }

    /// Largest projection cardinality this weight shape gives nonzero
    /// support to; the figure-of-merit's sum over projections never needs
    /// to look past this (spec S5).
    pub fn max_card(&self, dimension: usize) -> usize {
        match self {
            Weights::Product(w) => w
                .gammas
                .iter()
                .take(dimension)
                .enumerate()
                .filter(|(_, &g)| g > 0.0)
                .map(|(i, _)| i + 1)
                .max()
                .unwrap_or(0),
            Weights::OrderDependent(w) => w.gammas.iter().enumerate().filter(|(_, &g)| g > 0.0).map(|(i, _)| i + 1).max().unwrap_or(0),
            Weights::Pod(pod) => Weights::OrderDependent(pod.order.clone()).max_card(dimension),
            Weights::ProjectionDependent(w) => w.entries.keys().filter(|p| !p.is_empty()).map(|p| p.len()).max().unwrap_or(0),
            Weights::Combined(children) => children.iter().map(|c| c.max_card(dimension)).max().unwrap_or(0),
        }
    }
}

impl ProductWeights {
    fn validate_shape(&self) -> Result<()> {
        Ok(())
    }
}

impl OrderDependentWeights {
    fn validate_shape(&self) -> Result<()> {
        Ok(())
    }
}

/// The running state of the `init`/`update`/`query` recurrence for one
/// weight shape, accumulated one coordinate's kernel row at a time.
#[derive(Debug, Clone)]
pub enum KernelState {
    Product { running: f64 },
    OrderDependent { esp: Vec<f64> },
    Pod { esp: Vec<f64> },
    ProjectionDependent { rows: Vec<f64> },
    Combined(Vec<KernelState>),
}

impl Weights {
    /// Fresh accumulator state for a net of the given dimension.
    pub fn init(&self, dimension: usize) -> KernelState {
        match self {
            Weights::Product(_) => KernelState::Product { running: 1.0 },
            Weights::OrderDependent(w) => {
                let max_k = w.gammas.len().min(dimension);
                KernelState::OrderDependent {
                    esp: std::iter::once(1.0).chain(std::iter::repeat(0.0).take(max_k)).collect(),
                }
            }
            Weights::Pod(pod) => {
                let max_k = pod.order.gammas.len().min(dimension);
                KernelState::Pod {
                    esp: std::iter::once(1.0).chain(std::iter::repeat(0.0).take(max_k)).collect(),
                }
            }
            Weights::ProjectionDependent(_) => KernelState::ProjectionDependent { rows: Vec::with_capacity(dimension) },
            Weights::Combined(children) => KernelState::Combined(children.iter().map(|c| c.init(dimension)).collect()),
        }
    }

    /// Folds in the kernel row for one newly added coordinate.
    pub fn update(&self, state: KernelState, coord: usize, kernel_row: f64) -> KernelState {
        match (self, state) {
            (Weights::Product(w), KernelState::Product { running }) => {
                let gamma_j = w.gammas.get(coord).copied().unwrap_or(0.0);
                KernelState::Product {
                    running: running * (1.0 + gamma_j * kernel_row),
                }
            }
            (Weights::OrderDependent(_), KernelState::OrderDependent { esp }) => {
                KernelState::OrderDependent { esp: update_esp(esp, kernel_row) }
            }
            (Weights::Pod(pod), KernelState::Pod { esp }) => {
                let gamma_j = pod.product.gammas.get(coord).copied().unwrap_or(0.0);
                KernelState::Pod {
                    esp: update_esp(esp, gamma_j * kernel_row),
                }
            }
            (Weights::ProjectionDependent(_), KernelState::ProjectionDependent { mut rows }) => {
                rows.push(kernel_row);
                KernelState::ProjectionDependent { rows }
            }
            (Weights::Combined(children), KernelState::Combined(states)) => KernelState::Combined(
                children
                    .iter()
                    .zip(states)
                    .map(|(c, s)| c.update(s, coord, kernel_row))
                    .collect(),
            ),
            _ => unreachable!("KernelState variant must match the Weights variant that created it"),
        }
    }

    /// The partial merit contribution: `Σ_{P nonempty} γ(P) Π_{j∈P} ω_j`.
    pub fn query(&self, state: &KernelState) -> f64 {
        match (self, state) {
            (Weights::Product(_), KernelState::Product { running }) => running - 1.0,
            (Weights::OrderDependent(w), KernelState::OrderDependent { esp }) => {
                esp.iter().skip(1).zip(&w.gammas).map(|(e, g)| e * g).sum()
            }
            (Weights::Pod(pod), KernelState::Pod { esp }) => esp.iter().skip(1).zip(&pod.order.gammas).map(|(e, g)| e * g).sum(),
            (Weights::ProjectionDependent(w), KernelState::ProjectionDependent { rows }) => w
                .entries
                .iter()
                .filter(|(p, _)| !p.is_empty() && p.iter().all(|&j| j < rows.len()))
                .map(|(p, &g)| g * p.iter().map(|&j| rows[j]).product::<f64>())
                .sum(),
            (Weights::Combined(children), KernelState::Combined(states)) => {
                children.iter().zip(states).map(|(c, s)| c.query(s)).sum()
            }
            _ => unreachable!("KernelState variant must match the Weights variant that created it"),
        }
    }
}

/// Standard elementary-symmetric-polynomial update: `e_k' = e_k + x * e_{k-1}`,
/// run from the top down so each `e_k` only ever reads last round's values.
fn update_esp(mut esp: Vec<f64>, x: f64) -> Vec<f64> {
    for k in (1..esp.len()).rev() {
        esp[k] += x * esp[k - 1];
    }
    esp
}

/// Validates a weights object against the rule that default (unlisted)
/// weight must be zero, surfacing a [`Error::Configuration`] otherwise.
pub fn compute_max_card_from_weights(weights: &Weights, dimension: usize) -> Result<usize> {
    weights.validate()?;
    let card = weights.max_card(dimension);
    if card == 0 {
        return Err(Error::Configuration("weights have no projection with positive weight".into()));
    }
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_dependent_max_card_matches_scenario() {
        // S5: Gamma_3 = 1, Gamma_k = 0 otherwise => max card 3.
        let weights = Weights::OrderDependent(OrderDependentWeights {
            gammas: vec![0.0, 0.0, 1.0],
        });
        assert_eq!(compute_max_card_from_weights(&weights, 5).unwrap(), 3);
    }

    #[test]
    fn product_weights_query_matches_inclusion_exclusion() {
        let weights = Weights::Product(ProductWeights { gammas: vec![0.5, 0.25] });
        let mut state = weights.init(2);
        state = weights.update(state, 0, 2.0);
        state = weights.update(state, 1, 4.0);
        // (1 + 0.5*2)(1 + 0.25*4) - 1 = 2*2 - 1 = 3
        assert!((weights.query(&state) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn order_dependent_query_matches_elementary_symmetric() {
        let weights = Weights::OrderDependent(OrderDependentWeights { gammas: vec![1.0, 1.0] });
        let mut state = weights.init(2);
        state = weights.update(state, 0, 2.0);
        state = weights.update(state, 1, 3.0);
        // e1 = 2+3 = 5, e2 = 2*3 = 6; merit = 1*5 + 1*6 = 11
        assert!((weights.query(&state) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn projection_dependent_gamma_is_order_independent() {
        let mut entries = HashMap::new();
        entries.insert(vec![0, 2], 0.7);
        let weights = Weights::ProjectionDependent(ProjectionDependentWeights { entries });
        assert_eq!(weights.gamma(&[2, 0]), 0.7);
        assert_eq!(weights.gamma(&[1]), 0.0);
    }

    #[test]
    fn rejects_infeasible_default_via_zero_max_card() {
        let weights = Weights::OrderDependent(OrderDependentWeights { gammas: vec![] });
        assert!(compute_max_card_from_weights(&weights, 5).is_err());
    }
}
