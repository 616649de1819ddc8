//! Enumerates compositions of `k` into `s` positive parts in an order
//! whose successive elements differ by relocating exactly one unit from one
//! part to another.
//!
//! This minimal-change property is what lets [`crate::tvalue::TValueEngine`]
//! perform exactly one [`crate::reducer::ProgressiveRowReducer::replace_row`]
//! call per composition instead of rebuilding the reduction from scratch.
//! The underlying graph (vertices: compositions of `k` into `s` parts;
//! edges: pairs differing by a single-unit transfer between two parts) is
//! dense enough in practice that a greedy, most-constrained-first search
//! (the same idea as Warnsdorff's rule for knight's tours) finds a
//! Hamiltonian path without needing to fall back to exhaustive backtracking,
//! for the modest `k`/`s` this engine is used with.

/// Describes the single-unit relocation between two successive compositions:
/// the unit that was the `from_unit`-th of `from_part` becomes the
/// `to_unit`-th of `to_part`. Parts and units are both 1-indexed, matching
/// the way `TValueEngine` talks about "row `u` of matrix `i`".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionDelta {
    pub from_part: usize,
    pub from_unit: usize,
    pub to_part: usize,
    pub to_unit: usize,
}

/// Lazy-looking, eagerly-computed enumerator over compositions of `k` into
/// `s` positive parts.
pub struct CompositionMaker {
    compositions: Vec<Vec<usize>>,
    deltas: Vec<CompositionDelta>,
    index: usize,
}

fn enumerate_compositions(k: usize, s: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut acc = Vec::with_capacity(s);
    fn go(remaining_k: usize, remaining_s: usize, acc: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if remaining_s == 0 {
            if remaining_k == 0 {
                out.push(acc.clone());
            }
            return;
        }
        // Every remaining part needs at least 1, leaving remaining_k - remaining_s for this one.
        if remaining_k < remaining_s {
            return;
        }
        let max_here = remaining_k - (remaining_s - 1);
        for v in 1..=max_here {
            acc.push(v);
            go(remaining_k - v, remaining_s - 1, acc, out);
            acc.pop();
        }
    }
    go(k, s, &mut acc, &mut out);
    out
}

/// `Some(delta)` if `a` and `b` (same length, same sum) differ by exactly
/// one unit moving from one coordinate to another; `None` otherwise.
fn single_unit_delta(a: &[usize], b: &[usize]) -> Option<CompositionDelta> {
    let mut donor = None;
    let mut recipient = None;
    for i in 0..a.len() {
        if a[i] == b[i] {
            continue;
        }
        if a[i] == b[i] + 1 {
            if donor.is_some() {
                return None;
            }
            donor = Some(i);
        } else if b[i] == a[i] + 1 {
            if recipient.is_some() {
                return None;
            }
            recipient = Some(i);
        } else {
            return None;
        }
    }
    match (donor, recipient) {
        (Some(d), Some(r)) => Some(CompositionDelta {
            from_part: d + 1,
            from_unit: a[d],
            to_part: r + 1,
            to_unit: b[r],
        }),
        _ => None,
    }
}

/// Greedy, most-constrained-vertex-first Hamiltonian path search with
/// backtracking, over the "single unit transfer" adjacency of `nodes`.
fn hamiltonian_order(nodes: Vec<Vec<usize>>) -> (Vec<Vec<usize>>, Vec<CompositionDelta>) {
    let n = nodes.len();
    if n <= 1 {
        return (nodes, Vec::new());
    }
    let adjacency: Vec<Vec<(usize, CompositionDelta)>> = nodes
        .iter()
        .enumerate()
        .map(|(i, a)| {
            nodes
                .iter()
                .enumerate()
                .filter_map(|(j, b)| {
                    if i == j {
                        None
                    } else {
                        single_unit_delta(a, b).map(|d| (j, d))
                    }
                })
                .collect()
        })
        .collect();

    let mut visited = vec![false; n];
    let mut order = vec![0usize];
    let mut deltas = Vec::with_capacity(n - 1);
    visited[0] = true;

    fn search(
        adjacency: &[Vec<(usize, CompositionDelta)>],
        visited: &mut [bool],
        order: &mut Vec<usize>,
        deltas: &mut Vec<CompositionDelta>,
        n: usize,
    ) -> bool {
        if order.len() == n {
            return true;
        }
        let current = *order.last().unwrap();
        let mut candidates: Vec<(usize, CompositionDelta)> = adjacency[current]
            .iter()
            .copied()
            .filter(|(j, _)| !visited[*j])
            .collect();
        // Most-constrained-first: try the neighbour with fewest unvisited
        // onward options, so we don't paint ourselves into a corner.
        candidates.sort_by_key(|(j, _)| {
            adjacency[*j]
                .iter()
                .filter(|(k, _)| !visited[*k])
                .count()
        });
        for (next, delta) in candidates {
            visited[next] = true;
            order.push(next);
            deltas.push(delta);
            if search(adjacency, visited, order, deltas, n) {
                return true;
            }
            order.pop();
            deltas.pop();
            visited[next] = false;
        }
        false
    }

    let found = search(&adjacency, &mut visited, &mut order, &mut deltas, n);
    assert!(
        found,
        "no single-unit-transfer Hamiltonian path exists over this composition set; this is a bug"
    );

    let ordered_nodes = order.iter().map(|&i| nodes[i].clone()).collect();
    (ordered_nodes, deltas)
}

impl CompositionMaker {
    /// Starts at the lexicographically first composition
    /// `(1, 1, ..., 1, k - s + 1)`.
    pub fn new(k: usize, s: usize) -> Self {
        assert!(s >= 1, "compositions need at least one part");
        assert!(k >= s, "k must be at least s for s positive parts to sum to k");
        let all = enumerate_compositions(k, s);
        // enumerate_compositions already visits the lexicographically-first
        // composition (1,1,...,1,k-s+1) first; keep that as our start.
        let (compositions, deltas) = hamiltonian_order(all);
        Self {
            compositions,
            deltas,
            index: 0,
        }
    }

    /// Total number of compositions, `C(k-1, s-1)`.
    pub fn total(&self) -> usize {
        self.compositions.len()
    }

    /// The current composition.
    pub fn current(&self) -> &[usize] {
        &self.compositions[self.index]
    }

    /// Moves to the next composition. Returns `false` once exhausted.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.compositions.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// The single-unit move that produced the current composition from the
    /// previous one. `None` before the first `advance()` call.
    pub fn delta(&self) -> Option<CompositionDelta> {
        if self.index == 0 {
            None
        } else {
            self.deltas.get(self.index - 1).copied()
        }
    }
}

/// `C(n, r)`, used to size the expected composition count in tests.
pub fn binomial(n: usize, r: usize) -> usize {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
    }
    acc as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn visits_every_composition_exactly_once() {
        let k = 6;
        let s = 3;
        let mut maker = CompositionMaker::new(k, s);
        let expected = binomial(k - 1, s - 1);
        assert_eq!(maker.total(), expected);

        let mut seen = HashSet::new();
        seen.insert(maker.current().to_vec());
        while maker.advance() {
            assert!(seen.insert(maker.current().to_vec()), "composition repeated");
        }
        assert_eq!(seen.len(), expected);
        for comp in &seen {
            assert_eq!(comp.iter().sum::<usize>(), k);
            assert!(comp.iter().all(|&a| a >= 1));
        }
    }

    #[test]
    fn every_transition_is_a_single_unit_move() {
        let mut maker = CompositionMaker::new(7, 4);
        let mut prev = maker.current().to_vec();
        while maker.advance() {
            let delta = maker.delta().expect("delta after advance");
            let current = maker.current().to_vec();
            let recomputed = single_unit_delta(&prev, &current).expect("single unit move");
            assert_eq!(delta, recomputed);
            prev = current;
        }
    }

    #[test]
    fn first_composition_matches_spec() {
        let maker = CompositionMaker::new(5, 2);
        assert_eq!(maker.current(), &[1, 4]);
    }

    #[test]
    fn s_equals_k_all_ones() {
        let maker = CompositionMaker::new(4, 4);
        assert_eq!(maker.total(), 1);
        assert_eq!(maker.current(), &[1, 1, 1, 1]);
    }
}
