//! Ensemble voting: similarity clustering plus weighted consensus.
//!
//! The quality-maximizing merge path. Candidates from every succeeding
//! backend are clustered by kind, span overlap, and content similarity;
//! each cluster is scored by the normalized weight of the backends that
//! contributed to it; low-agreement clusters are dropped and survivors are
//! represented by their most confident member with a consensus-boosted
//! priority.
//!
//! The whole pass is deterministic for fixed inputs and weights: candidates
//! are processed in a total order, clustering is union-find (merge order
//! cannot change the partition), and every tie-break ends at the source
//! backend id.

use std::collections::{BTreeMap, HashMap};

use crate::config::ClusterParams;
use crate::description::Description;
use crate::similarity::token_set_similarity;

/// Priority boost per unit of consensus, shared by all callers.
pub const BOOST_FACTOR: f64 = 0.5;

/// A transient cluster of agreeing candidates. Never leaves this module;
/// its winning member becomes the representative [`Description`].
struct EnsembleGroup {
    members: Vec<usize>,
    consensus_score: f64,
}

/// Cluster candidates across backends and reduce each surviving cluster to
/// one consensus-scored representative.
///
/// `weights` must hold the raw weight of every backend that ran to
/// completion (including those that returned zero candidates); failed and
/// timed-out backends must already be excluded. Weights are normalized so
/// the succeeding backends sum to 1.0. If the weight sum is zero there is
/// nothing to normalize against and the vote short-circuits to empty.
#[must_use]
pub fn vote(
    per_backend_raw: &HashMap<String, Vec<Description>>,
    weights: &HashMap<String, f64>,
    consensus_threshold: f64,
    params: &ClusterParams,
) -> Vec<Description> {
    let denominator: f64 = weights.values().sum();
    if denominator <= 0.0 {
        return Vec::new();
    }

    // Flatten, keeping only candidates whose backend has a known weight,
    // then impose a total order so clustering input is deterministic.
    let mut candidates: Vec<&Description> = per_backend_raw
        .iter()
        .filter(|(id, _)| weights.contains_key(*id))
        .flat_map(|(_, descs)| descs.iter())
        .collect();
    candidates.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.char_length.cmp(&b.char_length))
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.content.cmp(&b.content))
    });

    if candidates.is_empty() {
        return Vec::new();
    }

    // Union-find merge: same kind, and either span overlap or content
    // similarity above the configured thresholds.
    let mut dsu = DisjointSet::new(candidates.len());
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if same_passage(candidates[i], candidates[j], params) {
                dsu.union(i, j);
            }
        }
    }

    // BTreeMap keyed by root index keeps group iteration deterministic.
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..candidates.len() {
        groups.entry(dsu.find(i)).or_default().push(i);
    }

    let mut winners: Vec<Description> = Vec::new();
    for members in groups.into_values() {
        let group = score_group(members, &candidates, weights, denominator);
        if group.consensus_score < consensus_threshold {
            continue;
        }

        let rep_idx = representative(&group.members, &candidates);
        let mut rep = candidates[rep_idx].clone();
        rep.priority = rep.kind.base_priority() + group.consensus_score * BOOST_FACTOR;
        winners.push(rep);
    }

    winners.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.position.cmp(&b.position))
    });
    winners
}

fn same_passage(a: &Description, b: &Description, params: &ClusterParams) -> bool {
    a.kind == b.kind
        && (a.overlap_ratio(b) > params.position_overlap
            || token_set_similarity(&a.content, &b.content) > params.token_similarity)
}

/// Consensus = normalized weight sum over the distinct backends that
/// contributed a member. Floating-point sums can creep past 1.0; cap it.
fn score_group(
    members: Vec<usize>,
    candidates: &[&Description],
    weights: &HashMap<String, f64>,
    denominator: f64,
) -> EnsembleGroup {
    let mut contributing: Vec<&str> = members
        .iter()
        .map(|&i| candidates[i].source.as_str())
        .collect();
    contributing.sort_unstable();
    contributing.dedup();

    let raw: f64 = contributing
        .iter()
        .filter_map(|id| weights.get(*id))
        .sum();

    EnsembleGroup {
        members,
        consensus_score: (raw / denominator).min(1.0),
    }
}

/// Winning member: highest confidence, then longer content, then smaller
/// source id.
fn representative(members: &[usize], candidates: &[&Description]) -> usize {
    let mut best = members[0];
    for &idx in &members[1..] {
        let cand = candidates[idx];
        let cur = candidates[best];
        let better = cand
            .confidence
            .partial_cmp(&cur.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| cand.char_length.cmp(&cur.char_length))
            .then_with(|| cur.source.cmp(&cand.source))
            .is_gt();
        if better {
            best = idx;
        }
    }
    best
}

/// Path-compressed disjoint set over candidate indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            let root = self.find(self.parent[i]);
            self.parent[i] = root;
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Smaller root wins so the partition is order-independent.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
