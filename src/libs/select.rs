//! Greedy choice of non-overlapping tiles closest to a target free energy.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::libs::tile::{GibbsTile, SplitTile, Tile};

/// Anything the selector can rank: a positioned tile with a ΔG.
pub trait Candidate {
    fn tile(&self) -> &Tile;
    fn gibbs(&self) -> f64;
}

impl Candidate for GibbsTile {
    fn tile(&self) -> &Tile {
        GibbsTile::tile(self)
    }

    fn gibbs(&self) -> f64 {
        GibbsTile::gibbs(self)
    }
}

impl Candidate for SplitTile {
    fn tile(&self) -> &Tile {
        SplitTile::tile(self)
    }

    fn gibbs(&self) -> f64 {
        SplitTile::gibbs(self)
    }
}

/// Heap key: distance to the target, then start, then input position.
#[derive(Debug, Clone, Copy)]
struct Rank {
    distance: f64,
    start: usize,
    index: usize,
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rank {}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.start.cmp(&other.start))
            .then(self.index.cmp(&other.index))
    }
}

/// Picks up to `max_probes` mutually non-overlapping candidates.
///
/// Candidates are visited by increasing `|gibbs - target_gibbs|`, ties going
/// to the earliest start. A candidate overlapping anything already chosen is
/// dropped. This is a greedy packing: it does not maximise the number of
/// probes nor the summed deviation.
///
/// The result is in selection order, best first.
pub fn select<C: Candidate>(candidates: Vec<C>, target_gibbs: f64, max_probes: usize) -> Vec<C> {
    let mut queue: BinaryHeap<Reverse<Rank>> = candidates
        .iter()
        .enumerate()
        .map(|(index, c)| {
            Reverse(Rank {
                distance: (c.gibbs() - target_gibbs).abs(),
                start: c.tile().start(),
                index,
            })
        })
        .collect();

    let mut slots: Vec<Option<C>> = candidates.into_iter().map(Some).collect();
    let mut chosen: Vec<C> = Vec::new();

    while chosen.len() < max_probes {
        let Some(Reverse(rank)) = queue.pop() else {
            break;
        };
        let Some(candidate) = slots[rank.index].take() else {
            continue;
        };

        if chosen.iter().all(|c| !c.tile().overlaps(candidate.tile())) {
            chosen.push(candidate);
        }
    }

    chosen
}

/// Selected candidates re-ordered along the target.
pub fn by_position<C: Candidate>(mut selected: Vec<C>) -> Vec<C> {
    selected.sort_by_key(|c| c.tile().start());
    selected
}
