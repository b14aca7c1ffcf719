//! The domain store: the live set of candidate words for each slot.
//!
//! Every elimination is recorded on a trail, so a caller can take a `Checkpoint` before exploring a
//! branch and `restore` it afterwards to get back exactly the domains it started with. This is
//! what lets the search share one store across all of its branches.

use bit_set::BitSet;
use std::fmt::{Debug, Formatter};

use crate::dictionary::{Dictionary, WordId};
use crate::grid_config::{GridConfig, SlotId};
use crate::CHECK_INVARIANTS;

/// A position on the elimination trail, returned by `Domains::checkpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

pub struct Domains {
    /// The words that can ever be considered for each slot, in ascending `WordId` order.
    options: Vec<Vec<WordId>>,

    /// For each slot, the indices (into `options`) of the words eliminated since setup.
    eliminated: Vec<BitSet>,

    /// Cached count of options not in `eliminated`, per slot.
    remaining_counts: Vec<usize>,

    /// Every elimination in the order it happened, as (slot id, option index).
    trail: Vec<(SlotId, usize)>,
}

impl Debug for Domains {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domains")
            .field("remaining_counts", &self.remaining_counts)
            .field("trail", &(["(", &self.trail.len().to_string(), " eliminations)"].join("")))
            .finish()
    }
}

impl Domains {
    /// Build a store where every slot's domain is the full dictionary.
    pub fn new(config: &GridConfig, dictionary: &Dictionary) -> Domains {
        let slot_count = config.slot_count();

        Domains {
            options: (0..slot_count).map(|_| dictionary.word_ids().collect()).collect(),
            eliminated: (0..slot_count)
                .map(|_| BitSet::with_capacity(dictionary.len()))
                .collect(),
            remaining_counts: vec![dictionary.len(); slot_count],
            trail: vec![],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.options.len()
    }

    /// How many candidates does this slot have left?
    pub fn len(&self, slot_id: SlotId) -> usize {
        self.remaining_counts[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.remaining_counts[slot_id] == 0
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        match self.options[slot_id].binary_search(&word_id) {
            Ok(option_idx) => !self.eliminated[slot_id].contains(option_idx),
            Err(_) => false,
        }
    }

    /// The remaining candidates for a slot, in ascending `WordId` order.
    pub fn options(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        let eliminated = &self.eliminated[slot_id];
        self.options[slot_id]
            .iter()
            .enumerate()
            .filter(move |(option_idx, _)| !eliminated.contains(*option_idx))
            .map(|(_, &word_id)| word_id)
    }

    /// Remove a word from a slot's domain, recording it on the trail. Returns false if the word
    /// wasn't in the domain.
    pub fn eliminate(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        let Ok(option_idx) = self.options[slot_id].binary_search(&word_id) else {
            return false;
        };

        if !self.eliminated[slot_id].insert(option_idx) {
            return false;
        }

        self.remaining_counts[slot_id] -= 1;
        self.trail.push((slot_id, option_idx));
        true
    }

    /// Permanently drop every candidate for which `keep` returns false. Unlike `eliminate`, this
    /// can't be undone, so it's only for setup work like node consistency, before any checkpoint
    /// has been taken.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        if CHECK_INVARIANTS && !self.trail.is_empty() {
            panic!("Retaining options with eliminations on the trail?");
        }

        let before = self.options[slot_id].len();
        self.options[slot_id].retain(|&word_id| keep(word_id));
        self.eliminated[slot_id].clear();
        self.remaining_counts[slot_id] = self.options[slot_id].len();

        before - self.options[slot_id].len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Undo every elimination made since the given checkpoint.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            if let Some((slot_id, option_idx)) = self.trail.pop() {
                self.eliminated[slot_id].remove(option_idx);
                self.remaining_counts[slot_id] += 1;
            }
        }
    }

    /// How many eliminations have happened since the given checkpoint?
    pub fn eliminations_since(&self, checkpoint: Checkpoint) -> usize {
        self.trail.len() - checkpoint.0
    }

    /// An owned copy of every slot's remaining candidates.
    pub fn snapshot(&self) -> Vec<Vec<WordId>> {
        (0..self.slot_count())
            .map(|slot_id| self.options(slot_id).collect())
            .collect()
    }
}
