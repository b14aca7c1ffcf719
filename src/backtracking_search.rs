//! This module implements grid filling as a depth-first backtracking search. Before searching we
//! make every slot node-consistent and the whole grid arc-consistent; during the search we pick
//! slots with the minimum-remaining-values heuristic (ties broken by unfilled crossings), try words
//! in least-constraining-value order, and, by default, maintain arc consistency after every
//! tentative choice.
//!
//! Every tentative choice is bracketed by a domain checkpoint, so whatever pruning it caused is
//! undone before the next sibling is tried.

use bit_set::BitSet;
use instant::{Duration, Instant};
use thiserror::Error;

use crate::arc_consistency::{ac3, enforce_node_consistency};
use crate::assignment::Assignment;
use crate::dictionary::{Dictionary, WordId};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::heuristics::{order_domain_values, select_unassigned_slot};
use crate::{CHECK_INVARIANTS, LOG_FILL_PROCESS};

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Number of times we picked a slot to fill.
    pub states: u64,
    /// Number of tentative choices we had to undo.
    pub backtracks: u64,
    /// Number of options pruned by inference during the search.
    pub eliminations: u64,
    pub initial_arc_consistency_time: Duration,
    pub duration: Duration,
}

/// Settings for a fill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    /// After each tentative choice, remove the word from every other unfilled slot and re-establish
    /// arc consistency among the unfilled slots. Without this, the search relies only on the
    /// consistency check against slots that are already filled.
    pub inference: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        FillOptions { inference: true }
    }
}

/// A struct representing the results of a fill operation.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub assignment: Assignment,
    pub statistics: Statistics,
}

/// The grid can't be filled from this dictionary. This is the same whether we found that out
/// while establishing initial consistency or by exhausting the search.
#[derive(Debug, Clone, Error)]
#[error("no fill exists for this grid and dictionary")]
pub struct FillFailure {
    pub statistics: Statistics,
}

/// The live state of a single fill attempt.
struct Search<'a> {
    config: &'a GridConfig,
    dictionary: &'a Dictionary,
    options: FillOptions,
    domains: Domains,
    assignment: Assignment,
    statistics: Statistics,
}

impl<'a> Search<'a> {
    /// Propagate the consequences of putting `word_id` in `slot_id`, which must already be in the
    /// assignment. Returns false if that leaves some unfilled slot without options. Any pruning is
    /// recorded on the domain trail whether or not this succeeds.
    fn infer(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        let others: Vec<WordId> = self
            .domains
            .options(slot_id)
            .filter(|&other_word_id| other_word_id != word_id)
            .collect();
        for other_word_id in others {
            self.domains.eliminate(slot_id, other_word_id);
        }

        let unassigned_slot_ids: BitSet = self
            .config
            .slot_ids()
            .filter(|&other_slot_id| !self.assignment.contains(other_slot_id))
            .collect();

        let mut arcs: Vec<(SlotId, SlotId)> = self
            .config
            .neighbors(slot_id)
            .iter()
            .filter(|&&neighbor_id| unassigned_slot_ids.contains(neighbor_id))
            .map(|&neighbor_id| (neighbor_id, slot_id))
            .collect();

        // No other slot can use this word.
        for other_slot_id in &unassigned_slot_ids {
            if !self.domains.eliminate(other_slot_id, word_id) {
                continue;
            }
            if self.domains.is_empty(other_slot_id) {
                return false;
            }
            arcs.extend(
                self.config
                    .neighbors(other_slot_id)
                    .iter()
                    .filter(|&&neighbor_id| unassigned_slot_ids.contains(neighbor_id))
                    .map(|&neighbor_id| (neighbor_id, other_slot_id)),
            );
        }

        ac3(
            self.config,
            self.dictionary,
            &mut self.domains,
            Some(arcs),
            Some(&unassigned_slot_ids),
        )
        .is_ok()
    }

    /// Extend the current assignment to a complete one if possible. On failure, the assignment and
    /// domains are exactly as they were when this was called.
    fn backtrack(&mut self) -> bool {
        let Some(slot_id) = select_unassigned_slot(self.config, &self.domains, &self.assignment)
        else {
            return true;
        };

        self.statistics.states += 1;

        let candidates = order_domain_values(
            self.config,
            self.dictionary,
            &self.domains,
            &self.assignment,
            slot_id,
        );

        for word_id in candidates {
            if !self
                .assignment
                .is_consistent_with(self.config, self.dictionary, slot_id, word_id)
            {
                continue;
            }

            let checkpoint = self.domains.checkpoint();
            let snapshot = if CHECK_INVARIANTS { Some(self.domains.snapshot()) } else { None };

            self.assignment.insert(slot_id, word_id);

            let viable = !self.options.inference || self.infer(slot_id, word_id);
            self.statistics.eliminations += self.domains.eliminations_since(checkpoint) as u64;

            if viable && self.backtrack() {
                return true;
            }

            self.assignment.remove(slot_id);
            self.domains.restore(checkpoint);
            self.statistics.backtracks += 1;

            if let Some(snapshot) = snapshot {
                if snapshot != self.domains.snapshot() {
                    panic!("Domains weren't restored after backtracking from slot {}?", slot_id);
                }
            }
        }

        false
    }
}

/// Search for a valid fill for the given grid using words from the given dictionary.
pub fn find_fill(
    config: &GridConfig,
    dictionary: &Dictionary,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = Domains::new(config, dictionary);
    enforce_node_consistency(config, dictionary, &mut domains);

    if let Some(slot_id) = config.slot_ids().find(|&slot_id| domains.is_empty(slot_id)) {
        if LOG_FILL_PROCESS {
            eprintln!("No words fit slot {}; not searching", slot_id);
        }
        statistics.duration = start.elapsed();
        return Err(FillFailure { statistics });
    }

    let initial_arc_consistency_result = ac3(config, dictionary, &mut domains, None, None);
    statistics.initial_arc_consistency_time = start.elapsed();

    match initial_arc_consistency_result {
        Ok(success) => {
            if LOG_FILL_PROCESS {
                eprintln!(
                    "Initial arc consistency removed {} options in {:?}",
                    success.eliminations, statistics.initial_arc_consistency_time,
                );
            }
        }
        Err(failure) => {
            if LOG_FILL_PROCESS {
                eprintln!(
                    "Arc consistency emptied slot {}; not searching",
                    failure.slot_id
                );
            }
            statistics.duration = start.elapsed();
            return Err(FillFailure { statistics });
        }
    }

    let mut search = Search {
        config,
        dictionary,
        options: *options,
        domains,
        assignment: Assignment::new(config.slot_count()),
        statistics,
    };

    let found = search.backtrack();
    search.statistics.duration = start.elapsed();

    if LOG_FILL_PROCESS {
        eprintln!(
            "{} {:?}",
            if found { "Found a fill:" } else { "Search exhausted:" },
            search.statistics
        );
    }

    if found {
        if CHECK_INVARIANTS && !search.assignment.is_consistent(config, dictionary) {
            panic!("Search returned an inconsistent assignment?");
        }

        Ok(FillSuccess {
            assignment: search.assignment,
            statistics: search.statistics,
        })
    } else {
        Err(FillFailure {
            statistics: search.statistics,
        })
    }
}

/// Fill the grid with the default options, returning just the assignment.
pub fn solve(config: &GridConfig, dictionary: &Dictionary) -> Result<Assignment, FillFailure> {
    find_fill(config, dictionary, &FillOptions::default()).map(|success| success.assignment)
}
