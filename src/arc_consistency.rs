//! This module contains node consistency and a crossword-specific implementation of the AC-3
//! algorithm. For our purposes, a set of domains is arc-consistent when every option for every slot
//! has, in each crossing slot, at least one option that puts the same letter in the shared cell
//! and is not the same word.
//!
//! All eliminations go through the `Domains` trail, so the effects of a call can be rolled back by
//! restoring a checkpoint taken beforehand.

use bit_set::BitSet;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::dictionary::{Dictionary, WordId};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::LOG_FILL_PROCESS;

/// Result from a successful call to `ac3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many words were removed across all slots.
    pub eliminations: usize,
}

/// Result from a failed call to `ac3`: the slot whose domain was wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Drop every option that can't fit its slot on its own: words of the wrong length and words that
/// disagree with a letter given in the grid. Returns the number of options removed.
pub fn enforce_node_consistency(
    config: &GridConfig,
    dictionary: &Dictionary,
    domains: &mut Domains,
) -> usize {
    let mut removed = 0;

    for slot_config in &config.slot_configs {
        removed += domains.retain(slot_config.id, |word_id| {
            let word = dictionary.word(word_id);

            word.len() == slot_config.length
                && word
                    .chars
                    .iter()
                    .zip(&slot_config.fill)
                    .all(|(&glyph, &given)| given.map_or(true, |given| given == glyph))
        });

        if LOG_FILL_PROCESS && domains.is_empty(slot_config.id) {
            eprintln!(
                "Slot {} ({:?} at {:?}, length {}) has no options after node consistency",
                slot_config.id, slot_config.direction, slot_config.start_cell, slot_config.length,
            );
        }
    }

    removed
}

/// Count how many of a slot's remaining options put each glyph in the given cell.
pub(crate) fn glyph_counts_at(
    dictionary: &Dictionary,
    domains: &Domains,
    slot_id: SlotId,
    cell_idx: usize,
) -> HashMap<char, u32> {
    let mut counts: HashMap<char, u32> = HashMap::new();

    for word_id in domains.options(slot_id) {
        if let Some(&glyph) = dictionary.word(word_id).chars.get(cell_idx) {
            *counts.entry(glyph).or_insert(0) += 1;
        }
    }

    counts
}

/// How many options of slot `y` are compatible with `word_id` placed in slot `x`, where the slots
/// cross at `(ix, iy)` and `y_counts` are the glyph counts for `y`'s cell `iy`? The word doesn't
/// count as supporting itself, since two slots can't hold the same word.
pub(crate) fn count_supports(
    dictionary: &Dictionary,
    domains: &Domains,
    word_id: WordId,
    (ix, iy): (usize, usize),
    y: SlotId,
    y_counts: &HashMap<char, u32>,
) -> u32 {
    let word = dictionary.word(word_id);
    let Some(&glyph) = word.chars.get(ix) else {
        return 0;
    };

    let supports = y_counts.get(&glyph).copied().unwrap_or(0);
    if word.chars.get(iy) == Some(&glyph) && domains.contains(y, word_id) {
        supports - 1
    } else {
        supports
    }
}

/// Make slot `x` arc-consistent with slot `y`, removing every option of `x` with no supporting
/// option in `y`. Returns whether anything was removed. Slots that don't cross impose no
/// constraint on each other, so this is a no-op for them.
pub fn revise(
    config: &GridConfig,
    dictionary: &Dictionary,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some(overlap) = config.overlap(x, y) else {
        return false;
    };

    let unsupported: Vec<WordId> = {
        let domains: &Domains = domains;
        let y_counts = glyph_counts_at(dictionary, domains, y, overlap.1);

        domains
            .options(x)
            .filter(|&word_id| {
                count_supports(dictionary, domains, word_id, overlap, y, &y_counts) == 0
            })
            .collect()
    };

    for &word_id in &unsupported {
        domains.eliminate(x, word_id);
    }

    !unsupported.is_empty()
}

/// Work queue of arcs for `ac3`. An arc that's already waiting isn't queued twice.
#[derive(Debug, Default)]
struct ArcQueue {
    queue: VecDeque<(SlotId, SlotId)>,
    queued: HashSet<(SlotId, SlotId)>,
}

impl ArcQueue {
    fn enqueue(&mut self, arc: (SlotId, SlotId)) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }

    fn pop_front(&mut self) -> Option<(SlotId, SlotId)> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }
}

/// Run AC-3 until no more eliminations are possible or some slot runs out of options.
///
/// `initial_arcs` defaults to every ordered pair of crossing slots. If `active_slot_ids` is given,
/// only those slots have their domains revised; the rest (typically slots that already have a
/// word) still constrain their neighbors but are never changed.
///
/// On failure the domains are left partially pruned; callers restore a checkpoint to undo that.
pub fn ac3(
    config: &GridConfig,
    dictionary: &Dictionary,
    domains: &mut Domains,
    initial_arcs: Option<Vec<(SlotId, SlotId)>>,
    active_slot_ids: Option<&BitSet>,
) -> ArcConsistencyResult {
    let start = domains.checkpoint();
    let is_active = |slot_id: SlotId| active_slot_ids.map_or(true, |ids| ids.contains(slot_id));

    let mut queue = ArcQueue::default();
    match initial_arcs {
        Some(arcs) => arcs.into_iter().for_each(|arc| queue.enqueue(arc)),
        None => config.arcs().for_each(|arc| queue.enqueue(arc)),
    }

    while let Some((x, y)) = queue.pop_front() {
        if !is_active(x) || !revise(config, dictionary, domains, x, y) {
            continue;
        }

        if domains.is_empty(x) {
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        for &z in config.neighbors(x) {
            if z != y && is_active(z) {
                queue.enqueue((z, x));
            }
        }
    }

    Ok(ArcConsistencySuccess {
        eliminations: domains.eliminations_since(start),
    })
}
