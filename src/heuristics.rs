//! Ordering heuristics consulted by the search: which slot to fill next, and which of its words to
//! try first. Nothing here modifies the domain store.

use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::arc_consistency::{count_supports, glyph_counts_at};
use crate::assignment::Assignment;
use crate::dictionary::{Dictionary, WordId};
use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId};
use crate::MAX_SLOT_LENGTH;

/// How many of this slot's crossing slots are still unfilled?
pub fn unassigned_degree(config: &GridConfig, assignment: &Assignment, slot_id: SlotId) -> usize {
    config
        .neighbors(slot_id)
        .iter()
        .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
        .count()
}

/// Choose the next slot to fill: the unassigned slot with the fewest remaining options (MRV),
/// breaking ties by the most unfilled crossings, then by lowest slot id.
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    config
        .slot_ids()
        .filter(|&slot_id| !assignment.contains(slot_id))
        .min_by_key(|&slot_id| {
            (
                domains.len(slot_id),
                Reverse(unassigned_degree(config, assignment, slot_id)),
                slot_id,
            )
        })
}

/// For a candidate word, how many options would it rule out across the unfilled crossing slots?
/// An option is ruled out if it disagrees on the shared cell or is the same word.
fn count_ruled_out(
    dictionary: &Dictionary,
    domains: &Domains,
    word_id: WordId,
    neighbors: &[(SlotId, (usize, usize), HashMap<char, u32>)],
) -> usize {
    neighbors
        .iter()
        .map(|&(neighbor_id, overlap, ref neighbor_counts)| {
            let supports =
                count_supports(dictionary, domains, word_id, overlap, neighbor_id, neighbor_counts);
            domains.len(neighbor_id) - supports as usize
        })
        .sum()
}

/// Return the slot's remaining options ordered so that the ones ruling out the fewest options for
/// unfilled crossing slots come first (LCV). Ties keep the domain store's order.
pub fn order_domain_values(
    config: &GridConfig,
    dictionary: &Dictionary,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let neighbors: SmallVec<[(SlotId, (usize, usize), HashMap<char, u32>); MAX_SLOT_LENGTH]> =
        config
            .neighbors(slot_id)
            .iter()
            .filter(|&&neighbor_id| !assignment.contains(neighbor_id))
            .filter_map(|&neighbor_id| {
                let overlap = config.overlap(slot_id, neighbor_id)?;
                let counts = glyph_counts_at(dictionary, domains, neighbor_id, overlap.1);
                Some((neighbor_id, overlap, counts))
            })
            .collect();

    let mut scored: Vec<(usize, WordId)> = domains
        .options(slot_id)
        .map(|word_id| (count_ruled_out(dictionary, domains, word_id, &neighbors), word_id))
        .collect();
    scored.sort_by_key(|&(ruled_out, _)| ruled_out);

    scored.into_iter().map(|(_, word_id)| word_id).collect()
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::enforce_node_consistency;
    use crate::assignment::Assignment;
    use crate::dictionary::Dictionary;
    use crate::domains::Domains;
    use crate::grid_config::{generate_grid_config_from_template_string, GridConfig};
    use crate::heuristics::{order_domain_values, select_unassigned_slot, unassigned_degree};

    /// ...
    /// .#.
    /// ...
    fn ring_grid() -> GridConfig {
        generate_grid_config_from_template_string(
            "
            ...
            .#.
            ...
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_select_prefers_fewest_options() {
        let config = ring_grid();
        let dictionary = Dictionary::new(["abc", "cde", "efg", "ghi"]);
        let mut domains = Domains::new(&config, &dictionary);
        enforce_node_consistency(&config, &dictionary, &mut domains);
        let assignment = Assignment::new(config.slot_count());

        // Every slot has four options and two crossings, so the lowest id wins.
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(0));

        domains.eliminate(3, 0);
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(3));
    }

    #[test]
    fn test_select_breaks_ties_by_unfilled_crossings() {
        let config = ring_grid();
        let dictionary = Dictionary::new(["abc", "cde", "efg", "ghi"]);
        let mut domains = Domains::new(&config, &dictionary);
        enforce_node_consistency(&config, &dictionary, &mut domains);
        let mut assignment = Assignment::new(config.slot_count());

        // Filling the top row leaves the bottom row with more unfilled crossings than either
        // column.
        assignment.insert(0, 0);
        assert_eq!(unassigned_degree(&config, &assignment, 1), 2);
        assert_eq!(unassigned_degree(&config, &assignment, 2), 1);
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(1));

        domains.eliminate(3, 1);
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), Some(3));

        for slot_id in 1..4 {
            assignment.insert(slot_id, slot_id);
        }
        assert_eq!(select_unassigned_slot(&config, &domains, &assignment), None);
    }

    #[test]
    fn test_order_domain_values_puts_least_constraining_first() {
        // Slot 0 is the top row and slot 2 is the left column; they share the top-left cell.
        let config = ring_grid();
        let dictionary = Dictionary::new(["bag", "bat", "bee", "zoo", "bot"]);
        let mut domains = Domains::new(&config, &dictionary);
        enforce_node_consistency(&config, &dictionary, &mut domains);
        let assignment = Assignment::new(config.slot_count());
        let before = domains.snapshot();

        let ordered: Vec<_> = order_domain_values(&config, &dictionary, &domains, &assignment, 0)
            .into_iter()
            .map(|word_id| dictionary.word(word_id).string.as_str())
            .collect();

        // No other word starts with "z" and no word starts with "o", so "zoo" rules out every
        // option in both columns.
        assert_eq!(ordered.last(), Some(&"zoo"));
        assert_eq!(ordered.len(), 5);
        assert_eq!(domains.snapshot(), before, "ordering must not prune domains");
    }

    #[test]
    fn test_order_domain_values_counts_identical_words() {
        let config = generate_grid_config_from_template_string(
            "
            ...
            .##
            .##
            ",
        )
        .unwrap();
        let dictionary = Dictionary::new(["aaa", "abc"]);
        let mut domains = Domains::new(&config, &dictionary);
        enforce_node_consistency(&config, &dictionary, &mut domains);
        let assignment = Assignment::new(config.slot_count());

        // Either choice for the across slot rules out exactly itself in the down slot, so ties
        // keep dictionary order.
        assert_eq!(order_domain_values(&config, &dictionary, &domains, &assignment, 0), vec![0, 1]);

        let mut assignment = assignment;
        assignment.insert(1, 0);
        assert_eq!(
            order_domain_values(&config, &dictionary, &domains, &assignment, 0),
            vec![0, 1],
            "filled crossings aren't counted",
        );
    }
}
