use crate::dictionary::{Dictionary, WordId};
use crate::grid_config::{GridConfig, SlotId};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words, indexed by `SlotId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { words: vec![None; slot_count], assigned_count: 0 }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words[slot_id]
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.words[slot_id].is_some()
    }

    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) {
        if self.words[slot_id].replace(word_id).is_none() {
            self.assigned_count += 1;
        }
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        let removed = self.words[slot_id].take();
        if removed.is_some() {
            self.assigned_count -= 1;
        }
        removed
    }

    /// Number of slots with a word.
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.words.len()
    }

    pub fn choices(&self) -> impl Iterator<Item = Choice> + '_ {
        self.words.iter().enumerate().filter_map(|(slot_id, word_id)| {
            word_id.map(|word_id| Choice { slot_id, word_id })
        })
    }

    /// The assigned word for a slot, as a string.
    pub fn word<'a>(&self, dictionary: &'a Dictionary, slot_id: SlotId) -> Option<&'a str> {
        self.get(slot_id).map(|word_id| dictionary.word(word_id).string.as_str())
    }

    /// Could `word_id` be added to this assignment for `slot_id` without breaking any constraint?
    /// Checks length, distinctness against every other assigned slot, and agreement with every
    /// assigned crossing slot. The slot's own current value, if any, is ignored.
    pub fn is_consistent_with(
        &self,
        config: &GridConfig,
        dictionary: &Dictionary,
        slot_id: SlotId,
        word_id: WordId,
    ) -> bool {
        let word = dictionary.word(word_id);
        if word.len() != config.slot_configs[slot_id].length {
            return false;
        }

        let is_duplicate = self
            .choices()
            .any(|choice| choice.slot_id != slot_id && choice.word_id == word_id);
        if is_duplicate {
            return false;
        }

        config.neighbors(slot_id).iter().all(|&neighbor_id| {
            match (self.get(neighbor_id), config.overlap(slot_id, neighbor_id)) {
                (Some(neighbor_word_id), Some((cell_idx, neighbor_cell_idx))) => {
                    word.chars[cell_idx] == dictionary.word(neighbor_word_id).chars[neighbor_cell_idx]
                }
                _ => true,
            }
        })
    }

    /// Does every assigned slot satisfy every constraint?
    pub fn is_consistent(&self, config: &GridConfig, dictionary: &Dictionary) -> bool {
        self.choices().all(|choice| {
            self.is_consistent_with(config, dictionary, choice.slot_id, choice.word_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::assignment::{Assignment, Choice};
    use crate::dictionary::Dictionary;
    use crate::grid_config::generate_grid_config_from_template_string;

    /// ...
    /// .##
    /// .##
    fn corner_grid() -> crate::grid_config::GridConfig {
        generate_grid_config_from_template_string(
            "
            ...
            .##
            .##
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_bookkeeping() {
        let mut assignment = Assignment::new(2);
        assert!(assignment.is_empty());

        assignment.insert(1, 7);
        assignment.insert(1, 8);
        assert_eq!(assignment.len(), 1);
        assert!(!assignment.is_complete());
        assert_eq!(assignment.choices().collect::<Vec<_>>(), vec![Choice { slot_id: 1, word_id: 8 }]);

        assignment.insert(0, 3);
        assert!(assignment.is_complete());
        assert_eq!(assignment.remove(1), Some(8));
        assert_eq!(assignment.remove(1), None);
        assert_eq!(assignment.len(), 1);
    }

    #[test]
    fn test_consistency_checks() {
        let config = corner_grid();
        let dictionary = Dictionary::new(["cat", "cow", "dog", "to"]);
        let id = |word: &str| dictionary.word_id(word).unwrap();

        let mut assignment = Assignment::new(config.slot_count());
        assignment.insert(0, id("cat"));

        // Wrong length.
        assert!(!assignment.is_consistent_with(&config, &dictionary, 1, id("to")));
        // Duplicate word.
        assert!(!assignment.is_consistent_with(&config, &dictionary, 1, id("cat")));
        // Crossing letter mismatch.
        assert!(!assignment.is_consistent_with(&config, &dictionary, 1, id("dog")));
        assert!(assignment.is_consistent_with(&config, &dictionary, 1, id("cow")));

        assignment.insert(1, id("cow"));
        assert!(assignment.is_consistent(&config, &dictionary));
        assert_eq!(assignment.word(&dictionary, 1), Some("cow"));

        assignment.insert(1, id("dog"));
        assert!(!assignment.is_consistent(&config, &dictionary));
    }
}
