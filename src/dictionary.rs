use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the `Dictionary`'s `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let chars = string.chars().collect();
        Word { string, chars }
    }

    /// Length in chars, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// The immutable set of admissible words for a fill. Words are normalized (trimmed and lowercased)
/// and deduplicated on construction, and stored in sorted order so that `WordId`s, and therefore
/// search order, are reproducible.
#[derive(Clone)]
pub struct Dictionary {
    pub words: Vec<Word>,
}

impl Debug for Dictionary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl Dictionary {
    pub fn new<I, S>(words: I) -> Dictionary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: BTreeSet<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Dictionary {
            words: normalized.into_iter().map(Word::new).collect(),
        }
    }

    /// Build a dictionary from the contents of a word list file: one word per line. Lines may
    /// carry a score after a `;` or `,` separator, which is ignored.
    pub fn from_word_list_string(contents: &str) -> Dictionary {
        Dictionary::new(
            contents
                .lines()
                .filter_map(|line| line.split([';', ',']).next()),
        )
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn word_ids(&self) -> impl Iterator<Item = WordId> {
        0..self.words.len()
    }

    pub fn word_id(&self, string: &str) -> Option<WordId> {
        let normalized = string.trim().to_lowercase();
        self.words
            .binary_search_by(|word| word.string.as_str().cmp(&normalized))
            .ok()
    }
}
