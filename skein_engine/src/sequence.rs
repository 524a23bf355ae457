//! Text-sequencing primitive.
//!
//! A [`TextSequence`] holds a list of entries and an advance strategy that
//! decides which entry each call produces. Sequences are registered on the
//! world by key and referenced from chains, so their cursor state stays
//! plain serializable data for the snapshot collaborator.

use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

/// How a [`TextSequence`] picks its next entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SequenceStrategy {
    /// Always the first entry.
    Single,
    /// Advance one entry per call, wrapping back to the start.
    Cyclic,
    /// A random entry per call.
    Random,
    /// Advance one entry per call, then stick at the last.
    Paged,
}

/// An ordered set of text entries with an advance strategy and a cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSequence {
    pub entries: Vec<String>,
    pub strategy: SequenceStrategy,
    pub cursor: usize,
}

impl TextSequence {
    pub fn new<S: Into<String>>(strategy: SequenceStrategy, entries: Vec<S>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            strategy,
            cursor: 0,
        }
    }

    /// Produce the next entry per the strategy, advancing the cursor.
    /// Returns `None` only when the sequence has no entries.
    pub fn next_text(&mut self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        match self.strategy {
            SequenceStrategy::Single => self.entries.first().cloned(),
            SequenceStrategy::Cyclic => {
                let text = self.entries.get(self.cursor % self.entries.len()).cloned();
                self.cursor = (self.cursor + 1) % self.entries.len();
                text
            },
            SequenceStrategy::Random => {
                let mut rng = rand::rng();
                self.entries.choose(&mut rng).cloned()
            },
            SequenceStrategy::Paged => {
                let index = self.cursor.min(self.entries.len() - 1);
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
                self.entries.get(index).cloned()
            },
        }
    }

    /// Rewind the cursor to the first entry.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(strategy: SequenceStrategy) -> TextSequence {
        TextSequence::new(strategy, vec!["one", "two", "three"])
    }

    #[test]
    fn single_repeats_first_entry() {
        let mut s = seq(SequenceStrategy::Single);
        assert_eq!(s.next_text().as_deref(), Some("one"));
        assert_eq!(s.next_text().as_deref(), Some("one"));
    }

    #[test]
    fn cyclic_wraps_around() {
        let mut s = seq(SequenceStrategy::Cyclic);
        assert_eq!(s.next_text().as_deref(), Some("one"));
        assert_eq!(s.next_text().as_deref(), Some("two"));
        assert_eq!(s.next_text().as_deref(), Some("three"));
        assert_eq!(s.next_text().as_deref(), Some("one"));
    }

    #[test]
    fn paged_sticks_at_last_entry() {
        let mut s = seq(SequenceStrategy::Paged);
        assert_eq!(s.next_text().as_deref(), Some("one"));
        assert_eq!(s.next_text().as_deref(), Some("two"));
        assert_eq!(s.next_text().as_deref(), Some("three"));
        assert_eq!(s.next_text().as_deref(), Some("three"));
    }

    #[test]
    fn random_always_yields_an_entry() {
        let mut s = seq(SequenceStrategy::Random);
        for _ in 0..20 {
            let text = s.next_text().expect("entry");
            assert!(s.entries.contains(&text));
        }
    }

    #[test]
    fn empty_sequence_yields_none() {
        let mut s = TextSequence::new::<String>(SequenceStrategy::Cyclic, vec![]);
        assert_eq!(s.next_text(), None);
    }

    #[test]
    fn reset_rewinds_cursor() {
        let mut s = seq(SequenceStrategy::Paged);
        s.next_text();
        s.next_text();
        s.reset();
        assert_eq!(s.next_text().as_deref(), Some("one"));
    }
}
