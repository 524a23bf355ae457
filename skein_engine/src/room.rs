//! Room type.
//!
//! Rooms scope what the parser can see and may register their own verbs
//! (invoked directly, with no object resolution, when a bare verb span is
//! the whole input). Rooms are otherwise data for the content modules.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::verb::Verb;

/// One location in the world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Ids of items presently in this room.
    pub contents: HashSet<Uuid>,
    /// Room-level verbs, rebuilt at session init like item verbs.
    #[serde(skip)]
    pub verbs: HashMap<String, Verb>,
}

impl Room {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.verbs.insert(verb.name.clone(), verb);
        self
    }

    /// Find a room verb answering to `span` (already lower-cased).
    pub fn verb_for_span(&self, span: &str) -> Option<&Verb> {
        self.verbs.values().find(|v| v.answers_to(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ActionChain;

    #[test]
    fn verb_for_span_matches_aliases() {
        let room = Room::new("Chapel", "A quiet chapel.")
            .with_verb(Verb::new("pray").with_alias("kneel").on_success(ActionChain::text("You pray.")));
        assert!(room.verb_for_span("pray").is_some());
        assert!(room.verb_for_span("kneel").is_some());
        assert!(room.verb_for_span("sing").is_none());
    }
}
