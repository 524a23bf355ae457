//! Item types.
//!
//! Items are the objects the parser resolves player input against. Each
//! carries a canonical name, aliases, a verb map (authoritative for
//! dispatch), a container reference via its [`Location`], and a visibility
//! flag. Names and aliases are also registered globally so the parser can
//! tell "exists somewhere" from "does not exist at all".

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::verb::Verb;
use crate::world::Location;

/// Anything the player can name and act on.
///
/// The `verbs` map holds live capability definitions (including `fn`
/// pointers), so it is rebuilt at session init rather than snapshotted;
/// everything mutable about an item is plain data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    /// Canonical display name.
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    /// Where the item currently is; `Location::Item` is its container reference.
    pub location: Location,
    /// Ids of items held inside this one.
    pub contents: HashSet<Uuid>,
    /// Hidden items are skipped by the parser's visible-scope search.
    pub visible: bool,
    /// Verb-name → verb. Authoritative for dispatch.
    #[serde(skip)]
    pub verbs: HashMap<String, Verb>,
}

impl Item {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.verbs.insert(verb.name.clone(), verb);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// True if `span` (already lower-cased) names this item exactly, by
    /// canonical name or alias.
    pub fn matches(&self, span: &str) -> bool {
        self.name.to_lowercase() == span || self.aliases.iter().any(|a| a.to_lowercase() == span)
    }

    /// True if this item exposes the (canonical) verb.
    pub fn supports(&self, verb: &str) -> bool {
        self.verbs.contains_key(verb)
    }
}
