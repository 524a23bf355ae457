//! Session registry.
//!
//! The global verb-alias, item-name, and keyword tables, held as one
//! explicit object owned by the world and torn down with it. Nothing here
//! is free-floating module state: a new session starts from an empty
//! registry and registration helpers on [`crate::world::SkeinWorld`] keep
//! it coherent with the world's contents.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::chain::ActionChain;
use crate::item::Item;
use crate::verb::Verb;

/// A global keyword: a verb-like entry dispatched directly, with no object
/// resolution. Covers directions, "inventory", "debug …" and the like.
#[derive(Debug, Clone)]
pub struct Keyword {
    /// Canonical name, lower-cased and trimmed.
    pub name: String,
    pub aliases: Vec<String>,
    /// Keywords that want trailing arguments are dispatched even when more
    /// tokens follow; the trailing tokens arrive as context args.
    pub takes_args: bool,
    pub actions: ActionChain,
}

impl Keyword {
    pub fn new(name: &str, actions: ActionChain) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            aliases: Vec::new(),
            takes_args: false,
            actions,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.trim().to_lowercase());
        self
    }

    pub fn with_args(mut self) -> Self {
        self.takes_args = true;
        self
    }
}

/// Per-session lookup tables used by the parser.
#[derive(Debug, Default, Clone)]
pub struct SessionRegistry {
    /// alias (or canonical name) → canonical verb name.
    verb_aliases: HashMap<String, String>,
    /// All canonical verb names seen so far.
    canonical_verbs: HashSet<String>,
    /// Every item name and alias → ids of items registered under it,
    /// world-wide. Lets the parser distinguish "it isn't here" from
    /// "nothing by that name exists".
    item_names: HashMap<String, HashSet<Uuid>>,
    /// keyword alias → keyword.
    keywords: HashMap<String, Keyword>,
}

impl SessionRegistry {
    /// Register a verb's canonical name and aliases in the global alias
    /// table. A canonical name is never overwritten by another verb's
    /// alias; plain alias collisions resolve last-registered-wins.
    pub fn register_verb_names(&mut self, verb: &Verb) {
        self.canonical_verbs.insert(verb.name.clone());
        self.verb_aliases.insert(verb.name.clone(), verb.name.clone());
        for alias in &verb.aliases {
            if self.canonical_verbs.contains(alias) && alias != &verb.name {
                warn!("alias '{alias}' for verb '{}' shadows a canonical verb name; skipped", verb.name);
                continue;
            }
            if let Some(previous) = self.verb_aliases.insert(alias.clone(), verb.name.clone()) {
                debug!("alias '{alias}' re-registered: '{previous}' -> '{}'", verb.name);
            }
        }
        info!("verb '{}' registered with {} alias(es)", verb.name, verb.aliases.len());
    }

    /// Register all of an item's names so the parser can recognize them
    /// even when the item is out of scope.
    pub fn register_item_names(&mut self, item: &Item) {
        self.item_names.entry(item.name.to_lowercase()).or_default().insert(item.id);
        for alias in &item.aliases {
            self.item_names.entry(alias.to_lowercase()).or_default().insert(item.id);
        }
    }

    pub fn register_keyword(&mut self, keyword: Keyword) {
        for alias in keyword.aliases.clone() {
            self.keywords.insert(alias, keyword.clone());
        }
        info!("keyword '{}' registered", keyword.name);
        self.keywords.insert(keyword.name.clone(), keyword);
    }

    /// Canonical verb name for a span, if the span is a known verb or alias.
    pub fn canonical_verb(&self, span: &str) -> Option<&str> {
        self.verb_aliases.get(span).map(String::as_str)
    }

    pub fn keyword(&self, span: &str) -> Option<&Keyword> {
        self.keywords.get(span)
    }

    /// True if any item anywhere in the world answers to this name.
    pub fn knows_item_name(&self, span: &str) -> bool {
        self.item_names.get(span).is_some_and(|ids| !ids.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_resolves_to_itself() {
        let mut registry = SessionRegistry::default();
        registry.register_verb_names(&Verb::new("take"));
        assert_eq!(registry.canonical_verb("take"), Some("take"));
    }

    #[test]
    fn aliases_resolve_to_canonical_name() {
        let mut registry = SessionRegistry::default();
        registry.register_verb_names(&Verb::new("take").with_alias("grab").with_alias("pick up"));
        assert_eq!(registry.canonical_verb("grab"), Some("take"));
        assert_eq!(registry.canonical_verb("pick up"), Some("take"));
        assert_eq!(registry.canonical_verb("steal"), None);
    }

    #[test]
    fn alias_collision_last_registered_wins() {
        let mut registry = SessionRegistry::default();
        registry.register_verb_names(&Verb::new("take").with_alias("get"));
        registry.register_verb_names(&Verb::new("fetch").with_alias("get"));
        assert_eq!(registry.canonical_verb("get"), Some("fetch"));
    }

    #[test]
    fn alias_never_shadows_canonical_name() {
        let mut registry = SessionRegistry::default();
        registry.register_verb_names(&Verb::new("take"));
        registry.register_verb_names(&Verb::new("pilfer").with_alias("take"));
        assert_eq!(registry.canonical_verb("take"), Some("take"));
    }

    #[test]
    fn item_names_track_all_aliases() {
        let mut registry = SessionRegistry::default();
        let item = Item::new("Rusty Iron Key", "a key").with_alias("key");
        registry.register_item_names(&item);
        assert!(registry.knows_item_name("rusty iron key"));
        assert!(registry.knows_item_name("key"));
        assert!(!registry.knows_item_name("sword"));
    }

    #[test]
    fn keywords_found_by_name_and_alias() {
        let mut registry = SessionRegistry::default();
        registry.register_keyword(Keyword::new("inventory", ActionChain::text("You carry nothing.")).with_alias("inv"));
        assert!(registry.keyword("inventory").is_some());
        assert!(registry.keyword("inv").is_some());
        assert!(registry.keyword("pockets").is_none());
    }
}
