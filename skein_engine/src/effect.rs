//! Effect table.
//!
//! Effects override, precede, or follow a verb's normal behavior for a
//! specific or wildcard item pairing. They are registered once at
//! game-setup time and only looked up afterwards; interception happens one
//! layer above raw verb dispatch, when the runner resolves a
//! [`VerbAttempt`].

use std::collections::HashMap;

use log::{debug, warn};

use crate::chain::{ActionChain, Chainable};
use crate::verb::VerbAttempt;

/// How an effect relates to the verb's own chains.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EffectRelation {
    /// The effect's actions run in place of the verb entirely.
    Instead,
    /// The effect's actions run first; the verb's own chain still runs
    /// (regardless of the effect's success flag) unless `continue_verb`
    /// is false.
    Before,
    /// The verb's chain runs first; the effect only follows if the verb's
    /// chain actually succeeded.
    After,
}

/// One slot of an effect key: a literal item name or a match-any wildcard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectSlot {
    Name(String),
    Any,
}

impl EffectSlot {
    pub fn name(name: &str) -> Self {
        EffectSlot::Name(name.trim().to_lowercase())
    }
}

/// Lookup key: (primary item or wildcard, secondary item or wildcard, verb name).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EffectKey {
    pub primary: EffectSlot,
    pub secondary: EffectSlot,
    pub verb: String,
}

impl EffectKey {
    pub fn new(primary: EffectSlot, secondary: EffectSlot, verb: &str) -> Self {
        Self {
            primary,
            secondary,
            verb: verb.trim().to_lowercase(),
        }
    }
}

/// A registered override / supplement to a verb's normal behavior.
#[derive(Clone, Debug)]
pub struct Effect {
    pub relation: EffectRelation,
    /// Reported success of the effect's action sequence.
    pub successful: bool,
    /// For `Before`: whether the verb's own chain still runs afterward.
    pub continue_verb: bool,
    pub actions: ActionChain,
}

impl Effect {
    pub fn new(relation: EffectRelation, actions: ActionChain) -> Self {
        Self {
            relation,
            successful: true,
            continue_verb: true,
            actions,
        }
    }

    pub fn unsuccessful(mut self) -> Self {
        self.successful = false;
        self
    }

    pub fn stop_verb(mut self) -> Self {
        self.continue_verb = false;
        self
    }
}

/// All registered effects for a session, immutable after setup.
#[derive(Debug, Default, Clone)]
pub struct EffectTable {
    entries: HashMap<EffectKey, Effect>,
}

impl EffectTable {
    /// Register an effect. Re-registering the same key replaces the earlier
    /// entry; that only happens from miswired setup code, so it is logged.
    pub fn register(&mut self, key: EffectKey, effect: Effect) {
        if self.entries.insert(key.clone(), effect).is_some() {
            warn!("effect for {key:?} replaced an earlier registration");
        }
    }

    /// Find the single effect matching this dispatch, most specific first:
    /// (primary, secondary) > (primary, *) > (*, secondary) > (*, *).
    /// An absent secondary item only matches wildcard secondary slots.
    pub fn lookup(&self, primary: &str, secondary: Option<&str>, verb: &str) -> Option<&Effect> {
        let verb = verb.trim().to_lowercase();
        let primary = EffectSlot::name(primary);
        let secondary = secondary.map(EffectSlot::name);

        let mut probes: Vec<EffectKey> = Vec::with_capacity(4);
        if let Some(secondary) = &secondary {
            probes.push(EffectKey::new(primary.clone(), secondary.clone(), &verb));
        }
        probes.push(EffectKey::new(primary, EffectSlot::Any, &verb));
        if let Some(secondary) = &secondary {
            probes.push(EffectKey::new(EffectSlot::Any, secondary.clone(), &verb));
        }
        probes.push(EffectKey::new(EffectSlot::Any, EffectSlot::Any, &verb));

        probes.iter().find_map(|key| self.entries.get(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the chain an intercepted [`VerbAttempt`] actually runs.
///
/// The re-dispatched attempt bypasses the effect table so interception
/// happens exactly once per dispatch.
pub(crate) fn compose_interception(effect: &Effect, attempt: &VerbAttempt) -> ActionChain {
    let raw = Chainable::Attempt(attempt.clone().bypassing());
    debug!("composing {:?} effect for '{}' attempt", effect.relation, attempt.verb);
    match effect.relation {
        EffectRelation::Instead => effect.actions.clone().with_outcome(effect.successful),
        EffectRelation::Before => {
            if effect.continue_verb {
                // the verb must still run whatever the effect chain reports
                let tolerant = effect.actions.clone().with_outcome(true);
                ActionChain::new(vec![Chainable::Chain(tolerant), raw])
            } else {
                effect.actions.clone().with_outcome(effect.successful)
            }
        },
        EffectRelation::After => {
            let follow = effect.actions.clone().with_outcome(effect.successful);
            ActionChain::new(vec![raw, Chainable::Chain(follow)])
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn table() -> EffectTable {
        let mut table = EffectTable::default();
        table.register(
            EffectKey::new(EffectSlot::name("gong"), EffectSlot::Any, "ring"),
            Effect::new(EffectRelation::Before, ActionChain::text("wildcard-secondary")),
        );
        table.register(
            EffectKey::new(EffectSlot::name("gong"), EffectSlot::name("mallet"), "ring"),
            Effect::new(EffectRelation::Instead, ActionChain::text("specific")),
        );
        table.register(
            EffectKey::new(EffectSlot::Any, EffectSlot::name("mallet"), "ring"),
            Effect::new(EffectRelation::After, ActionChain::text("wildcard-primary")),
        );
        table
    }

    #[test]
    fn specific_pair_beats_wildcards() {
        let table = table();
        let effect = table.lookup("gong", Some("mallet"), "ring").expect("match");
        assert_eq!(effect.relation, EffectRelation::Instead);
    }

    #[test]
    fn wildcard_secondary_matches_when_pair_absent() {
        let table = table();
        let effect = table.lookup("gong", Some("stick"), "ring").expect("match");
        assert_eq!(effect.relation, EffectRelation::Before);
    }

    #[test]
    fn wildcard_primary_matches_other_items() {
        let table = table();
        let effect = table.lookup("bell", Some("mallet"), "ring").expect("match");
        assert_eq!(effect.relation, EffectRelation::After);
    }

    #[test]
    fn absent_secondary_only_matches_wildcard_secondary() {
        let table = table();
        let effect = table.lookup("gong", None, "ring").expect("match");
        assert_eq!(effect.relation, EffectRelation::Before);
        assert!(table.lookup("bell", None, "ring").is_none());
    }

    #[test]
    fn lookup_misses_unknown_verb() {
        assert!(table().lookup("gong", Some("mallet"), "polish").is_none());
    }

    #[test]
    fn instead_composition_replaces_verb() {
        let effect = Effect::new(EffectRelation::Instead, ActionChain::text("boom")).unsuccessful();
        let attempt = VerbAttempt::new(Uuid::new_v4(), None, "ring");
        let chain = compose_interception(&effect, &attempt);
        assert_eq!(chain.outcome_override, Some(false));
        assert!(!chain.elements.iter().any(|e| matches!(e, Chainable::Attempt(_))));
    }

    #[test]
    fn before_composition_orders_effect_then_verb() {
        let effect = Effect::new(EffectRelation::Before, ActionChain::text("first"));
        let attempt = VerbAttempt::new(Uuid::new_v4(), None, "ring");
        let chain = compose_interception(&effect, &attempt);
        assert_eq!(chain.len(), 2);
        assert!(matches!(&chain.elements[0], Chainable::Chain(c) if c.outcome_override == Some(true)));
        assert!(matches!(&chain.elements[1], Chainable::Attempt(a) if a.bypass_effects));
    }

    #[test]
    fn before_composition_without_continue_drops_verb() {
        let effect = Effect::new(EffectRelation::Before, ActionChain::text("only")).stop_verb();
        let attempt = VerbAttempt::new(Uuid::new_v4(), None, "ring");
        let chain = compose_interception(&effect, &attempt);
        assert!(!chain.elements.iter().any(|e| matches!(e, Chainable::Attempt(_))));
    }

    #[test]
    fn after_composition_orders_verb_then_effect() {
        let effect = Effect::new(EffectRelation::After, ActionChain::text("follow"));
        let attempt = VerbAttempt::new(Uuid::new_v4(), None, "ring");
        let chain = compose_interception(&effect, &attempt);
        assert_eq!(chain.len(), 2);
        assert!(matches!(&chain.elements[0], Chainable::Attempt(a) if a.bypass_effects));
        assert!(matches!(&chain.elements[1], Chainable::Chain(_)));
    }
}
