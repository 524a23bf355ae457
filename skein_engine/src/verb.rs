//! Verb model.
//!
//! A [`Verb`] is a named, aliasable capability attached to an item, a room,
//! or the global keyword table. It carries a precondition test plus a
//! success chain and a failure chain. Dispatch goes through the effect
//! table one layer above (see [`crate::effect`] and the runner's
//! [`VerbAttempt`] resolution); per-item verb maps stay authoritative.

use uuid::Uuid;

use crate::chain::{ActionChain, ChainContext};
use crate::world::SkeinWorld;

/// Precondition predicate for a verb: plain `fn` so verb definitions hold
/// no hidden game-relevant state.
pub type VerbTest = fn(&SkeinWorld, &ChainContext) -> bool;

/// Whether a verb needs a second / indirect object.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PrepositionPolicy {
    /// Direct verb: never takes a second object.
    #[default]
    None,
    /// Second object used when supplied, not required.
    Optional,
    /// Second object required; its absence prompts the interrogative.
    Required,
}

/// A named capability with a precondition and success / failure chains.
#[derive(Debug, Clone, Default)]
pub struct Verb {
    /// Canonical name: lower-cased and trimmed at construction.
    pub name: String,
    pub aliases: Vec<String>,
    /// Precondition; `None` always passes.
    pub test: Option<VerbTest>,
    pub on_success: ActionChain,
    pub on_failure: ActionChain,
    pub preposition: PrepositionPolicy,
    /// Prompt used when a required second object is missing, e.g. "with what?".
    pub interrogative: Option<String>,
}

impl Verb {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.trim().to_lowercase());
        self
    }

    pub fn with_test(mut self, test: VerbTest) -> Self {
        self.test = Some(test);
        self
    }

    pub fn on_success(mut self, chain: ActionChain) -> Self {
        self.on_success = chain;
        self
    }

    pub fn on_failure(mut self, chain: ActionChain) -> Self {
        self.on_failure = chain;
        self
    }

    pub fn prepositional(mut self, policy: PrepositionPolicy) -> Self {
        self.preposition = policy;
        self
    }

    pub fn with_interrogative(mut self, prompt: &str) -> Self {
        self.interrogative = Some(prompt.to_string());
        self
    }

    /// True if `span` is this verb's canonical name or one of its aliases.
    pub fn answers_to(&self, span: &str) -> bool {
        self.name == span || self.aliases.iter().any(|a| a == span)
    }

    /// Evaluate the test and pick the branch chain to run.
    ///
    /// A failed test forces the branch's reported outcome to failure, so
    /// the attempt's completion signal is (test AND branch result) and a
    /// parent chain aborts its remainder. That is what keeps "after"
    /// effects from firing on a failed verb.
    pub fn attempt_chain(&self, world: &SkeinWorld, ctx: &ChainContext) -> ActionChain {
        let passed = self.test.is_none_or(|test| test(world, ctx));
        if passed {
            self.on_success.clone()
        } else {
            let mut failure = self.on_failure.clone();
            failure.outcome_override = Some(false);
            failure
        }
    }
}

/// A pending invocation of a verb on a resolved item, dispatched by the
/// runner through the effect table. Plain data, so disambiguation leaves
/// and effect compositions can carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbAttempt {
    pub item: Uuid,
    pub secondary: Option<Uuid>,
    /// Canonical verb name.
    pub verb: String,
    /// Set when an effect composition re-dispatches the underlying verb,
    /// so interception happens exactly once.
    pub(crate) bypass_effects: bool,
}

impl VerbAttempt {
    pub fn new(item: Uuid, secondary: Option<Uuid>, verb: &str) -> Self {
        Self {
            item,
            secondary,
            verb: verb.trim().to_lowercase(),
            bypass_effects: false,
        }
    }

    pub(crate) fn bypassing(mut self) -> Self {
        self.bypass_effects = true;
        self
    }
}
