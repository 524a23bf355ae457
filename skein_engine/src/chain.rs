//! Action chain value model.
//!
//! An [`ActionChain`] is an ordered list of heterogeneous [`Chainable`]
//! values: literal text, named text sequences, step functions, nested
//! chains, option graphs, and verb attempts. The chain itself is plain
//! data; execution and pacing live in [`crate::runner`].

use std::collections::HashMap;

use uuid::Uuid;
use variantly::Variantly;

use crate::graph::OptionGraph;
use crate::verb::VerbAttempt;
use crate::world::SkeinWorld;

/// A step function: runs against the world and the shared chain context,
/// and may yield another chainable value to resolve in its place.
pub type StepFn = fn(&mut SkeinWorld, &mut ChainContext) -> StepValue;

/// What a [`StepFn`] produced.
#[derive(Debug)]
pub enum StepValue {
    /// Nothing visible; move on to the next element.
    Continue,
    /// Explicit failure signal: abort the remaining elements, mark the chain failed.
    Halt,
    /// Another chainable value, resolved in place of the step.
    Value(Box<Chainable>),
}

impl StepValue {
    /// Convenience for steps that produce dynamic text.
    pub fn text(text: impl Into<String>) -> Self {
        StepValue::Value(Box::new(Chainable::Text(text.into())))
    }
}

/// One element of an [`ActionChain`].
///
/// Closed variant set: the runner dispatches on the tag exactly once per
/// element rather than probing values for shape.
#[derive(Debug, Clone, Variantly)]
pub enum Chainable {
    /// Literal text, shown as one frame.
    Text(String),
    /// Text shown as a final frame; marks the chain failed and stops it.
    Fail(String),
    /// A world-registered [`crate::sequence::TextSequence`], referenced by key.
    Sequence(String),
    /// A step function evaluated against world + context.
    Step(StepFn),
    /// A nested chain, run to completion before the parent resumes.
    Chain(ActionChain),
    /// An option graph, run to completion before the parent resumes.
    Graph(OptionGraph),
    /// A verb attempt, dispatched through the effect table.
    Attempt(VerbAttempt),
}

impl From<&str> for Chainable {
    fn from(text: &str) -> Self {
        Chainable::Text(text.to_string())
    }
}

impl From<String> for Chainable {
    fn from(text: String) -> Self {
        Chainable::Text(text)
    }
}

impl From<ActionChain> for Chainable {
    fn from(chain: ActionChain) -> Self {
        Chainable::Chain(chain)
    }
}

impl From<OptionGraph> for Chainable {
    fn from(graph: OptionGraph) -> Self {
        Chainable::Graph(graph)
    }
}

impl From<VerbAttempt> for Chainable {
    fn from(attempt: VerbAttempt) -> Self {
        Chainable::Attempt(attempt)
    }
}

/// Trailing text appended to the last emitted text frame of a chain.
#[derive(Debug, Clone)]
pub enum PostScript {
    Text(String),
    Sequence(String),
    Step(StepFn),
}

/// An ordered list of chainable values plus chain-level policy.
#[derive(Debug, Clone)]
pub struct ActionChain {
    pub elements: Vec<Chainable>,
    /// When true (the default), an advance frame is still requested after a
    /// nested chain or graph that showed text, so pacing stays consistent
    /// however deeply chains are composed.
    pub pace_after_nested: bool,
    /// Appended to the final text frame only.
    pub post_script: Option<PostScript>,
    /// Caller-supplied controls offered with the final frame. Empty means
    /// the interaction simply ends. Only honored on the outermost chain of
    /// an interaction; the caller interprets the pick itself.
    pub final_options: Vec<String>,
    /// Forces the reported success of this chain regardless of how its
    /// elements fared. Used by effect interception and failed verb tests.
    pub outcome_override: Option<bool>,
}

impl Default for ActionChain {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            pace_after_nested: true,
            post_script: None,
            final_options: Vec::new(),
            outcome_override: None,
        }
    }
}

impl ActionChain {
    pub fn new(elements: Vec<Chainable>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    /// A one-frame chain that just shows `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Chainable::Text(text.into())])
    }

    /// A one-frame chain that shows `text` and completes as failed.
    /// The parser delivers its feedback messages this way: player-facing
    /// failures are ordinary chain text, never errors.
    pub fn refusal(text: impl Into<String>) -> Self {
        Self::new(vec![Chainable::Fail(text.into())])
    }

    pub fn with_post_script(mut self, post_script: PostScript) -> Self {
        self.post_script = Some(post_script);
        self
    }

    pub fn with_final_options<S: Into<String>>(mut self, labels: Vec<S>) -> Self {
        self.final_options = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn without_nested_pacing(mut self) -> Self {
        self.pace_after_nested = false;
        self
    }

    pub fn with_outcome(mut self, succeeded: bool) -> Self {
        self.outcome_override = Some(succeeded);
        self
    }

    pub fn push(&mut self, element: impl Into<Chainable>) {
        self.elements.push(element.into());
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Shared context fed to every element of a chain (and its children).
///
/// Populated by the parser at dispatch and updated by each [`VerbAttempt`]
/// as it resolves, so disambiguation leaves see the substituted item.
#[derive(Debug, Clone, Default)]
pub struct ChainContext {
    /// Canonical name of the verb being attempted, if any.
    pub verb: Option<String>,
    /// The resolved primary item.
    pub item: Option<Uuid>,
    /// The resolved secondary / indirect item.
    pub secondary: Option<Uuid>,
    /// Trailing input tokens, for keywords that take arguments.
    pub args: Vec<String>,
    /// Scratch values steps may use to talk to later steps in the same turn.
    pub scratch: HashMap<String, String>,
}

impl ChainContext {
    pub fn for_verb(verb: impl Into<String>, item: Option<Uuid>, secondary: Option<Uuid>) -> Self {
        Self {
            verb: Some(verb.into()),
            item,
            secondary,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_defaults_pace_after_nested() {
        let chain = ActionChain::new(vec![Chainable::from("hello")]);
        assert!(chain.pace_after_nested);
        assert!(chain.post_script.is_none());
        assert!(chain.outcome_override.is_none());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn refusal_builds_single_fail_element() {
        let chain = ActionChain::refusal("no.");
        assert_eq!(chain.len(), 1);
        assert!(matches!(&chain.elements[0], Chainable::Fail(text) if text == "no."));
    }

    #[test]
    fn chainable_from_conversions() {
        assert!(Chainable::from("a").is_text());
        assert!(Chainable::from(String::from("b")).is_text());
        assert!(Chainable::from(ActionChain::default()).is_chain());
    }

    #[test]
    fn context_for_verb_sets_fields() {
        let id = Uuid::new_v4();
        let ctx = ChainContext::for_verb("open", Some(id), None);
        assert_eq!(ctx.verb.as_deref(), Some("open"));
        assert_eq!(ctx.item, Some(id));
        assert_eq!(ctx.secondary, None);
        assert!(ctx.args.is_empty());
    }
}
