//! Chain execution engine.
//!
//! [`ChainRunner`] resolves the elements of an [`ActionChain`] strictly in
//! order and turns them into paced, player-visible [`Frame`]s. Suspension
//! is explicit and cooperative: each call returns a [`ChainCue`] telling
//! the rendering collaborator what to show and what to wait for, and the
//! collaborator calls back in with `advance` or `choose`. All work between
//! cues is synchronous; nested chains and graphs run to full completion
//! before their parent resumes.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::chain::{ActionChain, ChainContext, Chainable, PostScript, StepValue};
use crate::effect::compose_interception;
use crate::graph::{GraphError, NodeOption, OptionGraph};
use crate::verb::VerbAttempt;
use crate::world::SkeinWorld;

/// One unit of displayed text plus the controls offered with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub options: Vec<String>,
}

impl Frame {
    /// Label of the default advance control, offered when content demands
    /// pacing but supplies no options of its own.
    pub const ADVANCE_LABEL: &'static str = "Next";

    pub(crate) fn advance(text: String) -> Self {
        Self {
            text,
            options: vec![Self::ADVANCE_LABEL.to_string()],
        }
    }

    pub(crate) fn terminal(text: String) -> Self {
        Self {
            text,
            options: Vec::new(),
        }
    }

    pub(crate) fn choices(text: String, options: Vec<String>) -> Self {
        Self { text, options }
    }
}

/// Completion signal of a chain or graph run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainOutcome {
    /// False after an explicit failure signal or a failed verb test.
    pub succeeded: bool,
    /// Whether the last element actually executed yielded visible text.
    /// Downstream failure-message logic keys off this.
    pub emitted_text: bool,
    /// Whether any element of the run (or its children) yielded visible
    /// text. Drives the pace-after-nested policy.
    pub any_text: bool,
}

impl ChainOutcome {
    pub(crate) const EMPTY: Self = Self {
        succeeded: true,
        emitted_text: false,
        any_text: false,
    };
}

/// What the rendering collaborator must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCue {
    /// Show the frame; call `advance` once the player moves past it.
    Advance(Frame),
    /// Show the frame; call `choose` with the index of the player's pick.
    Choose(Frame),
    /// The interaction is over. Show the final frame, if any.
    Finished {
        frame: Option<Frame>,
        outcome: ChainOutcome,
    },
}

impl ChainCue {
    pub fn is_advance(&self) -> bool {
        matches!(self, ChainCue::Advance(_))
    }

    pub fn is_choose(&self) -> bool {
        matches!(self, ChainCue::Choose(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ChainCue::Finished { .. })
    }

    /// The frame to show for this cue, if there is one.
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            ChainCue::Advance(frame) | ChainCue::Choose(frame) => Some(frame),
            ChainCue::Finished { frame, .. } => frame.as_ref(),
        }
    }
}

/// What resolving one element produced.
enum Emission {
    /// Nothing visible.
    Silent,
    /// Visible text to pace.
    Text(String),
    /// Failure signal, with optional final text.
    Abort(Option<String>),
    /// Nested content to run before the current chain resumes.
    Push(Activation),
}

/// A chain mid-execution.
#[derive(Debug)]
struct ChainRun {
    elements: Vec<Chainable>,
    index: usize,
    succeeded: bool,
    aborted: bool,
    last_emitted: bool,
    any_text: bool,
    trailing: Option<String>,
    pace_after_nested: bool,
    post_script: Option<PostScript>,
    outcome_override: Option<bool>,
}

impl ChainRun {
    fn new(chain: ActionChain) -> Self {
        Self {
            elements: chain.elements,
            index: 0,
            succeeded: true,
            aborted: false,
            last_emitted: false,
            any_text: false,
            trailing: None,
            pace_after_nested: chain.pace_after_nested,
            post_script: chain.post_script,
            outcome_override: chain.outcome_override,
        }
    }

    /// Close out the run: apply any post-script to the final text frame and
    /// compute the reported outcome.
    fn finish(mut self, world: &mut SkeinWorld, ctx: &mut ChainContext) -> (ChainOutcome, Option<String>) {
        if !self.aborted {
            if let Some(post_script) = self.post_script.take() {
                if let Some(text) = resolve_post_script(post_script, world, ctx) {
                    match &mut self.trailing {
                        Some(trailing) => {
                            trailing.push_str("\n\n");
                            trailing.push_str(&text);
                        },
                        // final element showed nothing: the post-script
                        // becomes its own trailing frame
                        None => self.trailing = Some(text),
                    }
                    self.last_emitted = true;
                    self.any_text = true;
                }
            }
        }
        let succeeded = self.outcome_override.unwrap_or(self.succeeded);
        let outcome = ChainOutcome {
            succeeded,
            emitted_text: self.last_emitted,
            any_text: self.any_text,
        };
        (outcome, self.trailing)
    }
}

fn resolve_post_script(post_script: PostScript, world: &mut SkeinWorld, ctx: &mut ChainContext) -> Option<String> {
    match post_script {
        PostScript::Text(text) => Some(text),
        PostScript::Sequence(key) => world.advance_sequence(&key),
        PostScript::Step(step) => match step(world, ctx) {
            StepValue::Value(value) => match *value {
                Chainable::Text(text) => Some(text),
                other => {
                    warn!("post-script step produced a non-text value ({other:?}); ignored");
                    None
                },
            },
            StepValue::Continue | StepValue::Halt => None,
        },
    }
}

/// An option graph mid-execution. Definition stays shared and immutable;
/// all per-run state (visit set, current node) lives here.
#[derive(Debug)]
struct GraphRun {
    graph: OptionGraph,
    current: String,
    visited: HashSet<String>,
    /// Options shown to the player, awaiting a pick.
    offering: Vec<NodeOption>,
    /// Set while an option's inline actions run; the node to enter after.
    pending_target: Option<String>,
    entering: bool,
    awaiting_offer: bool,
    failed: bool,
    any_text: bool,
    trailing: Option<String>,
}

impl GraphRun {
    fn enter(graph: OptionGraph, node: String) -> Self {
        Self {
            graph,
            current: node,
            visited: HashSet::new(),
            offering: Vec::new(),
            pending_target: None,
            entering: true,
            awaiting_offer: false,
            failed: false,
            any_text: false,
            trailing: None,
        }
    }

    /// The current node's options, minus any whose target was visited and
    /// disallows repeats.
    fn resolvable_options(&self) -> Vec<NodeOption> {
        let Some(node) = self.graph.node(&self.current) else {
            return Vec::new();
        };
        node.options
            .iter()
            .filter(|option| {
                self.graph
                    .node(&option.target)
                    .is_some_and(|target| !self.visited.contains(&option.target) || self.graph.allows_repeat(target))
            })
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
enum Activation {
    Chain(ChainRun),
    Graph(GraphRun),
}

/// Cooperative executor for one interaction: a stack of active chains and
/// graphs plus the shared context.
#[derive(Debug)]
pub struct ChainRunner {
    stack: Vec<Activation>,
    ctx: ChainContext,
    cue: ChainCue,
    /// Controls offered with the outermost chain's final frame; the caller
    /// interprets a pick among these itself.
    final_options: Vec<String>,
}

impl ChainRunner {
    /// Start a chain and run it to its first suspension point.
    pub fn begin(chain: ActionChain, ctx: ChainContext, world: &mut SkeinWorld) -> Self {
        let final_options = chain.final_options.clone();
        let mut runner = Self {
            stack: vec![Activation::Chain(ChainRun::new(chain))],
            ctx,
            cue: ChainCue::Finished {
                frame: None,
                outcome: ChainOutcome::EMPTY,
            },
            final_options,
        };
        runner.cue = runner.drive(world);
        runner
    }

    /// Start an option graph at its designated start node.
    pub fn begin_graph(graph: OptionGraph, ctx: ChainContext, world: &mut SkeinWorld) -> Self {
        let start = graph.start().to_string();
        Self::start_graph_at(graph, start, ctx, world)
    }

    /// Start an option graph at an arbitrary node.
    ///
    /// # Errors
    /// - [`GraphError::UnknownNode`] if the id is not in the graph
    pub fn commence_graph(
        graph: OptionGraph,
        node_id: &str,
        ctx: ChainContext,
        world: &mut SkeinWorld,
    ) -> Result<Self, GraphError> {
        if !graph.contains(node_id) {
            return Err(GraphError::UnknownNode(node_id.to_string()));
        }
        Ok(Self::start_graph_at(graph, node_id.to_string(), ctx, world))
    }

    fn start_graph_at(graph: OptionGraph, node: String, ctx: ChainContext, world: &mut SkeinWorld) -> Self {
        let mut runner = Self {
            stack: vec![Activation::Graph(GraphRun::enter(graph, node))],
            ctx,
            cue: ChainCue::Finished {
                frame: None,
                outcome: ChainOutcome::EMPTY,
            },
            final_options: Vec::new(),
        };
        runner.cue = runner.drive(world);
        runner
    }

    pub fn cue(&self) -> &ChainCue {
        &self.cue
    }

    pub fn is_finished(&self) -> bool {
        self.cue.is_finished()
    }

    /// The completion signal, once the interaction is over.
    pub fn outcome(&self) -> Option<ChainOutcome> {
        match &self.cue {
            ChainCue::Finished { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }

    /// The player moved past an advance frame: resume until the next cue.
    pub fn advance(&mut self, world: &mut SkeinWorld) -> &ChainCue {
        if self.cue.is_advance() {
            self.cue = self.drive(world);
        } else {
            warn!("advance() called while the runner was not awaiting an advance");
        }
        &self.cue
    }

    /// The player picked an option from a choose frame. An out-of-range
    /// index leaves the offer standing (player input is never fatal).
    pub fn choose(&mut self, index: usize, world: &mut SkeinWorld) -> &ChainCue {
        if !self.cue.is_choose() {
            warn!("choose() called while the runner was not offering options");
            return &self.cue;
        }
        let picked = {
            let Some(Activation::Graph(run)) = self.stack.last_mut() else {
                unreachable!("choose cue without a graph on top of the runner stack")
            };
            if index < run.offering.len() {
                let option = run.offering[index].clone();
                run.offering.clear();
                Some(option)
            } else {
                warn!("choice index {index} out of range ({} offered)", run.offering.len());
                None
            }
        };
        let Some(option) = picked else {
            return &self.cue;
        };
        debug!("option '{}' picked -> node '{}'", option.label, option.target);

        let mut inline: Option<ActionChain> = None;
        {
            let Some(Activation::Graph(run)) = self.stack.last_mut() else {
                unreachable!("graph vanished beneath a choose cue")
            };
            match option.actions {
                Some(actions) => {
                    run.pending_target = Some(option.target);
                    inline = Some(actions);
                },
                None => {
                    run.current = option.target;
                    run.entering = true;
                    run.trailing = None;
                },
            }
        }
        if let Some(actions) = inline {
            self.stack.push(Activation::Chain(ChainRun::new(actions)));
        }
        self.cue = self.drive(world);
        &self.cue
    }

    /// Run synchronously until the next suspension point or completion.
    fn drive(&mut self, world: &mut SkeinWorld) -> ChainCue {
        // Set when a child activation just finished: its outcome and any
        // trailing text not yet shown to the player.
        let mut completed: Option<(ChainOutcome, Option<String>)> = None;
        loop {
            if let Some((outcome, trailing)) = completed.take() {
                match self.stack.last_mut() {
                    None => {
                        let frame = if self.final_options.is_empty() {
                            trailing.map(Frame::terminal)
                        } else {
                            Some(Frame::choices(
                                trailing.unwrap_or_default(),
                                self.final_options.clone(),
                            ))
                        };
                        return ChainCue::Finished { frame, outcome };
                    },
                    Some(Activation::Chain(parent)) => {
                        parent.any_text |= outcome.any_text;
                        parent.last_emitted = outcome.emitted_text;
                        if !outcome.succeeded {
                            // a failed nested run aborts the remainder
                            parent.succeeded = false;
                            parent.aborted = true;
                            parent.trailing = trailing;
                        } else if parent.index < parent.elements.len() {
                            if let Some(text) = trailing {
                                debug!("pacing trailing text of nested content");
                                return ChainCue::Advance(Frame::advance(text));
                            }
                            if parent.pace_after_nested && outcome.any_text {
                                debug!("blank advance frame after nested content");
                                return ChainCue::Advance(Frame::advance(String::new()));
                            }
                        } else {
                            parent.trailing = trailing;
                        }
                    },
                    Some(Activation::Graph(run)) => {
                        run.any_text |= outcome.any_text;
                        if !outcome.succeeded {
                            run.failed = true;
                            run.trailing = trailing;
                            run.awaiting_offer = true;
                        } else if let Some(target) = run.pending_target.take() {
                            // inline option actions done: transition
                            run.current = target;
                            run.entering = true;
                            run.trailing = None;
                            if let Some(text) = trailing {
                                return ChainCue::Advance(Frame::advance(text));
                            }
                        } else {
                            // node entry chain done: offer its options
                            run.trailing = trailing;
                            run.awaiting_offer = true;
                        }
                    },
                }
                continue;
            }

            enum Todo {
                RunElement(Chainable),
                CompleteChain,
                EnterNode,
                Offer,
            }
            let todo = match self.stack.last_mut() {
                None => unreachable!("runner stack underflow"),
                Some(Activation::Chain(run)) => {
                    if run.aborted || run.index >= run.elements.len() {
                        Todo::CompleteChain
                    } else {
                        let element = run.elements[run.index].clone();
                        run.index += 1;
                        Todo::RunElement(element)
                    }
                },
                Some(Activation::Graph(run)) => {
                    if run.entering {
                        Todo::EnterNode
                    } else if run.awaiting_offer {
                        Todo::Offer
                    } else {
                        unreachable!("idle graph on top of the runner stack")
                    }
                },
            };

            match todo {
                Todo::RunElement(element) => match self.resolve_element(element, world) {
                    Emission::Silent => {
                        if let Some(Activation::Chain(run)) = self.stack.last_mut() {
                            run.last_emitted = false;
                        }
                    },
                    Emission::Text(text) => {
                        let Some(Activation::Chain(run)) = self.stack.last_mut() else {
                            unreachable!("text emission without an active chain")
                        };
                        run.any_text = true;
                        run.last_emitted = true;
                        if run.index < run.elements.len() {
                            debug!("chain suspended for advance");
                            return ChainCue::Advance(Frame::advance(text));
                        }
                        run.trailing = Some(text);
                    },
                    Emission::Abort(text) => {
                        let Some(Activation::Chain(run)) = self.stack.last_mut() else {
                            unreachable!("abort emission without an active chain")
                        };
                        run.succeeded = false;
                        run.aborted = true;
                        run.last_emitted = text.is_some();
                        if let Some(text) = text {
                            run.any_text = true;
                            run.trailing = Some(text);
                        }
                    },
                    Emission::Push(activation) => self.stack.push(activation),
                },
                Todo::CompleteChain => {
                    let Some(Activation::Chain(run)) = self.stack.pop() else {
                        unreachable!("expected a chain on top of the runner stack")
                    };
                    completed = Some(run.finish(world, &mut self.ctx));
                },
                Todo::EnterNode => {
                    let actions = {
                        let Some(Activation::Graph(run)) = self.stack.last_mut() else {
                            unreachable!("expected a graph on top of the runner stack")
                        };
                        run.entering = false;
                        run.visited.insert(run.current.clone());
                        let Some(node) = run.graph.node(&run.current) else {
                            unreachable!("graph node '{}' missing after validation", run.current)
                        };
                        debug!("entering option graph node '{}'", node.id);
                        node.actions.clone()
                    };
                    self.stack.push(Activation::Chain(ChainRun::new(actions)));
                },
                Todo::Offer => {
                    let Some(Activation::Graph(run)) = self.stack.last_mut() else {
                        unreachable!("expected a graph on top of the runner stack")
                    };
                    run.awaiting_offer = false;
                    let options = if run.failed { Vec::new() } else { run.resolvable_options() };
                    if options.is_empty() {
                        let Some(Activation::Graph(run)) = self.stack.pop() else {
                            unreachable!("graph vanished while terminating")
                        };
                        info!("option graph finished at node '{}'", run.current);
                        let outcome = ChainOutcome {
                            succeeded: !run.failed,
                            emitted_text: run.trailing.is_some(),
                            any_text: run.any_text,
                        };
                        completed = Some((outcome, run.trailing));
                    } else {
                        let labels = options.iter().map(|o| o.label.clone()).collect();
                        let text = run.trailing.clone().unwrap_or_default();
                        debug!("offering {} option(s) at node '{}'", options.len(), run.current);
                        run.offering = options;
                        return ChainCue::Choose(Frame::choices(text, labels));
                    }
                },
            }
        }
    }

    /// Resolve one chainable value into an emission.
    fn resolve_element(&mut self, element: Chainable, world: &mut SkeinWorld) -> Emission {
        match element {
            Chainable::Text(text) => Emission::Text(text),
            Chainable::Fail(text) => Emission::Abort(Some(text)),
            Chainable::Sequence(key) => match world.advance_sequence(&key) {
                Some(text) => Emission::Text(text),
                None => Emission::Silent,
            },
            Chainable::Step(step) => match step(world, &mut self.ctx) {
                StepValue::Continue => Emission::Silent,
                StepValue::Halt => Emission::Abort(None),
                StepValue::Value(value) => self.resolve_element(*value, world),
            },
            Chainable::Chain(chain) => Emission::Push(Activation::Chain(ChainRun::new(chain))),
            Chainable::Graph(graph) => {
                let start = graph.start().to_string();
                Emission::Push(Activation::Graph(GraphRun::enter(graph, start)))
            },
            Chainable::Attempt(attempt) => self.resolve_attempt(attempt, world),
        }
    }

    /// Dispatch a verb attempt, intercepting through the effect table once.
    fn resolve_attempt(&mut self, attempt: VerbAttempt, world: &mut SkeinWorld) -> Emission {
        self.ctx.verb = Some(attempt.verb.clone());
        self.ctx.item = Some(attempt.item);
        self.ctx.secondary = attempt.secondary;

        if !attempt.bypass_effects {
            let primary_name = world.items.get(&attempt.item).map(|i| i.name.to_lowercase());
            let secondary_name = attempt
                .secondary
                .and_then(|id| world.items.get(&id))
                .map(|i| i.name.to_lowercase());
            if let Some(primary_name) = &primary_name {
                if let Some(effect) = world.effects.lookup(primary_name, secondary_name.as_deref(), &attempt.verb) {
                    debug!("effect intercepts '{}' on '{primary_name}'", attempt.verb);
                    let chain = compose_interception(effect, &attempt);
                    return Emission::Push(Activation::Chain(ChainRun::new(chain)));
                }
            }
        }

        let Some(item) = world.items.get(&attempt.item) else {
            warn!("verb attempt on unknown item {}", attempt.item);
            return Emission::Abort(None);
        };
        let Some(verb) = item.verbs.get(&attempt.verb) else {
            warn!("item '{}' does not expose verb '{}'", item.name, attempt.verb);
            return Emission::Abort(None);
        };
        debug!("attempting '{}' on '{}'", attempt.verb, item.name);
        let chain = verb.attempt_chain(world, &self.ctx);
        Emission::Push(Activation::Chain(ChainRun::new(chain)))
    }
}
