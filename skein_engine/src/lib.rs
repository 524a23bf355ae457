#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const SKEIN_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod chain;
pub mod effect;
pub mod graph;
pub mod item;
pub mod parser;
pub mod registry;
pub mod repl;
pub mod room;
pub mod runner;
pub mod sequence;
pub mod style;
pub mod verb;
pub mod world;

// Re-exports for convenience
pub use chain::{ActionChain, ChainContext, Chainable, PostScript, StepValue};
pub use effect::{Effect, EffectKey, EffectRelation, EffectSlot, EffectTable};
pub use graph::{GraphError, GraphNode, NodeOption, OptionGraph};
pub use item::Item;
pub use parser::{ParseFailure, ParseReport, PlayerTurn, parse};
pub use registry::{Keyword, SessionRegistry};
pub use repl::run_repl;
pub use room::Room;
pub use runner::{ChainCue, ChainOutcome, ChainRunner, Frame};
pub use sequence::{SequenceStrategy, TextSequence};
pub use verb::{PrepositionPolicy, Verb, VerbAttempt};
pub use world::{Location, SkeinWorld};
