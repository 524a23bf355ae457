//! Player command resolution.
//!
//! Turns one line of free text into a running interaction. Tokens are
//! lower-cased words; command heads and item names match whole contiguous
//! spans, longest first, so "brass key" wins over "key" wherever both are
//! known. Resolution order per span: session keyword, then current-room
//! verb, then item verb. Anything unresolvable becomes a refusal chain so
//! the caller renders every turn the same way.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use thiserror::Error;
use uuid::Uuid;

use crate::chain::{ActionChain, ChainContext, Chainable};
use crate::graph::{GraphNode, NodeOption, OptionGraph};
use crate::runner::{ChainCue, ChainRunner};
use crate::verb::{PrepositionPolicy, VerbAttempt};
use crate::world::SkeinWorld;

/// Why a turn was refused before any verb ran. The display strings are the
/// player-facing refusal text, most specific condition first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Verb and item resolved, but the verb demands a second item.
    #[error("{} the {item}... {prompt}", capitalize(.verb))]
    MissingSecondItem {
        verb: String,
        item: String,
        prompt: String,
    },
    /// Verb and item both known, but that item has no such verb.
    #[error("You can't {verb} the {item}.")]
    VerbNotSupported { verb: String, item: String },
    /// The item name is known to the session but nothing here matches it.
    #[error("You don't see any {name} here.")]
    NotPresent { name: String },
    /// The verb resolved but no object phrase named anything at all.
    #[error("You don't see anything like that to {verb}.")]
    NothingToActOn { verb: String },
    /// An item was named but the command head is not a known verb.
    #[error("You can't do that to the {item}.")]
    UnknownVerb { item: String },
    /// Nothing in the input resolved.
    #[error("That doesn't make any sense here.")]
    NoMatch,
    /// Both object slots matched several items; disambiguating one at a
    /// time cannot help.
    #[error("More than one thing here matches. Try to be more specific.")]
    TooAmbiguous,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// What the parser decided about the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseReport {
    /// A verb attempt was dispatched.
    Dispatched {
        verb: String,
        item: Option<Uuid>,
        secondary: Option<Uuid>,
    },
    /// A session keyword ran.
    Keyword { name: String },
    /// Several items matched one slot; the player is being asked which.
    Disambiguating { candidates: Vec<Uuid> },
    /// The turn was refused. The refusal text is already in the runner.
    Failed(ParseFailure),
}

/// One resolved player turn: the parser's decision plus the interaction
/// already running (refusals included, so rendering is uniform).
#[derive(Debug)]
pub struct PlayerTurn {
    pub report: ParseReport,
    pub runner: ChainRunner,
}

impl PlayerTurn {
    pub fn cue(&self) -> &ChainCue {
        self.runner.cue()
    }
}

/// All contiguous token spans, widest first, leftmost first within a width.
fn spans(tokens: &[String]) -> Vec<(usize, usize, String)> {
    let mut out = Vec::new();
    for width in (1..=tokens.len()).rev() {
        for start in 0..=(tokens.len() - width) {
            out.push((start, start + width, tokens[start..start + width].join(" ")));
        }
    }
    out
}

/// Longest span of `tokens` naming at least one visible item. Candidates
/// come back sorted by id so repeated parses resolve identically.
fn find_item_span(world: &SkeinWorld, tokens: &[String], visible: &HashSet<Uuid>) -> Option<(usize, usize, Vec<Uuid>)> {
    for (start, end, span) in spans(tokens) {
        let mut candidates: Vec<Uuid> = visible
            .iter()
            .copied()
            .filter(|id| world.items.get(id).is_some_and(|item| item.matches(&span)))
            .collect();
        if !candidates.is_empty() {
            candidates.sort_unstable();
            return Some((start, end, candidates));
        }
    }
    None
}

/// Longest span the session knows as an item name, present here or not.
fn find_known_name(world: &SkeinWorld, tokens: &[String]) -> Option<String> {
    spans(tokens)
        .into_iter()
        .map(|(_, _, span)| span)
        .find(|span| world.registry.knows_item_name(span))
}

enum Head {
    Keyword(crate::registry::Keyword, usize, usize),
    RoomVerb(String),
    Verb(String, usize),
}

/// Resolve one line of player input into a running turn.
pub fn parse(world: &mut SkeinWorld, input: &str) -> PlayerTurn {
    let tokens: Vec<String> = input.to_lowercase().split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        return refuse(world, ParseFailure::NoMatch);
    }
    debug!("parsing {} token(s): {tokens:?}", tokens.len());

    let head = {
        let room = world.rooms.get(&world.current_room);
        let mut found = None;
        for (start, end, span) in spans(&tokens) {
            if let Some(keyword) = world.registry.keyword(&span) {
                if (start == 0 && end == tokens.len()) || keyword.takes_args {
                    found = Some(Head::Keyword(keyword.clone(), start, end));
                    break;
                }
            }
            if end == tokens.len() {
                // a bare room verb; with trailing words the span must be
                // naming an item verb instead
                if let Some(verb) = room.and_then(|r| r.verb_for_span(&span)) {
                    found = Some(Head::RoomVerb(verb.name.clone()));
                    break;
                }
            }
            if let Some(canonical) = world.registry.canonical_verb(&span) {
                found = Some(Head::Verb(canonical.to_string(), end));
                break;
            }
        }
        found
    };

    match head {
        None => {
            let visible = world.visible_items();
            match find_item_span(world, &tokens, &visible) {
                Some((_, _, candidates)) => {
                    let item = world.item_name(candidates[0]);
                    refuse(world, ParseFailure::UnknownVerb { item })
                },
                None => refuse(world, ParseFailure::NoMatch),
            }
        },
        Some(Head::Keyword(keyword, start, end)) => {
            let mut args: Vec<String> = tokens[..start].to_vec();
            args.extend_from_slice(&tokens[end..]);
            info!("keyword '{}' dispatched with {} arg(s)", keyword.name, args.len());
            let ctx = ChainContext {
                args,
                ..ChainContext::default()
            };
            let runner = ChainRunner::begin(keyword.actions.clone(), ctx, world);
            PlayerTurn {
                report: ParseReport::Keyword { name: keyword.name },
                runner,
            }
        },
        Some(Head::RoomVerb(name)) => {
            let ctx = ChainContext::for_verb(name.clone(), None, None);
            let chain = world
                .rooms
                .get(&world.current_room)
                .and_then(|room| room.verbs.get(&name))
                .map(|verb| verb.attempt_chain(world, &ctx));
            let Some(chain) = chain else {
                return refuse(world, ParseFailure::NoMatch);
            };
            info!("room verb '{name}' dispatched");
            let runner = ChainRunner::begin(chain, ctx, world);
            PlayerTurn {
                report: ParseReport::Dispatched {
                    verb: name,
                    item: None,
                    secondary: None,
                },
                runner,
            }
        },
        Some(Head::Verb(verb, end)) => resolve_objects(world, verb, &tokens[end..]),
    }
}

/// Resolve the object phrase after a verb and dispatch the attempt.
fn resolve_objects(world: &mut SkeinWorld, verb: String, trailing: &[String]) -> PlayerTurn {
    let visible = world.visible_items();

    let Some((p_start, p_end, primary_candidates)) = find_item_span(world, trailing, &visible) else {
        return match find_known_name(world, trailing) {
            Some(name) => refuse(world, ParseFailure::NotPresent { name }),
            None => refuse(world, ParseFailure::NothingToActOn { verb }),
        };
    };

    let supporting: Vec<Uuid> = primary_candidates
        .iter()
        .copied()
        .filter(|id| world.items.get(id).is_some_and(|item| item.supports(&verb)))
        .collect();
    if supporting.is_empty() {
        let item = world.item_name(primary_candidates[0]);
        return refuse(world, ParseFailure::VerbNotSupported { verb, item });
    }

    let secondary_span = find_item_span(world, &trailing[p_end..], &visible);
    let (s_start, s_end) = secondary_span.as_ref().map_or((0, 0), |(s, e, _)| (*s, *e));
    let secondary_candidates = secondary_span.as_ref().map(|(_, _, c)| c.as_slice());

    match (supporting.as_slice(), secondary_candidates) {
        // both slots ambiguous: give up rather than ask twice
        ([_, _, ..], Some([_, _, ..])) => refuse(world, ParseFailure::TooAmbiguous),
        // primary ambiguous
        (many @ [_, _, ..], secondary) => {
            let secondary = secondary.and_then(<[Uuid]>::first).copied();
            let choices = many
                .iter()
                .zip(candidate_labels(world, many))
                .map(|(id, label)| (label, leaf_chain(world, &verb, *id, secondary)))
                .collect();
            let asked = trailing[p_start..p_end].join(" ");
            disambiguate(world, &asked, choices, many.to_vec())
        },
        // secondary ambiguous
        ([primary], Some(many @ [_, _, ..])) => {
            let choices = many
                .iter()
                .zip(candidate_labels(world, many))
                .map(|(id, label)| {
                    let chain = ActionChain::new(vec![Chainable::Attempt(VerbAttempt::new(*primary, Some(*id), &verb))]);
                    (label, chain)
                })
                .collect();
            let asked = trailing[p_end + s_start..p_end + s_end].join(" ");
            disambiguate(world, &asked, choices, many.to_vec())
        },
        ([primary], secondary) => {
            let primary = *primary;
            let secondary = secondary.and_then(<[Uuid]>::first).copied();
            if secondary.is_none() {
                if let Some((PrepositionPolicy::Required, interrogative)) = verb_policy(world, primary, &verb) {
                    let failure = ParseFailure::MissingSecondItem {
                        verb,
                        item: world.item_name(primary),
                        prompt: interrogative.unwrap_or_else(|| "with what?".to_string()),
                    };
                    return refuse(world, failure);
                }
            }
            dispatch(world, verb, primary, secondary)
        },
        ([], _) => unreachable!("empty supporting slice already refused"),
    }
}

fn verb_policy(world: &SkeinWorld, item: Uuid, verb: &str) -> Option<(PrepositionPolicy, Option<String>)> {
    world
        .items
        .get(&item)
        .and_then(|item| item.verbs.get(verb))
        .map(|v| (v.preposition, v.interrogative.clone()))
}

/// The chain a disambiguation leaf runs. A candidate whose verb requires a
/// preposition, with no second item resolved, gets the missing-second-item
/// refusal instead of its attempt so choosing it cannot skip the prompt.
fn leaf_chain(world: &SkeinWorld, verb: &str, primary: Uuid, secondary: Option<Uuid>) -> ActionChain {
    if secondary.is_none() {
        if let Some((PrepositionPolicy::Required, interrogative)) = verb_policy(world, primary, verb) {
            let failure = ParseFailure::MissingSecondItem {
                verb: verb.to_string(),
                item: world.item_name(primary),
                prompt: interrogative.unwrap_or_else(|| "with what?".to_string()),
            };
            return ActionChain::refusal(failure.to_string());
        }
    }
    ActionChain::new(vec![Chainable::Attempt(VerbAttempt::new(primary, secondary, verb))])
}

/// Display names for the candidates, numbering only true duplicates.
fn candidate_labels(world: &SkeinWorld, candidates: &[Uuid]) -> Vec<String> {
    let names: Vec<String> = candidates.iter().map(|id| world.item_name(*id)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name).or_default() += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .iter()
        .map(|name| {
            if counts[name.as_str()] > 1 {
                let nth = seen.entry(name).or_default();
                *nth += 1;
                format!("{name} ({nth})")
            } else {
                name.clone()
            }
        })
        .collect()
}

fn dispatch(world: &mut SkeinWorld, verb: String, item: Uuid, secondary: Option<Uuid>) -> PlayerTurn {
    info!("dispatching '{verb}' on '{}'", world.item_name(item));
    let ctx = ChainContext::for_verb(verb.clone(), Some(item), secondary);
    let chain = ActionChain::new(vec![Chainable::Attempt(VerbAttempt::new(item, secondary, &verb))]);
    let runner = ChainRunner::begin(chain, ctx, world);
    PlayerTurn {
        report: ParseReport::Dispatched {
            verb,
            item: Some(item),
            secondary,
        },
        runner,
    }
}

/// Ask the player which of several matching items they meant: a two
/// level graph with one leaf per candidate plus a cancel leaf. `asked`
/// is the span the player typed; each option carries its candidate's
/// own display name.
fn disambiguate(world: &mut SkeinWorld, asked: &str, choices: Vec<(String, ActionChain)>, candidates: Vec<Uuid>) -> PlayerTurn {
    info!("'{asked}' is ambiguous ({} candidates)", choices.len());
    let mut root = GraphNode::new("which-one", ActionChain::text(format!("Which {asked} do you mean?")));
    let mut nodes = Vec::with_capacity(choices.len() + 2);
    for (i, (label, chain)) in choices.into_iter().enumerate() {
        let id = format!("choice-{i}");
        root = root.with_option(NodeOption::new(&label, &id));
        nodes.push(GraphNode::new(&id, chain));
    }
    root = root.with_option(NodeOption::new("Cancel", "cancel"));
    nodes.insert(0, root);
    nodes.push(GraphNode::new("cancel", ActionChain::default()));

    let Ok(graph) = OptionGraph::new(nodes) else {
        unreachable!("disambiguation graph is correct by construction")
    };
    let runner = ChainRunner::begin_graph(graph.with_default_repeat(false), ChainContext::default(), world);
    PlayerTurn {
        report: ParseReport::Disambiguating { candidates },
        runner,
    }
}

fn refuse(world: &mut SkeinWorld, failure: ParseFailure) -> PlayerTurn {
    info!("turn refused: {failure}");
    let runner = ChainRunner::begin(ActionChain::refusal(failure.to_string()), ChainContext::default(), world);
    PlayerTurn {
        report: ParseReport::Failed(failure),
        runner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::registry::Keyword;
    use crate::room::Room;
    use crate::verb::Verb;
    use crate::world::Location;

    fn take_verb() -> Verb {
        Verb::new("take")
            .with_alias("grab")
            .on_success(ActionChain::text("Taken."))
    }

    fn world() -> SkeinWorld {
        let mut world = SkeinWorld::new_session();
        let cell = world.add_room(Room::new("Cell", "A bare cell."));
        world.current_room = cell;

        let put = Verb::new("put")
            .prepositional(PrepositionPolicy::Required)
            .with_interrogative("in what?")
            .on_success(ActionChain::text("Done."));
        let eat = Verb::new("eat").on_success(ActionChain::text("Delicious."));
        world.add_item(
            Item::new("apple", "a shiny apple")
                .with_verb(take_verb())
                .with_verb(put)
                .with_verb(eat),
            Location::Room(cell),
        );
        world.add_item(Item::new("basket", "a wicker basket"), Location::Room(cell));

        let unlock = Verb::new("unlock")
            .prepositional(PrepositionPolicy::Required)
            .on_success(ActionChain::text("Click."));
        world.add_item(Item::new("door", "an iron door").with_verb(unlock), Location::Room(cell));

        world.register_keyword(Keyword::new("inventory", ActionChain::text("You carry nothing.")).with_alias("i"));
        world
    }

    fn failure(turn: &PlayerTurn) -> &ParseFailure {
        match &turn.report {
            ParseReport::Failed(failure) => failure,
            other => panic!("expected a refusal, got {other:?}"),
        }
    }

    fn final_text(turn: &PlayerTurn) -> String {
        match turn.cue() {
            ChainCue::Finished { frame: Some(frame), .. } => frame.text.clone(),
            other => panic!("expected a finished turn with text, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_refuses_with_no_match() {
        let mut world = world();
        let turn = parse(&mut world, "   ");
        assert_eq!(failure(&turn), &ParseFailure::NoMatch);
        assert_eq!(final_text(&turn), "That doesn't make any sense here.");
    }

    #[test]
    fn verb_and_item_dispatch() {
        let mut world = world();
        let turn = parse(&mut world, "take apple");
        assert!(matches!(
            &turn.report,
            ParseReport::Dispatched { verb, item: Some(_), secondary: None } if verb == "take"
        ));
        assert_eq!(final_text(&turn), "Taken.");
    }

    #[test]
    fn verb_alias_resolves_to_canonical() {
        let mut world = world();
        let turn = parse(&mut world, "GRAB apple");
        assert!(matches!(&turn.report, ParseReport::Dispatched { verb, .. } if verb == "take"));
        assert_eq!(final_text(&turn), "Taken.");
    }

    #[test]
    fn secondary_item_resolves_after_primary() {
        let mut world = world();
        let turn = parse(&mut world, "put apple in basket");
        let ParseReport::Dispatched { verb, item, secondary } = &turn.report else {
            panic!("expected dispatch, got {:?}", turn.report)
        };
        assert_eq!(verb, "put");
        assert!(item.is_some());
        assert!(secondary.is_some());
        assert_eq!(final_text(&turn), "Done.");
    }

    #[test]
    fn required_preposition_without_secondary_prompts() {
        let mut world = world();
        let turn = parse(&mut world, "put apple");
        assert_eq!(final_text(&turn), "Put the apple... in what?");
        assert!(matches!(failure(&turn), ParseFailure::MissingSecondItem { .. }));
    }

    #[test]
    fn missing_interrogative_falls_back_to_with_what() {
        let mut world = world();
        let turn = parse(&mut world, "unlock door");
        assert_eq!(final_text(&turn), "Unlock the door... with what?");
    }

    #[test]
    fn known_item_without_verb_support_is_refused() {
        let mut world = world();
        let turn = parse(&mut world, "eat door");
        assert_eq!(
            failure(&turn),
            &ParseFailure::VerbNotSupported {
                verb: "eat".into(),
                item: "door".into(),
            }
        );
        assert_eq!(final_text(&turn), "You can't eat the door.");
    }

    #[test]
    fn item_elsewhere_is_not_present_rather_than_unknown() {
        let mut world = world();
        let vault = world.add_room(Room::new("Vault", "A vault."));
        world.add_item(Item::new("lantern", "a dark lantern").with_verb(take_verb()), Location::Room(vault));

        let turn = parse(&mut world, "take lantern");
        assert_eq!(failure(&turn), &ParseFailure::NotPresent { name: "lantern".into() });
        assert_eq!(final_text(&turn), "You don't see any lantern here.");
    }

    #[test]
    fn unknown_object_with_known_verb() {
        let mut world = world();
        let turn = parse(&mut world, "take zeppelin");
        assert_eq!(failure(&turn), &ParseFailure::NothingToActOn { verb: "take".into() });
        assert_eq!(final_text(&turn), "You don't see anything like that to take.");
    }

    #[test]
    fn known_item_with_unknown_verb() {
        let mut world = world();
        let turn = parse(&mut world, "juggle apple");
        assert_eq!(failure(&turn), &ParseFailure::UnknownVerb { item: "apple".into() });
        assert_eq!(final_text(&turn), "You can't do that to the apple.");
    }

    #[test]
    fn pure_gibberish_is_no_match() {
        let mut world = world();
        let turn = parse(&mut world, "xyzzy plugh");
        assert_eq!(failure(&turn), &ParseFailure::NoMatch);
    }

    #[test]
    fn keyword_dispatch_and_alias() {
        let mut world = world();
        let turn = parse(&mut world, "inventory");
        assert_eq!(turn.report, ParseReport::Keyword { name: "inventory".into() });
        assert_eq!(final_text(&turn), "You carry nothing.");

        let turn = parse(&mut world, "i");
        assert_eq!(turn.report, ParseReport::Keyword { name: "inventory".into() });
    }

    #[test]
    fn keyword_with_trailing_words_needs_args_enabled() {
        let mut world = world();
        // "inventory" does not take args, so trailing words fall through
        let turn = parse(&mut world, "inventory please");
        assert_eq!(failure(&turn), &ParseFailure::NoMatch);

        world.register_keyword(Keyword::new("shout", ActionChain::text("You shout!")).with_args());
        let turn = parse(&mut world, "shout very loudly");
        assert_eq!(turn.report, ParseReport::Keyword { name: "shout".into() });
    }

    #[test]
    fn room_verb_runs_without_an_object() {
        let mut world = world();
        let cell = world.current_room;
        let meditate = Verb::new("meditate").on_success(ActionChain::text("Calm settles over you."));
        world.register_verb_names(&meditate);
        if let Some(room) = world.rooms.get_mut(&cell) {
            room.verbs.insert(meditate.name.clone(), meditate);
        }

        let turn = parse(&mut world, "meditate");
        assert_eq!(
            turn.report,
            ParseReport::Dispatched {
                verb: "meditate".into(),
                item: None,
                secondary: None,
            }
        );
        assert_eq!(final_text(&turn), "Calm settles over you.");
    }

    #[test]
    fn longest_item_span_wins() {
        let mut world = world();
        let cell = world.current_room;
        world.add_item(Item::new("brass key", "a small brass key").with_verb(take_verb()), Location::Room(cell));
        world.add_item(Item::new("key", "a plain key").with_verb(take_verb()), Location::Room(cell));

        let turn = parse(&mut world, "take brass key");
        let ParseReport::Dispatched { item: Some(id), .. } = &turn.report else {
            panic!("expected dispatch, got {:?}", turn.report)
        };
        assert_eq!(world.item_name(*id), "brass key");
    }

    fn two_keys_world() -> (SkeinWorld, Uuid, Uuid) {
        let mut world = world();
        let cell = world.current_room;
        let turn_verb = |text: &str| Verb::new("turn").on_success(ActionChain::text(text));
        let first = world.add_item(
            Item::new("key", "a silver key").with_verb(turn_verb("The silver key turns.")),
            Location::Room(cell),
        );
        let second = world.add_item(
            Item::new("key", "a rusty key").with_verb(turn_verb("The rusty key grinds.")),
            Location::Room(cell),
        );
        (world, first, second)
    }

    #[test]
    fn duplicate_names_offer_disambiguation() {
        let (mut world, first, second) = two_keys_world();
        let turn = parse(&mut world, "turn key");
        let ParseReport::Disambiguating { candidates } = &turn.report else {
            panic!("expected disambiguation, got {:?}", turn.report)
        };
        let mut expected = vec![first, second];
        expected.sort_unstable();
        assert_eq!(candidates, &expected);

        let ChainCue::Choose(frame) = turn.cue() else {
            panic!("expected choose cue")
        };
        assert_eq!(frame.text, "Which key do you mean?");
        assert_eq!(
            frame.options,
            vec!["key (1)".to_string(), "key (2)".to_string(), "Cancel".to_string()]
        );
    }

    #[test]
    fn choosing_a_candidate_runs_its_verb() {
        let (mut world, first, second) = two_keys_world();
        let mut turn = parse(&mut world, "turn key");
        let cue = turn.runner.choose(0, &mut world).clone();
        let ChainCue::Finished { frame: Some(frame), outcome } = cue else {
            panic!("expected finished cue after choice")
        };
        let mut ordered = vec![first, second];
        ordered.sort_unstable();
        let expected = if world.item_name(ordered[0]) == "key" && world.items[&ordered[0]].description.contains("silver")
        {
            "The silver key turns."
        } else {
            "The rusty key grinds."
        };
        assert_eq!(frame.text, expected);
        assert!(outcome.succeeded);
    }

    #[test]
    fn cancelling_disambiguation_ends_the_turn_quietly() {
        let (mut world, _, _) = two_keys_world();
        let mut turn = parse(&mut world, "turn key");
        let cue = turn.runner.choose(2, &mut world).clone();
        let ChainCue::Finished { frame, outcome } = cue else {
            panic!("expected finished cue after cancel")
        };
        assert_eq!(frame, None);
        assert!(outcome.succeeded);
    }

    #[test]
    fn ambiguity_in_both_slots_is_refused() {
        let (mut world, _, _) = two_keys_world();
        let turn = parse(&mut world, "turn key with key");
        assert_eq!(failure(&turn), &ParseFailure::TooAmbiguous);
        assert_eq!(final_text(&turn), "More than one thing here matches. Try to be more specific.");
    }

    #[test]
    fn disambiguated_candidate_still_needs_its_second_item() {
        let mut world = world();
        let cell = world.current_room;
        let put = || {
            Verb::new("put")
                .prepositional(PrepositionPolicy::Required)
                .with_interrogative("in what?")
                .on_success(ActionChain::text("Done."))
        };
        world.add_item(Item::new("coin", "a gold coin").with_verb(put()), Location::Room(cell));
        world.add_item(Item::new("coin", "a bent coin").with_verb(put()), Location::Room(cell));

        let mut turn = parse(&mut world, "put coin");
        assert!(matches!(turn.report, ParseReport::Disambiguating { .. }));
        let cue = turn.runner.choose(0, &mut world).clone();
        let ChainCue::Finished { frame: Some(frame), outcome } = cue else {
            panic!("expected finished cue after choice")
        };
        assert_eq!(frame.text, "Put the coin... in what?");
        assert!(!outcome.succeeded);
    }

    #[test]
    fn shared_alias_candidates_keep_their_own_names() {
        let mut world = world();
        let cell = world.current_room;
        world.add_item(
            Item::new("brass key", "a small brass key").with_alias("key").with_verb(take_verb()),
            Location::Room(cell),
        );
        world.add_item(
            Item::new("iron key", "a heavy iron key").with_alias("key").with_verb(take_verb()),
            Location::Room(cell),
        );

        let turn = parse(&mut world, "take key");
        assert!(matches!(turn.report, ParseReport::Disambiguating { .. }));
        let ChainCue::Choose(frame) = turn.cue() else {
            panic!("expected choose cue")
        };
        assert_eq!(frame.text, "Which key do you mean?");
        assert_eq!(frame.options.len(), 3);
        assert!(frame.options.contains(&"brass key".to_string()));
        assert!(frame.options.contains(&"iron key".to_string()));
        assert_eq!(frame.options[2], "Cancel");
    }
}
