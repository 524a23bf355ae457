#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Skein **
//! Command-resolution engine with a small built-in demonstration world.

use anyhow::Result;
use log::{info, warn};
use skein_engine::{
    ActionChain, ChainContext, Chainable, Effect, EffectKey, EffectRelation, EffectSlot, GraphNode, Item, Keyword,
    Location, NodeOption, OptionGraph, PostScript, PrepositionPolicy, Room, SKEIN_VERSION, SequenceStrategy,
    SkeinWorld, StepValue, TextSequence, Verb, run_repl,
};

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: building demo world for skein v{SKEIN_VERSION}...");
    let mut world = demo_world();
    info!("Demo world ready.");

    run_repl(&mut world)
}

fn demo_world() -> SkeinWorld {
    let mut world = SkeinWorld::new_session();

    let post = world.add_room(Room::new(
        "Guard Post",
        "A cramped stone room. A bored warden minds a ledger behind a low counter. \
         An archway leads north to the gatehouse.",
    ));
    let gate = world.add_room(Room::new(
        "Gatehouse",
        "Wind whistles through the portcullis slots. A heavy iron door is set into the south wall.",
    ));
    world.current_room = post;

    world.register_keyword(Keyword::new("look", step_chain(look_around)).with_alias("l"));
    world.register_keyword(Keyword::new("inventory", step_chain(check_inventory)).with_alias("i"));
    world.register_keyword(Keyword::new("north", step_chain(go_north)).with_alias("n"));
    world.register_keyword(Keyword::new("south", step_chain(go_south)).with_alias("s"));

    let put = Verb::new("put")
        .with_alias("place")
        .prepositional(PrepositionPolicy::Required)
        .with_interrogative("in what?")
        .on_success(step_chain(put_item));
    let eat = Verb::new("eat").on_success(ActionChain::text(
        "Crisp and sour. You feel slightly more alert.",
    ));
    world.add_item(
        Item::new("apple", "a bruised green apple")
            .with_verb(takeable())
            .with_verb(put)
            .with_verb(eat),
        Location::Room(post),
    );
    world.add_item(Item::new("basket", "a wicker basket, mostly empty"), Location::Room(post));

    // two identically named keys so "turn key" exercises disambiguation
    world.add_item(
        Item::new("key", "a bright brass key")
            .with_verb(takeable())
            .with_verb(Verb::new("turn").on_success(ActionChain::text("The brass key spins freely. Too small."))),
        Location::Room(post),
    );
    world.add_item(
        Item::new("key", "a heavy iron key")
            .with_verb(takeable())
            .with_verb(Verb::new("turn").on_success(ActionChain::text("The iron key resists, then gives a click."))),
        Location::Room(post),
    );

    let unlock = Verb::new("unlock")
        .with_test(secondary_is_key)
        .prepositional(PrepositionPolicy::Required)
        .on_success(ActionChain::text("The key turns and the iron door swings open."))
        .on_failure(ActionChain::text("That doesn't fit the lock."));
    world.add_item(Item::new("door", "a heavy iron door").with_verb(unlock), Location::Room(gate));

    world.register_sequence(
        "gong-echo",
        TextSequence::new(
            SequenceStrategy::Cyclic,
            vec![
                "The note hangs in the air.",
                "A fainter echo answers from the gatehouse.",
                "Silence, at last.",
            ],
        ),
    );
    let ring = Verb::new("ring").with_alias("strike").on_success(
        ActionChain::text("You strike the gong.").with_post_script(PostScript::Sequence("gong-echo".to_string())),
    );
    world.add_item(Item::new("gong", "a dented ceremonial gong").with_verb(ring), Location::Room(post));
    world.add_effect(
        EffectKey::new(EffectSlot::name("gong"), EffectSlot::Any, "ring"),
        Effect::new(
            EffectRelation::Before,
            ActionChain::text("The warden glances up sharply."),
        ),
    );

    let talk = Verb::new("talk")
        .with_alias("speak")
        .on_success(ActionChain::new(vec![Chainable::Graph(warden_dialogue())]));
    world.add_item(
        Item::new("warden", "a grey-whiskered warden in a patched uniform").with_verb(talk),
        Location::Room(post),
    );

    world
}

fn warden_dialogue() -> OptionGraph {
    let hub = GraphNode::new("hub", ActionChain::text("The warden sets down his ledger. \"Yes?\""))
        .with_option(NodeOption::new("Ask about the door", "door"))
        .with_option(NodeOption::new("Ask about the gong", "gong"))
        .with_option(NodeOption::new("Farewell", "bye"));
    let door = GraphNode::new(
        "door",
        ActionChain::text("\"Locked since the flood. One of the keys by the basket still turns it.\""),
    )
    .with_option(NodeOption::new("Back", "hub"));
    // he only explains the gong once
    let gong = GraphNode::new(
        "gong",
        ActionChain::text("\"Ring it and the whole post knows your business.\""),
    )
    .with_option(NodeOption::new("Back", "hub"))
    .no_repeat();
    let bye = GraphNode::new("bye", ActionChain::text("\"Mind the gate.\""));
    match OptionGraph::new(vec![hub, door, gong, bye]) {
        Ok(graph) => graph,
        Err(err) => unreachable!("warden dialogue is malformed: {err}"),
    }
}

fn takeable() -> Verb {
    Verb::new("take")
        .with_alias("get")
        .with_alias("grab")
        .on_success(step_chain(take_item))
}

fn step_chain(step: fn(&mut SkeinWorld, &mut ChainContext) -> StepValue) -> ActionChain {
    ActionChain::new(vec![Chainable::Step(step)])
}

fn secondary_is_key(world: &SkeinWorld, ctx: &ChainContext) -> bool {
    ctx.secondary
        .and_then(|id| world.items.get(&id))
        .is_some_and(|item| item.name.contains("key"))
}

fn go_north(world: &mut SkeinWorld, _ctx: &mut ChainContext) -> StepValue {
    travel(world, "Gatehouse")
}

fn go_south(world: &mut SkeinWorld, _ctx: &mut ChainContext) -> StepValue {
    travel(world, "Guard Post")
}

fn travel(world: &mut SkeinWorld, name: &str) -> StepValue {
    let found = world
        .rooms
        .iter()
        .find(|(_, room)| room.name == name)
        .map(|(id, room)| (*id, room.description.clone()));
    match found {
        Some((id, description)) => {
            if world.current_room == id {
                return StepValue::text("You're already there.");
            }
            world.current_room = id;
            StepValue::text(format!("{name}\n\n{description}"))
        },
        None => {
            warn!("no room named '{name}'");
            StepValue::Halt
        },
    }
}

fn look_around(world: &mut SkeinWorld, _ctx: &mut ChainContext) -> StepValue {
    let Ok(room) = world.current_room_ref() else {
        return StepValue::Halt;
    };
    let mut text = format!("{}\n\n{}", room.name, room.description);
    let here: Vec<String> = room
        .contents
        .iter()
        .filter(|id| world.items.get(id).is_some_and(|item| item.visible))
        .map(|id| world.item_name(*id))
        .collect();
    if !here.is_empty() {
        text.push_str(&format!("\n\nYou see: {}.", here.join(", ")));
    }
    StepValue::text(text)
}

fn check_inventory(world: &mut SkeinWorld, _ctx: &mut ChainContext) -> StepValue {
    if world.inventory.is_empty() {
        return StepValue::text("You aren't carrying anything.");
    }
    let carried: Vec<String> = world.inventory.iter().map(|id| world.item_name(*id)).collect();
    StepValue::text(format!("You are carrying: {}.", carried.join(", ")))
}

fn take_item(world: &mut SkeinWorld, ctx: &mut ChainContext) -> StepValue {
    let Some(id) = ctx.item else {
        return StepValue::Halt;
    };
    match world.move_item(id, Location::Inventory) {
        Ok(()) => StepValue::text(format!("You take the {}.", world.item_name(id))),
        Err(err) => {
            warn!("take failed: {err}");
            StepValue::Halt
        },
    }
}

fn put_item(world: &mut SkeinWorld, ctx: &mut ChainContext) -> StepValue {
    let (Some(id), Some(target)) = (ctx.item, ctx.secondary) else {
        return StepValue::Halt;
    };
    match world.move_item(id, Location::Item(target)) {
        Ok(()) => StepValue::text(format!(
            "You put the {} in the {}.",
            world.item_name(id),
            world.item_name(target)
        )),
        Err(err) => {
            warn!("put failed: {err}");
            StepValue::Halt
        },
    }
}
