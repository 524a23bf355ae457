//! The state store.
//!
//! [`SkeinWorld`] holds every room and item in the running session, the
//! player's whereabouts and inventory, the registered text sequences,
//! the effect table, and the session registry. It is created at session
//! start, mutated synchronously by chains and steps, and dropped at
//! teardown. Everything the snapshot collaborator needs is plain serde
//! data; verb maps, effects and the registry are rebuilt at session init.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use variantly::Variantly;

use crate::SKEIN_VERSION;
use crate::effect::{Effect, EffectKey, EffectTable};
use crate::item::Item;
use crate::registry::{Keyword, SessionRegistry};
use crate::room::Room;
use crate::sequence::TextSequence;
use crate::verb::Verb;

/// Where an [`Item`] may be located. `Item(id)` is the container reference.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, Variantly, PartialEq, Eq)]
pub enum Location {
    Item(Uuid),
    Inventory,
    #[default]
    Nowhere,
    Room(Uuid),
}

/// Complete state of a running session.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SkeinWorld {
    pub rooms: HashMap<Uuid, Room>,
    pub items: HashMap<Uuid, Item>,
    /// The room the player currently occupies.
    pub current_room: Uuid,
    pub inventory: HashSet<Uuid>,
    /// Named text sequences, cursor state included.
    pub sequences: HashMap<String, TextSequence>,
    #[serde(skip)]
    pub effects: EffectTable,
    #[serde(skip)]
    pub registry: SessionRegistry,
    pub version: String,
}

impl SkeinWorld {
    /// Start an empty session with a fresh registry.
    pub fn new_session() -> Self {
        let world = Self {
            version: SKEIN_VERSION.to_string(),
            ..Self::default()
        };
        info!("new Skein session created");
        world
    }

    /// Add a room and return its id.
    pub fn add_room(&mut self, room: Room) -> Uuid {
        let id = room.id;
        for verb in room.verbs.values() {
            self.registry.register_verb_names(verb);
        }
        self.rooms.insert(id, room);
        id
    }

    /// Add an item at `location`, registering its names and verbs and
    /// updating the holder's contents.
    pub fn add_item(&mut self, mut item: Item, location: Location) -> Uuid {
        let id = item.id;
        item.location = location;
        self.registry.register_item_names(&item);
        for verb in item.verbs.values() {
            self.registry.register_verb_names(verb);
        }
        self.items.insert(id, item);
        match location {
            Location::Room(room_id) => {
                if let Some(room) = self.rooms.get_mut(&room_id) {
                    room.contents.insert(id);
                } else {
                    warn!("item {id} added to unknown room {room_id}");
                }
            },
            Location::Item(container_id) => {
                if let Some(container) = self.items.get_mut(&container_id) {
                    container.contents.insert(id);
                } else {
                    warn!("item {id} added to unknown container {container_id}");
                }
            },
            Location::Inventory => {
                self.inventory.insert(id);
            },
            Location::Nowhere => {},
        }
        id
    }

    pub fn register_keyword(&mut self, keyword: Keyword) {
        self.registry.register_keyword(keyword);
    }

    /// Register a verb's names without attaching it anywhere, so the parser
    /// recognizes it even where no nearby item supports it.
    pub fn register_verb_names(&mut self, verb: &Verb) {
        self.registry.register_verb_names(verb);
    }

    pub fn register_sequence(&mut self, key: &str, sequence: TextSequence) {
        self.sequences.insert(key.to_string(), sequence);
    }

    pub fn add_effect(&mut self, key: EffectKey, effect: Effect) {
        self.effects.register(key, effect);
    }

    /// Obtain a reference to the room the player occupies.
    ///
    /// # Errors
    /// - if the current room id is not in the world
    pub fn current_room_ref(&self) -> Result<&Room> {
        self.rooms
            .get(&self.current_room)
            .ok_or_else(|| anyhow!("current room id ({}) not found in world", self.current_room))
    }

    /// Display name for an item id, or a placeholder if unknown.
    pub fn item_name(&self, id: Uuid) -> String {
        self.items.get(&id).map_or_else(|| "something".to_string(), |i| i.name.clone())
    }

    /// All item ids the parser may resolve against right now: visible items
    /// in the current room, held items, and the visible contents of those,
    /// recursively.
    pub fn visible_items(&self) -> HashSet<Uuid> {
        let mut visible = HashSet::new();
        let mut pending: Vec<Uuid> = Vec::new();
        if let Some(room) = self.rooms.get(&self.current_room) {
            pending.extend(&room.contents);
        }
        pending.extend(&self.inventory);
        while let Some(id) = pending.pop() {
            let Some(item) = self.items.get(&id) else {
                warn!("dangling item id {id} in a contents set");
                continue;
            };
            if item.visible && visible.insert(id) {
                pending.extend(&item.contents);
            }
        }
        visible
    }

    /// Move an item to a new location, keeping holder contents coherent.
    ///
    /// # Errors
    /// - if the item or the destination holder does not exist
    pub fn move_item(&mut self, item_id: Uuid, to: Location) -> Result<()> {
        let from = self
            .items
            .get(&item_id)
            .map(|i| i.location)
            .with_context(|| format!("move_item: no item with id {item_id}"))?;

        match to {
            Location::Room(room_id) => {
                self.rooms
                    .get_mut(&room_id)
                    .with_context(|| format!("move_item: no room with id {room_id}"))?
                    .contents
                    .insert(item_id);
            },
            Location::Item(container_id) => {
                if container_id == item_id {
                    return Err(anyhow!("move_item: cannot place an item inside itself"));
                }
                self.items
                    .get_mut(&container_id)
                    .with_context(|| format!("move_item: no container with id {container_id}"))?
                    .contents
                    .insert(item_id);
            },
            Location::Inventory => {
                self.inventory.insert(item_id);
            },
            Location::Nowhere => {},
        }

        match from {
            Location::Room(room_id) => {
                if let Some(room) = self.rooms.get_mut(&room_id) {
                    room.contents.remove(&item_id);
                }
            },
            Location::Item(container_id) => {
                if let Some(container) = self.items.get_mut(&container_id) {
                    container.contents.remove(&item_id);
                }
            },
            Location::Inventory => {
                self.inventory.remove(&item_id);
            },
            Location::Nowhere => {},
        }

        if let Some(item) = self.items.get_mut(&item_id) {
            item.location = to;
        }
        Ok(())
    }

    /// Produce the next text of a registered sequence, advancing its cursor.
    pub fn advance_sequence(&mut self, key: &str) -> Option<String> {
        match self.sequences.get_mut(key) {
            Some(sequence) => sequence.next_text(),
            None => {
                warn!("chain referenced unregistered text sequence '{key}'");
                None
            },
        }
    }
}
