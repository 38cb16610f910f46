//! Presentation view models with character data denormalized in.
//!
//! # Responsibility
//! - Join stored rosters with the character registry.
//! - Apply image URL resolution uniformly to every character reference.
//!
//! # Invariants
//! - Every roster slot resolves to a registry entry; a dangling reference is
//!   reported, never silently dropped.

use crate::images::ImageResolver;
use crate::model::character::{Character, CharacterId};
use crate::model::composition::{CompositionKey, Roster, ROSTER_SIZE};
use crate::model::counter::{Counter, CounterId};
use crate::model::defense::{Defense, DefenseId};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Character reference as shown to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterView {
    pub id: CharacterId,
    pub name: String,
    pub image_url: Option<String>,
}

/// Defense joined with its members' names and portraits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefenseView {
    pub id: DefenseId,
    pub composition_key: CompositionKey,
    /// Slot order as stored.
    pub members: [CharacterView; ROSTER_SIZE],
    pub member_notes: [String; ROSTER_SIZE],
    pub wins: u32,
    pub notes: String,
}

impl DefenseView {
    pub fn member_ids(&self) -> [CharacterId; ROSTER_SIZE] {
        [self.members[0].id, self.members[1].id, self.members[2].id]
    }

    /// `"A / B / C"` in slot order.
    pub fn label(&self) -> String {
        self.members
            .iter()
            .map(|member| member.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Counter joined with its attackers' names and portraits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterView {
    pub id: CounterId,
    pub defense_id: DefenseId,
    pub attack_key: CompositionKey,
    pub attackers: [CharacterView; ROSTER_SIZE],
    pub wins: u32,
    pub notes: String,
}

/// A roster slot points at a character the registry does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCharacter(pub CharacterId);

impl Display for UnknownCharacter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "roster references unknown character: {}", self.0)
    }
}

impl Error for UnknownCharacter {}

/// Builds view models from raw records and one registry snapshot.
pub struct ViewAssembler {
    characters: HashMap<CharacterId, CharacterView>,
}

impl ViewAssembler {
    pub fn new(characters: &[Character], images: &ImageResolver) -> Self {
        let characters = characters
            .iter()
            .map(|character| (character.uuid, character_view(character, images)))
            .collect();
        Self { characters }
    }

    pub fn defense(&self, defense: &Defense) -> Result<DefenseView, UnknownCharacter> {
        Ok(DefenseView {
            id: defense.uuid,
            composition_key: defense.composition_key(),
            members: self.roster(&defense.roster)?,
            member_notes: defense.member_notes.clone(),
            wins: defense.wins,
            notes: defense.notes.clone(),
        })
    }

    pub fn counter(&self, counter: &Counter) -> Result<CounterView, UnknownCharacter> {
        Ok(CounterView {
            id: counter.uuid,
            defense_id: counter.defense_id,
            attack_key: counter.attack_key(),
            attackers: self.roster(&counter.attackers)?,
            wins: counter.wins,
            notes: counter.notes.clone(),
        })
    }

    fn roster(&self, roster: &Roster) -> Result<[CharacterView; ROSTER_SIZE], UnknownCharacter> {
        let [a, b, c] = *roster.members();
        Ok([self.lookup(a)?, self.lookup(b)?, self.lookup(c)?])
    }

    fn lookup(&self, id: CharacterId) -> Result<CharacterView, UnknownCharacter> {
        self.characters.get(&id).cloned().ok_or(UnknownCharacter(id))
    }
}

/// Converts one registry record, resolving its portrait URL.
pub fn character_view(character: &Character, images: &ImageResolver) -> CharacterView {
    CharacterView {
        id: character.uuid,
        name: character.name.clone(),
        image_url: images.resolve(character.image_path.as_deref()),
    }
}
