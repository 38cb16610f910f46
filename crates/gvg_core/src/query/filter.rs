//! Defense filter and sort engine.
//!
//! # Responsibility
//! - Narrow an in-memory defense list by name prefix and by member set.
//! - Order the result by win count or by slot-order name concatenation.
//!
//! # Invariants
//! - All active filters combine with AND; blank filters keep everything.
//! - Set containment is tested on member ids, never on the composition key,
//!   so 1- and 2-member selections match partial rosters in any slot.
//! - Sorting is stable: ties keep their input order.
//! - The input slice is never mutated.

use crate::model::character::CharacterId;
use crate::model::composition::ROSTER_SIZE;
use crate::query::view::DefenseView;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Result ordering for defense lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    WinsDesc,
    WinsAsc,
    /// Case-insensitive on `slot1 + slot2 + slot3` names.
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WinsDesc => "wins_desc",
            Self::WinsAsc => "wins_asc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortOrder(pub String);

impl Display for UnknownSortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown sort order `{}`; expected wins_desc|wins_asc|name_asc|name_desc",
            self.0
        )
    }
}

impl Error for UnknownSortOrder {}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wins_desc" => Ok(Self::WinsDesc),
            "wins_asc" => Ok(Self::WinsAsc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            _ => Err(UnknownSortOrder(value.to_string())),
        }
    }
}

/// Filter and sort options for one defense list evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseQuery {
    /// Keep defenses where some member name starts with this text.
    pub text: String,
    /// Keep defenses where every prefix starts some member name.
    pub prefixes: Vec<String>,
    /// Keep defenses containing every selected character, any slot.
    pub members: Vec<Option<CharacterId>>,
    pub sort: SortOrder,
}

impl DefenseQuery {
    pub fn is_unfiltered(&self) -> bool {
        normalize_prefix(&self.text).is_none()
            && normalized_prefixes(&self.prefixes).is_empty()
            && wanted_members(&self.members).is_empty()
    }
}

/// Evaluates `query` over `defenses` and returns a new ordered list.
pub fn apply_defense_query(defenses: &[DefenseView], query: &DefenseQuery) -> Vec<DefenseView> {
    let text = normalize_prefix(&query.text);
    let prefixes = normalized_prefixes(&query.prefixes);
    let wanted = wanted_members(&query.members);

    let mut rows = if query.is_unfiltered() {
        defenses.to_vec()
    } else {
        defenses
            .iter()
            .filter(|defense| text.as_deref().map_or(true, |t| matches_text(defense, t)))
            .filter(|defense| matches_all_prefixes(defense, &prefixes))
            .filter(|defense| matches_members(&defense.member_ids(), &wanted))
            .cloned()
            .collect::<Vec<_>>()
    };

    sort_defenses(&mut rows, query.sort);
    rows
}

/// Trims and lowercases a prefix; blank input means "no filter".
pub fn normalize_prefix(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Drops empty slots and collapses duplicate selections, keeping first-seen order.
pub fn wanted_members(slots: &[Option<CharacterId>]) -> Vec<CharacterId> {
    let mut seen = HashSet::new();
    slots
        .iter()
        .flatten()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// `true` when some member name starts with the normalized prefix `t`.
pub fn matches_text(defense: &DefenseView, t: &str) -> bool {
    defense
        .members
        .iter()
        .any(|member| member.name.to_lowercase().starts_with(t))
}

/// `true` when every member of `wanted` is in `members`, regardless of slot.
pub fn matches_members(members: &[CharacterId; ROSTER_SIZE], wanted: &[CharacterId]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let member_set = members.iter().collect::<HashSet<_>>();
    wanted.iter().all(|id| member_set.contains(id))
}

/// Sorts in place with a stable comparator for `order`.
pub fn sort_defenses(rows: &mut [DefenseView], order: SortOrder) {
    match order {
        SortOrder::WinsDesc => rows.sort_by(|a, b| b.wins.cmp(&a.wins)),
        SortOrder::WinsAsc => rows.sort_by(|a, b| a.wins.cmp(&b.wins)),
        SortOrder::NameAsc => rows.sort_by(compare_slot_names),
        SortOrder::NameDesc => rows.sort_by(|a, b| compare_slot_names(b, a)),
    }
}

/// Case-insensitive first; raw text only breaks ties between case variants.
fn compare_slot_names(a: &DefenseView, b: &DefenseView) -> Ordering {
    let (a, b) = (slot_name_key(a), slot_name_key(b));
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

fn slot_name_key(defense: &DefenseView) -> String {
    defense
        .members
        .iter()
        .map(|member| member.name.as_str())
        .collect()
}

fn normalized_prefixes(raw: &[String]) -> Vec<String> {
    raw.iter().filter_map(|value| normalize_prefix(value)).collect()
}

fn matches_all_prefixes(defense: &DefenseView, prefixes: &[String]) -> bool {
    prefixes.iter().all(|prefix| matches_text(defense, prefix))
}

#[cfg(test)]
mod tests {
    use super::{
        apply_defense_query, matches_members, normalize_prefix, wanted_members, DefenseQuery,
        SortOrder,
    };
    use crate::model::composition::canonical_key;
    use crate::query::view::{CharacterView, DefenseView};
    use uuid::Uuid;

    fn character(n: u128, name: &str) -> CharacterView {
        CharacterView {
            id: Uuid::from_u128(n),
            name: name.to_string(),
            image_url: None,
        }
    }

    fn defense(id: u128, members: [CharacterView; 3], wins: u32) -> DefenseView {
        let ids = [members[0].id, members[1].id, members[2].id];
        DefenseView {
            id: Uuid::from_u128(id),
            composition_key: canonical_key(&ids).unwrap(),
            members,
            member_notes: Default::default(),
            wins,
            notes: String::new(),
        }
    }

    #[test]
    fn normalize_prefix_trims_and_lowercases() {
        assert_eq!(normalize_prefix("  ArT ").as_deref(), Some("art"));
        assert_eq!(normalize_prefix("   "), None);
    }

    #[test]
    fn wanted_members_drops_empty_and_duplicate_slots() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert_eq!(wanted_members(&[Some(b), None, Some(b), Some(a)]), vec![b, a]);
    }

    #[test]
    fn empty_selection_matches_everything() {
        let members = [Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)];
        assert!(matches_members(&members, &[]));
    }

    #[test]
    fn text_and_member_filters_combine_with_and() {
        let artemis = character(1, "Artemis");
        let bruno = character(2, "Bruno");
        let cassia = character(3, "Cassia");
        let arlo = character(4, "Arlo");
        let rows = vec![
            defense(10, [artemis.clone(), bruno.clone(), cassia.clone()], 1),
            defense(11, [arlo.clone(), bruno.clone(), cassia.clone()], 2),
            defense(12, [artemis.clone(), cassia.clone(), arlo.clone()], 3),
        ];

        let query = DefenseQuery {
            text: "ar".to_string(),
            members: vec![Some(bruno.id)],
            ..DefenseQuery::default()
        };
        let ids = apply_defense_query(&rows, &query)
            .into_iter()
            .map(|row| row.id.as_u128())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![11, 10]);
    }

    #[test]
    fn unfiltered_query_returns_everything_sorted() {
        let rows = vec![
            defense(
                10,
                [character(1, "A"), character(2, "B"), character(3, "C")],
                1,
            ),
            defense(
                11,
                [character(4, "D"), character(5, "E"), character(6, "F")],
                5,
            ),
        ];
        let query = DefenseQuery::default();
        assert!(query.is_unfiltered());
        let sorted = apply_defense_query(&rows, &query);
        assert_eq!(sorted[0].id.as_u128(), 11);
        assert_eq!(rows[0].id.as_u128(), 10);
    }

    #[test]
    fn sort_order_parses_wire_names() {
        assert_eq!("name_desc".parse::<SortOrder>().unwrap(), SortOrder::NameDesc);
        assert!("newest".parse::<SortOrder>().is_err());
    }
}
