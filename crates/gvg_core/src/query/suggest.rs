//! Character picker suggestions.
//!
//! Names starting with the typed text rank before names merely containing
//! it; registry order is kept inside each group.

use crate::query::filter::normalize_prefix;
use crate::query::view::CharacterView;

/// Maximum suggestions shown by a picker.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 12;

/// Returns up to `limit` characters matching `text`.
///
/// Blank text returns the first `limit` characters unfiltered.
pub fn suggest_characters<'a>(
    characters: &'a [CharacterView],
    text: &str,
    limit: usize,
) -> Vec<&'a CharacterView> {
    let Some(needle) = normalize_prefix(text) else {
        return characters.iter().take(limit).collect();
    };

    let mut starts = Vec::new();
    let mut contains = Vec::new();
    for character in characters {
        let name = character.name.to_lowercase();
        if name.starts_with(&needle) {
            starts.push(character);
        } else if name.contains(&needle) {
            contains.push(character);
        }
    }

    starts.into_iter().chain(contains).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::{suggest_characters, DEFAULT_SUGGESTION_LIMIT};
    use crate::query::view::CharacterView;
    use uuid::Uuid;

    fn roster(names: &[&str]) -> Vec<CharacterView> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| CharacterView {
                id: Uuid::from_u128(index as u128 + 1),
                name: name.to_string(),
                image_url: None,
            })
            .collect()
    }

    #[test]
    fn prefix_matches_rank_before_substring_matches() {
        let characters = roster(&["Marcus", "Artemis", "Barbara", "Arlo"]);
        let names = suggest_characters(&characters, "AR", DEFAULT_SUGGESTION_LIMIT)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Artemis", "Arlo", "Marcus", "Barbara"]);
    }

    #[test]
    fn blank_text_returns_first_entries_up_to_limit() {
        let characters = roster(&["A", "B", "C"]);
        assert_eq!(suggest_characters(&characters, " ", 2).len(), 2);
    }
}
