// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial context classification from free-text space hints
//!
//! Room names arrive in English or Spanish, with or without accents, and
//! sometimes only inside a property set name. Hints are normalized to
//! lowercase ASCII tokens and matched whole-word against two keyword sets.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Keywords of service spaces (kitchens, bathrooms, circulation)
pub const SERVICE_KEYWORDS: &[&str] = &[
    "kitchen",
    "cocina",
    "bathroom",
    "toilet",
    "wc",
    "lavatory",
    "restroom",
    "aseo",
    "bano",
    "corridor",
    "hallway",
    "circulation",
    "pasillo",
    "pasadizo",
    "distribuidor",
];

/// Keywords of general occupancy spaces
pub const GENERAL_KEYWORDS: &[&str] = &[
    "living",
    "salon",
    "sala",
    "comedor",
    "dining",
    "bedroom",
    "dormitorio",
    "habitacion",
    "room",
    "office",
    "study",
    "classroom",
];

/// Functional category of the spaces around an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceCategory {
    General,
    Service,
    #[default]
    Unknown,
}

/// Classification result
///
/// `has_links == false` together with `Unknown` means there was no spatial
/// information at all, as opposed to linked spaces with unrecognized names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceContext {
    pub has_links: bool,
    pub category: SpaceCategory,
}

/// Strip diacritics, lowercase, and collapse to space separated ASCII tokens
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-token keyword match on normalized text
pub fn contains_keyword(normalized: &str, keyword: &str) -> bool {
    normalized.split(' ').any(|token| token == keyword)
}

fn matches_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| contains_keyword(normalized, kw))
}

/// Classify a set of hints; general occupancy wins over service
pub fn classify<S: AsRef<str>>(hints: &[S], has_links: bool) -> SpaceContext {
    let mut service = false;
    let mut general = false;
    for hint in hints {
        let text = normalize(hint.as_ref());
        if text.is_empty() {
            continue;
        }
        service |= matches_any(&text, SERVICE_KEYWORDS);
        general |= matches_any(&text, GENERAL_KEYWORDS);
    }

    let category = if general {
        SpaceCategory::General
    } else if service {
        SpaceCategory::Service
    } else {
        SpaceCategory::Unknown
    };

    SpaceContext {
        has_links,
        category,
    }
}
