//! Target-owned category vocabularies.
//!
//! Each target ecosystem validates categories against its own closed set,
//! so the tables here are independent constants, never derived from each
//! other.

/// Categories AltStore accepts; the vocabulary is identity-mapped.
const ALTSTORE_CATEGORIES: &[&str] = &[
    "developer",
    "entertainment",
    "games",
    "lifestyle",
    "other",
    "photo-video",
    "social",
    "utilities",
];

const ALTSTORE_DEFAULT: &str = "other";

/// Catalog label → F-Droid category.
const FDROID_CATEGORY_MAP: &[(&str, &str)] = &[
    ("entertainment", "Multimedia"),
    ("games", "Games"),
    ("lifestyle", "System"),
    ("photo-video", "Multimedia"),
    ("social", "Internet"),
    ("utilities", "System"),
    ("developer", "Development"),
    ("other", "System"),
];

const FDROID_DEFAULT: &str = "System";

fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "-")
}

pub fn altstore_category(raw: &str) -> String {
    let normalized = normalize(raw);
    if ALTSTORE_CATEGORIES.contains(&normalized.as_str()) {
        normalized
    } else {
        ALTSTORE_DEFAULT.to_string()
    }
}

pub fn fdroid_category(raw: &str) -> &'static str {
    let normalized = normalize(raw);
    FDROID_CATEGORY_MAP
        .iter()
        .find(|(label, _)| *label == normalized)
        .map(|(_, category)| *category)
        .unwrap_or(FDROID_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altstore_accepts_known_labels_after_normalizing() {
        assert_eq!(altstore_category("Photo-Video"), "photo-video");
        assert_eq!(altstore_category("Photo Video"), "photo-video");
        assert_eq!(altstore_category("GAMES"), "games");
    }

    #[test]
    fn altstore_falls_back_to_other() {
        assert_eq!(altstore_category("unknown-xyz"), "other");
        assert_eq!(altstore_category(""), "other");
    }

    #[test]
    fn fdroid_maps_through_its_own_table() {
        assert_eq!(fdroid_category("Social"), "Internet");
        assert_eq!(fdroid_category("photo video"), "Multimedia");
        assert_eq!(fdroid_category("developer"), "Development");
    }

    #[test]
    fn fdroid_falls_back_to_system() {
        assert_eq!(fdroid_category("unknown-xyz"), "System");
        assert_eq!(fdroid_category("games!"), "System");
    }
}
