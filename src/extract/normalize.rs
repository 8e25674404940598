//! Canonicalization of district and metro spellings.
//!
//! Channel authors spell the same place several ways ("dighomi", "Digomi").
//! Each table maps the lowercase, space-collapsed form to the canonical
//! spelling; unknown names pass through with their original casing.

/// District alias table. Keys are lowercase with spaces removed.
const DISTRICT_ALIASES: &[(&str, &str)] = &[
    ("dighomi", "Digomi"),
    ("dididighomi", "DidiDigomi"),
];

/// Metro station alias table. Keys are lowercase with spaces removed.
const METRO_ALIASES: &[(&str, &str)] = &[
    ("libertysquare", "LibertySquare"),
    ("ahmetelitheatre", "AkhmeteliTheatre"),
    ("technicaluniversity", "TCUniversity"),
];

fn canonicalize(raw: Option<&str>, table: &[(&str, &str)]) -> Option<String> {
    let collapsed = raw?.trim().replace(' ', "");
    if collapsed.is_empty() {
        return None;
    }
    let key = collapsed.to_lowercase();
    match table.iter().find(|(alias, _)| *alias == key) {
        Some((_, canonical)) => Some((*canonical).to_string()),
        None => Some(collapsed),
    }
}

/// Normalize a raw district token to its canonical spelling.
pub fn normalize_district(raw: Option<&str>) -> Option<String> {
    canonicalize(raw, DISTRICT_ALIASES)
}

/// Normalize a raw metro token to its canonical spelling.
pub fn normalize_metro(raw: Option<&str>) -> Option<String> {
    canonicalize(raw, METRO_ALIASES)
}
