//! Facility reference list and canonicalization of partner-entered labels.
//!
//! Partners pick facilities from a grouped list, but the write path also
//! accepts free text. Every incoming label is mapped onto the canonical
//! spelling when one matches, so listings stay filterable:
//!
//!   1. exact match after normalization
//!   2. first canonical entry containing the input (or contained by it)
//!   3. otherwise the input itself, title-cased

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// A titled group of facilities, as presented on the listing form and detail page.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityGroup {
    pub title: &'static str,
    /// Icon identifier understood by the front end.
    pub icon: &'static str,
    pub items: &'static [&'static str],
}

pub const FACILITY_GROUPS: &[FacilityGroup] = &[
    FacilityGroup {
        title: "Great for your stay",
        icon: "contact",
        items: &[
            "Balcony",
            "Air conditioning",
            "Parking",
            "Private bathroom",
            "View",
            "Free Wifi",
            "Kitchen",
            "Flat-screen TV",
            "Family rooms",
            "Non-smoking rooms",
        ],
    },
    FacilityGroup { title: "Kitchen", icon: "cooking-pot", items: &["Kitchen"] },
    FacilityGroup { title: "Bathroom", icon: "bath", items: &["Private bathroom"] },
    FacilityGroup { title: "Media & Technology", icon: "play", items: &["Flat-screen TV"] },
    FacilityGroup {
        title: "Outdoors",
        icon: "building",
        items: &["Picnic area", "Private pool", "Balcony", "Terrace"],
    },
    FacilityGroup { title: "Outdoor & View", icon: "tree-palm", items: &["View"] },
    FacilityGroup {
        title: "Transportation",
        icon: "tram-front",
        items: &["Car rental", "Airport shuttle (Additional charge)"],
    },
    FacilityGroup {
        title: "Front Desk Services",
        icon: "concierge-bell",
        items: &["Private check-in/out", "Baggage storage"],
    },
    FacilityGroup {
        title: "Cleaning Services",
        icon: "droplet",
        items: &["Daily housekeeping", "Ironing service", "Dry cleaning", "Laundry"],
    },
    FacilityGroup {
        title: "Miscellaneous",
        icon: "square-dashed",
        items: &[
            "Air conditioning",
            "Hypoallergenic room available",
            "Soundproof rooms",
            "Elevator",
            "Family rooms",
            "Non-smoking rooms",
        ],
    },
    FacilityGroup {
        title: "Safety & security",
        icon: "shield",
        items: &[
            "Fire extinguishers",
            "CCTV outside property",
            "CCTV in common areas",
            "Smoke alarms",
            "24-hour security",
        ],
    },
    FacilityGroup { title: "Languages Spoken", icon: "languages", items: &["English"] },
];

/// Notes shown under the parking and internet headings; stored verbatim when selected.
const FACILITY_NOTES: &[&str] = &[
    "Free private parking is available on site (reservation is not needed).",
    "Wifi is available in all areas and is free of charge.",
];

/// Canonical labels in match priority order, without duplicates.
pub static CANONICAL_FACILITIES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let first = FACILITY_GROUPS[0].items.iter();
    let rest = FACILITY_GROUPS[1..].iter().flat_map(|g| g.items.iter());
    let mut seen = HashSet::new();
    first
        .chain(FACILITY_NOTES.iter())
        .chain(rest)
        .copied()
        .filter(|item| seen.insert(*item))
        .collect()
});

/// (normalized key, canonical label) pairs, same order as [`CANONICAL_FACILITIES`].
static CANONICAL_KEYS: LazyLock<Vec<(String, &'static str)>> = LazyLock::new(|| {
    CANONICAL_FACILITIES
        .iter()
        .map(|label| (normalize_key(label), *label))
        .collect()
});

static SURROUNDING_QUOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[\u{2018}\u{2019}\u{201C}\u{201D}\"'`]+|[\u{2018}\u{2019}\u{201C}\u{201D}\"'`]+$")
        .expect("static regex")
});
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Normalize a label for comparison.
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let unquoted = SURROUNDING_QUOTES.replace_all(lowered.trim(), "");
    let stripped = PUNCTUATION.replace_all(&unquoted, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Map one incoming label to its canonical spelling.
///
/// Returns `None` for blank input.
pub fn match_to_canonical(raw: &str) -> Option<String> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }

    let key = normalize_key(cleaned);
    // An empty key is a substring of every entry; punctuation-only labels keep their own text.
    if !key.is_empty() {
        if let Some((_, label)) = CANONICAL_KEYS.iter().find(|(k, _)| *k == key) {
            return Some(label.to_string());
        }
        if let Some((_, label)) = CANONICAL_KEYS
            .iter()
            .find(|(k, _)| k.contains(key.as_str()) || key.contains(k.as_str()))
        {
            return Some(label.to_string());
        }
    }

    let titled = title_case(&SURROUNDING_QUOTES.replace_all(cleaned, ""));
    if titled.is_empty() {
        None
    } else {
        Some(titled)
    }
}

/// Canonicalize, drop blanks, and dedupe keeping the first occurrence.
pub fn sanitize_facilities<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|raw| match_to_canonical(raw.as_ref()))
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

/// Amenities are free text: trimmed, blanks dropped, nothing else.
pub fn sanitize_amenities<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .map(|a| a.as_ref().trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
