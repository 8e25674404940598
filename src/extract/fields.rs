//! Field extraction rules.
//!
//! Each extractor is a pure function over the message text, independent of
//! the others. The tag grammar: a tag token runs until whitespace, another
//! `#`, or a pictograph (the channel uses pictographs as field markers, so
//! they terminate tokens just like whitespace does).

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PetPolicy;

/// Characters that may appear inside a tag token.
const TAG_TOKEN: &str = r"[^\s#\u{1F300}-\u{1FAFF}\u{2600}-\u{27BF}]+";

static RE_HEADER_DISTRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s*#({})", TAG_TOKEN)).expect("district pattern"));
static RE_HEADER_METRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"🚇\s*#({})", TAG_TOKEN)).expect("metro pattern"));
static RE_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"📍\s*({}[^#\n]{{0,120}})", TAG_TOKEN)).expect("address pattern")
});
static RE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"💰.*?\$?\s*([0-9][0-9.,]*)\$?").expect("price pattern"));
static RE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,4}(?:\.\d+)?)\s*(?:Sq\.m|sqm|m2)").expect("size pattern")
});
static RE_ROOMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)#(\d+)Bed").expect("rooms pattern"));
static RE_RENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)#Rent").expect("rent pattern"));
static RE_SELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#(?:Sell|Sale)").expect("sell pattern"));
static RE_RENTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#Rented").expect("rented pattern"));
static RE_FLOOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})(?:/(\d{1,2}))?\s*Floor").expect("floor pattern"));
static RE_PETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#(Allowed|NotAllowed|ByAgreement)").expect("pets pattern"));
static RE_FEATURES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)✅\s*#([A-Za-z0-9]+)").expect("features pattern"));
static RE_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("float pattern"));

/// First non-blank line of the message, trimmed.
pub fn first_non_blank_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// District and metro raw tokens, read from the first non-blank line only.
///
/// Lines after the first are never consulted; body hashtags would otherwise
/// produce false positives. The district must open the line as a tag, the
/// metro may sit anywhere on it behind the transit pictograph.
pub fn extract_header(text: &str) -> (Option<String>, Option<String>) {
    let Some(first_line) = first_non_blank_line(text) else {
        return (None, None);
    };
    let district = RE_HEADER_DISTRICT
        .captures(first_line)
        .map(|caps| caps[1].to_string());
    let metro = RE_HEADER_METRO
        .captures(first_line)
        .map(|caps| caps[1].to_string());
    (district, metro)
}

/// Street address behind the location pin, trimmed, bounded at ~120 chars.
pub fn extract_address(text: &str) -> Option<String> {
    RE_ADDRESS
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Asking price. When the message restates the price (discounts usually
/// appear further down), the last occurrence wins.
pub fn extract_price(text: &str) -> Option<i64> {
    RE_PRICE
        .captures_iter(text)
        .last()
        .and_then(|caps| clean_int(&caps[1]))
}

/// Apartment size in square meters.
pub fn extract_size_sqm(text: &str) -> Option<f64> {
    RE_SIZE.captures(text).and_then(|caps| clean_float(&caps[1]))
}

/// Floor, and total floors when written as "floor/total".
pub fn extract_floor(text: &str) -> (Option<i32>, Option<i32>) {
    match RE_FLOOR.captures(text) {
        Some(caps) => {
            let floor = caps[1].parse().ok();
            let total = caps.get(2).and_then(|m| m.as_str().parse().ok());
            (floor, total)
        }
        None => (None, None),
    }
}

/// Bedroom count from a `#<n>Bed` tag, taken verbatim.
pub fn extract_rooms(text: &str) -> Option<i32> {
    RE_ROOMS.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// True when the message carries the rented marker anywhere.
pub fn has_rented_marker(text: &str) -> bool {
    RE_RENTED.is_match(text)
}

/// True when the message carries a rent tag.
pub fn has_rent_tag(text: &str) -> bool {
    RE_RENT.is_match(text)
}

/// True when the message carries a sell tag.
pub fn has_sell_tag(text: &str) -> bool {
    RE_SELL.is_match(text)
}

/// Pet policy tag, mapped to its canonical value.
pub fn extract_pets(text: &str) -> Option<PetPolicy> {
    RE_PETS
        .captures(text)
        .and_then(|caps| match caps[1].to_lowercase().as_str() {
            "allowed" => Some(PetPolicy::Allowed),
            "notallowed" => Some(PetPolicy::NotAllowed),
            "byagreement" => Some(PetPolicy::ByAgreement),
            _ => None,
        })
}

/// Amenity tags behind checkmarks, in order of appearance, duplicates kept.
pub fn extract_features(text: &str) -> Vec<String> {
    RE_FEATURES
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Strip every non-digit character and parse what remains.
///
/// The channel writes "100.000" and "100,000" for one hundred thousand, so
/// grouping separators and decimal points are treated identically here.
/// Decimal prices would be corrupted by this rule; the channel has none.
pub fn clean_int(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// First digit run with at most one decimal point.
pub fn clean_float(raw: &str) -> Option<f64> {
    RE_FLOAT.find(raw).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_district_must_open_the_line() {
        let (district, metro) = extract_header("#Vake 🚇 #Rustaveli\nbody");
        assert_eq!(district.as_deref(), Some("Vake"));
        assert_eq!(metro.as_deref(), Some("Rustaveli"));

        let (district, _) = extract_header("for #Rent in #Vake");
        assert_eq!(district, None);
    }

    #[test]
    fn header_skips_blank_leading_lines() {
        let (district, _) = extract_header("\n  \n#Saburtalo rest");
        assert_eq!(district.as_deref(), Some("Saburtalo"));
    }

    #[test]
    fn header_token_stops_at_pictograph() {
        // No space between the metro tag and the location pin.
        let (district, metro) = extract_header("#Saburtalo 🚇  #Delisi📍2 Giorgi Gegechkori St");
        assert_eq!(district.as_deref(), Some("Saburtalo"));
        assert_eq!(metro.as_deref(), Some("Delisi"));
    }

    #[test]
    fn address_is_trimmed_and_stops_at_tag() {
        assert_eq!(
            extract_address("📍Park Home Delisi    \nrest"),
            Some("Park Home Delisi".into())
        );
        assert_eq!(
            extract_address("📍1 Tskneti Hwy #Rent"),
            Some("1 Tskneti Hwy".into())
        );
    }

    #[test]
    fn last_price_occurrence_wins() {
        let text = "💰 900$\nnow discounted\n💰 800$";
        assert_eq!(extract_price(text), Some(800));
    }

    #[test]
    fn price_grouping_dot_is_stripped() {
        assert_eq!(extract_price("💰235.000$"), Some(235_000));
        assert_eq!(extract_price("💰 100,000$"), Some(100_000));
    }

    #[test]
    fn price_accepts_leading_dollar_sign() {
        assert_eq!(extract_price("💰 $1500 + Deposit $1500"), Some(1500));
    }

    #[test]
    fn size_accepts_decimal_and_unit_variants() {
        assert_eq!(extract_size_sqm("🏠 54.9 Sq.m | 2Floor"), Some(54.9));
        assert_eq!(extract_size_sqm("75 sqm"), Some(75.0));
        assert_eq!(extract_size_sqm("75 M2"), Some(75.0));
    }

    #[test]
    fn floor_with_and_without_total() {
        assert_eq!(extract_floor("on 9 Floor"), (Some(9), None));
        assert_eq!(extract_floor("4/12 Floor"), (Some(4), Some(12)));
        assert_eq!(extract_floor("2Floor"), (Some(2), None));
    }

    #[test]
    fn rooms_tag_is_verbatim() {
        assert_eq!(extract_rooms("🏢 #2Bed Apartment"), Some(2));
        assert_eq!(extract_rooms("#0Bed studio"), Some(0));
        assert_eq!(extract_rooms("no tag"), None);
    }

    #[test]
    fn pet_policy_maps_to_canonical_values() {
        assert_eq!(extract_pets("🐕Pets: #ByAgreement"), Some(PetPolicy::ByAgreement));
        assert_eq!(extract_pets("🐕Pets: #Allowed (Deposit)"), Some(PetPolicy::Allowed));
        assert_eq!(extract_pets("#NotAllowed"), Some(PetPolicy::NotAllowed));
        assert_eq!(extract_pets("no policy"), None);
    }

    #[test]
    fn features_keep_order_and_duplicates() {
        let feats = extract_features("✅#Oven ✅ #Balcony ✖️Dishwasher ✅#Oven");
        assert_eq!(feats, vec!["Oven", "Balcony", "Oven"]);
    }

    #[test]
    fn clean_int_treats_separators_identically() {
        assert_eq!(clean_int("100.000"), Some(100_000));
        assert_eq!(clean_int("100,000"), Some(100_000));
        assert_eq!(clean_int("..."), None);
    }
}
