//! Listing extraction
//!
//! Turns one raw channel message into a typed [`ParsedListing`], or rejects
//! it with a [`RejectReason`]. The builder is a pure transform: extractors
//! run independently over the text, district/metro go through the
//! normalizer, and two guards (the rented marker and the structured-field
//! threshold) keep non-listing chatter out of the store. Callers decide
//! what to log about rejections.

use thiserror::Error;

use crate::models::{ListingKind, PetPolicy};

pub mod fields;
pub mod normalize;

/// Minimum count of key fields a message must carry to be treated as a
/// listing. Promotional posts on the same channels reuse the tag style but
/// rarely clear this bar.
pub const MIN_STRUCTURED_FIELDS: usize = 3;

/// One extracted listing, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedListing {
    pub channel_id: String,
    pub source_id: i64,
    pub kind: ListingKind,
    pub district: Option<String>,
    pub metro: Option<String>,
    pub address: Option<String>,
    pub rooms: Option<i32>,
    pub size_sqm: Option<f64>,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub price: Option<i64>,
    pub pets: Option<PetPolicy>,
    pub features: Vec<String>,
}

/// Why a message was not turned into a listing.
///
/// All variants are expected and non-fatal; the sync engine still counts the
/// message as seen so a listing edited into one of these shapes gets
/// tombstoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("empty message body")]
    EmptyMessage,
    #[error("message carries the rented marker")]
    AlreadyRented,
    #[error("no rent or sell tag")]
    NoKindTag,
    #[error("only {present} structured fields present")]
    InsufficientStructure { present: usize },
}

/// Build a listing record from a raw message body.
pub fn build_listing(
    text: &str,
    source_id: i64,
    channel_id: &str,
) -> Result<ParsedListing, RejectReason> {
    if text.is_empty() {
        return Err(RejectReason::EmptyMessage);
    }

    if fields::has_rented_marker(text) {
        return Err(RejectReason::AlreadyRented);
    }

    // Rent is checked before sell, so a message carrying both counts as rent.
    let kind = if fields::has_rent_tag(text) {
        ListingKind::Rent
    } else if fields::has_sell_tag(text) {
        ListingKind::Sell
    } else {
        return Err(RejectReason::NoKindTag);
    };

    let (raw_district, raw_metro) = fields::extract_header(text);
    let district = normalize::normalize_district(raw_district.as_deref());
    let metro = normalize::normalize_metro(raw_metro.as_deref());

    let address = fields::extract_address(text);
    let price = fields::extract_price(text);
    let size_sqm = fields::extract_size_sqm(text);
    let (floor, total_floors) = fields::extract_floor(text);
    let rooms = fields::extract_rooms(text);
    let pets = fields::extract_pets(text);
    let features = fields::extract_features(text);

    let present = [
        district.is_some(),
        price.is_some(),
        rooms.is_some(),
        size_sqm.is_some(),
        address.is_some(),
    ]
    .iter()
    .filter(|p| **p)
    .count();
    if present < MIN_STRUCTURED_FIELDS {
        return Err(RejectReason::InsufficientStructure { present });
    }

    Ok(ParsedListing {
        channel_id: channel_id.to_string(),
        source_id,
        kind,
        district,
        metro,
        address,
        rooms,
        size_sqm,
        floor,
        total_floors,
        price,
        pets,
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rent_wins_over_sell_when_both_present() {
        let text = "#Vake\n📍Somewhere St\n#1Bed for #Rent or #Sell\n💰 500$";
        let listing = build_listing(text, 1, "77").expect("should build");
        assert_eq!(listing.kind, ListingKind::Rent);
    }

    #[test]
    fn rented_marker_rejects_before_anything_else() {
        let text = "#Vake\n📍Somewhere St\n#1Bed for #Rent #Rented\n💰 500$";
        assert_eq!(build_listing(text, 1, "77"), Err(RejectReason::AlreadyRented));
    }

    #[test]
    fn empty_body_is_rejected() {
        assert_eq!(build_listing("", 1, "77"), Err(RejectReason::EmptyMessage));
    }

    #[test]
    fn threshold_boundary_two_fields_rejected_three_accepted() {
        // district + price only
        let two = "#Vake apartment for #Rent\n💰 500$";
        assert_eq!(
            build_listing(two, 1, "77"),
            Err(RejectReason::InsufficientStructure { present: 2 })
        );

        // district + price + rooms
        let three = "#Vake apartment #1Bed for #Rent\n💰 500$";
        assert!(build_listing(three, 1, "77").is_ok());
    }

    #[test]
    fn builder_is_idempotent() {
        let text = "#Vake 🚇 #Rustaveli\n🏢 #1Bed Apartment for #Rent\n🏠 75 Sq.m | 10 Floor |\n💰 800$";
        let first = build_listing(text, 100, "12345").expect("should build");
        let second = build_listing(text, 100, "12345").expect("should build");
        assert_eq!(first, second);
    }
}
