//! # Data Models
//!
//! Entity models for the listings store plus the canonical registries for
//! the closed string columns (`kind`, `pets`).

use std::fmt;

pub mod listing;

pub use listing::Entity as Listing;

/// Canonical registry of supported `Listing.kind` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Rent,
    Sell,
}

impl ListingKind {
    /// Return the canonical string representation for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ListingKind::Rent => "rent",
            ListingKind::Sell => "sell",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete registry of canonical kinds.
pub const ALL_LISTING_KINDS: &[ListingKind] = &[ListingKind::Rent, ListingKind::Sell];

/// Return the canonical kind corresponding to the provided string, if any.
pub fn parse_listing_kind(kind: &str) -> Option<ListingKind> {
    ALL_LISTING_KINDS.iter().copied().find(|k| k.as_str() == kind)
}

/// Canonical registry of supported `Listing.pets` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetPolicy {
    Allowed,
    NotAllowed,
    ByAgreement,
}

impl PetPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            PetPolicy::Allowed => "allowed",
            PetPolicy::NotAllowed => "not_allowed",
            PetPolicy::ByAgreement => "by_agreement",
        }
    }
}

impl fmt::Display for PetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ALL_PET_POLICIES: &[PetPolicy] = &[
    PetPolicy::Allowed,
    PetPolicy::NotAllowed,
    PetPolicy::ByAgreement,
];

/// Return the canonical pet policy corresponding to the provided string, if any.
pub fn parse_pet_policy(policy: &str) -> Option<PetPolicy> {
    ALL_PET_POLICIES.iter().copied().find(|p| p.as_str() == policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registries_have_unique_entries() {
        let mut seen = HashSet::new();
        for kind in ALL_LISTING_KINDS {
            assert!(seen.insert(kind.as_str()), "duplicate kind {}", kind);
        }
        let mut seen = HashSet::new();
        for policy in ALL_PET_POLICIES {
            assert!(seen.insert(policy.as_str()), "duplicate policy {}", policy);
        }
    }

    #[test]
    fn parse_round_trips() {
        for kind in ALL_LISTING_KINDS {
            assert_eq!(parse_listing_kind(kind.as_str()), Some(*kind));
        }
        for policy in ALL_PET_POLICIES {
            assert_eq!(parse_pet_policy(policy.as_str()), Some(*policy));
        }
    }
}
