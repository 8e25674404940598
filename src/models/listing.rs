//! Listing entity model
//!
//! SeaORM entity for the listings table. One row per advertisement message,
//! identified by (channel_id, source_id). Rows are tombstoned via `deleted`
//! rather than removed, so identities stay stable across sync passes.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    /// Numeric channel identity (stored as text), first half of the key
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: String,

    /// Message sequence id within the channel, second half of the key
    #[sea_orm(primary_key, auto_increment = false)]
    pub source_id: i64,

    /// Canonical listing kind ("rent" | "sell"), never null
    pub kind: String,

    /// Canonicalized district name from the header line
    pub district: Option<String>,

    /// Canonicalized metro station from the header line
    pub metro: Option<String>,

    /// Free-text street address, bounded at extraction time
    pub address: Option<String>,

    /// Exact parsed bedroom count; 0 denotes a studio
    pub rooms: Option<i32>,

    pub size_sqm: Option<f64>,

    pub floor: Option<i32>,

    pub total_floors: Option<i32>,

    /// Asking price, currency implicit in the channel convention
    pub price: Option<i64>,

    /// Canonical pet policy ("allowed" | "not_allowed" | "by_agreement")
    pub pets: Option<String>,

    pub tenants: Option<String>,

    /// Amenity tags in extraction order, first-seen casing
    #[sea_orm(column_type = "JsonBinary")]
    pub features: JsonValue,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Tombstone flag; set when the listing disappears from its channel
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Feature tags decoded from the JSON column.
    pub fn feature_tags(&self) -> Vec<String> {
        serde_json::from_value(self.features.clone()).unwrap_or_default()
    }
}
