//! # Listing Repository
//!
//! Data access for listing records: keyed lookup, upsert from a parsed
//! message, the tombstone delta used by the sync engine, and the filtered
//! search consumed by the conversational frontend.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::error::RepositoryError;
use crate::extract::ParsedListing;
use crate::models::{ListingKind, PetPolicy, listing};
use crate::models::listing::Entity as Listing;

/// Filter-side rooms value meaning "this many or more".
pub const ROOMS_OPEN_BUCKET: i32 = 4;

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The record already matched the re-applied field set; no write issued,
    /// so repeated passes leave the row byte-identical.
    Unchanged,
}

/// Search filter handed over by the conversational frontend.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub kind: Option<ListingKind>,
    /// Canonicalized district names; empty means any.
    pub districts: Vec<String>,
    pub max_price: Option<i64>,
    /// Exact room counts; [`ROOMS_OPEN_BUCKET`] widens to "4 or more".
    pub rooms: Vec<i32>,
    /// When set, only listings where pets are allowed or by agreement match.
    pub pets_required: bool,
    /// Amenity tags that must all be present, case-insensitive.
    pub features: Vec<String>,
}

/// Repository for listing database operations.
pub struct ListingRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ListingRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Look up one listing by its composite key.
    pub async fn find(
        &self,
        channel_id: &str,
        source_id: i64,
    ) -> Result<Option<listing::Model>, RepositoryError> {
        Listing::find_by_id((channel_id.to_string(), source_id))
            .one(self.conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Insert a new listing or update the existing row with the same key.
    ///
    /// The update path re-applies kind, district, metro, address, rooms,
    /// size and price, and clears the tombstone. Floor, pets and features
    /// are NOT re-applied on update; this mirrors the long-observed behavior
    /// of the feed importer and is pinned by a test. An edit that only
    /// changes the pet policy therefore does not reach the stored row.
    pub async fn upsert_parsed(
        &self,
        parsed: &ParsedListing,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let now = Utc::now();

        let Some(existing) = self.find(&parsed.channel_id, parsed.source_id).await? else {
            let row = listing::ActiveModel {
                channel_id: Set(parsed.channel_id.clone()),
                source_id: Set(parsed.source_id),
                kind: Set(parsed.kind.as_str().to_string()),
                district: Set(parsed.district.clone()),
                metro: Set(parsed.metro.clone()),
                address: Set(parsed.address.clone()),
                rooms: Set(parsed.rooms),
                size_sqm: Set(parsed.size_sqm),
                floor: Set(parsed.floor),
                total_floors: Set(parsed.total_floors),
                price: Set(parsed.price),
                pets: Set(parsed.pets.map(|p| p.as_str().to_string())),
                tenants: Set(None),
                features: Set(serde_json::json!(parsed.features)),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                deleted: Set(false),
            };
            row.insert(self.conn)
                .await
                .map_err(RepositoryError::database_error)?;
            return Ok(UpsertOutcome::Inserted);
        };

        let unchanged = existing.kind == parsed.kind.as_str()
            && existing.district == parsed.district
            && existing.metro == parsed.metro
            && existing.address == parsed.address
            && existing.rooms == parsed.rooms
            && existing.size_sqm == parsed.size_sqm
            && existing.price == parsed.price
            && !existing.deleted;
        if unchanged {
            return Ok(UpsertOutcome::Unchanged);
        }

        let mut row: listing::ActiveModel = existing.into();
        row.kind = Set(parsed.kind.as_str().to_string());
        row.district = Set(parsed.district.clone());
        row.metro = Set(parsed.metro.clone());
        row.address = Set(parsed.address.clone());
        row.rooms = Set(parsed.rooms);
        row.size_sqm = Set(parsed.size_sqm);
        row.price = Set(parsed.price);
        row.deleted = Set(false);
        row.updated_at = Set(now.into());
        row.update(self.conn)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(UpsertOutcome::Updated)
    }

    /// Source ids of all non-deleted listings in a channel.
    pub async fn active_source_ids(
        &self,
        channel_id: &str,
    ) -> Result<HashSet<i64>, RepositoryError> {
        let ids = Listing::find()
            .select_only()
            .column(listing::Column::SourceId)
            .filter(listing::Column::ChannelId.eq(channel_id))
            .filter(listing::Column::Deleted.eq(false))
            .into_tuple::<i64>()
            .all(self.conn)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(ids.into_iter().collect())
    }

    /// Tombstone the given source ids within a channel. Rows are kept.
    pub async fn mark_deleted(
        &self,
        channel_id: &str,
        source_ids: &[i64],
    ) -> Result<u64, RepositoryError> {
        if source_ids.is_empty() {
            return Ok(0);
        }
        let now = sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now());
        let result = Listing::update_many()
            .col_expr(listing::Column::Deleted, Expr::value(true))
            .col_expr(listing::Column::UpdatedAt, Expr::value(now))
            .filter(listing::Column::ChannelId.eq(channel_id))
            .filter(listing::Column::SourceId.is_in(source_ids.to_vec()))
            .filter(listing::Column::Deleted.eq(false))
            .exec(self.conn)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(result.rows_affected)
    }

    /// Physically remove every listing of a channel. Only used by the
    /// explicit `--reset` re-import path.
    pub async fn purge_channel(&self, channel_id: &str) -> Result<u64, RepositoryError> {
        let result = Listing::delete_many()
            .filter(listing::Column::ChannelId.eq(channel_id))
            .exec(self.conn)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(result.rows_affected)
    }

    /// Non-deleted listings matching the filter, newest first.
    ///
    /// Feature matching happens in memory after the SQL filters: tags are
    /// stored with first-seen casing and compared case-insensitively.
    pub async fn search(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<listing::Model>, RepositoryError> {
        let mut query = Listing::find().filter(listing::Column::Deleted.eq(false));

        if let Some(kind) = filter.kind {
            query = query.filter(listing::Column::Kind.eq(kind.as_str()));
        }
        if !filter.districts.is_empty() {
            query = query.filter(listing::Column::District.is_in(filter.districts.clone()));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(listing::Column::Price.lte(max_price));
        }
        if !filter.rooms.is_empty() {
            let mut rooms_cond = Condition::any();
            if filter.rooms.contains(&ROOMS_OPEN_BUCKET) {
                rooms_cond = rooms_cond.add(listing::Column::Rooms.gte(ROOMS_OPEN_BUCKET));
            }
            let exact: Vec<i32> = filter
                .rooms
                .iter()
                .copied()
                .filter(|r| *r != ROOMS_OPEN_BUCKET)
                .collect();
            if !exact.is_empty() {
                rooms_cond = rooms_cond.add(listing::Column::Rooms.is_in(exact));
            }
            query = query.filter(rooms_cond);
        }
        if filter.pets_required {
            query = query.filter(listing::Column::Pets.is_in([
                PetPolicy::Allowed.as_str(),
                PetPolicy::ByAgreement.as_str(),
            ]));
        }

        let mut rows = query
            .order_by_desc(listing::Column::CreatedAt)
            .all(self.conn)
            .await
            .map_err(RepositoryError::database_error)?;

        if !filter.features.is_empty() {
            let wanted: Vec<String> = filter.features.iter().map(|f| f.to_lowercase()).collect();
            rows.retain(|row| {
                let have: HashSet<String> = row
                    .feature_tags()
                    .iter()
                    .map(|f| f.to_lowercase())
                    .collect();
                wanted.iter().all(|f| have.contains(f))
            });
        }

        Ok(rows)
    }

    /// Distinct districts across non-deleted listings, for the frontend's
    /// district picker.
    pub async fn distinct_districts(&self) -> Result<Vec<String>, RepositoryError> {
        let districts = Listing::find()
            .select_only()
            .column(listing::Column::District)
            .distinct()
            .filter(listing::Column::Deleted.eq(false))
            .filter(listing::Column::District.is_not_null())
            .into_tuple::<Option<String>>()
            .all(self.conn)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(districts.into_iter().flatten().collect())
    }
}
