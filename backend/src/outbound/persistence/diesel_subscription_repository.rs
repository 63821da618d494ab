//! PostgreSQL-backed `SubscriptionRepository` implementation.
//!
//! The `unique_subscription` constraint and the `taboo_self_follow` check are
//! the final arbiters for concurrent inserts.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{SubscriptionRepository, SubscriptionRepositoryError};
use crate::domain::{User, UserId};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{collect_rows, page_bounds, row_count};
use super::models::{NewSubscriptionRow, UserRow, user_id};
use super::pool::{DbPool, PoolError};
use super::schema::{subscriptions, users};

/// Diesel-backed implementation of the `SubscriptionRepository` port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubscriptionRepositoryError {
    map_basic_pool_error(error, SubscriptionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SubscriptionRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => SubscriptionRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => SubscriptionRepositoryError::unique_violation(),
        failure @ DieselFailure::CheckViolation { .. }
            if failure.constraint_contains("self_follow") =>
        {
            SubscriptionRepositoryError::self_subscription()
        }
        DieselFailure::Query(message) => SubscriptionRepositoryError::query(message),
        DieselFailure::CheckViolation { .. } | DieselFailure::ForeignKeyViolation { .. } => {
            SubscriptionRepositoryError::query("subscription constraint violation")
        }
    }
}

fn raw_ids(ids: &[UserId]) -> Vec<i64> {
    ids.iter().map(|id| id.value()).collect()
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn insert(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSubscriptionRow {
            user_id: user.value(),
            author_id: author.value(),
        };
        diesel::insert_into(subscriptions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            subscriptions::table
                .filter(subscriptions::user_id.eq(user.value()))
                .filter(subscriptions::author_id.eq(author.value())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn exists(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            subscriptions::table
                .filter(subscriptions::user_id.eq(user.value()))
                .filter(subscriptions::author_id.eq(author.value())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn followed_among(
        &self,
        user: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, SubscriptionRepositoryError> {
        if authors.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let followed: Vec<i64> = subscriptions::table
            .filter(subscriptions::user_id.eq(user.value()))
            .filter(subscriptions::author_id.eq_any(raw_ids(authors)))
            .select(subscriptions::author_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids = collect_rows(
            followed.into_iter().map(user_id),
            SubscriptionRepositoryError::query,
        )?;
        Ok(ids.into_iter().collect())
    }

    async fn list_authors(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<User>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_bounds(page);
        let total: i64 = subscriptions::table
            .filter(subscriptions::user_id.eq(user.value()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .inner_join(subscriptions::table.on(subscriptions::author_id.eq(users::id)))
            .filter(subscriptions::user_id.eq(user.value()))
            .select(UserRow::as_select())
            .order_by(users::id)
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = collect_rows(
            rows.into_iter().map(UserRow::into_user),
            SubscriptionRepositoryError::query,
        )?;
        Ok(Page::new(items, row_count(total)))
    }
}
