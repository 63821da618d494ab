//! Driving port for user-facing profile queries.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, UserId, UserProfile};

/// Domain use-case port for listing and viewing users.
///
/// `viewer` is `None` for anonymous requests; profiles then report
/// `is_subscribed = false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    async fn list_users(
        &self,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error>;

    /// Fetch one profile, `NotFound` when the user does not exist.
    async fn profile(&self, viewer: Option<UserId>, id: UserId) -> Result<UserProfile, Error>;
}
