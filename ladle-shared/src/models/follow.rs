/// Follower/author graph
///
/// A follow is a (follower, author) edge, unique per pair, with self-follow
/// forbidden. The self-follow check runs before the insert so a repeated
/// self-follow attempt always reports the self-follow reason, never a
/// duplicate-edge conflict. The database backs both rules with a CHECK
/// constraint and the composite primary key.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE follows (
///     follower_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (follower_id, author_id),
///     CONSTRAINT follows_no_self CHECK (follower_id <> author_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

/// Error type for follow operations
#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    /// A user may not follow themselves
    #[error("Cannot follow yourself")]
    SelfFollow,

    /// The (follower, author) edge already exists
    #[error("Already following this author")]
    AlreadyFollowing,

    /// The (follower, author) edge does not exist
    #[error("Not following this author")]
    NotFollowing,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Follow edge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    /// Checks the self-follow rule without touching storage
    ///
    /// Runs before the uniqueness check so the self-follow reason wins.
    pub fn validate_pair(follower_id: Uuid, author_id: Uuid) -> Result<(), FollowError> {
        if follower_id == author_id {
            return Err(FollowError::SelfFollow);
        }
        Ok(())
    }

    /// Adds a follow edge
    ///
    /// # Errors
    ///
    /// `SelfFollow` when follower and author are the same user (checked
    /// first); `AlreadyFollowing` when the pair already exists.
    pub async fn add(
        pool: &PgPool,
        follower_id: Uuid,
        author_id: Uuid,
    ) -> Result<Self, FollowError> {
        Self::validate_pair(follower_id, author_id)?;

        let follow = sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (follower_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, author_id) DO NOTHING
            RETURNING follower_id, author_id, created_at
            "#,
        )
        .bind(follower_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await?;

        follow.ok_or(FollowError::AlreadyFollowing)
    }

    /// Removes a follow edge
    ///
    /// # Errors
    ///
    /// `NotFollowing` when the pair does not exist.
    pub async fn remove(
        pool: &PgPool,
        follower_id: Uuid,
        author_id: Uuid,
    ) -> Result<(), FollowError> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE follower_id = $1 AND author_id = $2",
        )
        .bind(follower_id)
        .bind(author_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FollowError::NotFollowing);
        }

        Ok(())
    }

    /// Checks whether a follow edge exists
    pub async fn exists(
        pool: &PgPool,
        follower_id: Uuid,
        author_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE follower_id = $1 AND author_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(author_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the authors a user follows, in stable follow order
    ///
    /// `limit` of None returns all subscriptions.
    pub async fn authors_followed_by(
        pool: &PgPool,
        follower_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<User>, sqlx::Error> {
        let authors = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   u.password_hash, u.is_admin, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.author_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at, u.id
            LIMIT $2
            "#,
        )
        .bind(follower_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(authors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_follow_is_rejected_before_storage() {
        let user = Uuid::new_v4();

        assert!(matches!(
            Follow::validate_pair(user, user),
            Err(FollowError::SelfFollow)
        ));
        // A second attempt reports the same reason, never a duplicate edge.
        assert!(matches!(
            Follow::validate_pair(user, user),
            Err(FollowError::SelfFollow)
        ));
    }

    #[test]
    fn test_distinct_pair_passes_validation() {
        assert!(Follow::validate_pair(Uuid::new_v4(), Uuid::new_v4()).is_ok());
    }
}
