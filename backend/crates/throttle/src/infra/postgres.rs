//! PostgreSQL Repository Implementation
//!
//! Shared store for multi-instance deployments. `modify` holds a row lock
//! (taken by its upsert) for the duration of its transaction.

use sqlx::PgPool;

use crate::domain::entities::AttemptState;
use crate::domain::repository::AttemptStateRepository;
use crate::domain::value_objects::Identity;
use crate::error::ThrottleResult;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete rows whose window opened before `cutoff_secs`
    pub async fn cleanup_idle(&self, cutoff_secs: i64) -> ThrottleResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM attempt_states WHERE last_attempt_secs IS NULL OR last_attempt_secs < $1",
        )
        .bind(cutoff_secs)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(deleted, "Cleaned up idle attempt states");

        Ok(deleted)
    }
}

impl AttemptStateRepository for PgAttemptStore {
    async fn load(&self, identity: &Identity) -> ThrottleResult<Option<AttemptState>> {
        let row = sqlx::query_as::<_, AttemptStateRow>(
            "SELECT last_attempt_secs, attempt_count FROM attempt_states WHERE identity = $1",
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(AttemptStateRow::into_state))
    }

    async fn store(&self, identity: &Identity, state: &AttemptState) -> ThrottleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attempt_states (identity, last_attempt_secs, attempt_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity)
            DO UPDATE SET
                last_attempt_secs = EXCLUDED.last_attempt_secs,
                attempt_count = EXCLUDED.attempt_count,
                updated_at = now()
            "#,
        )
        .bind(identity.as_str())
        .bind(state.last_attempt_secs)
        .bind(count_to_db(state.attempt_count))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self, identity: &Identity) -> ThrottleResult<()> {
        sqlx::query("DELETE FROM attempt_states WHERE identity = $1")
            .bind(identity.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn modify<T, F>(&self, identity: &Identity, f: F) -> ThrottleResult<T>
    where
        T: Send,
        F: FnOnce(Option<AttemptState>) -> (AttemptState, T) + Send,
    {
        let mut tx = self.pool.begin().await?;

        // Insert-or-touch locks the row in one statement, so a concurrent
        // cleanup cannot delete it before the write below
        let row = sqlx::query_as::<_, AttemptStateRow>(
            r#"
            INSERT INTO attempt_states (identity)
            VALUES ($1)
            ON CONFLICT (identity)
            DO UPDATE SET identity = EXCLUDED.identity
            RETURNING last_attempt_secs, attempt_count
            "#,
        )
        .bind(identity.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let (next, output) = f(row.into_state());

        sqlx::query(
            r#"
            UPDATE attempt_states
            SET last_attempt_secs = $2, attempt_count = $3, updated_at = now()
            WHERE identity = $1
            "#,
        )
        .bind(identity.as_str())
        .bind(next.last_attempt_secs)
        .bind(count_to_db(next.attempt_count))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(output)
    }
}

fn count_to_db(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct AttemptStateRow {
    last_attempt_secs: Option<i64>,
    attempt_count: i64,
}

impl AttemptStateRow {
    /// A row without a window start is a fresh identity
    fn into_state(self) -> Option<AttemptState> {
        self.last_attempt_secs.map(|last_attempt_secs| AttemptState {
            last_attempt_secs,
            attempt_count: u64::try_from(self.attempt_count).unwrap_or(0),
        })
    }
}
