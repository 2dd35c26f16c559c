//! MembershipRepository - Tabella di join share <-> user
//!
//! La tabella `share_members` non appartiene a nessuno dei due lati:
//! ogni modifica all'appartenenza passa da qui.

use sqlx::{Error, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

pub struct MembershipRepository {
    connection_pool: SqlitePool,
}

impl MembershipRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Ids of the users in a share
    #[instrument(skip(self), fields(share_id = %share_id))]
    pub async fn member_ids(&self, share_id: &i64) -> Result<Vec<i64>, Error> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM share_members WHERE share_id = ? ORDER BY user_id",
        )
        .bind(share_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Share has {} members", ids.len());
        Ok(ids)
    }

    /// Ids of the shares a user belongs to (reverse lookup, indexed on user_id)
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn share_ids_of(&self, user_id: &i64) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT share_id FROM share_members WHERE user_id = ? ORDER BY share_id",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn is_member(&self, user_id: &i64, share_id: &i64) -> Result<bool, Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM share_members WHERE user_id = ? AND share_id = ?",
        )
        .bind(user_id)
        .bind(share_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    /// Adds a member. Returns `false` if the user was already in the share.
    #[instrument(skip(self), fields(share_id = %share_id, user_id = %user_id))]
    pub async fn add(&self, share_id: &i64, user_id: &i64) -> Result<bool, Error> {
        let mut conn = self.connection_pool.acquire().await?;
        let inserted = Self::add_in(&mut *conn, *share_id, &[*user_id]).await?;
        if inserted > 0 {
            info!("User added to share");
        } else {
            debug!("User already in share, nothing to do");
        }
        Ok(inserted > 0)
    }

    /// Removes a member. Returns `false` if the user was not in the share.
    #[instrument(skip(self), fields(share_id = %share_id, user_id = %user_id))]
    pub async fn remove(&self, share_id: &i64, user_id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM share_members WHERE share_id = ? AND user_id = ?")
            .bind(share_id)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ******************* operazioni dentro una transazione ******************* //

    /// Inserts the pairs `(share_id, user_id)`, skipping existing ones.
    /// Returns how many rows were actually added.
    pub(crate) async fn add_in(
        conn: &mut SqliteConnection,
        share_id: i64,
        user_ids: &[i64],
    ) -> Result<u64, Error> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT OR IGNORE INTO share_members (share_id, user_id) ");
        builder.push_values(user_ids, |mut row, user_id| {
            row.push_bind(share_id).push_bind(*user_id);
        });
        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Makes `user_ids` the exact member set of the share
    pub(crate) async fn replace_members_in(
        conn: &mut SqliteConnection,
        share_id: i64,
        user_ids: &[i64],
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM share_members WHERE share_id = ?")
            .bind(share_id)
            .execute(&mut *conn)
            .await?;
        Self::add_in(conn, share_id, user_ids).await?;
        Ok(())
    }

    /// Makes `share_ids` the exact set of shares the user belongs to
    pub(crate) async fn replace_shares_in(
        conn: &mut SqliteConnection,
        user_id: i64,
        share_ids: &[i64],
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM share_members WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        for share_id in share_ids {
            Self::add_in(conn, *share_id, &[user_id]).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;

    #[tokio::test]
    async fn add_is_idempotent() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let bob = fixtures::user(&state, "bob").await;
        let share = fixtures::share(&state, "flat", &[&alice]).await;

        assert!(state.members.add(&share.share_id, &bob.user_id).await.unwrap());
        assert!(!state.members.add(&share.share_id, &bob.user_id).await.unwrap());

        let members = state.members.member_ids(&share.share_id).await.unwrap();
        assert_eq!(members, vec![alice.user_id, bob.user_id]);
    }

    #[tokio::test]
    async fn remove_reports_missing_members() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let share = fixtures::share(&state, "flat", &[&alice]).await;

        assert!(state.members.remove(&share.share_id, &alice.user_id).await.unwrap());
        assert!(!state.members.remove(&share.share_id, &alice.user_id).await.unwrap());
        assert!(!state.members.is_member(&alice.user_id, &share.share_id).await.unwrap());
    }

    #[tokio::test]
    async fn reverse_lookup_lists_every_share_of_a_user() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let first = fixtures::share(&state, "first", &[&alice]).await;
        let _other = fixtures::share(&state, "other", &[]).await;
        let second = fixtures::share(&state, "second", &[&alice]).await;

        let shares = state.members.share_ids_of(&alice.user_id).await.unwrap();
        assert_eq!(shares, vec![first.share_id, second.share_id]);
    }
}
