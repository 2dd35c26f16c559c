//! ExpenseRatioRepository - Ratio store di una spesa
//!
//! Le quote nascono solo da un `RatioSet` già validato, sempre tutte insieme:
//! `generate` le crea, `regenerate` le sostituisce in un'unica transazione,
//! la cancellazione della spesa le elimina in cascata.

use crate::entities::ExpenseRatio;
use crate::split::RatioSet;
use sqlx::{Error, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

const RATIO_COLUMNS: &str =
    "SELECT ratio_id, expense_id, user_id, numerator, denominator FROM expense_ratios";

pub struct ExpenseRatioRepository {
    connection_pool: SqlitePool,
}

impl ExpenseRatioRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Creates one ratio per entry of `ratios`, all linked to `expense_id`
    #[instrument(skip(self, ratios), fields(expense_id = %expense_id, count = ratios.len()))]
    pub async fn generate(
        &self,
        expense_id: &i64,
        ratios: &RatioSet,
    ) -> Result<Vec<ExpenseRatio>, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let created = Self::generate_in(&mut *tx, *expense_id, ratios).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Replaces every ratio of the expense with `ratios`.
    ///
    /// Delete and insert share one transaction: readers see either the old
    /// set or the new one, never an expense without ratios.
    #[instrument(skip(self, ratios), fields(expense_id = %expense_id, count = ratios.len()))]
    pub async fn regenerate(
        &self,
        expense_id: &i64,
        ratios: &RatioSet,
    ) -> Result<Vec<ExpenseRatio>, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let created = Self::regenerate_in(&mut *tx, *expense_id, ratios).await?;
        tx.commit().await?;
        info!("Ratios regenerated");
        Ok(created)
    }

    /// Current ratios of an expense, ordered by user
    #[instrument(skip(self), fields(expense_id = %expense_id))]
    pub async fn list_for(&self, expense_id: &i64) -> Result<Vec<ExpenseRatio>, Error> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::list_for_in(&mut *conn, *expense_id).await
    }

    /// Ratios of several expenses at once, ordered by expense then user
    pub async fn list_for_many(&self, expense_ids: &[i64]) -> Result<Vec<ExpenseRatio>, Error> {
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(RATIO_COLUMNS);
        builder.push(" WHERE expense_id IN (");
        let mut separated = builder.separated(", ");
        for id in expense_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY expense_id, user_id");

        builder
            .build_query_as::<ExpenseRatio>()
            .fetch_all(&self.connection_pool)
            .await
    }

    /// Ids of the expenses a user holds a ratio in
    pub async fn expense_ids_for_user(&self, user_id: &i64) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT expense_id FROM expense_ratios WHERE user_id = ? ORDER BY expense_id",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    // ******************* operazioni dentro una transazione ******************* //

    pub(crate) async fn generate_in(
        conn: &mut SqliteConnection,
        expense_id: i64,
        ratios: &RatioSet,
    ) -> Result<Vec<ExpenseRatio>, Error> {
        let mut created = Vec::with_capacity(ratios.len());
        for (user_id, fraction) in ratios.iter() {
            let result = sqlx::query(
                r#"
                INSERT INTO expense_ratios (expense_id, user_id, numerator, denominator)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(expense_id)
            .bind(user_id)
            .bind(fraction.numerator())
            .bind(fraction.denominator())
            .execute(&mut *conn)
            .await?;

            created.push(ExpenseRatio {
                ratio_id: result.last_insert_rowid(),
                expense_id,
                user_id,
                numerator: fraction.numerator(),
                denominator: fraction.denominator(),
            });
        }
        debug!("Generated {} ratios", created.len());
        Ok(created)
    }

    pub(crate) async fn regenerate_in(
        conn: &mut SqliteConnection,
        expense_id: i64,
        ratios: &RatioSet,
    ) -> Result<Vec<ExpenseRatio>, Error> {
        let removed = sqlx::query("DELETE FROM expense_ratios WHERE expense_id = ?")
            .bind(expense_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        debug!("Removed {} old ratios", removed);
        Self::generate_in(conn, expense_id, ratios).await
    }

    pub(crate) async fn list_for_in(
        conn: &mut SqliteConnection,
        expense_id: i64,
    ) -> Result<Vec<ExpenseRatio>, Error> {
        sqlx::query_as::<_, ExpenseRatio>(&format!(
            "{RATIO_COLUMNS} WHERE expense_id = ? ORDER BY user_id"
        ))
        .bind(expense_id)
        .fetch_all(&mut *conn)
        .await
    }
}
