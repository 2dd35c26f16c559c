//! ExpenseRepository - Repository per la gestione delle spese
//!
//! Creazione e aggiornamento toccano anche le quote: la riga della spesa e
//! il suo ratio set vengono scritti nella stessa transazione.

use super::{Create, Delete, ExpenseRatioRepository, Read, Update};
use crate::dtos::{CreateExpenseDTO, ListFilter, UpdateExpenseDTO};
use crate::entities::{Expense, timestamps};
use sqlx::{Error, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

const EXPENSE_COLUMNS: &str = r#"
    SELECT expense_id, description, share_id, total, paid_by, resolved, created_at, updated_at
    FROM expenses"#;

// EXPENSE REPOSITORY
pub struct ExpenseRepository {
    connection_pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Expenses matching every filter set in `filter`, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Expense>, Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(EXPENSE_COLUMNS);
        builder.push(" WHERE 1 = 1");
        if let Some(ids) = &filter.ids {
            builder.push(" AND expense_id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        if let Some(share_ids) = &filter.share_ids {
            builder.push(" AND share_id IN (");
            let mut separated = builder.separated(", ");
            for id in share_ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        builder.push(" ORDER BY expense_id");

        let expenses = builder
            .build_query_as::<Expense>()
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} expenses", expenses.len());
        Ok(expenses)
    }

    /// Expenses of a share
    pub async fn find_many_by_share_id(&self, share_id: &i64) -> Result<Vec<Expense>, Error> {
        self.list(&ListFilter {
            share_ids: Some(vec![*share_id]),
            ..ListFilter::default()
        })
        .await
    }

    /// Ids of the expenses paid by a user
    pub async fn ids_paid_by(&self, user_id: &i64) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT expense_id FROM expenses WHERE paid_by = ? ORDER BY expense_id",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    async fn read_in(conn: &mut SqliteConnection, id: i64) -> Result<Expense, Error> {
        sqlx::query_as::<_, Expense>(&format!("{EXPENSE_COLUMNS} WHERE expense_id = ?"))
            .bind(id)
            .fetch_one(&mut *conn)
            .await
    }
}

impl Create<Expense, CreateExpenseDTO> for ExpenseRepository {
    /// Inserts the expense then generates its ratios; both or neither are stored
    #[instrument(skip(self, data), fields(share_id = %data.share_id, paid_by = %data.paid_by))]
    async fn create(&self, data: &CreateExpenseDTO) -> Result<Expense, Error> {
        debug!("Creating new expense");
        let updated_at = timestamps::now();
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO expenses (description, share_id, total, paid_by, resolved, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.description)
        .bind(data.share_id)
        .bind(data.total.amount().to_string())
        .bind(data.paid_by)
        .bind(data.resolved)
        .bind(data.created_at)
        .bind(updated_at)
        .execute(&mut *tx)
        .await?;
        let new_id = result.last_insert_rowid();

        ExpenseRatioRepository::generate_in(&mut *tx, new_id, &data.paid_for).await?;
        let expense = Self::read_in(&mut *tx, new_id).await?;

        tx.commit().await?;
        info!("Expense created with id {}", new_id);
        Ok(expense)
    }
}

impl Read<Expense, i64> for ExpenseRepository {
    #[instrument(skip(self), fields(expense_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Expense>, Error> {
        sqlx::query_as::<_, Expense>(&format!("{EXPENSE_COLUMNS} WHERE expense_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Update<Expense, UpdateExpenseDTO, i64> for ExpenseRepository {
    /// Overwrites the supplied fields, refreshes `updated_at` and, when
    /// `paid_for` is present, regenerates the ratios in the same transaction
    #[instrument(skip(self, data), fields(expense_id = %id, new_ratios = data.paid_for.is_some()))]
    async fn update(&self, id: &i64, data: &UpdateExpenseDTO) -> Result<Expense, Error> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE expenses SET updated_at = ");
        builder.push_bind(timestamps::now());
        if let Some(description) = &data.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(share_id) = data.share_id {
            builder.push(", share_id = ").push_bind(share_id);
        }
        if let Some(total) = data.total {
            builder.push(", total = ").push_bind(total.amount().to_string());
        }
        if let Some(paid_by) = data.paid_by {
            builder.push(", paid_by = ").push_bind(paid_by);
        }
        if let Some(resolved) = data.resolved {
            builder.push(", resolved = ").push_bind(resolved);
        }
        if let Some(created_at) = data.created_at {
            builder.push(", created_at = ").push_bind(created_at);
        }
        builder.push(" WHERE expense_id = ").push_bind(*id);

        let mut tx = self.connection_pool.begin().await?;

        let result = builder.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        if let Some(ratios) = &data.paid_for {
            ExpenseRatioRepository::regenerate_in(&mut *tx, *id, ratios).await?;
        }

        let expense = Self::read_in(&mut *tx, *id).await?;
        tx.commit().await?;
        info!("Expense updated");
        Ok(expense)
    }
}

impl Delete<i64> for ExpenseRepository {
    /// Ratios follow through ON DELETE CASCADE
    #[instrument(skip(self), fields(expense_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE expense_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Expense deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use crate::dtos::{ListFilter, UpdateExpenseDTO};
    use crate::entities::Money;
    use crate::repositories::Update;
    use rust_decimal::Decimal;
    use std::time::Duration;

    #[tokio::test]
    async fn create_stores_the_exact_total() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let share = fixtures::share(&state, "flat", &[&alice]).await;
        let whole = fixtures::ratios(&[&alice], &[(&alice, "1/1")]);
        let expense = fixtures::expense(&state, &share, &alice, whole).await;

        assert_eq!(expense.total, Decimal::new(1000, 2));
        assert_eq!(expense.paid_by, alice.user_id);
        assert!(!expense.resolved);
    }

    #[tokio::test]
    async fn update_without_ratios_keeps_them() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let bob = fixtures::user(&state, "bob").await;
        let share = fixtures::share(&state, "flat", &[&alice, &bob]).await;
        let halves = fixtures::ratios(&[&alice, &bob], &[(&alice, "1/2"), (&bob, "1/2")]);
        let expense = fixtures::expense(&state, &share, &alice, halves).await;
        let before = state.ratios.list_for(&expense.expense_id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = state
            .expense
            .update(
                &expense.expense_id,
                &UpdateExpenseDTO {
                    total: Some(Money::new(Decimal::new(123_456, 3)).unwrap()),
                    resolved: Some(true),
                    ..UpdateExpenseDTO::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.total, Decimal::new(123_456, 3));
        assert!(updated.resolved);
        assert_eq!(updated.description, "lunch");
        assert!(updated.timestamps.updated_at > expense.timestamps.updated_at);
        assert_eq!(state.ratios.list_for(&expense.expense_id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_with_ratios_regenerates_them() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let bob = fixtures::user(&state, "bob").await;
        let share = fixtures::share(&state, "flat", &[&alice, &bob]).await;
        let halves = fixtures::ratios(&[&alice, &bob], &[(&alice, "1/2"), (&bob, "1/2")]);
        let expense = fixtures::expense(&state, &share, &alice, halves).await;

        let split = fixtures::ratios(&[&alice, &bob], &[(&alice, "2/3"), (&bob, "1/3")]);
        state
            .expense
            .update(
                &expense.expense_id,
                &UpdateExpenseDTO {
                    paid_for: Some(split),
                    ..UpdateExpenseDTO::default()
                },
            )
            .await
            .unwrap();

        let ratios = state.ratios.list_for(&expense.expense_id).await.unwrap();
        let strings: Vec<String> = ratios.iter().map(|r| r.ratio_string()).collect();
        assert_eq!(strings, vec!["2/3".to_string(), "1/3".to_string()]);
    }

    #[tokio::test]
    async fn list_filters_by_share() {
        let state = fixtures::state().await;
        let alice = fixtures::user(&state, "alice").await;
        let share = fixtures::share(&state, "flat", &[&alice]).await;
        for _ in 0..3 {
            let whole = fixtures::ratios(&[&alice], &[(&alice, "1/1")]);
            fixtures::expense(&state, &share, &alice, whole).await;
        }

        let _elsewhere = fixtures::share(&state, "elsewhere", &[&alice]).await;
        let listed = state
            .expense
            .list(&ListFilter {
                share_ids: Some(vec![share.share_id]),
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);
        let total: Decimal = listed.iter().map(|e| e.total).sum();
        assert_eq!(total, Decimal::new(3000, 2));
        assert_eq!(state.expense.ids_paid_by(&alice.user_id).await.unwrap().len(), 3);
    }
}
