//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Delete, MembershipRepository, Read, ReadMany, Update};
use crate::dtos::{CreateUserDTO, ListFilter, UpdateUserDTO};
use crate::entities::{User, timestamps};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

const USER_COLUMNS: &str = "SELECT user_id, name, created_at, updated_at FROM users";

// USER REPO
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Names are unique
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Users matching every filter set in `filter`
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<User>, Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(USER_COLUMNS);
        builder.push(" WHERE 1 = 1");
        if let Some(names) = &filter.names {
            builder.push(" AND name IN (");
            let mut separated = builder.separated(", ");
            for name in names {
                separated.push_bind(name.clone());
            }
            separated.push_unseparated(")");
        }
        if let Some(ids) = &filter.ids {
            builder.push(" AND user_id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        builder.push(" ORDER BY user_id");

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} users", users.len());
        Ok(users)
    }

    /// `true` while the user pays an expense or holds a ratio in one
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn has_expense_references(&self, user_id: &i64) -> Result<bool, Error> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM expenses WHERE paid_by = ?)
                + (SELECT COUNT(*) FROM expense_ratios WHERE user_id = ?)
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Creating new user");
        let stamps = timestamps::Timestamps::now();
        let mut tx = self.connection_pool.begin().await?;

        let result =
            sqlx::query("INSERT INTO users (name, created_at, updated_at) VALUES (?, ?, ?)")
                .bind(&data.name)
                .bind(stamps.created_at)
                .bind(stamps.updated_at)
                .execute(&mut *tx)
                .await?;
        let new_id = result.last_insert_rowid();

        if let Some(shares) = &data.shares {
            for share_id in shares {
                MembershipRepository::add_in(&mut *tx, *share_id, &[new_id]).await?;
            }
        }

        tx.commit().await?;
        info!("User created with id {}", new_id);

        Ok(User {
            user_id: new_id,
            name: data.name.clone(),
            timestamps: stamps,
        })
    }
}

impl Read<User, i64> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE user_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl ReadMany<User, i64> for UserRepository {
    async fn read_many(&self, ids: &[i64]) -> Result<Vec<User>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.list(&ListFilter {
            ids: Some(ids.to_vec()),
            ..ListFilter::default()
        })
        .await
    }
}

impl Update<User, UpdateUserDTO, i64> for UserRepository {
    #[instrument(skip(self, data), fields(user_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateUserDTO) -> Result<User, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), updated_at = ? WHERE user_id = ?",
        )
        .bind(data.name.as_deref())
        .bind(timestamps::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        if let Some(shares) = &data.shares {
            debug!("Replacing share set with {} shares", shares.len());
            MembershipRepository::replace_shares_in(&mut *tx, *id, shares).await?;
        }

        let user = sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE user_id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("User updated");
        Ok(user)
    }
}

impl Delete<i64> for UserRepository {
    /// Memberships go with the user; expenses and ratios referencing it block the delete
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete(&self, user_id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("User deleted");
        Ok(())
    }
}
