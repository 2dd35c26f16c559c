//! ShareRepository - Repository per la gestione degli share

use super::{Create, Delete, MembershipRepository, Read, ReadMany, Update};
use crate::dtos::{CreateShareDTO, ListFilter, UpdateShareDTO};
use crate::entities::{Share, timestamps};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

const SHARE_COLUMNS: &str =
    "SELECT share_id, name, description, created_at, updated_at FROM shares";

// SHARE REPOSITORY
pub struct ShareRepository {
    connection_pool: SqlitePool,
}

impl ShareRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Names are unique
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Share>, Error> {
        sqlx::query_as::<_, Share>(&format!("{SHARE_COLUMNS} WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// Shares matching every filter set in `filter`
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Share>, Error> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SHARE_COLUMNS);
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
            builder.push(" AND share_id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        builder.push(" ORDER BY share_id");

        let shares = builder
            .build_query_as::<Share>()
            .fetch_all(&self.connection_pool)
            .await?;
        debug!("Found {} shares", shares.len());
        Ok(shares)
    }
}

impl Create<Share, CreateShareDTO> for ShareRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CreateShareDTO) -> Result<Share, Error> {
        debug!("Creating new share");
        let stamps = timestamps::Timestamps::now();
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO shares (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(stamps.created_at)
        .bind(stamps.updated_at)
        .execute(&mut *tx)
        .await?;
        let new_id = result.last_insert_rowid();

        if let Some(users) = &data.users {
            MembershipRepository::add_in(&mut *tx, new_id, users).await?;
        }

        tx.commit().await?;
        info!("Share created with id {}", new_id);

        Ok(Share {
            share_id: new_id,
            name: data.name.clone(),
            description: data.description.clone(),
            timestamps: stamps,
        })
    }
}

impl Read<Share, i64> for ShareRepository {
    #[instrument(skip(self), fields(share_id = %id))]
    async fn read(&self, id: &i64) -> Result<Option<Share>, Error> {
        let share = sqlx::query_as::<_, Share>(&format!("{SHARE_COLUMNS} WHERE share_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        if share.is_none() {
            debug!("Share not found");
        }
        Ok(share)
    }
}

impl ReadMany<Share, i64> for ShareRepository {
    async fn read_many(&self, ids: &[i64]) -> Result<Vec<Share>, Error> {
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

impl Update<Share, UpdateShareDTO, i64> for ShareRepository {
    #[instrument(skip(self, data), fields(share_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateShareDTO) -> Result<Share, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE shares
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE share_id = ?
            "#,
        )
        .bind(data.name.as_deref())
        .bind(data.description.as_deref())
        .bind(timestamps::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        if let Some(users) = &data.users {
            debug!("Replacing member set with {} users", users.len());
            MembershipRepository::replace_members_in(&mut *tx, *id, users).await?;
        }

        let share = sqlx::query_as::<_, Share>(&format!("{SHARE_COLUMNS} WHERE share_id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Share updated");
        Ok(share)
    }
}

impl Delete<i64> for ShareRepository {
    /// ON DELETE CASCADE removes memberships, expenses and their ratios
    #[instrument(skip(self), fields(share_id = %id))]
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM shares WHERE share_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("Share deleted");
        Ok(())
    }
}
