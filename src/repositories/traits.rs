//! Common repository traits
//!
//! Generic CRUD interfaces implemented by every repository struct.
//! All of them surface raw `sqlx::Error`; services turn it into `AppError`.

/// Inserts a new row and returns the stored entity with its generated id
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Reads one entity by primary key; `Ok(None)` when no row matches
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Reads every entity whose key is in `ids`.
///
/// Missing keys are skipped silently, callers compare lengths when they care.
/// Rows come back ordered by primary key, not in the order of `ids`.
pub trait ReadMany<Entity, Id> {
    async fn read_many(&self, ids: &[Id]) -> Result<Vec<Entity>, sqlx::Error>;
}

/// Partial update: only fields set in the DTO change, `updated_at` always does.
///
/// Fails with `sqlx::Error::RowNotFound` when the id does not exist.
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Deletes by primary key. Fails with `RowNotFound` if nothing was deleted.
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
