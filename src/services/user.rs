//! User services - Gestione utenti

use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateUserDTO, ListFilter, ListQuery, ReadOnlyFields, UpdateUserDTO, UserDTO,
};
use crate::entities::User;
use crate::repositories::{Create, Delete, Read, ReadMany, Update};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Fills the relations of a user: its shares and the expenses it pays or takes part in
async fn to_dto(state: &AppState, user: User) -> Result<UserDTO, AppError> {
    let (shares, paid_by, paid_for) = tokio::try_join!(
        state.members.share_ids_of(&user.user_id),
        state.expense.ids_paid_by(&user.user_id),
        state.ratios.expense_ids_for_user(&user.user_id),
    )?;

    Ok(UserDTO {
        shares,
        paid_by,
        paid_for,
        ..UserDTO::from(user)
    })
}

/// Every id in `share_ids` must name an existing share
async fn check_shares_exist(state: &AppState, share_ids: &[i64]) -> Result<(), AppError> {
    let found: Vec<i64> = state
        .share
        .read_many(share_ids)
        .await?
        .into_iter()
        .map(|s| s.share_id)
        .collect();

    if let Some(missing) = share_ids.iter().find(|id| !found.contains(id)) {
        warn!("Share {} does not exist", missing);
        return Err(AppError::validation(
            [("shares".to_string(), format!("Share with ID {missing} not found."))].into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, params))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>, // /users?name=a,b&id=1,2
) -> Result<Json<Vec<UserDTO>>, AppError> {
    let filter = ListFilter::try_from(params)?;
    debug!("Listing users, filtered: {}", !filter.is_empty());

    let users = state.user.list(&filter).await?;
    let users_dto = try_join_all(users.into_iter().map(|user| to_dto(&state, user))).await?;

    info!("Found {} users", users_dto.len());
    Ok(Json(users_dto))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating user");
    // 1. Rifiutare i campi assegnati dal server e validare il body
    body.reject_read_only()?;
    body.validate()?;

    // 2. Il nome deve essere libero
    if state.user.find_by_name(&body.name).await?.is_some() {
        warn!("User name already taken");
        return Err(AppError::conflict("User already exists")
            .with_field("name", "user with this name already exists."));
    }

    // 3. Gli share indicati devono esistere
    if let Some(shares) = &body.shares {
        check_shares_exist(&state, shares).await?;
    }

    // 4. Inserire utente e appartenenze in un'unica transazione
    let user = state.user.create(&body).await?;
    info!("User {} created", user.user_id);

    Ok((StatusCode::CREATED, Json(to_dto(&state, user).await?)))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDTO>, AppError> {
    let user = state.user.read(&user_id).await?.ok_or_else(|| {
        warn!("User not found");
        AppError::not_found("User not found")
    })?;
    Ok(Json(to_dto(&state, user).await?))
}

#[instrument(skip(state, body), fields(user_id = %user_id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    debug!("Updating user");
    body.reject_read_only()?;
    body.validate()?;

    let current = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if let Some(name) = body.name.as_deref().filter(|name| *name != current.name) {
        if state.user.find_by_name(name).await?.is_some() {
            warn!("User name already taken");
            return Err(AppError::conflict("User already exists")
                .with_field("name", "user with this name already exists."));
        }
    }

    if let Some(shares) = &body.shares {
        check_shares_exist(&state, shares).await?;
    }

    let user = state.user.update(&user_id, &body).await?;
    info!("User updated");
    Ok(Json(to_dto(&state, user).await?))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    info!("User deletion requested");
    if state.user.read(&user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    // Pagatori e partecipanti restano: le spese non possono perdere riferimenti
    if state.user.has_expense_references(&user_id).await? {
        warn!("User still referenced by expenses");
        return Err(AppError::conflict("User is still referenced by expenses")
            .with_details("Delete or update the expenses this user pays or takes part in first."));
    }

    state.user.delete(&user_id).await?;
    info!("User deleted");
    Ok(StatusCode::NO_CONTENT)
}
