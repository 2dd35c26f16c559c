//! Share services - Gestione degli share e dei loro membri

use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateShareDTO, ListFilter, ListQuery, ReadOnlyFields, ShareDTO, UpdateShareDTO,
};
use crate::entities::Share;
use crate::repositories::{Create, Delete, Read, ReadMany, Update};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Fills members, expenses and the exact total of a share
async fn to_dto(state: &AppState, share: Share) -> Result<ShareDTO, AppError> {
    let (users, expenses) = tokio::try_join!(
        state.members.member_ids(&share.share_id),
        state.expense.find_many_by_share_id(&share.share_id),
    )?;

    let total: Decimal = expenses.iter().map(|e| e.total).sum();
    Ok(ShareDTO {
        users,
        expenses: expenses.iter().map(|e| e.expense_id).collect(),
        total,
        ..ShareDTO::from(share)
    })
}

async fn check_users_exist(state: &AppState, user_ids: &[i64]) -> Result<(), AppError> {
    let found: Vec<i64> = state
        .user
        .read_many(user_ids)
        .await?
        .into_iter()
        .map(|u| u.user_id)
        .collect();

    if let Some(missing) = user_ids.iter().find(|id| !found.contains(id)) {
        warn!("User {} does not exist", missing);
        return Err(AppError::validation(
            [("users".to_string(), format!("User with ID {missing} not found."))].into(),
        ));
    }
    Ok(())
}

async fn share_or_404(state: &AppState, share_id: i64) -> Result<Share, AppError> {
    state.share.read(&share_id).await?.ok_or_else(|| {
        warn!("Share {} not found", share_id);
        AppError::not_found("Share not found")
    })
}

#[instrument(skip(state, params))]
pub async fn list_shares(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>, // /shares?name=a,b&id=1,2
) -> Result<Json<Vec<ShareDTO>>, AppError> {
    let filter = ListFilter::try_from(params)?;
    let shares = state.share.list(&filter).await?;
    let shares_dto = try_join_all(shares.into_iter().map(|share| to_dto(&state, share))).await?;

    info!("Found {} shares", shares_dto.len());
    Ok(Json(shares_dto))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_share(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateShareDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating share");
    body.reject_read_only()?;
    body.validate()?;

    if state.share.find_by_name(&body.name).await?.is_some() {
        warn!("Share name already taken");
        return Err(AppError::conflict("Share already exists")
            .with_field("name", "share with this name already exists."));
    }

    if let Some(users) = &body.users {
        check_users_exist(&state, users).await?;
    }

    let share = state.share.create(&body).await?;
    info!("Share {} created", share.share_id);

    Ok((StatusCode::CREATED, Json(to_dto(&state, share).await?)))
}

#[instrument(skip(state), fields(share_id = %share_id))]
pub async fn get_share(
    State(state): State<Arc<AppState>>,
    Path(share_id): Path<i64>,
) -> Result<Json<ShareDTO>, AppError> {
    let share = share_or_404(&state, share_id).await?;
    Ok(Json(to_dto(&state, share).await?))
}

#[instrument(skip(state, body), fields(share_id = %share_id))]
pub async fn update_share(
    State(state): State<Arc<AppState>>,
    Path(share_id): Path<i64>,
    Json(body): Json<UpdateShareDTO>,
) -> Result<Json<ShareDTO>, AppError> {
    debug!("Updating share");
    body.reject_read_only()?;
    body.validate()?;

    let current = share_or_404(&state, share_id).await?;

    if let Some(name) = body.name.as_deref().filter(|name| *name != current.name) {
        if state.share.find_by_name(name).await?.is_some() {
            warn!("Share name already taken");
            return Err(AppError::conflict("Share already exists")
                .with_field("name", "share with this name already exists."));
        }
    }

    if let Some(users) = &body.users {
        check_users_exist(&state, users).await?;
    }

    let share = state.share.update(&share_id, &body).await?;
    info!("Share updated");
    Ok(Json(to_dto(&state, share).await?))
}

#[instrument(skip(state), fields(share_id = %share_id))]
pub async fn delete_share(
    State(state): State<Arc<AppState>>,
    Path(share_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    info!("Share deletion requested");
    // ON DELETE CASCADE: membri, spese e quote spariscono con lo share
    state.share.delete(&share_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state), fields(share_id = %share_id, user_id = %user_id))]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path((share_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<ShareDTO>, AppError> {
    // 1. Verificare che share e utente esistano
    let share = share_or_404(&state, share_id).await?;
    if state.user.read(&user_id).await?.is_none() {
        warn!("User not found");
        return Err(AppError::not_found("User not found"));
    }

    // 2. Aggiungere il membro: se c'è già non cambia nulla
    let added = state.members.add(&share_id, &user_id).await?;
    debug!("Member added: {}", added);

    // 3. Ritornare lo share aggiornato
    Ok(Json(to_dto(&state, share).await?))
}

#[instrument(skip(state), fields(share_id = %share_id, user_id = %user_id))]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((share_id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    share_or_404(&state, share_id).await?;

    if !state.members.remove(&share_id, &user_id).await? {
        warn!("User is not a member of the share");
        return Err(AppError::not_found("User is not a member of this share"));
    }

    info!("Member removed");
    Ok(StatusCode::NO_CONTENT)
}
