//! Expense services - Creazione, aggiornamento e lettura delle spese
//!
//! Ogni mutazione segue lo stesso percorso: si carica il roster dello share,
//! si valida pagante e paid_for, e solo dopo si scrive. Un errore di
//! validazione non tocca mai il database.

use crate::core::{AppError, AppState, FieldErrors};
use crate::dtos::{
    CreateExpenseDTO, CreateExpenseRequestDTO, ExpenseDTO, ExpenseListQuery, ListFilter,
    ReadOnlyFields, UpdateExpenseDTO, UpdateExpenseRequestDTO,
};
use crate::entities::{ExpenseRatio, Money, timestamps};
use crate::repositories::{Create, Delete, Read, ReadMany, Update};
use crate::split::{RatioSet, ShareRoster, ValidationError, ratio_entries, validate_ratio_set};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Loads the members of `share_id` and which of the referenced users exist.
///
/// Only the ids that appear in the payload are looked up.
async fn load_roster(
    state: &AppState,
    share_id: i64,
    paid_for: Option<&BTreeMap<String, String>>,
    payer: Option<i64>,
) -> Result<ShareRoster, AppError> {
    let mut referenced: Vec<i64> = paid_for
        .into_iter()
        .flat_map(|map| map.keys())
        .filter_map(|raw| ShareRoster::parse_participant(raw))
        .chain(payer)
        .collect();
    referenced.sort_unstable();
    referenced.dedup();

    let members = state.members.member_ids(&share_id).await?;
    let known = state
        .user
        .read_many(&referenced)
        .await?
        .into_iter()
        .map(|u| u.user_id);

    Ok(ShareRoster::new(members, known))
}

fn record(errors: &mut FieldErrors, err: ValidationError) {
    debug!("Rejected: {}", err);
    errors.insert(err.field().to_string(), err.to_string());
}

fn money(errors: &mut FieldErrors, total: Decimal) -> Option<Money> {
    Money::new(total)
        .map_err(|err| errors.insert("total".to_string(), err.to_string()))
        .ok()
}

async fn share_exists(state: &AppState, share_id: i64) -> Result<bool, AppError> {
    Ok(state.share.read(&share_id).await?.is_some())
}

fn share_not_found(share_id: i64) -> (String, String) {
    ("share".to_string(), format!("Share with ID {share_id} not found."))
}

#[instrument(skip(state, params))]
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseListQuery>, // /expenses?share=1&id=3,4
) -> Result<Json<Vec<ExpenseDTO>>, AppError> {
    let filter = ListFilter::try_from(params)?;
    let expenses = state.expense.list(&filter).await?;

    // una sola query per le quote di tutte le spese
    let ids: Vec<i64> = expenses.iter().map(|e| e.expense_id).collect();
    let mut by_expense: HashMap<i64, Vec<ExpenseRatio>> = HashMap::new();
    for ratio in state.ratios.list_for_many(&ids).await? {
        by_expense.entry(ratio.expense_id).or_default().push(ratio);
    }

    let expenses_dto: Vec<ExpenseDTO> = expenses
        .into_iter()
        .map(|expense| {
            let ratios = by_expense.remove(&expense.expense_id).unwrap_or_default();
            ExpenseDTO::new(expense, &ratios)
        })
        .collect();

    info!("Found {} expenses", expenses_dto.len());
    Ok(Json(expenses_dto))
}

#[instrument(skip(state, body), fields(share_id = %body.share, paid_by = %body.paid_by))]
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateExpenseRequestDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating expense");
    // 1. Rifiutare i campi assegnati dal server e validare il body
    body.server_assigned.reject_read_only()?;
    body.validate()?;

    let mut errors = FieldErrors::new();
    let total = money(&mut errors, body.total);

    // 2. Senza share non c'è nulla contro cui validare
    if !share_exists(&state, body.share).await? {
        warn!("Share not found");
        errors.extend([share_not_found(body.share)]);
        return Err(AppError::validation(errors));
    }

    // 3. Pagante e paid_for vengono validati insieme, prima di qualsiasi scrittura
    let entries = ratio_entries(&body.paid_for)
        .map_err(|err| record(&mut errors, err))
        .ok();
    let roster = load_roster(&state, body.share, entries.as_ref(), Some(body.paid_by)).await?;
    if let Err(err) = roster.check_payer(body.paid_by) {
        record(&mut errors, err);
    }
    let paid_for = entries.and_then(|entries| {
        validate_ratio_set(&entries, &roster)
            .map_err(|err| record(&mut errors, err))
            .ok()
    });

    let (Some(total), Some(paid_for), true) = (total, paid_for, errors.is_empty()) else {
        warn!("Expense rejected: {:?}", errors);
        return Err(AppError::validation(errors));
    };

    // 4. Spesa e quote nella stessa transazione
    let new_expense = CreateExpenseDTO {
        description: body.description,
        share_id: body.share,
        total,
        paid_by: body.paid_by,
        resolved: body.resolved.unwrap_or(false),
        created_at: body.created_at.unwrap_or_else(timestamps::now),
        paid_for,
    };
    let expense = state.expense.create(&new_expense).await?;
    let ratios = state.ratios.list_for(&expense.expense_id).await?;

    info!(
        "Expense {} created with {} ratios",
        expense.expense_id,
        ratios.len()
    );
    Ok((StatusCode::CREATED, Json(ExpenseDTO::new(expense, &ratios))))
}

#[instrument(skip(state), fields(expense_id = %expense_id))]
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(expense_id): Path<i64>,
) -> Result<Json<ExpenseDTO>, AppError> {
    let expense = state.expense.read(&expense_id).await?.ok_or_else(|| {
        warn!("Expense not found");
        AppError::not_found("Expense not found")
    })?;
    let ratios = state.ratios.list_for(&expense_id).await?;
    Ok(Json(ExpenseDTO::new(expense, &ratios)))
}

/// Partial update. Omitted fields are left untouched; `paid_for`, when
/// present, replaces every ratio after being validated against the share
/// the expense will belong to.
#[instrument(skip(state, body), fields(expense_id = %expense_id))]
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(expense_id): Path<i64>,
    Json(body): Json<UpdateExpenseRequestDTO>,
) -> Result<Json<ExpenseDTO>, AppError> {
    debug!("Updating expense");
    body.server_assigned.reject_read_only()?;
    body.validate()?;

    let current = state
        .expense
        .read(&expense_id)
        .await?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    let mut errors = FieldErrors::new();
    let total = body.total.map(|total| money(&mut errors, total));

    if let Some(share_id) = body.share {
        if !share_exists(&state, share_id).await? {
            warn!("Share not found");
            errors.extend([share_not_found(share_id)]);
            return Err(AppError::validation(errors));
        }
    }

    // Valori effettivi dopo l'aggiornamento
    let share_id = body.share.unwrap_or(current.share_id);
    let payer = body.paid_by.unwrap_or(current.paid_by);
    let check_payer = body.paid_by.is_some() || body.share.is_some();

    let entries = body.paid_for.as_ref().and_then(|raw| {
        ratio_entries(raw)
            .map_err(|err| record(&mut errors, err))
            .ok()
    });

    let mut paid_for: Option<RatioSet> = None;
    if check_payer || entries.is_some() {
        let roster = load_roster(&state, share_id, entries.as_ref(), Some(payer)).await?;
        if check_payer {
            if let Err(err) = roster.check_payer(payer) {
                record(&mut errors, err);
            }
        }
        if let Some(entries) = &entries {
            paid_for = validate_ratio_set(entries, &roster)
                .map_err(|err| record(&mut errors, err))
                .ok();
        }
    }

    if !errors.is_empty() {
        warn!("Update rejected: {:?}", errors);
        return Err(AppError::validation(errors));
    }

    let changes = UpdateExpenseDTO {
        description: body.description,
        share_id: body.share,
        total: total.flatten(),
        paid_by: body.paid_by,
        resolved: body.resolved,
        created_at: body.created_at,
        paid_for,
    };
    let expense = state.expense.update(&expense_id, &changes).await?;
    let ratios = state.ratios.list_for(&expense_id).await?;

    info!("Expense updated, ratios regenerated: {}", changes.paid_for.is_some());
    Ok(Json(ExpenseDTO::new(expense, &ratios)))
}

#[instrument(skip(state), fields(expense_id = %expense_id))]
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(expense_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // le quote seguono per ON DELETE CASCADE
    state.expense.delete(&expense_id).await?;
    info!("Expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
