//! Dati di prova per i test dei repository

use crate::core::{AppState, connect_in_memory};
use crate::dtos::{
    CreateExpenseDTO, CreateShareDTO, CreateUserDTO, ServerAssigned, ShareComputed, UserComputed,
};
use crate::entities::{Expense, Money, Share, User, timestamps};
use crate::repositories::Create;
use crate::split::{RatioSet, ShareRoster, validate_ratio_set};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub async fn state() -> AppState {
    let pool = connect_in_memory().await.expect("in-memory database");
    AppState::new(pool)
}

pub async fn user(state: &AppState, name: &str) -> User {
    state
        .user
        .create(&CreateUserDTO {
            name: name.to_string(),
            shares: None,
            server_assigned: ServerAssigned::default(),
            computed: UserComputed::default(),
        })
        .await
        .expect("create user")
}

pub async fn share(state: &AppState, name: &str, members: &[&User]) -> Share {
    state
        .share
        .create(&CreateShareDTO {
            name: name.to_string(),
            description: format!("{name} expenses"),
            users: Some(members.iter().map(|u| u.user_id).collect()),
            server_assigned: ServerAssigned::default(),
            computed: ShareComputed::default(),
        })
        .await
        .expect("create share")
}

/// Validates `entries` against the share members, as the services do
pub fn ratios(members: &[&User], entries: &[(&User, &str)]) -> RatioSet {
    let roster = ShareRoster::new(members.iter().map(|u| u.user_id), Vec::new());
    let paid_for: BTreeMap<String, String> = entries
        .iter()
        .map(|(user, ratio)| (user.user_id.to_string(), ratio.to_string()))
        .collect();
    validate_ratio_set(&paid_for, &roster).expect("valid ratio set")
}

pub async fn expense(state: &AppState, share: &Share, payer: &User, paid_for: RatioSet) -> Expense {
    state
        .expense
        .create(&CreateExpenseDTO {
            description: "lunch".to_string(),
            share_id: share.share_id,
            total: Money::new(Decimal::new(1000, 2)).expect("valid amount"),
            paid_by: payer.user_id,
            resolved: false,
            created_at: timestamps::now(),
            paid_for,
        })
        .await
        .expect("create expense")
}
