//! Query DTOs - Filtri delle liste (`?name=a,b&id=1,2`)

use crate::core::AppError;
use serde::Deserialize;

/// Raw `name` / `id` filters of the user and share lists
#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Raw `share` / `id` filters of the expense list
#[derive(Deserialize, Debug, Default)]
pub struct ExpenseListQuery {
    #[serde(default)]
    pub share: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Parsed filters. `None` means "no filter"; several filters combine with AND.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListFilter {
    pub names: Option<Vec<String>>,
    pub ids: Option<Vec<i64>>,
    pub share_ids: Option<Vec<i64>>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        self.names.is_none() && self.ids.is_none() && self.share_ids.is_none()
    }
}

impl TryFrom<ListQuery> for ListFilter {
    type Error = AppError;

    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            names: query.name.as_deref().and_then(list_of_str),
            ids: naturals_param("id", query.id.as_deref())?,
            share_ids: None,
        })
    }
}

impl TryFrom<ExpenseListQuery> for ListFilter {
    type Error = AppError;

    fn try_from(query: ExpenseListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            names: None,
            ids: naturals_param("id", query.id.as_deref())?,
            share_ids: naturals_param("share", query.share.as_deref())?,
        })
    }
}

fn strip_trailing_commas(raw: &str) -> &str {
    raw.trim_end().trim_end_matches(',')
}

/// Comma separated strings; empty input means no filter
fn list_of_str(raw: &str) -> Option<Vec<String>> {
    let raw = strip_trailing_commas(raw);
    (!raw.is_empty()).then(|| raw.split(',').map(str::to_string).collect())
}

/// Comma separated natural numbers (n >= 0)
fn list_of_naturals(raw: &str) -> Result<Option<Vec<i64>>, ()> {
    let raw = strip_trailing_commas(raw);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.split(',')
        .map(|part| match part.trim().parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err(()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn naturals_param(name: &'static str, raw: Option<&str>) -> Result<Option<Vec<i64>>, AppError> {
    match raw {
        None => Ok(None),
        Some(raw) => list_of_naturals(raw).map_err(|_| {
            AppError::bad_request("Invalid query parameter").with_field(
                name,
                format!("Parameter '{name}' must be type 'List of Natural Numbers'"),
            )
        }),
    }
}
