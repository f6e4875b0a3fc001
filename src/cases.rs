use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Case;
use crate::store::{Store, StoreError, keys, read_record, write_record};

pub const CASE_NUMBER_PREFIX: &str = "FMA-EXP";

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Expediente no encontrado")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Partial update for the editable header fields. Absent fields are
/// left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseChanges {
    pub title: Option<String>,
    pub client: Option<String>,
    pub monto_ganado: Option<f64>,
}

pub async fn list_cases(store: &dyn Store) -> Result<Vec<Case>, CaseError> {
    Ok(read_record(store, keys::CASES).await?)
}

// The whole list is rewritten after every mutation; the persisted record
// always matches the in-memory list.
async fn save_cases(store: &dyn Store, cases: &[Case]) -> Result<(), CaseError> {
    write_record(store, keys::CASES, &cases).await?;
    Ok(())
}

/// Bump the persisted per-year counter and format the next case number,
/// e.g. `FMA-EXP-2026-0001`.
pub async fn next_case_number(store: &dyn Store, year: i32) -> Result<String, CaseError> {
    let key = keys::case_counter(year);
    let last: u32 = read_record(store, &key).await?;
    let next = last + 1;
    write_record(store, &key, &next).await?;

    Ok(format!("{CASE_NUMBER_PREFIX}-{year}-{next:04}"))
}

pub async fn create_case(store: &dyn Store) -> Result<Case, CaseError> {
    let year = chrono::Utc::now().year();
    let case = Case {
        id: Uuid::new_v4().to_string(),
        case_number: next_case_number(store, year).await?,
        title: "Nuevo expediente".to_string(),
        client: String::new(),
        monto_ganado: 0.0,
        products: Vec::new(),
    };

    let mut cases = list_cases(store).await?;
    cases.push(case.clone());
    save_cases(store, &cases).await?;

    Ok(case)
}

pub async fn get_case(store: &dyn Store, id: &str) -> Result<Case, CaseError> {
    list_cases(store)
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or(CaseError::NotFound)
}

pub async fn update_case(
    store: &dyn Store,
    id: &str,
    changes: CaseChanges,
) -> Result<Case, CaseError> {
    let mut cases = list_cases(store).await?;
    let case = cases
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(CaseError::NotFound)?;

    if let Some(title) = changes.title {
        case.title = title;
    }
    if let Some(client) = changes.client {
        case.client = client;
    }
    if let Some(monto) = changes.monto_ganado {
        case.monto_ganado = monto;
    }

    let updated = case.clone();
    save_cases(store, &cases).await?;

    Ok(updated)
}

/// Whole-record replacement, used by the line-item routes after the
/// billing operations have run.
pub async fn save_case(store: &dyn Store, updated: &Case) -> Result<(), CaseError> {
    let mut cases = list_cases(store).await?;
    let slot = cases
        .iter_mut()
        .find(|c| c.id == updated.id)
        .ok_or(CaseError::NotFound)?;
    *slot = updated.clone();
    save_cases(store, &cases).await?;

    Ok(())
}

pub async fn delete_case(store: &dyn Store, id: &str) -> Result<(), CaseError> {
    let mut cases = list_cases(store).await?;
    let before = cases.len();
    cases.retain(|c| c.id != id);
    if cases.len() == before {
        return Err(CaseError::NotFound);
    }
    save_cases(store, &cases).await?;

    Ok(())
}
