use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::auth::{require_admin, require_session};
use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::billing::{self, CaseTotals};
use crate::cases::{self, CaseChanges};
use crate::models::{self, Case, CatalogProduct};

/// Case plus its derived totals, the shape the detail screen renders.
#[derive(Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: Case,
    pub totals: CaseTotals,
}

impl CaseDetail {
    fn new(case: Case) -> Self {
        let totals = billing::case_totals(&case);
        Self { case, totals }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AddProductRequest {
    Catalog { product_id: String },
    Manual { name: String, price: f64 },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItemChanges {
    pub qty: Option<i64>,
    pub custom_price: Option<f64>,
}

pub async fn catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<&'static [CatalogProduct]>, ApiError> {
    require_session(state.store.as_ref()).await?;
    Ok(Json(models::CATALOG))
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Case>>, ApiError> {
    require_session(state.store.as_ref()).await?;
    Ok(Json(cases::list_cases(state.store.as_ref()).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Case>), ApiError> {
    require_session(state.store.as_ref()).await?;
    let case = cases::create_case(state.store.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CaseDetail>, ApiError> {
    require_session(state.store.as_ref()).await?;
    let case = cases::get_case(state.store.as_ref(), &id).await?;
    Ok(Json(CaseDetail::new(case)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(changes): Json<CaseChanges>,
) -> Result<Json<CaseDetail>, ApiError> {
    let session = require_session(state.store.as_ref()).await?;
    require_admin(&session)?;

    let case = cases::update_case(state.store.as_ref(), &id, changes).await?;
    Ok(Json(CaseDetail::new(case)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = require_session(state.store.as_ref()).await?;
    require_admin(&session)?;

    cases::delete_case(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<AddProductRequest>,
) -> Result<Json<CaseDetail>, ApiError> {
    let session = require_session(state.store.as_ref()).await?;
    require_admin(&session)?;

    let mut case = cases::get_case(state.store.as_ref(), &id).await?;
    match request {
        AddProductRequest::Catalog { product_id } => {
            let product = models::find_catalog_product(&product_id)
                .ok_or_else(|| ApiError::NotFound("Producto no encontrado".to_string()))?;
            billing::add_catalog_product(&mut case, product)?;
        }
        AddProductRequest::Manual { name, price } => {
            billing::add_manual_product(&mut case, &name, price)?;
        }
    }
    cases::save_case(state.store.as_ref(), &case).await?;

    Ok(Json(CaseDetail::new(case)))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path((id, line_id)): Path<(String, String)>,
    Json(changes): Json<LineItemChanges>,
) -> Result<Json<CaseDetail>, ApiError> {
    let session = require_session(state.store.as_ref()).await?;
    require_admin(&session)?;

    let mut case = cases::get_case(state.store.as_ref(), &id).await?;
    if let Some(qty) = changes.qty {
        billing::set_qty(&mut case, &line_id, qty)?;
    }
    if let Some(price) = changes.custom_price {
        billing::set_custom_price(&mut case, &line_id, price)?;
    }
    cases::save_case(state.store.as_ref(), &case).await?;

    Ok(Json(CaseDetail::new(case)))
}

pub async fn remove_product(
    State(state): State<Arc<AppState>>,
    Path((id, line_id)): Path<(String, String)>,
) -> Result<Json<CaseDetail>, ApiError> {
    let session = require_session(state.store.as_ref()).await?;
    require_admin(&session)?;

    let mut case = cases::get_case(state.store.as_ref(), &id).await?;
    billing::remove_product(&mut case, &line_id)?;
    cases::save_case(state.store.as_ref(), &case).await?;

    Ok(Json(CaseDetail::new(case)))
}
