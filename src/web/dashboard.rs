//! Dashboard REST endpoints.
//!
//! The companion web dashboard reads the ledger and edits individual rows
//! through these routes. They are simple parameterized queries; ownership
//! is checked by resolving the phone number sent with every request to its
//! user row.

use crate::{core::ledger, entities::user, errors::Error, web::AppState};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::info;

#[allow(clippy::expect_used)]
static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("pattern is valid"));

type ApiError = (StatusCode, Json<Value>);

fn api_error(code: StatusCode, detail: &str) -> ApiError {
    (code, Json(json!({ "detail": detail })))
}

fn internal_error(e: Error) -> ApiError {
    tracing::error!("Dashboard API failure: {e}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno.")
}

/// Normalizes a dashboard-supplied phone number to the WhatsApp JID stored
/// in the users table: digits only, Brazilian `55` prefix, `@s.whatsapp.net`
/// suffix.
#[must_use]
pub fn normalize_phone_to_jid(phone_number: &str) -> String {
    let digits = NON_DIGITS.replace_all(phone_number, "");
    let with_country = if digits.starts_with("55") {
        digits.to_string()
    } else {
        format!("55{digits}")
    };
    format!("{with_country}@s.whatsapp.net")
}

async fn user_from_phone(db: &DatabaseConnection, phone_number: &str) -> Result<user::Model, ApiError> {
    if phone_number.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Número de telefone é obrigatório.",
        ));
    }
    let jid = normalize_phone_to_jid(phone_number);
    ledger::find_user(db, &jid)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Usuário não encontrado."))
}

/// Query-string carrier for the phone number that scopes row edits.
#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    /// The dashboard user's phone number
    pub phone_number: String,
}

/// Body of an expense edit request.
#[derive(Debug, Deserialize)]
pub struct ExpenseUpdate {
    /// New description
    pub description: String,
    /// New value
    pub value: Decimal,
    /// New category, cleared when absent
    #[serde(default)]
    pub category: Option<String>,
}

/// Body of an income edit request.
#[derive(Debug, Deserialize)]
pub struct IncomeUpdate {
    /// New description
    pub description: String,
    /// New value
    pub value: Decimal,
}

/// `GET /` - liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "Status": "Meu Gestor Backend está online!" }))
}

/// `GET /api/data/{phone_number}` - all financial records of one user,
/// newest first.
pub async fn get_user_data(
    State(state): State<AppState>,
    Path(phone_number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    info!("Dashboard data request for number: {phone_number}");
    let user = user_from_phone(&state.db, &phone_number).await?;

    let expenses = ledger::all_expenses(&state.db, user.id)
        .await
        .map_err(internal_error)?;
    let incomes = ledger::all_incomes(&state.db, user.id)
        .await
        .map_err(internal_error)?;

    let expenses_data: Vec<Value> = expenses
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "description": e.description,
                "value": e.value,
                "category": e.category,
                "date": e.transaction_date.to_rfc3339(),
            })
        })
        .collect();
    let incomes_data: Vec<Value> = incomes
        .iter()
        .map(|i| {
            json!({
                "id": i.id,
                "description": i.description,
                "value": i.value,
                "date": i.transaction_date.to_rfc3339(),
            })
        })
        .collect();

    Ok(Json(json!({
        "user_id": user.id,
        "phone_number": user.phone_number,
        "expenses": expenses_data,
        "incomes": incomes_data,
    })))
}

/// `PUT /api/expense/{id}?phone_number=...` - edit one expense row.
pub async fn update_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
    Query(query): Query<PhoneQuery>,
    Json(body): Json<ExpenseUpdate>,
) -> Result<Json<Value>, ApiError> {
    let user = user_from_phone(&state.db, &query.phone_number).await?;

    let found = ledger::expense_for_user(&state.db, expense_id, user.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Despesa não encontrada."))?;

    let mut active: crate::entities::expense::ActiveModel = found.into();
    active.description = sea_orm::Set(body.description);
    active.value = sea_orm::Set(body.value.round_dp(2));
    active.category = sea_orm::Set(body.category);
    let updated = sea_orm::ActiveModelTrait::update(active, &*state.db)
        .await
        .map_err(|e| internal_error(e.into()))?;

    Ok(Json(serde_json::to_value(updated).map_err(|e| internal_error(e.into()))?))
}

/// `DELETE /api/expense/{id}?phone_number=...` - delete one expense row.
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<Value>, ApiError> {
    let user = user_from_phone(&state.db, &query.phone_number).await?;

    ledger::expense_for_user(&state.db, expense_id, user.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Despesa não encontrada."))?;
    ledger::delete_expense(&state.db, expense_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({ "status": "success", "message": "Despesa apagada." })))
}

/// `PUT /api/income/{id}?phone_number=...` - edit one income row.
pub async fn update_income(
    State(state): State<AppState>,
    Path(income_id): Path<i64>,
    Query(query): Query<PhoneQuery>,
    Json(body): Json<IncomeUpdate>,
) -> Result<Json<Value>, ApiError> {
    let user = user_from_phone(&state.db, &query.phone_number).await?;

    let found = ledger::income_for_user(&state.db, income_id, user.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Crédito não encontrado."))?;

    let mut active: crate::entities::income::ActiveModel = found.into();
    active.description = sea_orm::Set(body.description);
    active.value = sea_orm::Set(body.value.round_dp(2));
    let updated = sea_orm::ActiveModelTrait::update(active, &*state.db)
        .await
        .map_err(|e| internal_error(e.into()))?;

    Ok(Json(serde_json::to_value(updated).map_err(|e| internal_error(e.into()))?))
}

/// `DELETE /api/income/{id}?phone_number=...` - delete one income row.
pub async fn delete_income(
    State(state): State<AppState>,
    Path(income_id): Path<i64>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<Value>, ApiError> {
    let user = user_from_phone(&state.db, &query.phone_number).await?;

    ledger::income_for_user(&state.db, income_id, user.id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Crédito não encontrado."))?;
    ledger::delete_income(&state.db, income_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({ "status": "success", "message": "Crédito apagado." })))
}
