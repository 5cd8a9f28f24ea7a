//! Shared test utilities.
//!
//! Provides helpers for setting up in-memory databases and inserting
//! fixture rows with explicit timestamps, which the period-window tests
//! need and the public ledger API deliberately does not expose.

use crate::{
    config::AppConfig,
    core::ledger,
    entities::{expense, income, user},
    errors::Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a database with one registered user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, user::Model)> {
    let db = setup_test_db().await?;
    let user = ledger::get_or_create_user(&db, "5511999990000@s.whatsapp.net").await?;
    Ok((db, user))
}

/// Inserts an expense with an explicit transaction date.
pub async fn insert_expense_at(
    db: &DatabaseConnection,
    user_id: i64,
    description: &str,
    value: Decimal,
    category: Option<String>,
    transaction_date: DateTime<Utc>,
) -> Result<expense::Model> {
    let model = expense::ActiveModel {
        description: Set(description.to_string()),
        value: Set(value.round_dp(2)),
        category: Set(category),
        transaction_date: Set(transaction_date),
        user_id: Set(user_id),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Inserts an income with an explicit transaction date.
pub async fn insert_income_at(
    db: &DatabaseConnection,
    user_id: i64,
    description: &str,
    value: Decimal,
    transaction_date: DateTime<Utc>,
) -> Result<income::Model> {
    let model = income::ActiveModel {
        description: Set(description.to_string()),
        value: Set(value.round_dp(2)),
        transaction_date: Set(transaction_date),
        user_id: Set(user_id),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// An [`AppConfig`] with placeholder collaborator endpoints, for tests that
/// never reach the network.
#[must_use]
pub fn test_config(dashboard_url: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        dify_api_url: "http://dify.invalid".to_string(),
        dify_api_key: "test-key".to_string(),
        evolution_api_url: "http://evolution.invalid".to_string(),
        evolution_instance_name: "test-instance".to_string(),
        evolution_api_key: "test-key".to_string(),
        dashboard_url: dashboard_url.map(String::from),
        bind_address: "127.0.0.1:0".to_string(),
    }
}
