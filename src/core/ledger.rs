//! Ledger persistence operations - per-user append/query/edit/delete over
//! expense and income records.
//!
//! Every function takes a `&DatabaseConnection` and returns a `Result`
//! (or `Result<Option<_>>` for lookups) so callers can pattern-match
//! found/not-found/store-error instead of catching broad failures.
//!
//! The "last expense" targeted by delete/edit is the row with the highest
//! `id` for the user. This is deliberate and differs from timestamp order;
//! keep it for behavioral parity with the deployed assistant.

use crate::{
    entities::{Expense, Income, User, expense, income, reminder, user},
    errors::Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Finds a user by phone-number JID, creating the row on first contact.
pub async fn get_or_create_user(db: &DatabaseConnection, phone_number: &str) -> Result<user::Model> {
    let existing = User::find()
        .filter(user::Column::PhoneNumber.eq(phone_number))
        .one(db)
        .await?;

    if let Some(found) = existing {
        return Ok(found);
    }

    info!("Creating new user for number: {phone_number}");
    let new_user = user::ActiveModel {
        phone_number: Set(phone_number.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_user.insert(db).await.map_err(Into::into)
}

/// Finds a user by phone-number JID without creating one.
pub async fn find_user(db: &DatabaseConnection, phone_number: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::PhoneNumber.eq(phone_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Appends an expense to the user's ledger, timestamped now.
pub async fn add_expense(
    db: &DatabaseConnection,
    user_id: i64,
    description: String,
    value: Decimal,
    category: Option<String>,
) -> Result<expense::Model> {
    info!("Adding expense for user {user_id}...");
    let new_expense = expense::ActiveModel {
        description: Set(description),
        value: Set(value.round_dp(2)),
        category: Set(category),
        transaction_date: Set(Utc::now()),
        user_id: Set(user_id),
        ..Default::default()
    };
    new_expense.insert(db).await.map_err(Into::into)
}

/// Appends an income to the user's ledger, timestamped now.
pub async fn add_income(
    db: &DatabaseConnection,
    user_id: i64,
    description: String,
    value: Decimal,
) -> Result<income::Model> {
    info!("Adding income for user {user_id}...");
    let new_income = income::ActiveModel {
        description: Set(description),
        value: Set(value.round_dp(2)),
        transaction_date: Set(Utc::now()),
        user_id: Set(user_id),
        ..Default::default()
    };
    new_income.insert(db).await.map_err(Into::into)
}

/// Appends a reminder for the user.
pub async fn add_reminder(
    db: &DatabaseConnection,
    user_id: i64,
    description: String,
    due_date: DateTime<Utc>,
) -> Result<reminder::Model> {
    info!("Adding reminder for user {user_id}...");
    let new_reminder = reminder::ActiveModel {
        description: Set(description),
        due_date: Set(due_date),
        is_sent: Set(false),
        user_id: Set(user_id),
        ..Default::default()
    };
    new_reminder.insert(db).await.map_err(Into::into)
}

/// Expenses of a user inside the half-open UTC range `[start, end)`,
/// optionally restricted to one category, ascending by transaction date.
pub async fn expenses_in_range(
    db: &DatabaseConnection,
    user_id: i64,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
    category: Option<&str>,
) -> Result<Vec<expense::Model>> {
    let mut query = Expense::find()
        .filter(expense::Column::UserId.eq(user_id))
        .filter(expense::Column::TransactionDate.gte(start_utc))
        .filter(expense::Column::TransactionDate.lt(end_utc));

    if let Some(category) = category {
        query = query.filter(expense::Column::Category.eq(category));
    }

    query
        .order_by_asc(expense::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Incomes of a user inside the half-open UTC range `[start, end)`,
/// ascending by transaction date. Incomes are never category-filtered.
pub async fn incomes_in_range(
    db: &DatabaseConnection,
    user_id: i64,
    start_utc: DateTime<Utc>,
    end_utc: DateTime<Utc>,
) -> Result<Vec<income::Model>> {
    Income::find()
        .filter(income::Column::UserId.eq(user_id))
        .filter(income::Column::TransactionDate.gte(start_utc))
        .filter(income::Column::TransactionDate.lt(end_utc))
        .order_by_asc(income::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The user's most recently registered expense: the row with the highest id,
/// regardless of transaction date.
pub async fn find_last_expense(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find()
        .filter(expense::Column::UserId.eq(user_id))
        .order_by_desc(expense::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes one expense row by id.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    Expense::delete_by_id(expense_id).exec(db).await?;
    Ok(())
}

/// Deletes one income row by id.
pub async fn delete_income(db: &DatabaseConnection, income_id: i64) -> Result<()> {
    Income::delete_by_id(income_id).exec(db).await?;
    Ok(())
}

/// Overwrites the value of one expense row, returning the updated model,
/// or `None` when the row no longer exists.
pub async fn update_expense_value(
    db: &DatabaseConnection,
    expense_id: i64,
    new_value: Decimal,
) -> Result<Option<expense::Model>> {
    let Some(found) = Expense::find_by_id(expense_id).one(db).await? else {
        return Ok(None);
    };

    let mut active: expense::ActiveModel = found.into();
    active.value = Set(new_value.round_dp(2));
    active.update(db).await.map(Some).map_err(Into::into)
}

/// All expenses of a user, newest first. Used by the dashboard API.
pub async fn all_expenses(db: &DatabaseConnection, user_id: i64) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::UserId.eq(user_id))
        .order_by_desc(expense::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All incomes of a user, newest first. Used by the dashboard API.
pub async fn all_incomes(db: &DatabaseConnection, user_id: i64) -> Result<Vec<income::Model>> {
    Income::find()
        .filter(income::Column::UserId.eq(user_id))
        .order_by_desc(income::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One expense row, constrained to the owning user. Used by the dashboard API.
pub async fn expense_for_user(
    db: &DatabaseConnection,
    expense_id: i64,
    user_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id)
        .filter(expense::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// One income row, constrained to the owning user. Used by the dashboard API.
pub async fn income_for_user(
    db: &DatabaseConnection,
    income_id: i64,
    user_id: i64,
) -> Result<Option<income::Model>> {
    Income::find_by_id(income_id)
        .filter(income::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}
