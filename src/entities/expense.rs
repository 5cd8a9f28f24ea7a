//! Expense entity - One row per registered expense.
//!
//! Values are stored as `Decimal(10, 2)`; timestamps are UTC instants.
//! The "last expense" that delete/edit actions target is the row with the
//! highest `id` for a user, not the one with the latest `transaction_date`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable description of the expense
    pub description: String,
    /// Monetary value, always two fraction digits
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub value: Decimal,
    /// Free-form category; `None` renders as the "Outros" bucket
    pub category: Option<String>,
    /// When the expense happened (UTC)
    pub transaction_date: DateTimeUtc,
    /// Owning user
    pub user_id: i64,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
