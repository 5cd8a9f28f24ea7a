//! User entity - One row per WhatsApp contact that ever messaged the bot.
//!
//! Users are identified by their `phone_number` JID and are created lazily on
//! the first inbound message. A user owns expenses, incomes and reminders.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// WhatsApp JID, e.g. `5511999999999@s.whatsapp.net`
    #[sea_orm(unique)]
    pub phone_number: String,
    /// When the user first messaged the bot
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and the owned record tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user owns many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expense,
    /// A user owns many incomes
    #[sea_orm(has_many = "super::income::Entity")]
    Income,
    /// A user owns many reminders
    #[sea_orm(has_many = "super::reminder::Entity")]
    Reminder,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::income::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Income.def()
    }
}

impl Related<super::reminder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reminder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
