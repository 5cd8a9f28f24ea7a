//! Reminder entity - Scheduled one-off reminders created from chat.
//!
//! `is_sent` is flipped by an external scheduler once the reminder message
//! goes out; this service only creates rows.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reminder database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reminders")]
pub struct Model {
    /// Unique identifier for the reminder
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What to remind the user about
    pub description: String,
    /// When the reminder is due (UTC)
    pub due_date: DateTimeUtc,
    /// Whether the reminder message has already been delivered
    pub is_sent: bool,
    /// Owning user
    pub user_id: i64,
}

/// Defines relationships between Reminder and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reminder belongs to one user
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
