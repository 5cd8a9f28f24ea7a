//! Decoded agent actions and the dispatcher that executes them.
//!
//! The external LLM agent answers every inbound message with a JSON object
//! carrying an `action` tag plus a payload. [`Action`] is the closed,
//! strongly-typed decoding of that object; [`dispatch`] matches it
//! exhaustively, mutates the ledger, and always produces exactly one
//! outbound message, even when an operation fails.

use crate::{
    config::AppConfig,
    core::{ledger, period, summary},
    entities::user,
    errors::Result,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::error;

/// Fallback shown whenever a handler fails; the dispatcher never lets an
/// error escape to its caller.
pub const INTERNAL_ERROR_MESSAGE: &str = "❌ Ocorreu um erro interno ao processar seu pedido.";

/// A decoded intent produced by the agent.
///
/// Unknown tags and undecodable payloads both collapse into
/// [`Action::NotUnderstood`] via [`Action::from_agent_value`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Append an expense to the user's ledger
    RegisterExpense {
        /// What was bought
        #[serde(default = "default_description")]
        description: String,
        /// How much it cost
        #[serde(default)]
        value: Decimal,
        /// Optional category, free-form or from the default set
        #[serde(default)]
        category: Option<String>,
    },
    /// Append an income to the user's ledger
    RegisterIncome {
        /// Where the money came from
        #[serde(default = "default_description")]
        description: String,
        /// How much came in
        #[serde(default)]
        value: Decimal,
    },
    /// Schedule a reminder
    CreateReminder {
        /// What to be reminded of
        #[serde(default = "default_description")]
        description: String,
        /// ISO-8601 due timestamp, BRT wall clock; may be absent or malformed
        #[serde(default)]
        due_date: Option<String>,
    },
    /// Send the user their dashboard link
    GetDashboardLink,
    /// Build a period summary report
    GetSummary {
        /// Natural-language period phrase
        #[serde(default = "default_period")]
        period: String,
        /// Optional expense category filter
        #[serde(default)]
        category: Option<String>,
    },
    /// Delete the user's most recently registered expense
    DeleteLastExpense,
    /// Overwrite the value of the most recently registered expense
    EditLastExpenseValue {
        /// Replacement value
        #[serde(default)]
        new_value: Decimal,
    },
    /// Anything the agent could not map to a known intent
    #[serde(other)]
    NotUnderstood,
}

fn default_description() -> String {
    "N/A".to_string()
}

fn default_period() -> String {
    "período não identificado".to_string()
}

impl Action {
    /// Decodes an agent answer object, collapsing anything undecodable into
    /// [`Action::NotUnderstood`].
    #[must_use]
    pub fn from_agent_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or(Self::NotUnderstood)
    }
}

/// Parses the agent's due-date string leniently. The agent emits BRT
/// wall-clock timestamps; accepted shapes are ISO date-times (with or
/// without offset) and bare dates.
fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(period::utc_to_brt(with_offset.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

/// Executes a decoded action for `user` and returns the outbound message.
///
/// Stateless per call: the entire context is `(action, user, now)`. Any
/// error inside a handler is logged and replaced by
/// [`INTERNAL_ERROR_MESSAGE`], so this function always yields reply text.
pub async fn dispatch(
    db: &DatabaseConnection,
    config: &AppConfig,
    user: &user::Model,
    action: Action,
    now_utc: DateTime<Utc>,
) -> String {
    let label = action_label(&action);
    match apply(db, config, user, action, now_utc).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Error handling action '{label}': {e}");
            INTERNAL_ERROR_MESSAGE.to_string()
        }
    }
}

fn action_label(action: &Action) -> &'static str {
    match action {
        Action::RegisterExpense { .. } => "register_expense",
        Action::RegisterIncome { .. } => "register_income",
        Action::CreateReminder { .. } => "create_reminder",
        Action::GetDashboardLink => "get_dashboard_link",
        Action::GetSummary { .. } => "get_summary",
        Action::DeleteLastExpense => "delete_last_expense",
        Action::EditLastExpenseValue { .. } => "edit_last_expense_value",
        Action::NotUnderstood => "not_understood",
    }
}

async fn apply(
    db: &DatabaseConnection,
    config: &AppConfig,
    user: &user::Model,
    action: Action,
    now_utc: DateTime<Utc>,
) -> Result<String> {
    match action {
        Action::RegisterExpense {
            description,
            value,
            category,
        } => {
            ledger::add_expense(db, user.id, description.clone(), value, category).await?;
            Ok(format!(
                "✅ Despesa de R$ {:.2} ({description}) registrada com sucesso!",
                value.round_dp(2)
            ))
        }

        Action::RegisterIncome { description, value } => {
            ledger::add_income(db, user.id, description.clone(), value).await?;
            Ok(format!(
                "💰 Crédito de R$ {:.2} ({description}) registrado com sucesso!",
                value.round_dp(2)
            ))
        }

        Action::CreateReminder {
            description,
            due_date,
        } => {
            let parsed = due_date.as_deref().and_then(parse_due_date);
            match parsed {
                Some(local) => {
                    ledger::add_reminder(
                        db,
                        user.id,
                        description.clone(),
                        period::brt_to_utc(local),
                    )
                    .await?;
                    Ok(format!(
                        "🗓️ Lembrete agendado: '{description}' para {}.",
                        local.format("%d/%m/%Y às %H:%M")
                    ))
                }
                // Unparsable due date: the reminder is still recorded (due
                // now, for the operator to triage) and the confirmation just
                // omits the date clause.
                None => {
                    ledger::add_reminder(db, user.id, description.clone(), now_utc).await?;
                    Ok(format!("🗓️ Lembrete '{description}' agendado com sucesso!"))
                }
            }
        }

        Action::GetDashboardLink => match config.dashboard_url.as_deref() {
            Some(url) => Ok(format!(
                "Olá! Acesse seu painel de controle pessoal aqui: {url}"
            )),
            None => {
                error!("DASHBOARD_URL is not configured; cannot answer a dashboard link request");
                Ok("Desculpe, a funcionalidade de link para o painel não está configurada \
                    corretamente pelo administrador."
                    .to_string())
            }
        },

        Action::GetSummary { period, category } => {
            let outcome = summary::build_summary(
                db,
                user.id,
                &period,
                category.as_deref(),
                config.dashboard_url.as_deref(),
                now_utc,
            )
            .await?;
            match outcome {
                summary::SummaryOutcome::Report(text) => Ok(text),
                summary::SummaryOutcome::PeriodUnresolved => Ok(format!(
                    "Não consegui entender o período '{period}'. \
                     Tente 'hoje', 'ontem', 'este mês', ou 'últimos X dias'."
                )),
            }
        }

        Action::DeleteLastExpense => match ledger::find_last_expense(db, user.id).await? {
            Some(last) => {
                ledger::delete_expense(db, last.id).await?;
                Ok(format!(
                    "🗑️ Despesa anterior ('{}' de R$ {:.2}) foi removida.",
                    last.description, last.value
                ))
            }
            None => Ok("🤔 Não encontrei nenhuma despesa para apagar.".to_string()),
        },

        Action::EditLastExpenseValue { new_value } => {
            let updated = match ledger::find_last_expense(db, user.id).await? {
                // The row can disappear between lookup and update when two
                // messages race; both misses read as nothing to edit.
                Some(last) => ledger::update_expense_value(db, last.id, new_value).await?,
                None => None,
            };
            match updated {
                Some(updated) => Ok(format!(
                    "✏️ Valor da despesa '{}' corrigido para *R$ {:.2}*.",
                    updated.description, updated.value
                )),
                None => Ok("🤔 Não encontrei nenhuma despesa para editar.".to_string()),
            }
        }

        Action::NotUnderstood => Ok(
            "Não entendi. Tente de novo. Ex: 'gastei 50 no mercado', \
             'recebi 1000 de salário', 'resumo do mês'."
                .to_string(),
        ),
    }
}
