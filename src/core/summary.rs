//! Period summary aggregation and report rendering.
//!
//! Given a user and a natural-language period phrase, pulls the matching
//! expenses and incomes from the ledger, aggregates expenses by category and
//! renders the WhatsApp balance report. Rendering is deterministic: the same
//! ledger state and inputs always produce byte-identical text.

use crate::{
    core::{ledger, period},
    entities::{expense, income},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Default bucket for expenses without a category.
pub const DEFAULT_CATEGORY: &str = "Outros";

/// Outcome of building a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The rendered report text, ready to send
    Report(String),
    /// The period phrase matched no known pattern; the caller renders help
    PeriodUnresolved,
}

/// Formats a monetary value with two decimals and a comma separator,
/// as used inside report text ("1234,50").
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2)).replace('.', ",")
}

/// Formats a UTC instant as a BRT-local `dd/mm/yyyy` date.
#[must_use]
pub fn format_date(instant: DateTime<Utc>) -> String {
    period::utc_to_brt(instant).format("%d/%m/%Y").to_string()
}

fn category_emoji(category: &str) -> &'static str {
    match category {
        "Alimentação" => "🍽️",
        "Transporte" => "🚗",
        "Moradia" => "🏠",
        "Lazer" => "🎉",
        "Saúde" => "❤️‍🩹",
        "Educação" => "🎓",
        _ => "🛒",
    }
}

struct CategoryGroup<'a> {
    name: &'a str,
    items: Vec<&'a expense::Model>,
    total: Decimal,
}

/// Groups expenses by category in first-seen order, then sorts descending by
/// subtotal. The sort is stable, so equal subtotals keep first-seen order.
fn group_by_category(expenses: &[expense::Model]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for expense in expenses {
        let name = expense.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => {
                group.items.push(expense);
                group.total += expense.value;
            }
            None => groups.push(CategoryGroup {
                name,
                items: vec![expense],
                total: expense.value,
            }),
        }
    }
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

fn render_report(
    resolved: period::Period,
    expenses: &[expense::Model],
    incomes: &[income::Model],
    dashboard_url: Option<&str>,
) -> String {
    let total_expenses: Decimal = expenses.iter().map(|e| e.value).sum();
    let total_incomes: Decimal = incomes.iter().map(|i| i.value).sum();
    let balance = total_incomes - total_expenses;

    let start_str = resolved.start_local.format("%d/%m/%Y");
    let end_str = (resolved.end_local - Duration::days(1)).format("%d/%m/%Y");

    let mut message = format!(
        "Vamos lá! No período de {start_str} a {end_str}, este é o seu balanço:\n\n"
    );

    message.push_str(&format!(
        "💰 *Créditos: R$ {}*\n",
        format_currency(total_incomes)
    ));
    if incomes.is_empty() {
        message.push_str("- Nenhum crédito no período.\n");
    } else {
        for income in incomes {
            message.push_str(&format!(
                "- {}: {} - R$ {}\n",
                format_date(income.transaction_date),
                income.description,
                format_currency(income.value)
            ));
        }
    }
    message.push('\n');

    message.push_str("💸 *Despesas*\n");
    if expenses.is_empty() {
        message.push_str("- Nenhuma despesa no período. 🎉\n");
    } else {
        for group in group_by_category(expenses) {
            message.push_str(&format!("\n{} *{}*\n", category_emoji(group.name), group.name));
            for expense in &group.items {
                message.push_str(&format!(
                    "- {}: {} - R$ {}\n",
                    format_date(expense.transaction_date),
                    expense.description,
                    format_currency(expense.value)
                ));
            }
            message.push_str(&format!(
                "*Subtotal {}: R$ {}*\n",
                group.name,
                format_currency(group.total)
            ));
        }
    }

    let balance_emoji = if balance >= Decimal::ZERO { "📈" } else { "📉" };
    message.push_str("\n--------------------\n");
    message.push_str(&format!(
        "{balance_emoji} *Balanço Final: R$ {}*\n\n",
        format_currency(balance)
    ));

    if let Some(url) = dashboard_url {
        message.push_str(&format!(
            "Se precisar de mais detalhes ou visualizar os gráficos dos seus gastos, \
             você pode acessar a plataforma web em {url} 😉"
        ));
    }

    message
}

/// Builds the balance report for `user_id` over the period described by
/// `phrase`, optionally restricting expenses (never incomes) to `category`.
///
/// Returns [`SummaryOutcome::PeriodUnresolved`] when the phrase matches no
/// known pattern. Persistence errors propagate; no partial report is built.
pub async fn build_summary(
    db: &DatabaseConnection,
    user_id: i64,
    phrase: &str,
    category: Option<&str>,
    dashboard_url: Option<&str>,
    now_utc: DateTime<Utc>,
) -> Result<SummaryOutcome> {
    let Some(resolved) = period::resolve(phrase, now_utc) else {
        return Ok(SummaryOutcome::PeriodUnresolved);
    };

    let start_utc = resolved.start_utc();
    let end_utc = resolved.end_utc();

    let expenses = ledger::expenses_in_range(db, user_id, start_utc, end_utc, category).await?;
    let incomes = ledger::incomes_in_range(db, user_id, start_utc, end_utc).await?;

    Ok(SummaryOutcome::Report(render_report(
        resolved,
        &expenses,
        &incomes,
        dashboard_url,
    )))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn report_text(outcome: SummaryOutcome) -> String {
        match outcome {
            SummaryOutcome::Report(text) => text,
            SummaryOutcome::PeriodUnresolved => panic!("expected a report"),
        }
    }

    #[test]
    fn test_format_currency_uses_comma_and_two_decimals() {
        assert_eq!(format_currency(dec!(950)), "950,00");
        assert_eq!(format_currency(dec!(50.5)), "50,50");
        assert_eq!(format_currency(dec!(-12.349)), "-12,35");
        assert_eq!(format_currency(Decimal::ZERO), "0,00");
    }

    #[test]
    fn test_format_date_converts_to_brt() {
        // 01:30Z is still the previous day in BRT
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 1, 30, 0).single().unwrap();
        assert_eq!(format_date(instant), "29/02/2024");
    }

    #[tokio::test]
    async fn test_summary_scenario_today() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        insert_expense_at(
            &db,
            user.id,
            "Mercado",
            dec!(50.00),
            Some("Alimentação".to_string()),
            now,
        )
        .await?;
        insert_income_at(&db, user.id, "Salário", dec!(1000.00), now).await?;

        let text = report_text(build_summary(&db, user.id, "hoje", None, None, now).await?);

        assert!(text.contains("💰 *Créditos: R$ 1000,00*"));
        assert!(text.contains("Salário - R$ 1000,00"));
        assert!(text.contains("🍽️ *Alimentação*"));
        assert!(text.contains("Mercado - R$ 50,00"));
        assert!(text.contains("*Subtotal Alimentação: R$ 50,00*"));
        assert!(text.contains("📈 *Balanço Final: R$ 950,00*"));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_is_idempotent() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        insert_expense_at(&db, user.id, "Uber", dec!(23.40), None, now).await?;
        insert_income_at(&db, user.id, "Pix", dec!(100.00), now).await?;

        let first = report_text(build_summary(&db, user.id, "hoje", None, None, now).await?);
        let second = report_text(build_summary(&db, user.id, "hoje", None, None, now).await?);
        assert_eq!(first, second);

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_unresolved_period() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let outcome = build_summary(&db, user.id, "xyz", None, None, Utc::now()).await?;
        assert_eq!(outcome, SummaryOutcome::PeriodUnresolved);
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_empty_period_has_zero_balance() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let text = report_text(build_summary(&db, user.id, "hoje", None, None, Utc::now()).await?);

        assert!(text.contains("- Nenhum crédito no período."));
        assert!(text.contains("- Nenhuma despesa no período. 🎉"));
        assert!(text.contains("📈 *Balanço Final: R$ 0,00*"));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_negative_balance_arrow() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        insert_expense_at(&db, user.id, "Aluguel", dec!(1200.00), None, now).await?;

        let text = report_text(build_summary(&db, user.id, "hoje", None, None, now).await?);
        assert!(text.contains("📉 *Balanço Final: R$ -1200,00*"));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_categories_sorted_by_subtotal_descending() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        insert_expense_at(
            &db,
            user.id,
            "Cinema",
            dec!(30.00),
            Some("Lazer".to_string()),
            now,
        )
        .await?;
        insert_expense_at(
            &db,
            user.id,
            "Mercado",
            dec!(200.00),
            Some("Alimentação".to_string()),
            now,
        )
        .await?;
        insert_expense_at(&db, user.id, "Pilhas", dec!(10.00), None, now).await?;

        let text = report_text(build_summary(&db, user.id, "hoje", None, None, now).await?);

        let alimentacao = text.find("*Alimentação*").unwrap();
        let lazer = text.find("*Lazer*").unwrap();
        let outros = text.find("*Outros*").unwrap();
        assert!(alimentacao < lazer && lazer < outros);
        assert!(text.contains("🛒 *Outros*"));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_subtotals_sum_to_total() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        let values = [dec!(10.01), dec!(20.02), dec!(0.97), dec!(33.33)];
        let categories = [Some("Lazer"), Some("Lazer"), None, Some("Transporte")];
        for (value, category) in values.iter().zip(categories) {
            insert_expense_at(
                &db,
                user.id,
                "Item",
                *value,
                category.map(String::from),
                now,
            )
            .await?;
        }

        let expenses =
            ledger::expenses_in_range(&db, user.id, now - Duration::hours(1), now + Duration::hours(1), None)
                .await?;
        let total: Decimal = expenses.iter().map(|e| e.value).sum();
        let grouped_total: Decimal = super::group_by_category(&expenses)
            .iter()
            .map(|g| g.total)
            .sum();
        assert_eq!(total, grouped_total);
        assert_eq!(total, dec!(64.33));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_category_filter_ignores_incomes() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        insert_expense_at(
            &db,
            user.id,
            "Mercado",
            dec!(50.00),
            Some("Alimentação".to_string()),
            now,
        )
        .await?;
        insert_expense_at(
            &db,
            user.id,
            "Uber",
            dec!(20.00),
            Some("Transporte".to_string()),
            now,
        )
        .await?;
        insert_income_at(&db, user.id, "Salário", dec!(1000.00), now).await?;

        let text = report_text(
            build_summary(&db, user.id, "hoje", Some("Alimentação"), None, now).await?,
        );

        // Filtered expenses, full income list, balance over the filtered set
        assert!(text.contains("Mercado"));
        assert!(!text.contains("Uber"));
        assert!(text.contains("Salário"));
        assert!(text.contains("📈 *Balanço Final: R$ 950,00*"));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_dashboard_footer_only_when_configured() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let now = Utc::now();

        let with = report_text(
            build_summary(&db, user.id, "hoje", None, Some("https://painel.example"), now).await?,
        );
        assert!(with.contains("https://painel.example"));

        let without = report_text(build_summary(&db, user.id, "hoje", None, None, now).await?);
        assert!(!without.contains("plataforma web"));

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_header_renders_inclusive_end_date() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        // Noon BRT on 2024-06-15
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 15, 0, 0).single().unwrap();

        let text = report_text(build_summary(&db, user.id, "últimos 3 dias", None, None, now).await?);
        assert!(text.starts_with("Vamos lá! No período de 13/06/2024 a 15/06/2024"));

        Ok(())
    }
}
