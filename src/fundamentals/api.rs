use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::wire::{epoch_to_date, from_raw, from_raw_date, unwrap_raw};
use crate::core::{ProviderError, YahooProvider, quotesummary};

use super::model::{Calendar, EarningsRow, Frequency, StatementKind, StatementRow};
use super::wire::V10Result;

pub(crate) async fn calendar(
    client: &YahooProvider,
    symbol: &str,
) -> Result<Calendar, ProviderError> {
    let root: V10Result =
        quotesummary::fetch_module_result(client, symbol, "calendarEvents", "calendar").await?;

    let Some(ev) = root.calendar_events else {
        return Ok(Calendar::default());
    };

    let mut cal = Calendar {
        ex_dividend_date: from_raw_date(ev.ex_dividend_date),
        dividend_date: from_raw_date(ev.dividend_date),
        ..Calendar::default()
    };

    if let Some(e) = ev.earnings {
        cal.earnings_dates = e
            .earnings_date
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| from_raw_date(Some(d)))
            .collect();
        cal.earnings_high = from_raw(e.earnings_high);
        cal.earnings_low = from_raw(e.earnings_low);
        cal.earnings_average = from_raw(e.earnings_average);
        cal.revenue_high = from_raw(e.revenue_high);
        cal.revenue_low = from_raw(e.revenue_low);
        cal.revenue_average = from_raw(e.revenue_average);
    }

    Ok(cal)
}

/// quoteSummary module holding `kind`/`frequency`, and the array key inside it.
const fn statement_module(kind: StatementKind, frequency: Frequency) -> (&'static str, &'static str) {
    match (kind, frequency) {
        (StatementKind::Income, Frequency::Annual) => {
            ("incomeStatementHistory", "incomeStatementHistory")
        }
        (StatementKind::Income, Frequency::Quarterly) => {
            ("incomeStatementHistoryQuarterly", "incomeStatementHistory")
        }
        (StatementKind::Balance, Frequency::Annual) => {
            ("balanceSheetHistory", "balanceSheetStatements")
        }
        (StatementKind::Balance, Frequency::Quarterly) => {
            ("balanceSheetHistoryQuarterly", "balanceSheetStatements")
        }
        (StatementKind::Cash, Frequency::Annual) => {
            ("cashflowStatementHistory", "cashflowStatements")
        }
        (StatementKind::Cash, Frequency::Quarterly) => {
            ("cashflowStatementHistoryQuarterly", "cashflowStatements")
        }
    }
}

/// Every period of the statement, newest first as Yahoo returns it.
///
/// Line items are taken generically: any field whose value reduces to a number is kept.
pub(crate) async fn statement(
    client: &YahooProvider,
    symbol: &str,
    kind: StatementKind,
    frequency: Frequency,
) -> Result<Vec<StatementRow>, ProviderError> {
    let (module, array_key) = statement_module(kind, frequency);
    let mut root = quotesummary::fetch_result_value(client, symbol, module, "statement").await?;

    let periods = match root.get_mut(module).and_then(|m| m.get_mut(array_key)) {
        Some(Value::Array(v)) => std::mem::take(v),
        _ => return Ok(Vec::new()),
    };

    Ok(periods.into_iter().filter_map(statement_row).collect())
}

fn statement_row(period: Value) -> Option<StatementRow> {
    let Value::Object(fields) = period else {
        return None;
    };

    let mut period_end = None;
    let mut items = BTreeMap::new();
    for (name, value) in fields {
        let value = unwrap_raw(value);
        if name == "endDate" {
            period_end = value.as_i64().and_then(epoch_to_date);
        } else if name != "maxAge" {
            if let Some(n) = value.as_f64() {
                items.insert(name, n);
            }
        }
    }

    Some(StatementRow {
        period_end: period_end?,
        items,
    })
}

pub(crate) async fn earnings_history(
    client: &YahooProvider,
    symbol: &str,
) -> Result<Vec<EarningsRow>, ProviderError> {
    let root: V10Result =
        quotesummary::fetch_module_result(client, symbol, "earningsHistory", "earnings_history")
            .await?;

    let history = root
        .earnings_history
        .and_then(|h| h.history)
        .unwrap_or_default();

    Ok(history
        .into_iter()
        .map(|h| EarningsRow {
            quarter: from_raw_date(h.quarter),
            period: h.period,
            eps_actual: from_raw(h.eps_actual),
            eps_estimate: from_raw(h.eps_estimate),
            eps_difference: from_raw(h.eps_difference),
            surprise_percent: from_raw(h.surprise_percent),
        })
        .collect())
}
