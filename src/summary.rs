use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use prospera_advice::{CategoryTotal, FinancialSnapshot, HistoryPoint};

use crate::model::{Transaction, TxnKind};
use crate::store::MemoryStore;

const TOP_CATEGORIES: usize = 3;
const HISTORY_MONTHS: u32 = 6;

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn in_month(tx: &Transaction, start: NaiveDate) -> bool {
    tx.day().map_or(false, |d| month_start(d) == start)
}

fn total(txns: &[Transaction], start: NaiveDate, kind: TxnKind) -> f64 {
    txns.iter()
        .filter(|t| t.kind == kind && in_month(t, start))
        .map(|t| t.amount)
        .sum()
}

fn growth(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }

    (current - previous) / previous * 100.0
}

fn top_categories(txns: &[Transaction], start: NaiveDate) -> Vec<CategoryTotal> {
    let mut by_name: HashMap<&str, f64> = HashMap::new();
    for tx in txns
        .iter()
        .filter(|t| t.kind == TxnKind::Expense && in_month(t, start))
    {
        *by_name.entry(tx.category.as_str()).or_default() += tx.amount;
    }

    let mut totals: Vec<CategoryTotal> = by_name
        .into_iter()
        .map(|(name, amount)| CategoryTotal {
            name: name.to_string(),
            amount,
        })
        .collect();
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    totals.truncate(TOP_CATEGORIES);
    totals
}

/// Month-end balances, oldest first, walking back from the current balance.
fn history(txns: &[Transaction], balance: f64, current: NaiveDate) -> Vec<HistoryPoint> {
    let mut points = vec![];
    for back in (0..HISTORY_MONTHS).rev() {
        let Some(start) = current.checked_sub_months(Months::new(back)) else {
            continue;
        };
        let Some(end) = start.checked_add_months(Months::new(1)) else {
            continue;
        };

        let later: f64 = txns
            .iter()
            .filter(|t| t.day().map_or(false, |d| d >= end))
            .map(Transaction::signed_amount)
            .sum();

        points.push(HistoryPoint {
            label: start.format("%Y-%m").to_string(),
            balance: balance - later,
        });
    }

    points
}

/// Dashboard figures for the month containing `today`.
pub fn overview(store: &MemoryStore, today: NaiveDate) -> FinancialSnapshot {
    let txns = store.txns().records();
    let current = month_start(today);
    let previous = current
        .checked_sub_months(Months::new(1))
        .unwrap_or(current);

    let balance: f64 = store.accounts().records().iter().map(|a| a.balance).sum();
    let income = total(txns, current, TxnKind::Income);
    let expense = total(txns, current, TxnKind::Expense);

    FinancialSnapshot {
        balance,
        income,
        expense,
        income_growth: growth(income, total(txns, previous, TxnKind::Income)),
        expense_growth: growth(expense, total(txns, previous, TxnKind::Expense)),
        top_categories: top_categories(txns, current),
        history: history(txns, balance, current),
    }
}
