use crate::models::{Account, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::env;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar month bucket. Keeping the year makes the trailing window
/// correct across year boundaries.
pub type MonthBucket = (i32, u32);

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SourceSeries {
    pub name: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
}

/// Merchant-name substrings treated as income sources.
pub fn income_sources() -> Vec<String> {
    let raw = env::var("INCOME_SOURCES").unwrap_or_else(|_| "fiverr,KFC".to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Category labels counted as payroll deductions.
pub fn deduction_categories() -> Vec<String> {
    let raw = env::var("DEDUCTION_CATEGORIES").unwrap_or_else(|_| "Taxes,Insurance".to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The 12 calendar months ending with the current one, oldest first.
pub fn trailing_months(today: NaiveDate) -> Vec<MonthBucket> {
    let mut months = Vec::with_capacity(12);
    let mut year = today.year();
    let mut month = today.month();
    for _ in 0..12 {
        months.push((year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

pub fn month_label(bucket: MonthBucket) -> String {
    MONTH_NAMES[(bucket.1 - 1) as usize].to_string()
}

pub fn month_labels(months: &[MonthBucket]) -> Vec<String> {
    months.iter().map(|m| month_label(*m)).collect()
}

fn transaction_month(transaction: &Transaction) -> Option<MonthBucket> {
    let date = NaiveDate::parse_from_str(&transaction.date, "%Y-%m-%d").ok()?;
    Some((date.year(), date.month()))
}

/// Sum of `balances.current` over every account.
pub fn sum_current_balances(accounts: &[Account]) -> f64 {
    accounts
        .iter()
        .filter_map(|account| account.balances.current)
        .sum()
}

/// Sum of `balances.current` over accounts whose type or subtype matches.
pub fn sum_balances_by_kind(accounts: &[Account], kind: &str) -> f64 {
    accounts
        .iter()
        .filter(|account| {
            account.account_type.as_deref() == Some(kind)
                || account.subtype.as_deref() == Some(kind)
        })
        .filter_map(|account| account.balances.current)
        .sum()
}

/// Per-bucket amount sums for the transactions matching `filter`.
pub fn monthly_totals<F>(
    transactions: &[Transaction],
    months: &[MonthBucket],
    filter: F,
) -> Vec<f64>
where
    F: Fn(&Transaction) -> bool,
{
    months
        .iter()
        .map(|bucket| {
            transactions
                .iter()
                .filter(|t| filter(t))
                .filter(|t| transaction_month(t) == Some(*bucket))
                .map(|t| t.amount)
                .sum()
        })
        .collect()
}

pub fn matches_source(transaction: &Transaction, source: &str) -> bool {
    transaction
        .name
        .to_lowercase()
        .contains(&source.to_lowercase())
}

pub fn matches_any_category(transaction: &Transaction, categories: &[String]) -> bool {
    transaction
        .category
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|label| categories.iter().any(|c| label.eq_ignore_ascii_case(c)))
}

/// One monthly series per income source. The provider reports inflows as
/// negative amounts, so sums are negated to read as positive income.
pub fn income_series(
    transactions: &[Transaction],
    sources: &[String],
    months: &[MonthBucket],
) -> Vec<SourceSeries> {
    sources
        .iter()
        .map(|source| SourceSeries {
            name: source.clone(),
            data: monthly_totals(transactions, months, |t| matches_source(t, source))
                .into_iter()
                .map(|total| -total)
                .collect(),
        })
        .collect()
}

/// Combined monthly income across all sources, sign-normalized.
pub fn monthly_income(
    transactions: &[Transaction],
    sources: &[String],
    months: &[MonthBucket],
) -> Vec<f64> {
    monthly_totals(transactions, months, |t| {
        sources.iter().any(|source| matches_source(t, source))
    })
    .into_iter()
    .map(|total| -total)
    .collect()
}

/// Monthly totals of transactions in any deduction category. Outflows are
/// already positive in the provider's convention, so amounts are kept as-is.
pub fn monthly_deductions(
    transactions: &[Transaction],
    categories: &[String],
    months: &[MonthBucket],
) -> Vec<f64> {
    monthly_totals(transactions, months, |t| {
        matches_any_category(t, categories)
    })
}

/// Per-month income minus deductions.
pub fn net_pay(income: &[f64], deductions: &[f64]) -> Vec<f64> {
    income
        .iter()
        .zip(deductions.iter())
        .map(|(inc, ded)| inc - ded)
        .collect()
}

/// Spending per distinct top-level category: first category label of each
/// positive-amount transaction, summed and sorted by descending total.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for transaction in transactions {
        if transaction.amount <= 0.0 {
            continue;
        }
        let Some(first) = transaction
            .category
            .as_deref()
            .and_then(|labels| labels.first())
        else {
            continue;
        };
        *totals.entry(first.clone()).or_insert(0.0) += transaction.amount;
    }

    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, total)| CategoryTotal { name, total })
        .collect();
    categories.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountBalances;

    fn account(kind: &str, subtype: &str, current: f64) -> Account {
        Account {
            account_id: format!("{}-{}", kind, current),
            name: None,
            account_type: Some(kind.to_string()),
            subtype: Some(subtype.to_string()),
            balances: AccountBalances {
                current: Some(current),
                ..Default::default()
            },
            extra: Default::default(),
        }
    }

    fn transaction(name: &str, amount: f64, date: &str, categories: &[&str]) -> Transaction {
        Transaction {
            transaction_id: format!("{}-{}", name, date),
            account_id: "acc-1".to_string(),
            name: name.to_string(),
            amount,
            date: date.to_string(),
            category: if categories.is_empty() {
                None
            } else {
                Some(categories.iter().map(|c| c.to_string()).collect())
            },
            pending: false,
            extra: Default::default(),
        }
    }

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            transaction("fiverr deposit", -1200.0, "2026-07-03", &["Transfer", "Deposit"]),
            transaction("fiverr deposit", -800.0, "2026-08-01", &["Transfer", "Deposit"]),
            transaction("KFC paycheck", -2000.0, "2026-07-15", &[]),
            transaction("IRS", 450.0, "2026-07-20", &["Taxes", "Federal"]),
            transaction("Acme Insurance", 150.0, "2026-08-02", &["Insurance"]),
            transaction("United Airlines", 500.0, "2026-07-09", &["Travel", "Airlines"]),
            transaction("Uber", 23.5, "2026-08-05", &["Travel", "Ride Share"]),
            transaction("Refund", -40.0, "2026-07-11", &["Travel", "Airlines"]),
        ]
    }

    fn august_2026_window() -> Vec<MonthBucket> {
        trailing_months(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
    }

    #[test]
    fn test_trailing_months_crosses_year_boundary() {
        let months = trailing_months(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap());
        assert_eq!(months.len(), 12);
        assert_eq!(months.first(), Some(&(2025, 3)));
        assert_eq!(months.last(), Some(&(2026, 2)));
        assert_eq!(month_label((2025, 12)), "December");
    }

    #[test]
    fn test_sum_current_balances() {
        let accounts = vec![
            account("depository", "checking", 110.0),
            account("credit", "credit card", 410.0),
            account("depository", "savings", 210.0),
        ];
        assert!((sum_current_balances(&accounts) - 730.0).abs() < 1e-9);
        assert!((sum_balances_by_kind(&accounts, "credit") - 410.0).abs() < 1e-9);
        assert!((sum_balances_by_kind(&accounts, "savings") - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_filtered_balance_never_exceeds_total() {
        let accounts = vec![
            account("credit", "credit card", 50.0),
            account("depository", "checking", 75.0),
            account("credit", "credit card", 25.0),
        ];
        let total = sum_current_balances(&accounts);
        assert!(sum_balances_by_kind(&accounts, "credit") <= total);
        assert!(sum_balances_by_kind(&accounts, "savings") <= total);
    }

    #[test]
    fn test_income_is_sign_normalized_and_bucketed() {
        let months = august_2026_window();
        let sources = vec!["fiverr".to_string(), "KFC".to_string()];
        let series = income_series(&sample_transactions(), &sources, &months);

        assert_eq!(series.len(), 2);
        let fiverr = &series[0];
        // July is the second-to-last bucket, August the last.
        assert!((fiverr.data[10] - 1200.0).abs() < 1e-9);
        assert!((fiverr.data[11] - 800.0).abs() < 1e-9);
        assert!((series[1].data[10] - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_deductions_bucketed_by_category() {
        let months = august_2026_window();
        let categories = vec!["Taxes".to_string(), "Insurance".to_string()];
        let deductions = monthly_deductions(&sample_transactions(), &categories, &months);

        assert!((deductions[10] - 450.0).abs() < 1e-9);
        assert!((deductions[11] - 150.0).abs() < 1e-9);
        assert!(deductions[..10].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_net_pay_subtracts_per_month() {
        let months = august_2026_window();
        let sources = vec!["fiverr".to_string(), "KFC".to_string()];
        let categories = vec!["Taxes".to_string(), "Insurance".to_string()];
        let transactions = sample_transactions();

        let income = monthly_income(&transactions, &sources, &months);
        let deductions = monthly_deductions(&transactions, &categories, &months);
        let net = net_pay(&income, &deductions);

        assert!((net[10] - (3200.0 - 450.0)).abs() < 1e-9);
        assert!((net[11] - (800.0 - 150.0)).abs() < 1e-9);
    }

    #[test]
    fn test_expenses_take_first_category_and_positive_amounts_only() {
        let expenses = expenses_by_category(&sample_transactions());
        let travel = expenses.iter().find(|c| c.name == "Travel").unwrap();

        // The -40.0 refund is excluded; "Airlines" never appears as its own
        // category because only the first label counts.
        assert!((travel.total - 523.5).abs() < 1e-9);
        assert!(expenses.iter().all(|c| c.name != "Airlines"));
        assert!(expenses.iter().all(|c| c.name != "Federal"));

        // Sorted by descending total
        for window in expenses.windows(2) {
            assert!(window[0].total >= window[1].total);
        }
    }

    #[test]
    fn test_aggregations_are_order_independent() {
        let months = august_2026_window();
        let sources = vec!["fiverr".to_string(), "KFC".to_string()];
        let categories = vec!["Taxes".to_string(), "Insurance".to_string()];

        let transactions = sample_transactions();
        let mut reversed = transactions.clone();
        reversed.reverse();
        let mut rotated = transactions.clone();
        rotated.rotate_left(3);

        for permuted in [&reversed, &rotated] {
            assert_eq!(
                monthly_income(&transactions, &sources, &months),
                monthly_income(permuted, &sources, &months)
            );
            assert_eq!(
                monthly_deductions(&transactions, &categories, &months),
                monthly_deductions(permuted, &categories, &months)
            );
            let a = expenses_by_category(&transactions);
            let b = expenses_by_category(permuted);
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.name, y.name);
                assert!((x.total - y.total).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_unparseable_dates_are_ignored() {
        let months = august_2026_window();
        let transactions = vec![transaction("fiverr", -100.0, "not-a-date", &[])];
        let income = monthly_income(&transactions, &["fiverr".to_string()], &months);
        assert!(income.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_source_match_is_case_insensitive() {
        let t = transaction("FIVERR INTL", -10.0, "2026-08-01", &[]);
        assert!(matches_source(&t, "fiverr"));
        assert!(!matches_source(&t, "uber"));
    }
}
