//! Payment totals per currency and per month

use serde::Serialize;
use std::collections::BTreeMap;

use super::amount::{parse_amount, Currency};
use super::date::month_key;
use crate::sheet::{CellValue, RowObject};

pub const AMOUNT_COLUMN: &str = "MONTO";
pub const CURRENCY_COLUMN: &str = "MONEDA";
pub const DATE_COLUMN: &str = "FECHA_INGRESO";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CurrencyTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerCurrency<T> {
    #[serde(rename = "PEN")]
    pub pen: T,
    #[serde(rename = "USD")]
    pub usd: T,
}

impl<T> PerCurrency<T> {
    fn get_mut(&mut self, currency: Currency) -> &mut T {
        match currency {
            Currency::Pen => &mut self.pen,
            Currency::Usd => &mut self.usd,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub totals: PerCurrency<CurrencyTotals>,
    pub monthly: PerCurrency<Vec<MonthBucket>>,
    /// Rows whose date could not be read; counted in totals only
    pub unparsed_dates: usize,
}

/// Sum the payment log
///
/// Non-negative amounts are income, negative ones expense (as absolute
/// values). Months are sorted ascending.
pub fn summarize(rows: &[RowObject]) -> PaymentSummary {
    let mut totals = PerCurrency::<CurrencyTotals>::default();
    let mut months = PerCurrency::<BTreeMap<String, (f64, f64)>>::default();
    let mut unparsed_dates = 0;

    for row in rows {
        let field = |name: &str| row.get(name).cloned().unwrap_or(CellValue::Empty);
        let amount = parse_amount(&field(AMOUNT_COLUMN));
        let currency = Currency::from_cell(&field(CURRENCY_COLUMN));
        let month = month_key(&field(DATE_COLUMN));
        if month.is_none() {
            unparsed_dates += 1;
        }

        let total = totals.get_mut(currency);
        let bucket = month.map(|m| months.get_mut(currency).entry(m).or_insert((0.0, 0.0)));
        if amount >= 0.0 {
            total.income += amount;
            if let Some(bucket) = bucket {
                bucket.0 += amount;
            }
        } else {
            total.expense += amount.abs();
            if let Some(bucket) = bucket {
                bucket.1 += amount.abs();
            }
        }
    }

    for t in [&mut totals.pen, &mut totals.usd] {
        t.balance = t.income - t.expense;
    }

    let buckets = |map: BTreeMap<String, (f64, f64)>| {
        map.into_iter()
            .map(|(month, (income, expense))| MonthBucket {
                month,
                income,
                expense,
            })
            .collect()
    };

    PaymentSummary {
        totals,
        monthly: PerCurrency {
            pen: buckets(months.pen),
            usd: buckets(months.usd),
        },
        unparsed_dates,
    }
}
