//! Per-day sales totals

use chrono::NaiveDate;
use dokan_api::SaleRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals for one day of sales
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub sale_count: usize,
    pub items_sold: u64,
    pub total_income: f64,
    pub total_cost: f64,
    pub net_profit: f64,
}

impl DailySummary {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sale_count: 0,
            items_sold: 0,
            total_income: 0.0,
            total_cost: 0.0,
            net_profit: 0.0,
        }
    }

    fn add(&mut self, sale: &SaleRecord) {
        self.sale_count += 1;
        self.items_sold += u64::from(sale.quantity);
        self.total_income += sale.income();
        self.total_cost += sale.cost();
        self.net_profit = self.total_income - self.total_cost;
    }
}

/// One summary per date that has sales, newest first
pub fn summarize_by_date(sales: &[SaleRecord]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();
    for sale in sales {
        days.entry(sale.date)
            .or_insert_with(|| DailySummary::empty(sale.date))
            .add(sale);
    }
    days.into_values().rev().collect()
}

/// Totals for `date`; all zero when nothing was sold
pub fn summary_for(sales: &[SaleRecord], date: NaiveDate) -> DailySummary {
    let mut summary = DailySummary::empty(date);
    for sale in sales.iter().filter(|s| s.date == date) {
        summary.add(sale);
    }
    summary
}
