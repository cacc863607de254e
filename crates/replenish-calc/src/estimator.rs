//! 需求估算
//!
//! 從每日銷售事實計算銷售速度、需求波動、預測量與庫存可覆蓋天數。
//! 全部是純函式，資料稀疏時回傳 0 而不是錯誤。

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use replenish_core::SalesFact;

/// 需求估算器
pub struct DemandEstimator;

impl DemandEstimator {
    /// 滾動視窗起始日（含 `today` 在內往前共 `window` 天）
    pub fn window_start(today: NaiveDate, window: u32) -> NaiveDate {
        let span = u64::from(window.saturating_sub(1));
        today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN)
    }

    /// 將視窗內的銷售事實按日加總（同日重複記錄合併）
    fn daily_totals(facts: &[SalesFact], today: NaiveDate, window: u32) -> BTreeMap<NaiveDate, u64> {
        let mut totals = BTreeMap::new();
        if window == 0 {
            return totals;
        }

        let start = Self::window_start(today, window);
        for fact in facts.iter().filter(|f| f.within(start, today)) {
            *totals.entry(fact.date).or_insert(0u64) += fact.quantity;
        }
        totals
    }

    /// 滾動銷售速度：視窗內總銷量 ÷ 視窗天數
    pub fn rolling_sv(facts: &[SalesFact], today: NaiveDate, window: u32) -> f64 {
        if window == 0 {
            return 0.0;
        }

        let total: u64 = Self::daily_totals(facts, today, window).values().sum();
        total as f64 / f64::from(window)
    }

    /// 需求樣本標準差（除以 n − 1）
    ///
    /// 只計算有銷售記錄的日子；少於 2 天時回傳 0。
    pub fn demand_stdev(facts: &[SalesFact], today: NaiveDate, window: u32) -> f64 {
        let totals = Self::daily_totals(facts, today, window);
        if totals.len() < 2 {
            return 0.0;
        }

        let values: Vec<f64> = totals.values().map(|&q| q as f64).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / (n - 1.0);

        variance.sqrt()
    }

    /// 預測量：ceil(sv × window)，sv ≤ 0 時為 0
    pub fn forecast_qty(sv: f64, window: u32) -> u64 {
        if !(sv > 0.0) {
            return 0;
        }
        (sv * f64::from(window)).ceil() as u64
    }

    /// 安全庫存：ceil(k × sqrt(window) × stdev)
    pub fn safety_stock(safety_coefficient: f64, window: u32, stdev: f64) -> u64 {
        let raw = safety_coefficient * f64::from(window).sqrt() * stdev;
        if !(raw > 0.0) || !raw.is_finite() {
            return 0;
        }
        raw.ceil() as u64
    }

    /// 庫存可覆蓋天數：(現有 + 在途) ÷ sv
    ///
    /// sv ≤ 0 時：有庫存為 +∞（最不緊急），零庫存為 0。
    pub fn stock_cover_days(on_hand: u64, in_transit: u64, sv: f64) -> f64 {
        let stock = on_hand.saturating_add(in_transit);
        if !(sv > 0.0) {
            return if stock > 0 { f64::INFINITY } else { 0.0 };
        }
        stock as f64 / sv
    }
}
