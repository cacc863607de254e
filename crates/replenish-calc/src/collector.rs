//! 候選收集
//!
//! 第一階段從資料來源讀取所有需要的事實；第二階段以 rayon 並行計算每個候選的
//! 估算值。第二階段是純計算，不再存取資料來源。

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use replenish_core::{
    CapacityMap, CollectFilter, CostRecord, FactSource, PlanningCandidate, PlanningConfig,
    SalesFact, StockSnapshot, Warehouse,
};

use crate::estimator::DemandEstimator;

/// 已讀取的單一候選原始資料
#[derive(Debug, Clone)]
struct CandidateInput {
    warehouse: Warehouse,
    article: String,
    snapshot: StockSnapshot,
    facts: Vec<SalesFact>,
    unit_cost: Decimal,
}

/// 候選收集器
pub struct CandidateCollector<'a> {
    config: &'a PlanningConfig,
}

impl<'a> CandidateCollector<'a> {
    /// 創建新的收集器
    pub fn new(config: &'a PlanningConfig) -> Self {
        Self { config }
    }

    /// 收集計劃候選
    ///
    /// 活躍的 SKU×倉庫 定義為在 `today` 有庫存快照者。輸出按 (SKU, 倉庫) 排序。
    pub fn collect<S: FactSource + ?Sized>(
        &self,
        source: &S,
        today: NaiveDate,
        filter: &CollectFilter,
        capacity: &CapacityMap,
    ) -> replenish_core::Result<Vec<PlanningCandidate>> {
        let window = self.config.window_days;

        // Phase 1: 讀取事實
        let warehouses: HashMap<String, Warehouse> = source
            .warehouses()?
            .into_iter()
            .filter(|w| filter.accepts(w))
            .map(|w| (w.id.clone(), w))
            .collect();

        let articles: HashMap<String, String> = source
            .skus()?
            .into_iter()
            .map(|s| (s.id, s.article))
            .collect();

        let snapshots = Self::latest_snapshots(source.stock_snapshots(today)?);
        tracing::debug!("快照 {} 筆，範圍內倉庫 {} 個", snapshots.len(), warehouses.len());

        let from = DemandEstimator::window_start(today, window);
        let mut inputs = Vec::new();
        let mut cost_cache: HashMap<String, Decimal> = HashMap::new();

        for snapshot in snapshots {
            let Some(warehouse) = warehouses.get(&snapshot.warehouse_id) else {
                continue;
            };

            let facts = source.sales_facts(&snapshot.sku_id, &warehouse.id, from, today)?;

            let unit_cost = match cost_cache.get(&snapshot.sku_id) {
                Some(&cost) => cost,
                None => {
                    let records = source.cost_records(&snapshot.sku_id)?;
                    let cost = CostRecord::current(&records, today)?;
                    cost_cache.insert(snapshot.sku_id.clone(), cost);
                    cost
                }
            };

            let article = articles
                .get(&snapshot.sku_id)
                .cloned()
                .unwrap_or_else(|| snapshot.sku_id.clone());

            inputs.push(CandidateInput {
                warehouse: warehouse.clone(),
                article,
                snapshot,
                facts,
                unit_cost,
            });
        }

        // Phase 2: 並行估算
        let candidates: Vec<PlanningCandidate> = inputs
            .par_iter()
            .map(|input| self.build_candidate(input, today, capacity))
            .collect();

        tracing::debug!("收集候選 {} 筆", candidates.len());
        Ok(candidates)
    }

    /// 每個 SKU×倉庫 只保留最新的快照，並按鍵排序
    fn latest_snapshots(snapshots: Vec<StockSnapshot>) -> Vec<StockSnapshot> {
        let mut latest: HashMap<(String, String), StockSnapshot> = HashMap::new();
        for snapshot in snapshots {
            let key = (snapshot.sku_id.clone(), snapshot.warehouse_id.clone());
            match latest.get(&key) {
                Some(existing) if existing.date >= snapshot.date => {}
                _ => {
                    latest.insert(key, snapshot);
                }
            }
        }

        let mut result: Vec<StockSnapshot> = latest.into_values().collect();
        result.sort_by(|a, b| {
            a.sku_id
                .cmp(&b.sku_id)
                .then_with(|| a.warehouse_id.cmp(&b.warehouse_id))
        });
        result
    }

    /// 由原始資料建構單一候選
    fn build_candidate(
        &self,
        input: &CandidateInput,
        today: NaiveDate,
        capacity: &CapacityMap,
    ) -> PlanningCandidate {
        let window = self.config.window_days;
        let sku_id = &input.snapshot.sku_id;

        let sv = DemandEstimator::rolling_sv(&input.facts, today, window);
        let stdev = DemandEstimator::demand_stdev(&input.facts, today, window);
        let forecast = DemandEstimator::forecast_qty(sv, window);
        let safety = DemandEstimator::safety_stock(self.config.safety_coefficient, window, stdev);

        let constraints =
            self.config
                .resolve_constraints(sku_id, &input.warehouse, capacity, input.unit_cost);

        PlanningCandidate::new(sku_id.clone(), input.warehouse.id.clone(), sv, window)
            .with_channel(input.warehouse.channel.clone())
            .with_article(input.article.clone())
            .with_warehouse_name(input.warehouse.name.clone())
            .with_stock(input.snapshot.on_hand, input.snapshot.in_transit)
            .with_forecast(forecast, safety)
            .with_constraints(constraints)
    }
}
