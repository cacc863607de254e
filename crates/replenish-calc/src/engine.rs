//! 補貨計劃主流程

use chrono::NaiveDate;
use replenish_core::{
    CapacityMap, CollectFilter, FactSource, PlanKey, PlanLineRecord, PlanRepository,
    PlanningCandidate, PlanningConfig, UpsertOutcome,
};

use crate::collector::CandidateCollector;
use crate::explain::PlanLineSummary;
use crate::planner::{HeuristicPlanner, PlanOutcome};
use crate::{PlanResult, PlanWarning};

/// 持久化摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// 收集結果
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    pub candidates: Vec<PlanningCandidate>,
    /// 收集階段的警告（目前只有產能表格式錯誤）
    pub warnings: Vec<PlanWarning>,
}

/// 補貨計劃引擎
///
/// 每次運行各自建立候選清單與預算累計器，不同運行之間沒有共用狀態。
pub struct ReplenishmentEngine {
    config: PlanningConfig,
}

impl ReplenishmentEngine {
    /// 創建新的引擎
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }

    /// 獲取配置引用
    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// 主計劃入口：收集 → 分配 → 解釋
    pub fn run<S: FactSource + ?Sized>(
        &self,
        source: &S,
        today: NaiveDate,
        filter: &CollectFilter,
    ) -> replenish_core::Result<PlanResult> {
        tracing::info!("開始補貨計劃：日期 {}，範圍 {:?}", today, filter);
        let start_time = std::time::Instant::now();

        let mut result = PlanResult::empty(today);

        // Step 1: 解析產能表並收集候選（唯一存取資料來源的步驟）
        tracing::debug!("Step 1: 收集候選");
        let collected = self.collect(source, today, filter)?;
        for warning in collected.warnings {
            result.add_warning(warning);
        }
        let candidates = collected.candidates;

        // Step 2: 啟發式分配
        tracing::debug!("Step 2: 分配預算");
        let outcome = self.plan(candidates);

        // Step 3: 可解釋性
        tracing::debug!("Step 3: 產生說明與指紋");
        result.lines = outcome.lines.iter().map(PlanLineSummary::from_line).collect();
        result.budget_used = outcome.budget.used();
        result.budget_limit = outcome.budget.limit();
        result.budget_utilization = outcome.budget.utilization();
        result.candidates_considered = outcome.candidates_considered;
        result.warnings.extend(outcome.warnings);
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("補貨計劃完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "候選 {} 筆，計劃行 {} 筆，預算使用 {}",
            result.candidates_considered,
            result.lines.len(),
            result.budget_used
        );

        Ok(result)
    }

    /// 收集計劃候選；產能表格式錯誤時以不限產能收集並附上警告
    pub fn collect<S: FactSource + ?Sized>(
        &self,
        source: &S,
        today: NaiveDate,
        filter: &CollectFilter,
    ) -> replenish_core::Result<CollectOutcome> {
        let (capacity, capacity_warning) = self.capacity();
        let candidates =
            CandidateCollector::new(&self.config).collect(source, today, filter, &capacity)?;

        Ok(CollectOutcome {
            candidates,
            warnings: capacity_warning.into_iter().collect(),
        })
    }

    /// 對已收集的候選執行分配（純計算）
    pub fn plan(&self, candidates: Vec<PlanningCandidate>) -> PlanOutcome {
        HeuristicPlanner::new(self.config.budget_limit).plan(candidates)
    }

    /// 將計劃行 upsert 到儲存庫
    pub fn persist<R: PlanRepository + ?Sized>(
        &self,
        result: &PlanResult,
        repository: &mut R,
        tenant: Option<&str>,
    ) -> replenish_core::Result<PersistSummary> {
        let mut summary = PersistSummary::default();

        for line in &result.lines {
            let key = PlanKey {
                date: result.plan_date,
                sku_id: line.sku_id.clone(),
                warehouse_id: line.warehouse_id.clone(),
                tenant: tenant.map(str::to_string),
            };
            let record = PlanLineRecord::new(key, line.recommended_qty, line.rationale_hash.clone());

            match repository.upsert_plan_line(record)? {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
            }
        }

        tracing::info!(
            "計劃行持久化完成：新增 {}，覆寫 {}",
            summary.inserted,
            summary.updated
        );
        Ok(summary)
    }

    /// 解析產能表；格式錯誤時回傳不限產能與一則警告
    fn capacity(&self) -> (CapacityMap, Option<PlanWarning>) {
        let Some(raw) = self.config.capacity_map.as_deref() else {
            return (CapacityMap::default(), None);
        };

        match CapacityMap::try_parse(raw) {
            Ok(map) => (map, None),
            Err(e) => {
                tracing::warn!("{}，所有倉庫視為不限產能", e);
                let warning = PlanWarning::warning("capacity_map".to_string(), e.to_string());
                (CapacityMap::default(), Some(warning))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replenish_core::{
        Constraints, CostRecord, ReplenishError, Result, SalesFact, Sku, StockSnapshot, Warehouse,
    };
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    /// 測試用儲存庫
    #[derive(Default)]
    struct MapRepository {
        rows: BTreeMap<PlanKey, PlanLineRecord>,
    }

    impl PlanRepository for MapRepository {
        fn upsert_plan_line(&mut self, record: PlanLineRecord) -> Result<UpsertOutcome> {
            match self.rows.insert(record.key.clone(), record) {
                Some(_) => Ok(UpsertOutcome::Updated),
                None => Ok(UpsertOutcome::Inserted),
            }
        }
    }

    struct FailingRepository;

    /// 沒有任何資料的來源
    struct EmptySource;

    impl FactSource for EmptySource {
        fn warehouses(&self) -> Result<Vec<Warehouse>> {
            Ok(Vec::new())
        }

        fn skus(&self) -> Result<Vec<Sku>> {
            Ok(Vec::new())
        }

        fn stock_snapshots(&self, _date: NaiveDate) -> Result<Vec<StockSnapshot>> {
            Ok(Vec::new())
        }

        fn sales_facts(
            &self,
            _sku_id: &str,
            _warehouse_id: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<SalesFact>> {
            Ok(Vec::new())
        }

        fn cost_records(&self, _sku_id: &str) -> Result<Vec<CostRecord>> {
            Ok(Vec::new())
        }
    }

    impl PlanRepository for FailingRepository {
        fn upsert_plan_line(&mut self, _record: PlanLineRecord) -> Result<UpsertOutcome> {
            Err(ReplenishError::StoreUnavailable("write refused".to_string()))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn result_with_line(qty: u64) -> PlanResult {
        let candidate = PlanningCandidate::new("SKU-001".to_string(), "WH-01".to_string(), 2.0, 14)
            .with_channel("wb")
            .with_forecast(28, 5)
            .with_constraints(Constraints::default().with_unit_cost(Decimal::from(100)));
        let line = replenish_core::SupplyPlanLine::new(candidate, qty);

        let mut result = PlanResult::empty(day(14));
        result.lines.push(PlanLineSummary::from_line(&line));
        result
    }

    #[test]
    fn test_plan_uses_configured_budget() {
        let engine = ReplenishmentEngine::new(
            PlanningConfig::new().with_budget_limit(Decimal::from(1000)),
        );
        let candidate = PlanningCandidate::new("SKU-001".to_string(), "WH-01".to_string(), 2.0, 14)
            .with_forecast(100, 0)
            .with_constraints(Constraints::default().with_unit_cost(Decimal::from(100)));

        let outcome = engine.plan(vec![candidate]);

        assert_eq!(outcome.lines[0].recommended_qty, 10);
        assert_eq!(outcome.budget.used(), Decimal::from(1000));
    }

    #[test]
    fn test_capacity_warning_on_malformed_map() {
        let engine = ReplenishmentEngine::new(PlanningConfig::new().with_capacity_map("{broken"));
        let (map, warning) = engine.capacity();

        assert!(map.is_empty());
        let warning = warning.unwrap();
        assert_eq!(warning.subject, "capacity_map");
        assert_eq!(warning.severity, crate::WarningSeverity::Warning);
    }

    #[test]
    fn test_collect_reports_capacity_warning() {
        let engine = ReplenishmentEngine::new(PlanningConfig::new().with_capacity_map("{broken"));
        let collected = engine.collect(&EmptySource, day(14), &CollectFilter::all()).unwrap();

        assert!(collected.candidates.is_empty());
        assert_eq!(collected.warnings.len(), 1);
        assert_eq!(collected.warnings[0].subject, "capacity_map");

        let result = engine.run(&EmptySource, day(14), &CollectFilter::all()).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_collect_without_capacity_map_has_no_warning() {
        let engine = ReplenishmentEngine::new(PlanningConfig::new());
        let collected = engine.collect(&EmptySource, day(14), &CollectFilter::all()).unwrap();

        assert!(collected.warnings.is_empty());
    }

    #[test]
    fn test_persist_upserts_by_key() {
        let engine = ReplenishmentEngine::new(PlanningConfig::new());
        let mut repository = MapRepository::default();

        let first = engine
            .persist(&result_with_line(13), &mut repository, Some("tenant-a"))
            .unwrap();
        assert_eq!(first, PersistSummary { inserted: 1, updated: 0 });

        // 同一鍵重跑：覆寫而不是追加
        let second = engine
            .persist(&result_with_line(20), &mut repository, Some("tenant-a"))
            .unwrap();
        assert_eq!(second, PersistSummary { inserted: 0, updated: 1 });
        assert_eq!(repository.rows.len(), 1);
        assert_eq!(repository.rows.values().next().unwrap().recommended_qty, 20);

        // 不同租戶是不同的鍵
        let third = engine
            .persist(&result_with_line(20), &mut repository, Some("tenant-b"))
            .unwrap();
        assert_eq!(third.inserted, 1);
        assert_eq!(repository.rows.len(), 2);
    }

    #[test]
    fn test_persist_propagates_failure() {
        let engine = ReplenishmentEngine::new(PlanningConfig::new());
        let result = engine.persist(&result_with_line(13), &mut FailingRepository, None);

        assert!(matches!(result, Err(ReplenishError::StoreUnavailable(_))));
    }
}
