//! 啟發式補貨分配
//!
//! 單向貪婪分配：候選依緊急程度排序後逐一計算需求、套用批量規則，
//! 並從共用預算中扣除。已承諾的預算不會回溯調整。

use std::cmp::Ordering;

use replenish_core::{Constraints, PlanningCandidate, SupplyPlanLine};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::estimator::DemandEstimator;
use crate::rounding::{ceil_to_multiplicity, floor_to_multiplicity};
use crate::{subject_of, PlanWarning};

/// 單次運行的預算累計器
///
/// `used` 只增不減，且在有上限時永不超過 `limit`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetAccumulator {
    limit: Decimal,
    used: Decimal,
}

impl BudgetAccumulator {
    /// `limit` ≤ 0 表示不限
    pub fn new(limit: Decimal) -> Self {
        Self {
            limit,
            used: Decimal::ZERO,
        }
    }

    pub fn is_limited(&self) -> bool {
        self.limit > Decimal::ZERO
    }

    pub fn used(&self) -> Decimal {
        self.used
    }

    pub fn limit(&self) -> Decimal {
        self.limit
    }

    pub fn remaining(&self) -> Decimal {
        (self.limit - self.used).max(Decimal::ZERO)
    }

    /// 加上 `cost` 後是否超出上限
    pub fn would_exceed(&self, cost: Decimal) -> bool {
        self.is_limited()
            && self
                .used
                .checked_add(cost)
                .map_or(true, |total| total > self.limit)
    }

    /// 剩餘預算可負擔的數量：floor(剩餘 ÷ 單位成本)
    ///
    /// 單位成本 ≤ 0 時為 0。
    pub fn affordable_qty(&self, unit_cost: Decimal) -> u64 {
        if unit_cost <= Decimal::ZERO {
            return 0;
        }
        match self.remaining().checked_div(unit_cost) {
            Some(ratio) => ratio.floor().to_u64().unwrap_or(u64::MAX),
            None => u64::MAX,
        }
    }

    /// 承諾花費（只在有上限時累計，非正數忽略）
    pub fn commit(&mut self, cost: Decimal) {
        if self.is_limited() && cost > Decimal::ZERO {
            self.used = self.used.checked_add(cost).unwrap_or(Decimal::MAX);
        }
    }

    /// 預算使用比例；不限預算時為 None
    pub fn utilization(&self) -> Option<f64> {
        if !self.is_limited() {
            return None;
        }
        (self.used / self.limit).to_f64()
    }
}

/// 分配結果
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// 計劃行（保持優先順序）
    pub lines: Vec<SupplyPlanLine>,

    /// 預算狀態
    pub budget: BudgetAccumulator,

    /// 參與排序的候選數量
    pub candidates_considered: usize,

    /// 分配過程中的警告
    pub warnings: Vec<PlanWarning>,
}

impl PlanOutcome {
    /// 所有計劃行的總花費
    pub fn total_cost(&self) -> Decimal {
        self.lines.iter().fold(Decimal::ZERO, |acc, l| {
            acc.checked_add(l.cost).unwrap_or(Decimal::MAX)
        })
    }
}

/// 單一候選的分配決策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Allocation {
    /// 沒有補貨需求
    NoNeed,
    /// 每槽上限低於最小批量
    BelowMinBatch { capped: u64 },
    /// 預算不足以下最小批量
    Unaffordable { affordable: u64 },
    /// 下單
    Order { qty: u64, budget_constrained: bool },
}

/// 啟發式計劃器
pub struct HeuristicPlanner {
    budget_limit: Decimal,
}

impl HeuristicPlanner {
    /// 創建新的計劃器（`budget_limit` ≤ 0 表示不限）
    pub fn new(budget_limit: Decimal) -> Self {
        Self { budget_limit }
    }

    /// 執行單次分配
    pub fn plan(&self, candidates: Vec<PlanningCandidate>) -> PlanOutcome {
        let candidates_considered = candidates.len();
        let ordered = Self::prioritize(candidates);

        let mut budget = BudgetAccumulator::new(self.budget_limit);
        let mut lines = Vec::new();
        let mut warnings = Vec::new();

        for candidate in ordered {
            let subject = subject_of(&candidate.sku_id, &candidate.warehouse_id);

            match Self::allocate(&candidate, &budget) {
                Allocation::NoNeed => {
                    tracing::debug!("{} 無補貨需求，略過", subject);
                }
                Allocation::BelowMinBatch { capped } => {
                    tracing::debug!("{} 上限後數量 {} 低於最小批量，略過", subject, capped);
                    warnings.push(PlanWarning::warning(
                        subject,
                        format!(
                            "每槽上限後數量 {} 低於最小批量 {}",
                            capped, candidate.constraints.min_batch
                        ),
                    ));
                }
                Allocation::Unaffordable { affordable } => {
                    tracing::debug!("{} 預算不足（可負擔 {}），略過", subject, affordable);
                    let message = if candidate.constraints.unit_cost <= Decimal::ZERO {
                        "單位成本為 0，預算限制下視為無法負擔".to_string()
                    } else {
                        format!(
                            "剩餘預算 {} 只能負擔 {} 件，低於最小批量 {}",
                            budget.remaining(),
                            affordable,
                            candidate.constraints.min_batch
                        )
                    };
                    warnings.push(PlanWarning::info(subject, message));
                }
                Allocation::Order {
                    qty,
                    budget_constrained,
                } => {
                    let mut line = SupplyPlanLine::new(candidate, qty);
                    if budget_constrained {
                        line = line.as_budget_constrained();
                    }
                    budget.commit(line.cost);

                    tracing::debug!(
                        "{} 建議補貨 {}（花費 {}，累計 {}）",
                        subject,
                        qty,
                        line.cost,
                        budget.used()
                    );
                    lines.push(line);
                }
            }
        }

        PlanOutcome {
            lines,
            budget,
            candidates_considered,
            warnings,
        }
    }

    /// 依緊急程度排序
    ///
    /// 覆蓋天數升序，同覆蓋天數時銷售速度降序，最後以 (SKU, 倉庫) 保證結果穩定。
    pub fn prioritize(candidates: Vec<PlanningCandidate>) -> Vec<PlanningCandidate> {
        let mut keyed: Vec<(f64, PlanningCandidate)> = candidates
            .into_iter()
            .map(|c| {
                let cover = DemandEstimator::stock_cover_days(c.on_hand, c.in_transit, c.sv);
                (cover, c)
            })
            .collect();

        keyed.sort_by(|(cover_a, a), (cover_b, b)| Self::compare(*cover_a, a, *cover_b, b));
        keyed.into_iter().map(|(_, c)| c).collect()
    }

    fn compare(
        cover_a: f64,
        a: &PlanningCandidate,
        cover_b: f64,
        b: &PlanningCandidate,
    ) -> Ordering {
        cover_a
            .total_cmp(&cover_b)
            .then_with(|| b.sv.total_cmp(&a.sv))
            .then_with(|| a.sku_id.cmp(&b.sku_id))
            .then_with(|| a.warehouse_id.cmp(&b.warehouse_id))
    }

    /// 套用批量規則：最小批量 → 向上取整倍數 → 每槽上限
    pub fn size_order(need: u64, constraints: &Constraints) -> u64 {
        let floored = need.max(constraints.min_batch);
        let rounded = ceil_to_multiplicity(floored, constraints.multiplicity);
        match constraints.max_per_slot {
            Some(cap) => rounded.min(cap),
            None => rounded,
        }
    }

    /// 單一候選的分配決策（不修改預算）
    fn allocate(candidate: &PlanningCandidate, budget: &BudgetAccumulator) -> Allocation {
        let need = candidate.need();
        if need == 0 {
            return Allocation::NoNeed;
        }

        let constraints = &candidate.constraints;
        let qty = Self::size_order(need, constraints);
        if qty < constraints.min_batch {
            return Allocation::BelowMinBatch { capped: qty };
        }

        let within_budget = match SupplyPlanLine::cost_of(qty, constraints.unit_cost) {
            Some(cost) => !budget.would_exceed(cost),
            None => !budget.is_limited(),
        };
        if within_budget {
            return Self::order_or_skip(qty, false);
        }

        // 預算不足：縮減到可負擔數量，向下取整倍數，不足最小批量則放棄
        let affordable = budget.affordable_qty(constraints.unit_cost);
        let reduced = floor_to_multiplicity(qty.min(affordable), constraints.multiplicity);
        if reduced < constraints.min_batch {
            return Allocation::Unaffordable { affordable };
        }

        match Self::order_or_skip(reduced, true) {
            Allocation::NoNeed => Allocation::Unaffordable { affordable },
            allocation => allocation,
        }
    }

    fn order_or_skip(qty: u64, budget_constrained: bool) -> Allocation {
        if qty == 0 {
            return Allocation::NoNeed;
        }
        Allocation::Order {
            qty,
            budget_constrained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn candidate(sku: &str, sv: f64, on_hand: u64, in_transit: u64, forecast: u64, safety: u64) -> PlanningCandidate {
        PlanningCandidate::new(sku.to_string(), "WH-01".to_string(), sv, 14)
            .with_channel("wb")
            .with_stock(on_hand, in_transit)
            .with_forecast(forecast, safety)
    }

    fn constraints(min_batch: u64, multiplicity: u64, max_per_slot: u64, unit_cost: i64) -> Constraints {
        Constraints::default()
            .with_min_batch(min_batch)
            .with_multiplicity(multiplicity)
            .with_max_per_slot(max_per_slot)
            .with_unit_cost(Decimal::from(unit_cost))
    }

    #[rstest]
    // A：need = 28 + 5 − 20 = 13
    #[case::scenario_a(20, 0, 28, 5, 1, 500, Some(13))]
    // B：倍數 10，13 → 20
    #[case::scenario_b(20, 0, 28, 5, 10, 500, Some(20))]
    // C：need = 800，上限 200
    #[case::scenario_c(0, 0, 700, 100, 1, 200, Some(200))]
    // D：need = 33 − 60 < 0
    #[case::scenario_d(50, 10, 28, 5, 1, 500, None)]
    fn test_scenarios_without_budget(
        #[case] on_hand: u64,
        #[case] in_transit: u64,
        #[case] forecast: u64,
        #[case] safety: u64,
        #[case] multiplicity: u64,
        #[case] max_per_slot: u64,
        #[case] expected: Option<u64>,
    ) {
        let c = candidate("SKU-001", 2.0, on_hand, in_transit, forecast, safety)
            .with_constraints(constraints(10, multiplicity, max_per_slot, 100));

        let outcome = HeuristicPlanner::new(Decimal::ZERO).plan(vec![c]);

        assert_eq!(outcome.lines.first().map(|l| l.recommended_qty), expected);
        assert_eq!(outcome.budget.used(), Decimal::ZERO);
        assert_eq!(outcome.budget.utilization(), None);
    }

    #[test]
    fn test_scenario_e_budget_binding() {
        let first = candidate("SKU-001", 10.0, 0, 0, 100, 0)
            .with_constraints(constraints(10, 10, 500, 100));
        let second = candidate("SKU-002", 5.0, 0, 0, 100, 0)
            .with_constraints(constraints(10, 10, 500, 100));

        // 輸入順序不影響優先順序
        let outcome = HeuristicPlanner::new(Decimal::from(15000)).plan(vec![second, first]);

        assert_eq!(outcome.lines.len(), 2);
        assert_eq!(outcome.lines[0].sku_id(), "SKU-001");
        assert_eq!(outcome.lines[0].recommended_qty, 100);
        assert!(!outcome.lines[0].budget_constrained);
        assert_eq!(outcome.lines[1].sku_id(), "SKU-002");
        assert_eq!(outcome.lines[1].recommended_qty, 50);
        assert!(outcome.lines[1].budget_constrained);
        assert_eq!(outcome.budget.used(), Decimal::from(15000));
        assert_eq!(outcome.budget.utilization(), Some(1.0));
    }

    #[test]
    fn test_budget_reduction_rounds_down_to_multiple() {
        let first = candidate("SKU-001", 10.0, 0, 0, 100, 0)
            .with_constraints(constraints(10, 1, 500, 100));
        let second = candidate("SKU-002", 5.0, 0, 0, 100, 0)
            .with_constraints(constraints(10, 20, 500, 100));

        // 剩餘 5700 → 可負擔 57 → 向下取整 40
        let outcome = HeuristicPlanner::new(Decimal::from(15700)).plan(vec![first, second]);

        assert_eq!(outcome.lines[1].recommended_qty, 40);
        assert_eq!(outcome.budget.used(), Decimal::from(14000));
    }

    #[test]
    fn test_budget_too_small_for_min_batch() {
        let c = candidate("SKU-001", 2.0, 0, 0, 100, 0)
            .with_constraints(constraints(10, 1, 500, 100));

        let outcome = HeuristicPlanner::new(Decimal::from(900)).plan(vec![c]);

        assert!(outcome.lines.is_empty());
        assert_eq!(outcome.budget.used(), Decimal::ZERO);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_later_candidate_fits_remaining_budget() {
        // 第二個放不下，但第三個便宜的仍可使用剩餘預算
        let first = candidate("SKU-001", 10.0, 0, 0, 80, 0)
            .with_constraints(constraints(10, 1, 500, 100));
        let second = candidate("SKU-002", 5.0, 0, 0, 100, 0)
            .with_constraints(constraints(50, 1, 500, 100));
        let third = candidate("SKU-003", 1.0, 0, 0, 20, 0)
            .with_constraints(constraints(5, 1, 500, 10));

        let outcome = HeuristicPlanner::new(Decimal::from(10000)).plan(vec![first, second, third]);

        let skus: Vec<&str> = outcome.lines.iter().map(|l| l.sku_id()).collect();
        assert_eq!(skus, vec!["SKU-001", "SKU-003"]);
        assert_eq!(outcome.lines[1].recommended_qty, 20);
        assert_eq!(outcome.budget.used(), Decimal::from(8200));
    }

    #[test]
    fn test_cap_below_min_batch_is_dropped() {
        let c = candidate("SKU-001", 2.0, 0, 0, 100, 0)
            .with_constraints(constraints(50, 1, 30, 100));

        let outcome = HeuristicPlanner::new(Decimal::ZERO).plan(vec![c]);

        assert!(outcome.lines.is_empty());
        assert_eq!(outcome.warnings[0].severity, crate::WarningSeverity::Warning);
    }

    #[test]
    fn test_zero_cost_item_under_budget() {
        // 預算已用完時，零成本商品仍不會觸發預算分支（花費為 0 不超出）
        let c = candidate("SKU-001", 2.0, 0, 0, 30, 0)
            .with_constraints(constraints(0, 1, 500, 0));
        let outcome = HeuristicPlanner::new(Decimal::from(100)).plan(vec![c]);
        assert_eq!(outcome.lines[0].recommended_qty, 30);

        // 直接檢查可負擔數量：零成本視為 0
        let budget = BudgetAccumulator::new(Decimal::from(100));
        assert_eq!(budget.affordable_qty(Decimal::ZERO), 0);
        assert_eq!(budget.affordable_qty(Decimal::from(30)), 3);
    }

    #[test]
    fn test_negative_cost_does_not_refund_budget() {
        // 覆蓋天數 0，優先
        let refund = candidate("SKU-A", 1.0, 0, 0, 10, 0)
            .with_constraints(constraints(0, 1, 500, -100));
        // need = 20，覆蓋天數 5
        let regular = candidate("SKU-B", 1.0, 5, 0, 25, 0)
            .with_constraints(constraints(0, 1, 500, 100));

        let limit = Decimal::from(1000);
        let outcome = HeuristicPlanner::new(limit).plan(vec![regular, refund]);

        let lines: Vec<(&str, u64)> = outcome
            .lines
            .iter()
            .map(|l| (l.sku_id(), l.recommended_qty))
            .collect();
        assert_eq!(lines, vec![("SKU-A", 10), ("SKU-B", 10)]);
        assert_eq!(outcome.lines[0].cost, Decimal::ZERO);
        assert!(outcome.lines[1].budget_constrained);
        assert_eq!(outcome.budget.used(), limit);
        assert!(outcome.total_cost() <= limit);
    }

    #[test]
    fn test_overflowing_cost_is_treated_as_over_budget() {
        let c = candidate("SKU-001", 1.0, 0, 0, u64::MAX, 0).with_constraints(
            Constraints::default().with_unit_cost(Decimal::MAX),
        );

        let outcome = HeuristicPlanner::new(Decimal::from(1000)).plan(vec![c]);

        // 可負擔 floor(1000 / MAX) = 0，不下單也不 panic
        assert!(outcome.lines.is_empty());
        assert_eq!(outcome.budget.used(), Decimal::ZERO);

        let mut budget = BudgetAccumulator::new(Decimal::from(1000));
        assert!(budget.would_exceed(Decimal::MAX));
        budget.commit(Decimal::from(-500));
        assert_eq!(budget.used(), Decimal::ZERO);
    }

    #[test]
    fn test_min_batch_floor_applies() {
        let c = candidate("SKU-001", 2.0, 20, 0, 22, 0)
            .with_constraints(constraints(10, 1, 500, 100));

        let outcome = HeuristicPlanner::new(Decimal::ZERO).plan(vec![c]);

        // need = 2，提升到最小批量 10
        assert_eq!(outcome.lines[0].recommended_qty, 10);
    }

    #[test]
    fn test_prioritize_order() {
        let stocked = candidate("SKU-A", 1.0, 100, 0, 0, 0); // 100 天
        let urgent = candidate("SKU-B", 2.0, 10, 0, 0, 0); // 5 天
        let dormant = candidate("SKU-C", 0.0, 5, 0, 0, 0); // +∞
        let empty = candidate("SKU-D", 0.0, 0, 0, 0, 0); // 0
        let fast_out = candidate("SKU-E", 9.0, 0, 0, 0, 0); // 0，速度較高

        let ordered = HeuristicPlanner::prioritize(vec![stocked, urgent, dormant, empty, fast_out]);
        let skus: Vec<&str> = ordered.iter().map(|c| c.sku_id.as_str()).collect();

        assert_eq!(skus, vec!["SKU-E", "SKU-D", "SKU-B", "SKU-A", "SKU-C"]);
    }

    #[test]
    fn test_empty_input_yields_empty_plan() {
        let outcome = HeuristicPlanner::new(Decimal::from(1000)).plan(Vec::new());

        assert!(outcome.lines.is_empty());
        assert_eq!(outcome.candidates_considered, 0);
        assert_eq!(outcome.budget.utilization(), Some(0.0));
    }

    fn arb_candidate() -> impl Strategy<Value = PlanningCandidate> {
        (
            0u32..1_000,
            0.0f64..50.0,
            0u64..300,
            0u64..100,
            0u64..600,
            0u64..100,
            (0u64..60, 0u64..25, 0u64..400, -200i64..500),
        )
            .prop_map(|(id, sv, on_hand, in_transit, forecast, safety, (min_batch, multiplicity, cap, cost))| {
                let mut constraints = Constraints::default()
                    .with_min_batch(min_batch)
                    .with_multiplicity(multiplicity)
                    .with_unit_cost(Decimal::from(cost));
                if cap > 0 {
                    constraints = constraints.with_max_per_slot(cap);
                }
                PlanningCandidate::new(format!("SKU-{:04}", id), "WH-01".to_string(), sv, 14)
                    .with_stock(on_hand, in_transit)
                    .with_forecast(forecast, safety)
                    .with_constraints(constraints)
            })
    }

    proptest! {
        #[test]
        fn never_emits_below_min_batch(
            candidates in prop::collection::vec(arb_candidate(), 0..30),
            limit in 0i64..200_000,
        ) {
            let outcome = HeuristicPlanner::new(Decimal::from(limit)).plan(candidates);
            for line in &outcome.lines {
                prop_assert!(line.recommended_qty > 0);
                prop_assert!(line.recommended_qty >= line.candidate.constraints.min_batch);
            }
        }

        #[test]
        fn never_overspends_budget(
            candidates in prop::collection::vec(arb_candidate(), 0..30),
            limit in 1i64..200_000,
        ) {
            let limit = Decimal::from(limit);
            let outcome = HeuristicPlanner::new(limit).plan(candidates);
            prop_assert!(outcome.total_cost() <= limit);
            prop_assert_eq!(outcome.total_cost(), outcome.budget.used());
        }

        #[test]
        fn plan_is_independent_of_input_order(
            candidates in prop::collection::vec(arb_candidate(), 0..20),
            limit in 0i64..100_000,
        ) {
            // SKU 唯一，排序鍵才是全序
            let candidates: Vec<PlanningCandidate> = candidates
                .into_iter()
                .enumerate()
                .map(|(i, mut c)| {
                    c.sku_id = format!("SKU-{:04}", i);
                    c
                })
                .collect();
            let mut reversed = candidates.clone();
            reversed.reverse();

            let planner = HeuristicPlanner::new(Decimal::from(limit));
            let a: Vec<(String, u64)> = planner
                .plan(candidates)
                .lines
                .iter()
                .map(|l| (l.sku_id().to_string(), l.recommended_qty))
                .collect();
            let b: Vec<(String, u64)> = planner
                .plan(reversed)
                .lines
                .iter()
                .map(|l| (l.sku_id().to_string(), l.recommended_qty))
                .collect();
            prop_assert_eq!(a, b);
        }
    }
}
