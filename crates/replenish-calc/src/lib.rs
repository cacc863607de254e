//! # Replenishment Calculation Engine
//!
//! 需求估算、候選收集、啟發式補貨分配與可解釋性

pub mod collector;
pub mod engine;
pub mod estimator;
pub mod explain;
pub mod planner;
pub mod rounding;

// Re-export 主要類型
pub use collector::CandidateCollector;
pub use engine::{CollectOutcome, PersistSummary, ReplenishmentEngine};
pub use estimator::DemandEstimator;
pub use explain::{Explainer, PlanLineSummary};
pub use planner::{BudgetAccumulator, HeuristicPlanner, PlanOutcome};

use chrono::NaiveDate;
use replenish_core::SupplyPlanLine;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// 計劃運行結果
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    /// 運行ID
    pub run_id: Uuid,

    /// 計劃日期
    pub plan_date: NaiveDate,

    /// 計劃行（保持優先順序）
    pub lines: Vec<PlanLineSummary>,

    /// 已使用預算
    pub budget_used: Decimal,

    /// 預算上限（0 表示不限）
    pub budget_limit: Decimal,

    /// 預算使用比例（不限預算時為 None）
    pub budget_utilization: Option<f64>,

    /// 參與計劃的候選數量
    pub candidates_considered: usize,

    /// 警告信息
    pub warnings: Vec<PlanWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl PlanResult {
    /// 創建空的運行結果
    pub fn empty(plan_date: NaiveDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            plan_date,
            lines: Vec::new(),
            budget_used: Decimal::ZERO,
            budget_limit: Decimal::ZERO,
            budget_utilization: None,
            candidates_considered: 0,
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 所有計劃行的總花費
    pub fn total_cost(&self) -> Decimal {
        self.lines.iter().fold(Decimal::ZERO, |acc, l| {
            let cost = SupplyPlanLine::cost_of(l.recommended_qty, l.unit_cost).unwrap_or(Decimal::MAX);
            acc.checked_add(cost).unwrap_or(Decimal::MAX)
        })
    }
}

/// 計劃警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanWarning {
    /// 對象（`SKU@倉庫` 或配置項名稱）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

/// 候選的警告對象名稱
pub(crate) fn subject_of(sku_id: &str, warehouse_id: &str) -> String {
    format!("{}@{}", sku_id, warehouse_id)
}
