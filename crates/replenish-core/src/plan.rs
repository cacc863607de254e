//! 補貨計劃行模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::candidate::PlanningCandidate;

/// 補貨計劃行（計劃器輸出）
///
/// 只有建議數量大於 0 的候選才會產生計劃行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyPlanLine {
    /// 產生此行的候選（保留作為可解釋性輸入）
    pub candidate: PlanningCandidate,

    /// 建議補貨數量
    pub recommended_qty: u64,

    /// 此行花費（數量 × 單位成本）
    pub cost: Decimal,

    /// 是否被預算縮減過
    pub budget_constrained: bool,
}

impl SupplyPlanLine {
    /// 創建新的計劃行
    pub fn new(candidate: PlanningCandidate, recommended_qty: u64) -> Self {
        let cost = Self::cost_of(recommended_qty, candidate.constraints.unit_cost)
            .unwrap_or(Decimal::MAX);
        Self {
            candidate,
            recommended_qty,
            cost,
            budget_constrained: false,
        }
    }

    /// 數量 × 單位成本；負成本視為 0，溢位時回傳 None
    pub fn cost_of(qty: u64, unit_cost: Decimal) -> Option<Decimal> {
        Decimal::from(qty).checked_mul(unit_cost.max(Decimal::ZERO))
    }

    /// 建構器模式：標記為受預算限制
    pub fn as_budget_constrained(mut self) -> Self {
        self.budget_constrained = true;
        self
    }

    pub fn sku_id(&self) -> &str {
        &self.candidate.sku_id
    }

    pub fn warehouse_id(&self) -> &str {
        &self.candidate.warehouse_id
    }
}

/// 計劃行持久化的自然鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanKey {
    /// 計劃日期
    pub date: NaiveDate,

    /// SKU ID
    pub sku_id: String,

    /// 倉庫ID
    pub warehouse_id: String,

    /// 租戶範圍
    pub tenant: Option<String>,
}

/// 可 upsert 的計劃行記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLineRecord {
    /// 自然鍵
    pub key: PlanKey,

    /// 建議補貨數量
    pub recommended_qty: u64,

    /// 計劃依據雜湊（十六進位 SHA-256）
    pub rationale_hash: String,
}

impl PlanLineRecord {
    pub fn new(key: PlanKey, recommended_qty: u64, rationale_hash: String) -> Self {
        Self {
            key,
            recommended_qty,
            rationale_hash,
        }
    }
}

/// upsert 結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 新增
    Inserted,
    /// 覆寫既有記錄
    Updated,
}
