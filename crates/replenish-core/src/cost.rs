//! 成本模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ReplenishError, Result};

/// 生效日期制的單位成本記錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    /// SKU ID
    pub sku_id: String,

    /// 生效日期
    pub effective_from: NaiveDate,

    /// 單位成本
    pub unit_cost: Decimal,
}

impl CostRecord {
    /// 創建新的成本記錄
    pub fn new(sku_id: String, effective_from: NaiveDate, unit_cost: Decimal) -> Self {
        Self {
            sku_id,
            effective_from,
            unit_cost,
        }
    }

    /// 單位成本不得為負
    pub fn validate(&self) -> Result<()> {
        if self.unit_cost.is_sign_negative() && !self.unit_cost.is_zero() {
            return Err(ReplenishError::InvalidData(format!(
                "SKU {} 於 {} 的單位成本為負數: {}",
                self.sku_id, self.effective_from, self.unit_cost
            )));
        }
        Ok(())
    }

    /// 取得 `today` 當下的有效成本
    ///
    /// 取 `effective_from` 不晚於 `today` 的最新一筆；沒有任何記錄時為 0。
    /// 生效中的記錄為負數時回傳 `InvalidData`。
    pub fn current(records: &[CostRecord], today: NaiveDate) -> Result<Decimal> {
        match records
            .iter()
            .filter(|r| r.effective_from <= today)
            .max_by_key(|r| r.effective_from)
        {
            Some(record) => {
                record.validate()?;
                Ok(record.unit_cost)
            }
            None => Ok(Decimal::ZERO),
        }
    }
}
