//! 庫存快照模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 庫存快照（每個 日期/SKU/倉庫 一筆，計劃只使用最新一筆）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// 快照日期
    pub date: NaiveDate,

    /// SKU ID
    pub sku_id: String,

    /// 倉庫ID
    pub warehouse_id: String,

    /// 現有庫存
    pub on_hand: u64,

    /// 在途數量
    pub in_transit: u64,
}

impl StockSnapshot {
    /// 創建新的庫存快照
    pub fn new(date: NaiveDate, sku_id: String, warehouse_id: String, on_hand: u64) -> Self {
        Self {
            date,
            sku_id,
            warehouse_id,
            on_hand,
            in_transit: 0,
        }
    }

    /// 建構器模式：設置在途數量
    pub fn with_in_transit(mut self, in_transit: u64) -> Self {
        self.in_transit = in_transit;
        self
    }

    /// 總庫存（現有 + 在途）
    pub fn total(&self) -> u64 {
        self.on_hand.saturating_add(self.in_transit)
    }
}
