//! 銷售事實模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 每日銷售事實（每個 日期/SKU/倉庫 一筆）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesFact {
    /// 銷售日期
    pub date: NaiveDate,

    /// SKU ID
    pub sku_id: String,

    /// 倉庫ID
    pub warehouse_id: String,

    /// 銷售數量
    pub quantity: u64,
}

impl SalesFact {
    /// 創建新的銷售事實
    pub fn new(date: NaiveDate, sku_id: String, warehouse_id: String, quantity: u64) -> Self {
        Self {
            date,
            sku_id,
            warehouse_id,
            quantity,
        }
    }

    /// 檢查是否屬於指定的 SKU×倉庫
    pub fn matches(&self, sku_id: &str, warehouse_id: &str) -> bool {
        self.sku_id == sku_id && self.warehouse_id == warehouse_id
    }

    /// 檢查是否落在 [from, to] 區間內（含兩端）
    pub fn within(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.date >= from && self.date <= to
    }
}
