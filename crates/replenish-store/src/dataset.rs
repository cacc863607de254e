//! 可序列化的資料集

use std::io::Read;

use replenish_core::{CostRecord, ReplenishError, SalesFact, Sku, StockSnapshot, Warehouse};
use serde::{Deserialize, Serialize};

/// 一份完整的歷史資料（目錄、銷售、庫存、成本）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub warehouses: Vec<Warehouse>,
    pub skus: Vec<Sku>,
    pub sales: Vec<SalesFact>,
    pub stock: Vec<StockSnapshot>,
    pub costs: Vec<CostRecord>,
}

impl Dataset {
    /// 從 JSON 字串載入
    pub fn from_json_str(raw: &str) -> replenish_core::Result<Self> {
        let dataset: Self = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// 從 JSON reader 載入
    pub fn from_reader<R: Read>(reader: R) -> replenish_core::Result<Self> {
        let dataset: Self = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// 檢查資料內容（目前為成本不得為負）
    pub fn validate(&self) -> replenish_core::Result<()> {
        self.costs.iter().try_for_each(CostRecord::validate)
    }

    /// 從 JSON 檔案載入
    pub fn from_file(path: &str) -> replenish_core::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| ReplenishError::StoreUnavailable(format!("無法開啟 '{}': {}", path, e)))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// 序列化為 JSON
    pub fn to_json_string(&self) -> replenish_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
