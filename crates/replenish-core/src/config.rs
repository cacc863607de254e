//! 補貨計劃配置模型

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::candidate::Constraints;
use crate::catalog::Warehouse;
use crate::{ReplenishError, Result};

/// 計劃運行配置
///
/// 所有欄位皆有預設值，JSON 文件中缺少的欄位以預設值補齊。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 滾動視窗（天），同時作為預測時界
    pub window_days: u32,

    /// 安全係數 k（安全庫存 = ceil(k × sqrt(window) × stdev)）
    pub safety_coefficient: f64,

    /// 全域最小批量
    pub min_batch: u64,

    /// 全域訂購倍數（≤ 1 表示不取整）
    pub multiplicity: u64,

    /// 全域每槽上限（0 表示不限）
    pub max_per_slot: u64,

    /// 全域預算上限（0 表示不限）
    pub budget_limit: Decimal,

    /// 產能表原始 JSON：`{"<channel>:<warehouse-name>": 上限}`
    pub capacity_map: Option<String>,

    /// SKU×倉庫 層級的約束覆寫
    pub overrides: Vec<ConstraintOverride>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            safety_coefficient: 0.0,
            min_batch: 0,
            multiplicity: 1,
            max_per_slot: 0,
            budget_limit: Decimal::ZERO,
            capacity_map: None,
            overrides: Vec::new(),
        }
    }
}

impl PlanningConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 文件載入配置
    ///
    /// 整份文件格式錯誤屬於配置錯誤；內嵌的產能表則延後解析，解析失敗不影響載入。
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ReplenishError::InvalidConfig(e.to_string()))
    }

    /// 建構器模式：設置滾動視窗
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// 建構器模式：設置安全係數
    pub fn with_safety_coefficient(mut self, k: f64) -> Self {
        self.safety_coefficient = k;
        self
    }

    /// 建構器模式：設置最小批量
    pub fn with_min_batch(mut self, min_batch: u64) -> Self {
        self.min_batch = min_batch;
        self
    }

    /// 建構器模式：設置訂購倍數
    pub fn with_multiplicity(mut self, multiplicity: u64) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// 建構器模式：設置每槽上限
    pub fn with_max_per_slot(mut self, max_per_slot: u64) -> Self {
        self.max_per_slot = max_per_slot;
        self
    }

    /// 建構器模式：設置預算上限
    pub fn with_budget_limit(mut self, budget_limit: Decimal) -> Self {
        self.budget_limit = budget_limit;
        self
    }

    /// 建構器模式：設置產能表（原始 JSON）
    pub fn with_capacity_map(mut self, raw: impl Into<String>) -> Self {
        self.capacity_map = Some(raw.into());
        self
    }

    /// 建構器模式：添加約束覆寫
    pub fn with_override(mut self, item: ConstraintOverride) -> Self {
        self.overrides.push(item);
        self
    }

    /// 是否啟用預算限制
    pub fn has_budget_limit(&self) -> bool {
        self.budget_limit > Decimal::ZERO
    }

    /// 查找 SKU×倉庫 的覆寫
    pub fn find_override(&self, sku_id: &str, warehouse_id: &str) -> Option<&ConstraintOverride> {
        self.overrides
            .iter()
            .find(|o| o.sku_id == sku_id && o.warehouse_id == warehouse_id)
    }

    /// 為一個 SKU×倉庫 解析最終約束
    ///
    /// 每槽上限依序取：覆寫、產能表、全域設定，第一個大於 0 的值生效；都沒有則不限。
    pub fn resolve_constraints(
        &self,
        sku_id: &str,
        warehouse: &Warehouse,
        capacity: &CapacityMap,
        unit_cost: Decimal,
    ) -> Constraints {
        let item = self.find_override(sku_id, &warehouse.id);

        let min_batch = item.and_then(|o| o.min_batch).unwrap_or(self.min_batch);
        let multiplicity = item
            .and_then(|o| o.multiplicity)
            .unwrap_or(self.multiplicity);

        let max_per_slot = item
            .and_then(|o| o.max_per_slot)
            .filter(|&v| v > 0)
            .or_else(|| capacity.limit(&warehouse.capacity_key()))
            .or(Some(self.max_per_slot).filter(|&v| v > 0));

        Constraints {
            min_batch,
            multiplicity,
            max_per_slot,
            unit_cost,
        }
    }
}

/// SKU×倉庫 層級的約束覆寫（未設置的欄位沿用全域值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintOverride {
    pub sku_id: String,
    pub warehouse_id: String,
    #[serde(default)]
    pub min_batch: Option<u64>,
    #[serde(default)]
    pub multiplicity: Option<u64>,
    #[serde(default)]
    pub max_per_slot: Option<u64>,
}

impl ConstraintOverride {
    pub fn new(sku_id: String, warehouse_id: String) -> Self {
        Self {
            sku_id,
            warehouse_id,
            min_batch: None,
            multiplicity: None,
            max_per_slot: None,
        }
    }

    pub fn with_min_batch(mut self, min_batch: u64) -> Self {
        self.min_batch = Some(min_batch);
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: u64) -> Self {
        self.multiplicity = Some(multiplicity);
        self
    }

    pub fn with_max_per_slot(mut self, max_per_slot: u64) -> Self {
        self.max_per_slot = Some(max_per_slot);
        self
    }
}

/// 產能表：`<channel>:<warehouse-name>` → 每槽上限
///
/// 值為 0 或缺少鍵都表示不限。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapacityMap {
    limits: BTreeMap<String, u64>,
}

impl CapacityMap {
    /// 解析產能表；頂層不是 JSON 物件時回傳錯誤，由呼叫端決定退化方式
    ///
    /// 個別無法解析的值（負數、小數、非數字字串）會被略過。
    pub fn try_parse(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ReplenishError::InvalidConfig(format!("產能表無法解析: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| ReplenishError::InvalidConfig("產能表必須是 JSON 物件".to_string()))?;

        let mut limits = BTreeMap::new();
        for (key, v) in object {
            let limit = match v {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };

            match limit {
                Some(limit) => {
                    limits.insert(key.clone(), limit);
                }
                None => tracing::warn!("產能表項目 {} 的值無效，視為不限", key),
            }
        }

        Ok(Self { limits })
    }

    /// 建構器模式：設置單一上限
    pub fn with_limit(mut self, key: impl Into<String>, limit: u64) -> Self {
        self.limits.insert(key.into(), limit);
        self
    }

    /// 查詢上限；0 或缺少時回傳 None
    pub fn limit(&self, key: &str) -> Option<u64> {
        self.limits.get(key).copied().filter(|&v| v > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

/// 候選收集範圍
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectFilter {
    /// 只收集此通路的倉庫
    pub channel: Option<String>,

    /// 只收集此倉庫
    pub warehouse_id: Option<String>,
}

impl CollectFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_warehouse_id(mut self, warehouse_id: impl Into<String>) -> Self {
        self.warehouse_id = Some(warehouse_id.into());
        self
    }

    /// 倉庫是否在收集範圍內
    pub fn accepts(&self, warehouse: &Warehouse) -> bool {
        let channel_ok = self
            .channel
            .as_deref()
            .map_or(true, |c| c == warehouse.channel);
        let warehouse_ok = self
            .warehouse_id
            .as_deref()
            .map_or(true, |id| id == warehouse.id);

        channel_ok && warehouse_ok
    }
}
