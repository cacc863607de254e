//! 計劃候選模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一 SKU×倉庫 的補貨約束
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// 最小批量
    pub min_batch: u64,

    /// 訂購倍數（≤ 1 表示不取整）
    pub multiplicity: u64,

    /// 每槽上限（None 表示不限）
    pub max_per_slot: Option<u64>,

    /// 單位成本
    pub unit_cost: Decimal,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_batch: 0,
            multiplicity: 1,
            max_per_slot: None,
            unit_cost: Decimal::ZERO,
        }
    }
}

impl Constraints {
    pub fn with_min_batch(mut self, min_batch: u64) -> Self {
        self.min_batch = min_batch;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: u64) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_max_per_slot(mut self, max_per_slot: u64) -> Self {
        self.max_per_slot = Some(max_per_slot);
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }
}

/// 計劃候選（每次運行重新計算，不持久化）
///
/// 所有欄位在交給計劃器之前都已填妥，計劃器不再存取資料來源。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningCandidate {
    /// 銷售通路
    pub channel: String,

    /// SKU ID
    pub sku_id: String,

    /// 商品貨號
    pub article: String,

    /// 倉庫ID
    pub warehouse_id: String,

    /// 倉庫名稱
    pub warehouse_name: String,

    /// 銷售速度（件/天），恆 ≥ 0
    pub sv: f64,

    /// 預測視窗（天）
    pub window_days: u32,

    /// 現有庫存
    pub on_hand: u64,

    /// 在途數量
    pub in_transit: u64,

    /// 預測數量
    pub forecast: u64,

    /// 安全庫存
    pub safety: u64,

    /// 補貨約束
    pub constraints: Constraints,
}

impl PlanningCandidate {
    /// 創建新的候選（預測、安全庫存與約束由建構器補上）
    pub fn new(sku_id: String, warehouse_id: String, sv: f64, window_days: u32) -> Self {
        Self {
            channel: String::new(),
            article: sku_id.clone(),
            warehouse_name: warehouse_id.clone(),
            sku_id,
            warehouse_id,
            sv: sv.max(0.0),
            window_days,
            on_hand: 0,
            in_transit: 0,
            forecast: 0,
            safety: 0,
            constraints: Constraints::default(),
        }
    }

    /// 建構器模式：設置通路
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// 建構器模式：設置貨號
    pub fn with_article(mut self, article: impl Into<String>) -> Self {
        self.article = article.into();
        self
    }

    /// 建構器模式：設置倉庫名稱
    pub fn with_warehouse_name(mut self, name: impl Into<String>) -> Self {
        self.warehouse_name = name.into();
        self
    }

    /// 建構器模式：設置庫存
    pub fn with_stock(mut self, on_hand: u64, in_transit: u64) -> Self {
        self.on_hand = on_hand;
        self.in_transit = in_transit;
        self
    }

    /// 建構器模式：設置預測與安全庫存
    pub fn with_forecast(mut self, forecast: u64, safety: u64) -> Self {
        self.forecast = forecast;
        self.safety = safety;
        self
    }

    /// 建構器模式：設置約束
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// 總庫存（現有 + 在途）
    pub fn total_stock(&self) -> u64 {
        self.on_hand.saturating_add(self.in_transit)
    }

    /// 補貨需求：max(0, 預測 + 安全庫存 − 總庫存)
    pub fn need(&self) -> u64 {
        self.forecast
            .saturating_add(self.safety)
            .saturating_sub(self.total_stock())
    }
}
