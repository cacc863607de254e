//! # Replenish Core
//!
//! 補貨計劃的核心資料模型、配置與資料存取邊界

pub mod candidate;
pub mod catalog;
pub mod config;
pub mod cost;
pub mod plan;
pub mod sales;
pub mod stock;
pub mod store;

// Re-export 主要類型
pub use candidate::{Constraints, PlanningCandidate};
pub use catalog::{Sku, Warehouse};
pub use config::{CapacityMap, CollectFilter, ConstraintOverride, PlanningConfig};
pub use cost::CostRecord;
pub use plan::{PlanKey, PlanLineRecord, SupplyPlanLine, UpsertOutcome};
pub use sales::SalesFact;
pub use stock::StockSnapshot;
pub use store::{FactSource, PlanRepository};

/// 補貨計劃錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ReplenishError {
    #[error("資料來源無法存取: {0}")]
    StoreUnavailable(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無效的資料: {0}")]
    InvalidData(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReplenishError>;
