//! # Replenish Store
//!
//! 記憶體內的資料來源與計劃行儲存庫

pub mod dataset;
pub mod memory;

// Re-export 主要類型
pub use dataset::Dataset;
pub use memory::InMemoryStore;
