//! 商品與倉庫目錄

use serde::{Deserialize, Serialize};

/// SKU 目錄項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// SKU ID
    pub id: String,

    /// 商品貨號
    pub article: String,
}

impl Sku {
    pub fn new(id: String, article: String) -> Self {
        Self { id, article }
    }
}

/// 倉庫（隸屬於某個銷售通路）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    /// 倉庫ID
    pub id: String,

    /// 倉庫名稱（產能表以名稱為鍵）
    pub name: String,

    /// 銷售通路
    pub channel: String,
}

impl Warehouse {
    pub fn new(id: String, name: String, channel: String) -> Self {
        Self { id, name, channel }
    }

    /// 產能表鍵：`<channel>:<warehouse-name>`
    pub fn capacity_key(&self) -> String {
        format!("{}:{}", self.channel, self.name)
    }
}
