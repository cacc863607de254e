//! 計劃行可解釋性
//!
//! 為每一行產生固定欄位順序的說明文字，以及內容指紋（SHA-256）。
//! 相同輸入的兩次運行必定得到相同指紋。

use replenish_core::SupplyPlanLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 可解釋性產生器
pub struct Explainer;

impl Explainer {
    /// 產生人類可讀的說明
    ///
    /// 欄位順序固定：通路、倉庫、銷速、預測、安全庫存、現有、在途、建議量。
    pub fn generate_explanation(line: &SupplyPlanLine) -> String {
        let c = &line.candidate;
        format!(
            "通路 {} / 倉庫 {}：銷速 {:.2} 件/天，預測 {}，安全庫存 {}，現有 {}，在途 {}，建議補貨 {}",
            c.channel,
            c.warehouse_name,
            c.sv,
            c.forecast,
            c.safety,
            c.on_hand,
            c.in_transit,
            line.recommended_qty
        )
    }

    /// 產生計劃依據指紋（十六進位 SHA-256）
    ///
    /// 序列化順序：通路、倉庫ID、SKU ID、視窗、銷速（兩位小數）、預測、安全庫存、建議量。
    /// 字串以長度前綴寫入，避免欄位邊界混淆。
    pub fn generate_hash(line: &SupplyPlanLine) -> String {
        let c = &line.candidate;
        let velocity = format!("{:.2}", c.sv);

        let mut hasher = Sha256::new();
        Self::update_str(&mut hasher, &c.channel);
        Self::update_str(&mut hasher, &c.warehouse_id);
        Self::update_str(&mut hasher, &c.sku_id);
        hasher.update(c.window_days.to_le_bytes());
        Self::update_str(&mut hasher, &velocity);
        hasher.update(c.forecast.to_le_bytes());
        hasher.update(c.safety.to_le_bytes());
        hasher.update(line.recommended_qty.to_le_bytes());

        hex::encode(hasher.finalize())
    }

    fn update_str(hasher: &mut Sha256, value: &str) {
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
}

/// 回傳給呼叫端的計劃行摘要（保持計劃器的優先順序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLineSummary {
    pub channel: String,
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub sku_id: String,
    pub article: String,
    pub window_days: u32,
    pub sv: f64,
    pub forecast: u64,
    pub safety: u64,
    pub on_hand: u64,
    pub in_transit: u64,
    pub recommended_qty: u64,
    pub unit_cost: Decimal,
    pub budget_constrained: bool,
    pub explanation: String,
    pub rationale_hash: String,
}

impl PlanLineSummary {
    /// 由計劃行產生摘要（附上說明與指紋）
    pub fn from_line(line: &SupplyPlanLine) -> Self {
        let c = &line.candidate;
        Self {
            channel: c.channel.clone(),
            warehouse_id: c.warehouse_id.clone(),
            warehouse_name: c.warehouse_name.clone(),
            sku_id: c.sku_id.clone(),
            article: c.article.clone(),
            window_days: c.window_days,
            sv: c.sv,
            forecast: c.forecast,
            safety: c.safety,
            on_hand: c.on_hand,
            in_transit: c.in_transit,
            recommended_qty: line.recommended_qty,
            unit_cost: c.constraints.unit_cost,
            budget_constrained: line.budget_constrained,
            explanation: Explainer::generate_explanation(line),
            rationale_hash: Explainer::generate_hash(line),
        }
    }
}
