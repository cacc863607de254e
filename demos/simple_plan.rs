//! # 簡單補貨計劃範例
//!
//! 兩個通路、三個倉庫、四個 SKU，不限預算

use anyhow::Result;
use chrono::{Days, NaiveDate};
use replenish_calc::ReplenishmentEngine;
use replenish_core::*;
use replenish_store::InMemoryStore;
use rust_decimal::Decimal;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("📦 ===== 簡單補貨計劃範例 =====");
    println!();

    let today = NaiveDate::from_ymd_opt(2025, 11, 14).ok_or_else(|| anyhow::anyhow!("無效日期"))?;

    // ========== 1. 建立資料 ==========
    println!("🗂  步驟 1: 建立倉庫、SKU 與銷售歷史");
    let store = build_store(today)?;
    println!("   ✓ 倉庫 {} 個，SKU {} 個", store.warehouses()?.len(), store.skus()?.len());
    println!();

    // ========== 2. 設定計劃參數 ==========
    println!("⚙️  步驟 2: 設定計劃參數");
    let config = PlanningConfig::new()
        .with_window_days(14)
        .with_safety_coefficient(1.0)
        .with_min_batch(10)
        .with_multiplicity(5)
        .with_max_per_slot(200)
        .with_override(
            ConstraintOverride::new("SKU-004".to_string(), "WH-03".to_string())
                .with_multiplicity(12),
        );
    println!("   ✓ 視窗 {} 天，最小批量 {}，倍數 {}", config.window_days, config.min_batch, config.multiplicity);
    println!();

    // ========== 3. 執行計劃 ==========
    println!("🚀 步驟 3: 執行補貨計劃");
    let engine = ReplenishmentEngine::new(config);
    let result = engine.run(&store, today, &CollectFilter::all())?;
    println!();

    // ========== 4. 顯示結果 ==========
    println!("📊 計劃結果（運行 {}）", result.run_id);
    println!("   候選: {}，計劃行: {}", result.candidates_considered, result.lines.len());
    for line in &result.lines {
        println!("   • {} @ {}: {} 件", line.sku_id, line.warehouse_id, line.recommended_qty);
        println!("     {}", line.explanation);
        println!("     指紋 {}", &line.rationale_hash[..16]);
    }
    for warning in &result.warnings {
        println!("   ⚠ [{:?}] {}: {}", warning.severity, warning.subject, warning.message);
    }
    println!("   總成本: {}", result.total_cost());
    println!();

    println!("🧾 JSON 輸出:");
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn build_store(today: NaiveDate) -> Result<InMemoryStore> {
    let mut store = InMemoryStore::new();

    store.add_warehouse(Warehouse::new("WH-01".to_string(), "Koledino".to_string(), "wb".to_string()));
    store.add_warehouse(Warehouse::new("WH-02".to_string(), "Tula".to_string(), "wb".to_string()));
    store.add_warehouse(Warehouse::new("WH-03".to_string(), "Kazan".to_string(), "ozon".to_string()));

    // (SKU, 倉庫, 每日銷量循環, 現有, 在途, 單位成本)
    let items: [(&str, &str, &[u64], u64, u64, i64); 5] = [
        ("SKU-001", "WH-01", &[4, 6, 5], 20, 0, 350),
        ("SKU-001", "WH-02", &[1, 2], 40, 10, 350),
        ("SKU-002", "WH-01", &[12, 9, 15], 60, 30, 120),
        ("SKU-003", "WH-02", &[0, 0, 1], 25, 0, 990),
        ("SKU-004", "WH-03", &[7, 3], 0, 0, 75),
    ];

    for (sku, wh, pattern, on_hand, in_transit, cost) in items {
        store.add_sku(Sku::new(sku.to_string(), format!("ART-{}", &sku[4..])));

        for offset in 0..14u64 {
            let date = today
                .checked_sub_days(Days::new(offset))
                .ok_or_else(|| anyhow::anyhow!("日期超出範圍"))?;
            let qty = pattern[offset as usize % pattern.len()];
            store.record_sale(SalesFact::new(date, sku.to_string(), wh.to_string(), qty));
        }

        store.record_stock(
            StockSnapshot::new(today, sku.to_string(), wh.to_string(), on_hand)
                .with_in_transit(in_transit),
        );
        store.record_cost(CostRecord::new(
            sku.to_string(),
            today - Days::new(30),
            Decimal::from(cost),
        ));
    }

    Ok(store)
}
