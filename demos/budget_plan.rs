//! # 預算受限補貨計劃範例
//!
//! 從 JSON 資料集與 JSON 配置載入，預算不足時依優先順序分配，
//! 並將計劃行寫回儲存（重跑同一天會覆寫）

use anyhow::Result;
use chrono::NaiveDate;
use replenish_calc::ReplenishmentEngine;
use replenish_core::{CollectFilter, PlanningConfig};
use replenish_store::{Dataset, InMemoryStore};

const DATASET: &str = r#"{
    "warehouses": [
        {"id": "WH-01", "name": "Koledino", "channel": "wb"},
        {"id": "WH-02", "name": "Kazan", "channel": "ozon"}
    ],
    "skus": [
        {"id": "SKU-001", "article": "HOODIE-BLK-M"},
        {"id": "SKU-002", "article": "HOODIE-BLK-L"},
        {"id": "SKU-003", "article": "CAP-RED"}
    ],
    "sales": [
        {"date": "2025-11-10", "sku_id": "SKU-001", "warehouse_id": "WH-01", "quantity": 40},
        {"date": "2025-11-12", "sku_id": "SKU-001", "warehouse_id": "WH-01", "quantity": 30},
        {"date": "2025-11-14", "sku_id": "SKU-001", "warehouse_id": "WH-01", "quantity": 70},
        {"date": "2025-11-11", "sku_id": "SKU-002", "warehouse_id": "WH-01", "quantity": 70},
        {"date": "2025-11-13", "sku_id": "SKU-002", "warehouse_id": "WH-01", "quantity": 70},
        {"date": "2025-11-09", "sku_id": "SKU-003", "warehouse_id": "WH-02", "quantity": 14},
        {"date": "2025-11-14", "sku_id": "SKU-003", "warehouse_id": "WH-02", "quantity": 14}
    ],
    "stock": [
        {"date": "2025-11-14", "sku_id": "SKU-001", "warehouse_id": "WH-01", "on_hand": 40, "in_transit": 0},
        {"date": "2025-11-14", "sku_id": "SKU-002", "warehouse_id": "WH-01", "on_hand": 40, "in_transit": 0},
        {"date": "2025-11-14", "sku_id": "SKU-003", "warehouse_id": "WH-02", "on_hand": 2, "in_transit": 0}
    ],
    "costs": [
        {"sku_id": "SKU-001", "effective_from": "2025-10-01", "unit_cost": "100"},
        {"sku_id": "SKU-002", "effective_from": "2025-10-01", "unit_cost": "100"},
        {"sku_id": "SKU-003", "effective_from": "2025-10-01", "unit_cost": "80"},
        {"sku_id": "SKU-003", "effective_from": "2025-12-01", "unit_cost": "95"}
    ]
}"#;

const CONFIG: &str = r#"{
    "window_days": 14,
    "multiplicity": 10,
    "budget_limit": "15000",
    "capacity_map": "{\"ozon:Kazan\": 20}"
}"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("💰 ===== 預算受限補貨計劃範例 =====");
    println!();

    let today = NaiveDate::from_ymd_opt(2025, 11, 14).ok_or_else(|| anyhow::anyhow!("無效日期"))?;

    let mut store = InMemoryStore::from_dataset(Dataset::from_json_str(DATASET)?);
    let config = PlanningConfig::from_json_str(CONFIG)?;
    println!("⚙️  預算上限: {}", config.budget_limit);
    println!();

    let engine = ReplenishmentEngine::new(config);
    let result = engine.run(&store, today, &CollectFilter::all())?;

    println!("📊 計劃結果");
    for (rank, line) in result.lines.iter().enumerate() {
        let marker = if line.budget_constrained { "（預算縮減）" } else { "" };
        println!(
            "   {}. {} / {} @ {}: {} 件 × {} {}",
            rank + 1,
            line.sku_id,
            line.article,
            line.warehouse_name,
            line.recommended_qty,
            line.unit_cost,
            marker
        );
    }
    for warning in &result.warnings {
        println!("   ⚠ {}: {}", warning.subject, warning.message);
    }
    println!(
        "   預算使用: {} / {}（{:.0}%）",
        result.budget_used,
        result.budget_limit,
        result.budget_utilization.unwrap_or(0.0) * 100.0
    );
    println!();

    println!("💾 寫入計劃行");
    let first = engine.persist(&result, &mut store, Some("demo"))?;
    println!("   第一次: 新增 {}，覆寫 {}", first.inserted, first.updated);

    let rerun = engine.run(&store, today, &CollectFilter::all())?;
    let second = engine.persist(&rerun, &mut store, Some("demo"))?;
    println!("   重跑: 新增 {}，覆寫 {}", second.inserted, second.updated);

    for record in store.plan_lines() {
        println!(
            "   • {} {} @ {} → {} ({})",
            record.key.date,
            record.key.sku_id,
            record.key.warehouse_id,
            record.recommended_qty,
            &record.rationale_hash[..12]
        );
    }

    Ok(())
}
