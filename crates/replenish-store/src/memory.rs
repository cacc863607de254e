//! 記憶體內儲存

use std::collections::BTreeMap;

use chrono::NaiveDate;
use replenish_core::{
    CostRecord, FactSource, PlanKey, PlanLineRecord, PlanRepository, Result, SalesFact, Sku,
    StockSnapshot, UpsertOutcome, Warehouse,
};

use crate::dataset::Dataset;

/// (日期, SKU, 倉庫)
type FactKey = (NaiveDate, String, String);

/// 記憶體內儲存
///
/// 同一 日期/SKU/倉庫 的多筆銷售在寫入時合併；同鍵的庫存快照以後寫入者為準。
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    warehouses: BTreeMap<String, Warehouse>,
    skus: BTreeMap<String, Sku>,
    sales: BTreeMap<FactKey, u64>,
    stock: BTreeMap<FactKey, StockSnapshot>,
    costs: BTreeMap<String, Vec<CostRecord>>,
    plan_lines: BTreeMap<PlanKey, PlanLineRecord>,
}

impl InMemoryStore {
    /// 創建空的儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 由資料集建立
    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut store = Self::new();
        for warehouse in dataset.warehouses {
            store.add_warehouse(warehouse);
        }
        for sku in dataset.skus {
            store.add_sku(sku);
        }
        for fact in dataset.sales {
            store.record_sale(fact);
        }
        for snapshot in dataset.stock {
            store.record_stock(snapshot);
        }
        for cost in dataset.costs {
            store.record_cost(cost);
        }

        tracing::debug!(
            "載入資料集：倉庫 {}，SKU {}，銷售 {}，快照 {}",
            store.warehouses.len(),
            store.skus.len(),
            store.sales.len(),
            store.stock.len()
        );
        store
    }

    /// 由 JSON 資料集建立
    pub fn load_json(raw: &str) -> Result<Self> {
        Ok(Self::from_dataset(Dataset::from_json_str(raw)?))
    }

    pub fn add_warehouse(&mut self, warehouse: Warehouse) {
        self.warehouses.insert(warehouse.id.clone(), warehouse);
    }

    pub fn add_sku(&mut self, sku: Sku) {
        self.skus.insert(sku.id.clone(), sku);
    }

    /// 記錄銷售（同日同鍵合併）
    pub fn record_sale(&mut self, fact: SalesFact) {
        *self
            .sales
            .entry((fact.date, fact.sku_id, fact.warehouse_id))
            .or_insert(0) += fact.quantity;
    }

    /// 記錄庫存快照（同日同鍵覆寫）
    pub fn record_stock(&mut self, snapshot: StockSnapshot) {
        let key = (
            snapshot.date,
            snapshot.sku_id.clone(),
            snapshot.warehouse_id.clone(),
        );
        self.stock.insert(key, snapshot);
    }

    pub fn record_cost(&mut self, cost: CostRecord) {
        self.costs.entry(cost.sku_id.clone()).or_default().push(cost);
    }

    /// 查詢已持久化的計劃行
    pub fn plan_line(&self, key: &PlanKey) -> Option<&PlanLineRecord> {
        self.plan_lines.get(key)
    }

    /// 所有已持久化的計劃行（按鍵排序）
    pub fn plan_lines(&self) -> impl Iterator<Item = &PlanLineRecord> {
        self.plan_lines.values()
    }
}

impl FactSource for InMemoryStore {
    fn warehouses(&self) -> Result<Vec<Warehouse>> {
        Ok(self.warehouses.values().cloned().collect())
    }

    fn skus(&self) -> Result<Vec<Sku>> {
        Ok(self.skus.values().cloned().collect())
    }

    fn stock_snapshots(&self, date: NaiveDate) -> Result<Vec<StockSnapshot>> {
        Ok(self
            .stock
            .values()
            .filter(|s| s.date == date)
            .cloned()
            .collect())
    }

    fn sales_facts(
        &self,
        sku_id: &str,
        warehouse_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SalesFact>> {
        Ok(self
            .sales
            .iter()
            .filter(|((date, sku, warehouse), _)| {
                sku == sku_id && warehouse == warehouse_id && *date >= from && *date <= to
            })
            .map(|((date, sku, warehouse), &quantity)| {
                SalesFact::new(*date, sku.clone(), warehouse.clone(), quantity)
            })
            .collect())
    }

    fn cost_records(&self, sku_id: &str) -> Result<Vec<CostRecord>> {
        Ok(self.costs.get(sku_id).cloned().unwrap_or_default())
    }
}

impl PlanRepository for InMemoryStore {
    fn upsert_plan_line(&mut self, record: PlanLineRecord) -> Result<UpsertOutcome> {
        match self.plan_lines.insert(record.key.clone(), record) {
            Some(_) => Ok(UpsertOutcome::Updated),
            None => Ok(UpsertOutcome::Inserted),
        }
    }
}
