//! 資料存取邊界
//!
//! 銷售、庫存與成本資料由外部匯入，對計劃流程而言是唯讀的；
//! 計劃行以自然鍵 upsert，重跑同一個鍵不會產生重複記錄。

use chrono::NaiveDate;

use crate::catalog::{Sku, Warehouse};
use crate::cost::CostRecord;
use crate::plan::{PlanLineRecord, UpsertOutcome};
use crate::sales::SalesFact;
use crate::stock::StockSnapshot;
use crate::Result;

/// 歷史事實來源
pub trait FactSource {
    /// 所有倉庫
    fn warehouses(&self) -> Result<Vec<Warehouse>>;

    /// 所有 SKU
    fn skus(&self) -> Result<Vec<Sku>>;

    /// 指定日期的庫存快照
    fn stock_snapshots(&self, date: NaiveDate) -> Result<Vec<StockSnapshot>>;

    /// 指定 SKU×倉庫 在 [from, to] 區間的銷售事實
    fn sales_facts(
        &self,
        sku_id: &str,
        warehouse_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SalesFact>>;

    /// 指定 SKU 的全部成本記錄
    fn cost_records(&self, sku_id: &str) -> Result<Vec<CostRecord>>;
}

/// 計劃行儲存庫
pub trait PlanRepository {
    /// 依自然鍵新增或覆寫
    fn upsert_plan_line(&mut self, record: PlanLineRecord) -> Result<UpsertOutcome>;
}
