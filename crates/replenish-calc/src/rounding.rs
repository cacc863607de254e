//! 訂購量取整

/// 向上取整到倍數（倍數 ≤ 1 時不變）
///
/// 若 u64 內已無 ≥ quantity 的倍數，回傳可表示的最大倍數，結果仍為倍數但會小於 quantity。
pub fn ceil_to_multiplicity(quantity: u64, multiplicity: u64) -> u64 {
    if multiplicity <= 1 {
        return quantity;
    }
    quantity
        .div_ceil(multiplicity)
        .checked_mul(multiplicity)
        .unwrap_or_else(|| floor_to_multiplicity(u64::MAX, multiplicity))
}

/// 向下取整到倍數（倍數 ≤ 1 時不變）
pub fn floor_to_multiplicity(quantity: u64, multiplicity: u64) -> u64 {
    if multiplicity <= 1 {
        return quantity;
    }
    quantity - quantity % multiplicity
}
