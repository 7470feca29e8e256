// src/process/merge.rs
use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::record::RecordSet;
use crate::error::{PriceSyncError, Result, Side};

/// Which columns join the two lists and which carry the price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeColumns {
    pub base_key: String,
    pub base_price: String,
    pub supplier_key: String,
    /// Some feeds carry `price_recommended` instead of `price`.
    pub supplier_price: String,
}

impl Default for MergeColumns {
    fn default() -> Self {
        Self {
            base_key: "Артикул".to_string(),
            base_price: "Цена".to_string(),
            supplier_key: "vendor_code".to_string(),
            supplier_price: "price".to_string(),
        }
    }
}

/// Supplier identifier → supplier price, both kept verbatim (trimmed only).
#[derive(Debug, Default, Clone)]
pub struct PriceIndex {
    prices: HashMap<String, String>,
}

impl PriceIndex {
    /// Index `supplier` by `key_col`. Rows with an empty key or price are
    /// skipped; a repeated key takes the later row's price.
    pub fn build(supplier: &RecordSet, key_col: usize, price_col: usize) -> Self {
        let mut prices = HashMap::with_capacity(supplier.len());
        let mut skipped = 0;
        for record in supplier {
            let key = record.value_at(key_col).trim();
            let price = record.value_at(price_col).trim();
            if key.is_empty() || price.is_empty() {
                skipped += 1;
                continue;
            }
            if let Some(previous) = prices.insert(key.to_string(), price.to_string()) {
                debug!(key, previous = %previous, price, "duplicate supplier key, keeping later price");
            }
        }
        debug!(entries = prices.len(), skipped, "built price index");
        Self { prices }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prices.get(key.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MergeResult {
    pub records: RecordSet,
    /// Rows whose price cell was overwritten. Informational only.
    pub updated: usize,
}

fn require_column(set: &RecordSet, side: Side, column: &str) -> Result<usize> {
    set.column_index(column)
        .ok_or_else(|| PriceSyncError::MissingColumn {
            side,
            column: column.to_string(),
        })
}

/// Overwrite base prices with supplier prices where the join keys match.
///
/// The result has the base list's rows, order and columns exactly; only the
/// price cell of matched rows differs. Unmatched rows pass through.
pub fn merge_prices(
    base: &RecordSet,
    supplier: &RecordSet,
    columns: &MergeColumns,
) -> Result<MergeResult> {
    if base.is_empty() {
        return Err(PriceSyncError::EmptyInput(Side::Base));
    }
    let base_key = require_column(base, Side::Base, &columns.base_key)?;
    let base_price = require_column(base, Side::Base, &columns.base_price)?;
    let supplier_key = require_column(supplier, Side::Supplier, &columns.supplier_key)?;
    let supplier_price = require_column(supplier, Side::Supplier, &columns.supplier_price)?;

    let index = PriceIndex::build(supplier, supplier_key, supplier_price);
    if index.is_empty() {
        warn!(
            supplier_rows = supplier.len(),
            "supplier price list has no usable rows; nothing to update"
        );
    }

    let mut records = base.empty_like();
    let mut updated = 0;
    for record in base {
        match index.get(record.value_at(base_key)) {
            Some(price) => {
                records.push_record(record.with_value_at(base_price, price));
                updated += 1;
            }
            None => records.push_record(record.clone()),
        }
    }

    info!(
        rows = records.len(),
        indexed = index.len(),
        updated,
        unmatched = records.len() - updated,
        "merged supplier prices"
    );
    Ok(MergeResult { records, updated })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> MergeColumns {
        MergeColumns {
            base_key: "Article".into(),
            base_price: "Price".into(),
            supplier_key: "vendor_code".into(),
            supplier_price: "price".into(),
        }
    }

    #[test]
    fn matched_rows_take_supplier_price() {
        let base = RecordSet::from_rows(["Article", "Price"], [["A1", "10"], ["A2", "20"]]);
        let supplier = RecordSet::from_rows(["vendor_code", "price"], [["A1", "15"]]);

        let result = merge_prices(&base, &supplier, &columns()).unwrap();

        let expected = RecordSet::from_rows(["Article", "Price"], [["A1", "15"], ["A2", "20"]]);
        assert_eq!(result.records, expected);
        assert_eq!(result.updated, 1);
    }

    #[test]
    fn unmatched_rows_pass_through() {
        let base = RecordSet::from_rows(
            ["Article", "Name", "Price"],
            [["A9", "Saw", "99"], ["A1", "Drill", "10"]],
        );
        let supplier = RecordSet::from_rows(["vendor_code", "price"], [["A1", "12"]]);

        let result = merge_prices(&base, &supplier, &columns()).unwrap();
        assert_eq!(result.records.records()[0], base.records()[0]);
        assert_eq!(result.records.records()[1].values(), &["A1", "Drill", "12"]);
        assert_eq!(result.updated, 1);
    }

    #[test]
    fn index_skips_blank_rows_and_collapses_duplicates() {
        let supplier = RecordSet::from_rows(
            ["vendor_code", "price"],
            [["A1", "15"], ["A1", "17"], ["", "3"], ["A2", " "], ["A3", "9"]],
        );
        let index = PriceIndex::build(&supplier, 0, 1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(" A1 "), Some("17"));
        assert_eq!(index.get("A2"), None);

        let blank = RecordSet::from_rows(["vendor_code", "price"], [["", "3"]]);
        assert!(PriceIndex::build(&blank, 0, 1).is_empty());
    }

    #[test]
    fn later_duplicate_supplier_key_wins() {
        let base = RecordSet::from_rows(["Article", "Price"], [["A1", "10"]]);
        let supplier = RecordSet::from_rows(
            ["vendor_code", "price"],
            [["A1", "15"], ["A1", "17"]],
        );
        let result = merge_prices(&base, &supplier, &columns()).unwrap();
        assert_eq!(result.records.records()[0].get("Price"), Some("17"));
    }

    #[test]
    fn supplier_rows_with_blank_key_or_price_are_ignored() {
        let base = RecordSet::from_rows(["Article", "Price"], [["A1", "10"], ["", "5"]]);
        let supplier = RecordSet::from_rows(
            ["vendor_code", "price"],
            [["A1", " "], ["", "3"]],
        );
        let result = merge_prices(&base, &supplier, &columns()).unwrap();
        assert_eq!(result.updated, 0);
        assert_eq!(result.records, base);
    }

    #[test]
    fn keys_are_matched_after_trimming_and_prices_kept_verbatim() {
        let base = RecordSet::from_rows(["Article", "Price"], [[" A1 ", "10"]]);
        let supplier = RecordSet::from_rows(["vendor_code", "price"], [["A1", " 1 299,90 "]]);
        let result = merge_prices(&base, &supplier, &columns()).unwrap();
        assert_eq!(result.records.records()[0].get("Price"), Some("1 299,90"));
    }

    #[test]
    fn alternate_supplier_price_column() {
        let base = RecordSet::from_rows(["Article", "Price"], [["A1", "10"]]);
        let supplier = RecordSet::from_rows(
            ["vendor_code", "price", "price_recommended"],
            [["A1", "15", "19"]],
        );
        let cols = MergeColumns {
            supplier_price: "price_recommended".into(),
            ..columns()
        };
        let result = merge_prices(&base, &supplier, &cols).unwrap();
        assert_eq!(result.records.records()[0].get("Price"), Some("19"));
    }

    #[test]
    fn empty_base_is_rejected() {
        let base = RecordSet::from_rows(["Article", "Price"], Vec::<Vec<String>>::new());
        let supplier = RecordSet::from_rows(["vendor_code", "price"], [["A1", "15"]]);
        assert!(matches!(
            merge_prices(&base, &supplier, &columns()),
            Err(PriceSyncError::EmptyInput(Side::Base))
        ));
    }

    #[test]
    fn missing_columns_are_reported() {
        let base = RecordSet::from_rows(["Article", "Cost"], [["A1", "10"]]);
        let supplier = RecordSet::from_rows(["vendor_code", "price"], [["A1", "15"]]);
        match merge_prices(&base, &supplier, &columns()) {
            Err(PriceSyncError::MissingColumn { side, column }) => {
                assert_eq!(side, Side::Base);
                assert_eq!(column, "Price");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let base = RecordSet::from_rows(["Article", "Price"], [["A1", "10"]]);
        let supplier = RecordSet::from_rows(["sku", "price"], [["A1", "15"]]);
        assert!(matches!(
            merge_prices(&base, &supplier, &columns()),
            Err(PriceSyncError::MissingColumn {
                side: Side::Supplier,
                ..
            })
        ));
    }

    #[test]
    fn empty_supplier_changes_nothing() {
        let base = RecordSet::from_rows(["Article", "Price"], [["A1", "10"]]);
        let supplier = RecordSet::from_rows(["vendor_code", "price"], Vec::<Vec<String>>::new());
        let result = merge_prices(&base, &supplier, &columns()).unwrap();
        assert_eq!(result.updated, 0);
        assert_eq!(result.records, base);
    }
}
