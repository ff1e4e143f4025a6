use crate::error::{DashboardError, DashboardResult};

use super::model::RawTable;

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

pub const DATE: &str = "date";
pub const QTY_DELTA: &str = "qty_delta";
pub const VALUE_DELTA: &str = "value_delta";
pub const CATEGORY: &str = "category";
pub const PRODUCT_ID: &str = "product_id";
pub const PRODUCT_NAME: &str = "product_name";

/// Columns that must be present after normalization. `category` is optional;
/// missing categories get the sentinel label during coercion.
const REQUIRED_COLUMNS: &[&str] = &[DATE, QTY_DELTA, VALUE_DELTA, PRODUCT_ID, PRODUCT_NAME];

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Known historical header spellings per canonical column. Matching trims
/// whitespace and ignores case, so each spelling is listed once. The
/// canonical name itself is always accepted, which makes normalization a
/// no-op on already-canonical input.
pub const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (
        DATE,
        &["tanggal so", "tanggal", "tgl so", "so date", "date"],
    ),
    (
        QTY_DELTA,
        &[
            "selisih qty (pcs)",
            "selisih qty",
            "selisih_qty",
            "selisih pcs",
            "qty variance",
        ],
    ),
    (
        VALUE_DELTA,
        &[
            "selisih value (rp)",
            "selisih value",
            "selisih_value",
            "selisih_rp",
            "selisih rp",
            "value variance",
        ],
    ),
    (CATEGORY, &["tag", "kategori", "category"]),
    (PRODUCT_ID, &["plu", "kode plu", "product code", "sku"]),
    (
        PRODUCT_NAME,
        &["descp", "deskripsi", "nama produk", "description", "product name"],
    ),
];

/// Canonical name for a raw header spelling, if it is a known alias.
fn canonical_for(raw_header: &str) -> Option<&'static str> {
    let needle = raw_header.trim().to_lowercase();
    COLUMN_ALIASES.iter().find_map(|(canonical, aliases)| {
        let hit = *canonical == needle || aliases.contains(&needle.as_str());
        hit.then_some(*canonical)
    })
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Rename known header spellings to their canonical names.
///
/// Unrecognized columns pass through with only whitespace trimmed. When two
/// raw headers map to the same canonical name the first occurrence wins and
/// later ones pass through untouched. Fails with the first missing required
/// canonical column.
pub fn normalize_headers(table: RawTable) -> DashboardResult<RawTable> {
    let mut headers = Vec::with_capacity(table.headers.len());

    for raw in &table.headers {
        let mapped = match canonical_for(raw) {
            Some(canonical) if !headers.iter().any(|h| h == canonical) => canonical.to_string(),
            _ => raw.trim().to_string(),
        };
        headers.push(mapped);
    }

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(DashboardError::MissingColumn(required));
        }
    }

    Ok(RawTable::new(headers, table.rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_headers(headers: &[&str]) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), Vec::new())
    }

    #[test]
    fn historical_spellings_converge() {
        let a = table_with_headers(&[
            "Tanggal SO",
            "PLU",
            "DESCP",
            "Tag",
            "Selisih Qty (Pcs)",
            "SELISIH_RP",
        ]);
        let b = table_with_headers(&[
            "TANGGAL",
            "PLU",
            "DESCP",
            "Tag",
            "SELISIH_QTY",
            "Selisih Value",
        ]);

        let a = normalize_headers(a).unwrap();
        let b = normalize_headers(b).unwrap();
        assert_eq!(a.headers, b.headers);
        assert_eq!(
            a.headers,
            vec![DATE, PRODUCT_ID, PRODUCT_NAME, CATEGORY, QTY_DELTA, VALUE_DELTA]
        );
    }

    #[test]
    fn canonical_input_is_a_noop() {
        let table = table_with_headers(&[
            DATE,
            QTY_DELTA,
            VALUE_DELTA,
            CATEGORY,
            PRODUCT_ID,
            PRODUCT_NAME,
        ]);
        let before = table.headers.clone();
        let after = normalize_headers(table).unwrap();
        assert_eq!(after.headers, before);
    }

    #[test]
    fn unknown_columns_pass_through() {
        let table = table_with_headers(&[
            "Tanggal SO",
            "PLU",
            "DESCP",
            "Selisih Qty (Pcs)",
            "Selisih Value (Rp)",
            "  Lokasi Gudang ",
        ]);
        let after = normalize_headers(table).unwrap();
        assert!(after.headers.contains(&"Lokasi Gudang".to_string()));
    }

    #[test]
    fn missing_date_column_is_reported_by_name() {
        let table = table_with_headers(&[
            "PLU",
            "DESCP",
            "Tag",
            "Selisih Qty (Pcs)",
            "Selisih Value (Rp)",
        ]);
        match normalize_headers(table) {
            Err(DashboardError::MissingColumn(col)) => assert_eq!(col, DATE),
            other => panic!("expected MissingColumn(date), got {other:?}"),
        }
    }

    #[test]
    fn duplicate_alias_first_wins() {
        let table = table_with_headers(&[
            "Tanggal SO",
            "TANGGAL",
            "PLU",
            "DESCP",
            "Selisih Qty (Pcs)",
            "Selisih Value (Rp)",
        ]);
        let after = normalize_headers(table).unwrap();
        assert_eq!(after.headers[0], DATE);
        // Second date-like column keeps its raw spelling.
        assert_eq!(after.headers[1], "TANGGAL");
    }
}
