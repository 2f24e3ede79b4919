//! Landed-cost analysis of a packing list
//!
//! The sheet's SLI cell holds the total surcharge (freight, insurance,
//! duties). It is spread over the products in proportion to their FOB value.

use serde::Serialize;

use crate::sheet::{CellValue, RowObject};

const QTY_COLUMNS: &[&str] = &["Cantidad", "Qty", "Cant"];
const UNIT_COLUMNS: &[&str] = &["Precio Unitario", "Unit Price", "FOB Unit", "PRECIO_UNITARIO"];
const TOTAL_COLUMNS: &[&str] = &["Total", "Amount", "PRECIO_TOTAL"];
const NAME_COLUMNS: &[&str] = &["Producto", "Product", "Name", "Item", "Description"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandedProduct {
    pub name: CellValue,
    pub qty: f64,
    pub unit_fob: f64,
    pub total_fob: f64,
    pub unit_landed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandedCost {
    pub total_fob: f64,
    pub sli: f64,
    pub factor: f64,
    pub products: Vec<LandedProduct>,
}

fn number(row: &RowObject, columns: &[&str]) -> f64 {
    row.get_any_ignore_case(columns)
        .and_then(CellValue::as_f64)
        .unwrap_or(0.0)
}

/// Spread `sli` over the rows that have both a quantity and a unit price
pub fn landed_cost(rows: &[RowObject], sli: f64) -> LandedCost {
    let mut products = Vec::new();
    let mut total_fob = 0.0;

    for row in rows {
        let qty = number(row, QTY_COLUMNS);
        let unit_fob = number(row, UNIT_COLUMNS);
        if qty <= 0.0 || unit_fob <= 0.0 {
            continue;
        }

        let listed_total = number(row, TOTAL_COLUMNS);
        let row_total = if listed_total == 0.0 || listed_total.is_nan() {
            qty * unit_fob
        } else {
            listed_total
        };

        let name = row
            .get_any_ignore_case(NAME_COLUMNS)
            .filter(|v| !v.is_falsy())
            .or_else(|| row.first_value())
            .cloned()
            .unwrap_or_default();

        total_fob += row_total;
        products.push(LandedProduct {
            name,
            qty,
            unit_fob,
            total_fob: row_total,
            unit_landed: 0.0,
        });
    }

    let factor = if total_fob > 0.0 { sli / total_fob } else { 0.0 };
    for product in &mut products {
        product.unit_landed = product.unit_fob * (1.0 + factor);
    }

    LandedCost {
        total_fob,
        sli,
        factor,
        products,
    }
}
