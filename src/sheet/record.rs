//! Payment record accepted on the write path

use serde::Deserialize;
use serde_json::{Map, Value};

use super::cell::CellValue;

/// Column order used when a payment record is appended
pub const PAYMENT_FIELDS: [&str; 7] = [
    "fecha_ingreso",
    "empresa",
    "concepto_pago",
    "moneda",
    "monto",
    "nro_operacion",
    "detalle",
];

/// One payment as posted by the dashboard
///
/// Only a JSON object is accepted. Every field is optional; missing or `null`
/// fields become empty cells and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PaymentRecord {
    pub fecha_ingreso: CellValue,
    pub empresa: CellValue,
    pub concepto_pago: CellValue,
    pub moneda: CellValue,
    pub monto: CellValue,
    pub nro_operacion: CellValue,
    pub detalle: CellValue,
}

impl From<Map<String, Value>> for PaymentRecord {
    fn from(mut fields: Map<String, Value>) -> Self {
        let mut take = |name: &str| fields.remove(name).map(CellValue::from).unwrap_or_default();
        Self {
            fecha_ingreso: take("fecha_ingreso"),
            empresa: take("empresa"),
            concepto_pago: take("concepto_pago"),
            moneda: take("moneda"),
            monto: take("monto"),
            nro_operacion: take("nro_operacion"),
            detalle: take("detalle"),
        }
    }
}

impl PaymentRecord {
    /// Cells in fixed column order, independent of the target sheet's headers
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            self.fecha_ingreso.clone(),
            self.empresa.clone(),
            self.concepto_pago.clone(),
            self.moneda.clone(),
            self.monto.clone(),
            self.nro_operacion.clone(),
            self.detalle.clone(),
        ]
    }
}

/// Outcome of comparing a sheet's header row with the write column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderCheck {
    Match,
    /// Sheet has no header row yet
    NoHeaders,
    Mismatch { expected: Vec<String>, actual: Vec<String> },
}

/// Compare the first `expected.len()` headers, ignoring case and surrounding spaces
pub fn check_headers(expected: &[String], header_row: Option<&[CellValue]>) -> HeaderCheck {
    let Some(header_row) = header_row.filter(|r| !r.is_empty()) else {
        return HeaderCheck::NoHeaders;
    };
    let actual: Vec<String> = header_row
        .iter()
        .take(expected.len())
        .map(CellValue::to_key)
        .collect();

    let same = actual.len() == expected.len()
        && expected
            .iter()
            .zip(&actual)
            .all(|(e, a)| e.trim().eq_ignore_ascii_case(a.trim()));

    if same {
        HeaderCheck::Match
    } else {
        HeaderCheck::Mismatch {
            expected: expected.to_vec(),
            actual,
        }
    }
}
