//! Sheet data model
//!
//! Cells, row objects, the payment record written by POST and the SLI
//! reading returned next to row data.

pub mod cell;
pub mod record;
pub mod row;
pub mod sli;

pub use cell::{CellRef, CellValue};
pub use record::{check_headers, HeaderCheck, PaymentRecord, PAYMENT_FIELDS};
pub use row::{rows_to_objects, RowObject};
pub use sli::SliReading;
