// Month keys from the free-form dates typed into FECHA_INGRESO

use chrono::NaiveDate;

use crate::sheet::CellValue;

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%y"];

/// Parse the date part of a cell
///
/// Time components after a space or `T` are ignored. `%Y` only accepts
/// four-digit years so `15/01/26` falls through to the two-digit layout.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    let raw = cell.to_string();
    let date_part = raw.trim().split(' ').next()?.split('T').next()?;
    if date_part.is_empty() {
        return None;
    }

    DATE_FORMATS.iter().find_map(|fmt| {
        if fmt.contains("%Y") && !has_four_digit_year(date_part, fmt) {
            return None;
        }
        NaiveDate::parse_from_str(date_part, fmt).ok()
    })
}

/// `YYYY-MM` for the cell's date, if it has one
pub fn month_key(cell: &CellValue) -> Option<String> {
    parse_date(cell).map(|d| d.format("%Y-%m").to_string())
}

fn has_four_digit_year(date: &str, fmt: &str) -> bool {
    let parts: Vec<&str> = date.split(['-', '/']).collect();
    let year = if fmt.starts_with("%Y") {
        parts.first()
    } else {
        parts.last()
    };
    year.is_some_and(|y| y.len() == 4)
}
