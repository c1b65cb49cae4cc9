#![cfg(feature = "web")]

use rust_xlsxwriter::{DocProperties, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::bill::Bill;

/// MIME type of an xlsx workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const CURRENCY_FORMAT: &str = "\"₹\"#,##0.00";

const COLUMNS: [(&str, f64); 7] = [
    ("S.No", 6.0),
    ("Item Code", 18.0),
    ("Description", 40.0),
    ("Unit", 10.0),
    ("Price", 12.0),
    ("Quantity", 10.0),
    ("Total", 14.0),
];

// Zero-based row positions of the fixed blocks
const TITLE_ROW: u32 = 0;
const META_ROW: u32 = 2;
const HEADER_ROW: u32 = 4;
const FIRST_ITEM_ROW: u32 = 5;

/// Render a bill as an XLSX workbook
///
/// The single "Bill" worksheet holds the shop name as a merged title, an
/// invoice/customer/date row, the column headers, one row per item and a
/// bold grand total below a blank row. Price and total cells carry a
/// currency number format.
///
/// # Arguments
/// * `bill` - The bill to render
///
/// # Returns
/// * `Result<Vec<u8>, XlsxError>` - XLSX file content as bytes or an error
pub fn to_xlsx(bill: &Bill) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_author(&bill.header.shop_name));

    let mut worksheet = Worksheet::new();
    worksheet.set_name("Bill")?;

    let title = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let currency = Format::new().set_num_format(CURRENCY_FORMAT);
    let bold = Format::new().set_bold();
    let bold_currency = Format::new().set_bold().set_num_format(CURRENCY_FORMAT);

    let last_col = (COLUMNS.len() - 1) as u16;
    worksheet.merge_range(TITLE_ROW, 0, TITLE_ROW, last_col, &bill.header.shop_name, &title)?;

    let meta = [
        (0, "Invoice No:"),
        (1, bill.header.invoice_no.as_str()),
        (3, "Customer:"),
        (4, bill.header.customer.as_str()),
        (6, "Date:"),
        (7, bill.header.date.as_str()),
    ];
    for (col, text) in meta {
        worksheet.write_string(META_ROW, col, text)?;
    }

    for (col, (name, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(HEADER_ROW, col, *name, &header)?;
    }

    let mut row = FIRST_ITEM_ROW;
    for (index, item) in bill.items().iter().enumerate() {
        worksheet.write_number(row, 0, (index + 1) as f64)?;
        worksheet.write_string(row, 1, &item.item_code)?;
        worksheet.write_string(row, 2, &item.description)?;
        worksheet.write_string(row, 3, &item.unit)?;
        worksheet.write_number_with_format(row, 4, item.price, &currency)?;
        worksheet.write_number(row, 5, item.quantity)?;
        worksheet.write_number_with_format(row, 6, item.total, &currency)?;
        row += 1;
    }

    // one blank row before the total
    row += 1;
    worksheet.write_string_with_format(row, 2, "GRAND TOTAL", &bold)?;
    worksheet.write_number_with_format(row, 6, bill.grand_total(), &bold_currency)?;

    workbook.push_worksheet(worksheet);

    workbook.save_to_buffer()
}

/// Attachment filename for a bill
///
/// `bill_<invoice>.xlsx` when an invoice number is set, `bill.xlsx`
/// otherwise. Characters that are unsafe in a header are replaced by `_`.
pub fn bill_filename(invoice_no: &str) -> String {
    if invoice_no.is_empty() {
        return "bill.xlsx".to_string();
    }

    let safe: String = invoice_no
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("bill_{safe}.xlsx")
}
