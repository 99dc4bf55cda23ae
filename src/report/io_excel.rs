use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};
use survey_scores::builder::TableBuilder;

use crate::report::{
    io_common::{header_names, simplify_file_name, text_cell},
    *,
};

type Workbook = Xlsx<Cursor<Vec<u8>>>;

fn open_workbook(file: &Fetched) -> ReportResult<Workbook> {
    Xlsx::new(Cursor::new(file.bytes.clone())).context(OpeningExcelSnafu {
        path: file.name.clone(),
    })
}

fn get_range(
    workbook: &mut Workbook,
    file: &Fetched,
    sheet: &str,
) -> ReportResult<Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", &file.name, sheet);
    let available: Vec<String> = workbook.sheet_names().to_vec();
    workbook
        .worksheet_range(sheet)
        .context(MissingSheetSnafu {
            sheet,
            path: simplify_file_name(&file.name),
            available,
        })?
        .context(OpeningExcelSnafu {
            path: file.name.clone(),
        })
}

/// Reads one worksheet of a workbook into a table.
pub fn read_sheet(file: &Fetched, sheet: &str) -> ReportResult<Table> {
    let mut workbook = open_workbook(file)?;
    let wrange = get_range(&mut workbook, file, sheet)?;
    let table = range_to_table(&wrange);
    info!(
        "read_sheet: {} [{}]: {} rows",
        simplify_file_name(&file.name),
        sheet,
        table.num_rows()
    );
    Ok(table)
}

/// Reads several worksheets of the same workbook, in the order requested.
pub fn read_sheets(file: &Fetched, sheets: &[&str]) -> ReportResult<Vec<Table>> {
    let mut workbook = open_workbook(file)?;
    let mut res: Vec<Table> = Vec::new();
    for sheet in sheets {
        let wrange = get_range(&mut workbook, file, sheet)?;
        res.push(range_to_table(&wrange));
    }
    Ok(res)
}

/// The first row of the range is the header, the other rows are the values.
/// An empty range gives an empty table.
pub fn range_to_table(wrange: &Range<DataType>) -> Table {
    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = match iter.next() {
        Some(row) => row.iter().map(|c| read_cell(c).as_label()).collect(),
        None => return Table::default(),
    };
    debug!("range_to_table: header: {:?}", header);
    let mut builder = TableBuilder::new(&header_names(&header));
    for row in iter {
        builder.add_row(row.iter().map(read_cell).collect());
    }
    builder.build()
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::String(s) => text_cell(s),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        // Dates are kept as their serial number.
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::Empty => Cell::Missing,
        _ => {
            debug!("read_cell: treating {:?} as missing", cell);
            Cell::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(rows: &[Vec<DataType>]) -> Range<DataType> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut r = Range::new((0, 0), (height - 1, width - 1));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                r.set_value((i as u32, j as u32), v.clone());
            }
        }
        r
    }

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn converts_a_sheet() {
        let r = range(&[
            vec![s("Tahun"), s("Event"), s("Unit"), s("CSI")],
            vec![
                DataType::Int(2024),
                s("Lebaran"),
                s("Dufan"),
                DataType::Float(82.5),
            ],
            vec![DataType::Float(2025.0), s("Lebaran"), s("Dufan"), s("#N/A")],
        ]);
        let t = range_to_table(&r);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.cell("Tahun", 0), Some(&Cell::Number(2024.0)));
        assert_eq!(t.cell("CSI", 0), Some(&Cell::Number(82.5)));
        assert!(t.cell("CSI", 1).unwrap().is_missing());
        let sel = Selection {
            year: 2025,
            event: "Lebaran".to_string(),
            unit: "Dufan".to_string(),
        };
        assert_eq!(select_window(&t, &sel, 4).num_rows(), 2);
    }

    #[test]
    fn empty_cells_are_missing() {
        let r = range(&[
            vec![s("NPS"), s("Sentiment")],
            vec![DataType::Float(9.0), DataType::Empty],
            vec![DataType::Empty, s("Positive")],
        ]);
        let t = range_to_table(&r);
        assert!(t.cell("Sentiment", 0).unwrap().is_missing());
        assert!(t.cell("NPS", 1).unwrap().is_missing());
        assert_eq!(compute_scores(&t).promoter, Some(100.0));
    }

    #[test]
    fn numeric_headers_are_labelled() {
        let r = range(&[vec![DataType::Float(2024.0), DataType::Empty]]);
        let t = range_to_table(&r);
        assert_eq!(
            t.column_names(),
            vec!["2024".to_string(), "Unnamed: 1".to_string()]
        );
    }

    #[test]
    fn invalid_workbooks_are_reported() {
        let f = Fetched {
            name: "broken.xlsx".to_string(),
            bytes: b"not a zip file".to_vec(),
        };
        assert!(matches!(
            read_sheet(&f, "Dufan"),
            Err(ReportError::OpeningExcel { .. })
        ));
    }
}
