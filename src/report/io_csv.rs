// Primitives for reading CSV files.

use survey_scores::builder::TableBuilder;

use crate::report::{
    io_common::{header_names, simplify_file_name, text_cell},
    *,
};

/// Reads a CSV file with a header row into a table.
/// Rows may be shorter or longer than the header.
pub fn read_csv_table(file: &Fetched) -> ReportResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file.bytes.as_slice());

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvParseSnafu {
            path: file.name.clone(),
        })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    let names = header_names(&header);
    debug!("read_csv_table: {}: header: {:?}", file.name, names);

    let mut builder = TableBuilder::new(&names);
    for (idx, record_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let record = record_r.context(CsvParseSnafu {
            path: format!("{}:{}", simplify_file_name(&file.name), lineno),
        })?;
        builder.add_row(record.iter().map(text_cell).collect());
    }
    let table = builder.build();
    info!(
        "read_csv_table: {}: {} rows",
        simplify_file_name(&file.name),
        table.num_rows()
    );
    Ok(table)
}
