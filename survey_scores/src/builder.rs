pub use crate::config::*;

/// A builder for assembling a table row by row.
///
/// ```
/// use survey_scores::builder::TableBuilder;
/// use survey_scores::Cell;
///
/// let mut builder = TableBuilder::new(&["CSI".to_string(), "Domisili".to_string()]);
/// builder.add_row(vec![Cell::Number(5.0), Cell::Text("Jakarta".to_string())]);
/// builder.add_row(vec![Cell::Missing]);
/// let table = builder.build();
///
/// assert_eq!(table.num_rows(), 2);
/// assert!(table.cell("Domisili", 1).unwrap().is_missing());
/// ```
pub struct TableBuilder {
    _names: Vec<String>,
    _values: Vec<Vec<Cell>>,
    _num_rows: usize,
}

impl TableBuilder {
    pub fn new(column_names: &[String]) -> TableBuilder {
        TableBuilder {
            _names: column_names.to_vec(),
            _values: column_names.iter().map(|_| Vec::new()).collect(),
            _num_rows: 0,
        }
    }

    /// Adds a row.
    ///
    /// Rows shorter than the header are padded with missing values, the
    /// extra cells of longer rows are dropped.
    pub fn add_row(&mut self, row: Vec<Cell>) {
        let mut cells = row.into_iter();
        for col in self._values.iter_mut() {
            col.push(cells.next().unwrap_or(Cell::Missing));
        }
        self._num_rows += 1;
    }

    /// Builds a single-column table, handy for tests and quick computations.
    pub fn single_column(name: &str, values: Vec<Cell>) -> Table {
        let mut builder = TableBuilder::new(&[name.to_string()]);
        for v in values {
            builder.add_row(vec![v]);
        }
        builder.build()
    }

    pub fn build(self) -> Table {
        Table {
            columns: self
                ._names
                .into_iter()
                .zip(self._values)
                .map(|(name, values)| Column { name, values })
                .collect(),
            num_rows: self._num_rows,
        }
    }
}
