use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{info, warn};
use ndarray::{Array2, ArrayView1, Axis};

use super::{
    encoding::{FitScope, SexEncoder, SexEncoding},
    record::{NUM_FIELDS, NUM_MEASUREMENTS, Record, Sex},
};
use crate::{MlErr, Result};

/// A column-addressable table holding every record of the input file, with its categorical
/// column already encoded into numeric columns.
#[derive(Debug, Clone)]
pub struct RowStore {
    names: Vec<String>,
    table: Array2<f32>,
    encoder: SexEncoder,
}

impl RowStore {
    /// Loads a whitespace-delimited file.
    ///
    /// # Arguments
    /// * `path` - The path to the file.
    /// * `columns` - The ordered names of the 9 input columns, the first one being categorical.
    /// * `encoding` - How the categorical column is encoded.
    /// * `scope` - Which rows the categorical encoder is fitted on.
    ///
    /// # Returns
    /// The loaded store or an error if the file can't be read or a line is malformed.
    pub fn load<P: AsRef<Path>>(
        path: P,
        columns: &[&str],
        encoding: SexEncoding,
        scope: FitScope,
    ) -> Result<Self> {
        let path = path.as_ref();
        info!("loading dataset from {}", path.display());

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), columns, encoding, scope)
    }

    /// Same as `load`, reading from any buffered reader.
    pub fn from_reader<R: BufRead>(
        reader: R,
        columns: &[&str],
        encoding: SexEncoding,
        scope: FitScope,
    ) -> Result<Self> {
        if columns.len() != NUM_FIELDS {
            return Err(MlErr::SizeMismatch {
                what: "column names",
                got: columns.len(),
                expected: NUM_FIELDS,
            });
        }

        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            records.push(Record::parse(&line, i + 1)?);
        }

        Ok(Self::from_records(&records, columns, encoding, scope))
    }

    /// Builds the table out of already parsed records.
    ///
    /// `columns` must hold exactly 9 names, as checked by `from_reader`.
    fn from_records(
        records: &[Record],
        columns: &[&str],
        encoding: SexEncoding,
        scope: FitScope,
    ) -> Self {
        let fit_rows = scope.rows(records.len());
        if scope == FitScope::All {
            info!("fitting the categorical encoding over every row, test rows included");
        }

        let encoder = SexEncoder::fit(encoding, records[..fit_rows].iter().map(|r| r.sex));
        if encoding == SexEncoding::Indicator && encoder.levels().len() > 2 {
            warn!(
                "single indicator encoding of {:?} keeps only level {}, the other {} collapse",
                columns[0],
                encoder.levels()[0],
                encoder.levels().len() - 1
            );
        }

        let mut names = encoder.column_names(columns[0]);
        names.extend(columns[1..].iter().map(|name| name.to_string()));

        let sex_width = encoder.width();
        let mut table = Array2::zeros((records.len(), sex_width + NUM_MEASUREMENTS + 1));
        for (mut row, record) in table.axis_iter_mut(Axis(0)).zip(records) {
            let Some(row) = row.as_slice_mut() else {
                unreachable!("rows of a standard layout array are contiguous");
            };

            let (sex, rest) = row.split_at_mut(sex_width);
            encoder.encode_into(record.sex, sex);

            let (measurements, rings) = rest.split_at_mut(NUM_MEASUREMENTS);
            measurements.copy_from_slice(&record.measurements);
            rings[0] = record.rings as f32;
        }

        info!("loaded {} rows with columns {:?}", records.len(), names);

        Self {
            names,
            table,
            encoder,
        }
    }

    /// Returns the amount of rows.
    pub fn len(&self) -> usize {
        self.table.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the names of the stored (already encoded) columns, in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| MlErr::UnknownColumn(name.to_string()))
    }

    /// Returns a column by name.
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f32>> {
        let idx = self.column_index(name)?;
        Ok(self.table.column(idx))
    }

    /// Returns the `i`-th row or `None` if out of bounds.
    pub fn row(&self, i: usize) -> Option<ArrayView1<'_, f32>> {
        (i < self.len()).then(|| self.table.row(i))
    }

    /// Returns the levels of the categorical column the encoding was fitted with.
    pub fn levels(&self) -> &[Sex] {
        self.encoder.levels()
    }

    pub fn encoding(&self) -> SexEncoding {
        self.encoder.encoding()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::dataset::record::ABALONE_COLUMNS;

    const SAMPLE: &str = "\
M 0.455 0.365 0.095 0.514 0.2245 0.101 0.15 15
M 0.35 0.265 0.09 0.2255 0.0995 0.0485 0.07 7

F 0.53 0.42 0.135 0.677 0.2565 0.1415 0.21 9
I 0.33 0.255 0.08 0.205 0.0895 0.0395 0.055 7
";

    fn store(encoding: SexEncoding, scope: FitScope) -> Result<RowStore> {
        RowStore::from_reader(Cursor::new(SAMPLE), &ABALONE_COLUMNS, encoding, scope)
    }

    #[test]
    fn one_row_per_non_empty_line() {
        let store = store(SexEncoding::Indicator, FitScope::All).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.column_names().len(), NUM_FIELDS);
    }

    #[test]
    fn preserves_file_order() {
        let store = store(SexEncoding::Indicator, FitScope::All).unwrap();
        let rings = store.column("rings").unwrap();
        assert_eq!(rings.to_vec(), [15., 7., 9., 7.]);
    }

    #[test]
    fn indicator_marks_the_first_level() {
        let store = store(SexEncoding::Indicator, FitScope::All).unwrap();
        let sex = store.column("sex").unwrap();

        assert_eq!(store.levels(), &[Sex::Female, Sex::Infant, Sex::Male]);
        assert_eq!(sex.to_vec(), [0., 0., 1., 0.]);
    }

    #[test]
    fn one_hot_widens_the_table() {
        let store = store(SexEncoding::OneHot, FitScope::All).unwrap();

        assert_eq!(store.column_names()[..3], ["sex_F", "sex_I", "sex_M"]);
        assert_eq!(store.row(3).unwrap().to_vec()[..3], [0., 1., 0.]);
        assert!(store.column("sex").is_err());
    }

    #[test]
    fn prefix_scope_fits_only_the_first_rows() {
        let store = store(SexEncoding::OneHot, FitScope::Prefix(2)).unwrap();

        assert_eq!(store.levels(), &[Sex::Male]);
        assert_eq!(store.column("sex_M").unwrap().to_vec(), [1., 1., 0., 0.]);
    }

    #[test]
    fn malformed_line_reports_its_physical_number() {
        let data = "M 0.455 0.365 0.095 0.514 0.2245 0.101 0.15 15\n\nF 0.53 0.42\n";
        let err = RowStore::from_reader(
            Cursor::new(data),
            &ABALONE_COLUMNS,
            SexEncoding::Indicator,
            FitScope::All,
        )
        .unwrap_err();

        assert!(matches!(err, MlErr::Parse { line: 3, .. }));
    }

    #[test]
    fn wrong_amount_of_column_names() {
        let err = RowStore::from_reader(
            Cursor::new(SAMPLE),
            &ABALONE_COLUMNS[..8],
            SexEncoding::Indicator,
            FitScope::All,
        )
        .unwrap_err();

        assert!(matches!(err, MlErr::SizeMismatch { got: 8, .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RowStore::load(
            "definitely/not/here.data",
            &ABALONE_COLUMNS,
            SexEncoding::Indicator,
            FitScope::All,
        )
        .unwrap_err();

        assert!(matches!(err, MlErr::Io(_)));
    }
}
