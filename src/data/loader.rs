use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{CellValue, Column, Table, TableError};

/// Delimiter tried first.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Delimiter tried when the default one yields a single column.
pub const FALLBACK_DELIMITER: u8 = b';';

/// Cell texts treated as missing values (the usual dataframe NA spellings).
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "{} parsed into {found} column(s) with both ',' and ';' delimiters",
        path.display()
    )]
    TooFewColumns {
        path: PathBuf,
        found: usize,
        /// Why the comma parse was rejected, when it failed outright.
        #[source]
        cause: Option<Box<DataLoadError>>,
    },
    #[error("inconsistent table shape: {0}")]
    Shape(#[from] TableError),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the dataset at `path`.
///
/// The file is read with `,` first. A parse that yields a single column (or
/// fails to tokenize) means the delimiter did not match, so the file is read
/// again with `;`. Only a parse with more than one column is accepted.
pub fn load_table(path: &Path) -> Result<Table, DataLoadError> {
    let cause = match read_delimited(path, DEFAULT_DELIMITER) {
        Ok(table) if table.n_cols() > 1 => return Ok(table),
        Ok(table) => {
            log::debug!(
                "{}: {} column(s) with ',' delimiter, retrying with ';'",
                path.display(),
                table.n_cols()
            );
            None
        }
        Err(e @ DataLoadError::Open { .. }) => return Err(e),
        Err(e) => {
            log::debug!("{}: comma parse failed ({e}), retrying with ';'", path.display());
            Some(Box::new(e))
        }
    };

    let table = read_delimited(path, FALLBACK_DELIMITER)?;
    if table.n_cols() > 1 {
        Ok(table)
    } else {
        Err(DataLoadError::TooFewColumns {
            path: path.to_path_buf(),
            found: table.n_cols(),
            cause,
        })
    }
}

/// Parse `path` as a headed CSV file with the given delimiter.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        for (col_idx, value) in record.iter().enumerate() {
            cells[col_idx].push(guess_cell_type(value));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();

    Ok(Table::new(columns)?)
}

fn guess_cell_type(s: &str) -> CellValue {
    if NULL_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        // `parse` accepts any casing of "nan"; those are missing too.
        return if f.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(f)
        };
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}
