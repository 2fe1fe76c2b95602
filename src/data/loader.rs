use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
    Int32Array, Int64Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::{Column, Record, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a registry file could not be turned into a [`Table`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of records")]
    NotAnArray,

    #[error("row {0} is not a JSON object")]
    NotAnObject(usize),

    #[error("row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a registry table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "Nombre de la Unidad Económica": ..., ... }, ...]`
/// * `.csv`     – header row with the same keys
/// * `.parquet` – flat columns named by the same keys
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records from {} with columns {:?}",
        table.len(),
        path.display(),
        table.columns().iter().map(|c| c.key()).collect::<Vec<_>>()
    );
    Ok(table)
}

/// Record the known columns of one source row, in first-seen order.
fn note_columns<'a>(columns: &mut Vec<Column>, keys: impl IntoIterator<Item = &'a str>) {
    for key in keys {
        match Column::from_key(key) {
            Some(col) if !columns.contains(&col) => columns.push(col),
            Some(_) => {}
            None => log::trace!("ignoring column {key:?}"),
        }
    }
}

/// Decode row objects (from JSON, CSV or Parquet) into a table. `columns`
/// seeds the schema for formats that declare it up front.
fn table_from_objects(
    mut columns: Vec<Column>,
    objects: Vec<Map<String, JsonValue>>,
) -> Result<Table> {
    let mut records = Vec::with_capacity(objects.len());

    for (row, obj) in objects.into_iter().enumerate() {
        note_columns(&mut columns, obj.keys().map(String::as_str));
        let record: Record = serde_json::from_value(JsonValue::Object(obj))
            .map_err(|source| LoadError::Record { row, source })?;
        records.push(record);
    }

    Ok(Table::from_records(columns, records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Nombre de la Unidad Económica": "PAPELERIA LA ESTRELLA",
///     "Municipio": "Toluca",
///     "Latitud": 19.29,
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text)
}

/// Parse records-oriented JSON text.
pub fn parse_json(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text)?;
    let JsonValue::Array(items) = root else {
        return Err(LoadError::NotAnArray);
    };

    let objects = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::Object(obj) => Ok(obj),
            _ => Err(LoadError::NotAnObject(i)),
        })
        .collect::<Result<Vec<_>>>()?;

    table_from_objects(Vec::new(), objects)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the registry keys, one record per line.
/// Empty fields are null.
fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Read CSV records from any reader.
///
/// Cells are handed to the record decoder as strings so text such as `007`
/// or `NaN` is kept as written.
pub fn read_csv<R: std::io::Read>(rdr: R) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let mut columns = Vec::new();
    note_columns(&mut columns, headers.iter());

    let mut objects = Vec::new();
    for result in reader.records() {
        let record = result?;
        let obj = headers
            .iter()
            .zip(record.iter())
            .map(|(key, cell)| (key.to_string(), JsonValue::from(cell)))
            .collect::<Map<_, _>>();
        objects.push(obj);
    }

    table_from_objects(columns, objects)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose columns are named by the registry keys.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Every row is turned into a JSON object
/// and decoded through the same path as the JSON loader.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut columns = Vec::new();
    let mut objects = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        if columns.is_empty() {
            note_columns(&mut columns, schema.fields().iter().map(|f| f.name().as_str()));
            for field in schema.fields().iter().filter(|f| !is_supported(f.data_type())) {
                log::warn!(
                    "parquet column {:?} has unsupported type {:?}, reading as null",
                    field.name(),
                    field.data_type()
                );
            }
        }

        for row in 0..batch.num_rows() {
            let mut obj = Map::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_json_value(batch.column(col_idx), row);
                obj.insert(field.name().clone(), value);
            }
            objects.push(obj);
        }
    }

    table_from_objects(columns, objects)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_json_value(col: &Arc<dyn Array>, row: usize) -> JsonValue {
    if col.is_null(row) {
        return JsonValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(s) => JsonValue::from(s.value(row)),
            None => JsonValue::Null,
        },
        DataType::LargeUtf8 => JsonValue::from(col.as_string::<i64>().value(row)),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(JsonValue::Null, |a| JsonValue::from(a.value(row))),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(JsonValue::Null, |a| JsonValue::from(a.value(row))),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(JsonValue::Null, |a| JsonValue::from(a.value(row) as f64)),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(JsonValue::Null, |a| JsonValue::from(a.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map_or(JsonValue::Null, |a| JsonValue::from(a.value(row))),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(..) => temporal_text(col, row)
            .map_or(JsonValue::Null, JsonValue::from),
        _ => JsonValue::Null,
    }
}

fn is_supported(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
            | DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(..)
    )
}

/// Dates and timestamps as `YYYY-MM-DDTHH:MM:SS`, which `parse_year` reads.
fn temporal_text(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    let any = col.as_any();
    let dt = match col.data_type() {
        DataType::Date32 => any.downcast_ref::<Date32Array>()?.value_as_datetime(row),
        DataType::Date64 => any.downcast_ref::<Date64Array>()?.value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Second, _) => {
            any.downcast_ref::<TimestampSecondArray>()?.value_as_datetime(row)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            any.downcast_ref::<TimestampMillisecondArray>()?.value_as_datetime(row)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            any.downcast_ref::<TimestampMicrosecondArray>()?.value_as_datetime(row)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            any.downcast_ref::<TimestampNanosecondArray>()?.value_as_datetime(row)
        }
        _ => None,
    }?;
    Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}
