use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (a spreadsheet CSV export)
/// * `.json`    – `[{ "Name": "...", "Volume": 1200, ... }, ...]`
/// * `.parquet` – flat primitive columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.column_names,
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Caches loaded tables by path, optionally expiring them after a time-to-live.
///
/// This belongs to the retrieval side only; the pipeline never sees it.
#[derive(Debug, Default)]
pub struct DatasetCache {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<PathBuf, (Instant, Arc<Dataset>)>>,
}

impl DatasetCache {
    /// `None` keeps entries for the life of the process.
    pub fn new(ttl: Option<Duration>) -> Self {
        DatasetCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached table for `path`, loading it on a miss or after expiry.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("dataset cache lock poisoned"))?;

        if let Some((loaded_at, dataset)) = entries.get(path) {
            let fresh = self.ttl.map_or(true, |ttl| loaded_at.elapsed() < ttl);
            if fresh {
                log::debug!("cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
            log::debug!("cache entry for {} expired", path.display());
        }

        let dataset = Arc::new(load_file(path)?);
        entries.insert(path.to_path_buf(), (Instant::now(), Arc::clone(&dataset)));
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names, one row per record.
/// Empty cells become `Null`; all other cells are typed by [`guess_cell_type`].
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let row: Record = headers
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let value = record.get(col_idx).unwrap_or("");
                (name.clone(), guess_cell_type(value))
            })
            .collect();

        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

/// Type a raw text cell. Formatted numbers such as `"1,200"` stay text; the
/// normalizer deals with those.
pub fn guess_cell_type(s: &str) -> CellValue {
    if s.trim().is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    // "NaN" and "inf" parse as f64 but are labels, not measurements.
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Name": "Ethereum", "Category": "L1", "Volume": 1200000, "Change %": -1.5 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Record::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Strings, signed/unsigned integers, floats and booleans map onto [`CellValue`];
/// other column types are rendered as text. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let record: Record = columns
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), extract_cell_value(col, row)))
                .collect();
            rows.push(record);
        }
    }

    Ok(Dataset::new(columns, rows))
}

// -- Parquet / Arrow helpers --

fn primitive_i64<T>(col: &ArrayRef, row: usize) -> Option<CellValue>
where
    T: arrow::datatypes::ArrowPrimitiveType,
    T::Native: TryInto<i64>,
{
    let value = col.as_primitive_opt::<T>()?.value(row);
    value.try_into().ok().map(CellValue::Integer)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::Int8 => primitive_i64::<Int8Type>(col, row),
        DataType::Int16 => primitive_i64::<Int16Type>(col, row),
        DataType::Int32 => primitive_i64::<Int32Type>(col, row),
        DataType::Int64 => primitive_i64::<Int64Type>(col, row),
        DataType::UInt8 => primitive_i64::<UInt8Type>(col, row),
        DataType::UInt16 => primitive_i64::<UInt16Type>(col, row),
        DataType::UInt32 => primitive_i64::<UInt32Type>(col, row),
        DataType::UInt64 => primitive_i64::<UInt64Type>(col, row),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_boolean_opt()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };

    value.unwrap_or_else(|| {
        arrow::util::display::array_value_to_string(col, row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null)
    })
}
