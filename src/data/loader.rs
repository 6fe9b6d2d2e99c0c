use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Datasets, RawTable};
use super::schema::{faculties_from_raw, programs_from_raw};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Where to read one table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource<'a> {
    pub path: &'a Path,
    /// Worksheet name; ignored for non-spreadsheet formats. `None` picks the
    /// first sheet.
    pub sheet: Option<&'a str>,
}

/// Read and convert both tables. Any failure here is fatal for the app.
pub fn load_datasets(faculties: TableSource<'_>, programs: TableSource<'_>) -> Result<Datasets> {
    let raw = load_table(faculties.path, faculties.sheet)
        .with_context(|| format!("loading faculties table from {}", faculties.path.display()))?;
    let faculties_ds = faculties_from_raw(&raw)
        .with_context(|| format!("converting {}", faculties.path.display()))?;

    let raw = load_table(programs.path, programs.sheet)
        .with_context(|| format!("loading programs table from {}", programs.path.display()))?;
    let programs_ds = programs_from_raw(&raw)
        .with_context(|| format!("converting {}", programs.path.display()))?;

    for (name, empty) in [("faculties", faculties_ds.is_empty()), ("programs", programs_ds.is_empty())] {
        if empty {
            log::warn!("{name} table has no data rows; every selection will show no data");
        }
    }

    log::info!(
        "Loaded {} faculty rows ({} institutes, {} faculties) and {} program rows ({} programs)",
        faculties_ds.len(),
        faculties_ds.dictionaries.institute.len(),
        faculties_ds.dictionaries.faculty.len(),
        programs_ds.len(),
        programs_ds.dictionaries.program.len(),
    );

    Ok(Datasets {
        faculties: faculties_ds,
        programs: programs_ds,
    })
}

/// Load a table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first row is the header
/// * `.csv`     – header row, every cell read as text
/// * `.parquet` – e.g. written by `df.to_parquet()`
/// * `.json`    – `[{ "REGION": "...", "AÑO": 2020, ... }, ...]`
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, sheet)?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::debug!(
        "{}: {} column(s), {} row(s)",
        path.display(),
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;

    let names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .with_context(|| format!("worksheet '{wanted}' not found (available: {names:?})"))?,
        None => names.first().cloned().context("workbook has no worksheets")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading worksheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| spreadsheet_cell(c).to_string()).collect(),
        None => bail!("worksheet '{sheet_name}' is empty"),
    };
    let rows = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(d) => CellValue::Float(d.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`).
/// Headers are the union of keys in order of first appearance.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every non-empty cell is kept as text; the schema layer parses the numeric
/// columns so categorical values like `"007"` survive untouched.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Empty);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Dictionary-encoded categories and anything else: use Arrow's own
        // rendering of the value.
        _ => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
                .map_err(|e| anyhow!("unsupported column type {:?}: {e}", col.data_type()))?;
            CellValue::Text(formatter.value(row).to_string())
        }
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::Facet;

    const CSV_FACULTIES: &str = "REGION,FINANCIAMIENTO,FACULTAD UDLA,Instituto,AÑO,Participación\n\
        Metropolitana,PRIVADA,Ingeniería,UNIVERSIDAD DE LAS AMERICAS,2020,0.12\n\
        Metropolitana,PÚBLICA,Ingeniería,UNIVERSIDAD DE CHILE,2020,0.30\n";

    const CSV_PROGRAMS: &str = "REGION,FINANCIAMIENTO,FACULTAD UDLA,CARRERA UDLA,Instituto,AÑO,Participación por carrera\n\
        Metropolitana,PRIVADA,Ingeniería,Software,UNIVERSIDAD DE LAS AMERICAS,2021,0.2\n";

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_cells_are_text_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "t.csv", "A,B\n007,\n");
        let table = load_table(&path, None).unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec![CellValue::Text("007".into()), CellValue::Empty]]);
    }

    #[test]
    fn json_records_become_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "t.json",
            r#"[{"Instituto": "A", "AÑO": 2020, "Participación": 0.5}, {"Instituto": "B"}]"#,
        );
        let table = load_table(&path, None).unwrap();
        assert_eq!(table.headers.len(), 3);
        let year_col = table.column_index(&["AÑO"]).unwrap();
        assert_eq!(table.rows[0][year_col], CellValue::Integer(2020));
        assert_eq!(table.rows[1][year_col], CellValue::Empty);
    }

    #[test]
    fn parquet_columns_keep_their_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("Instituto", DataType::Utf8, false),
            Field::new("AÑO", DataType::Int64, false),
            Field::new("Participación", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(Int64Array::from(vec![2020, 2021])),
                Arc::new(Float64Array::from(vec![Some(0.25), None])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path, None).unwrap();
        assert_eq!(table.headers, vec!["Instituto", "AÑO", "Participación"]);
        assert_eq!(
            table.rows[0],
            vec![CellValue::Text("A".into()), CellValue::Integer(2020), CellValue::Float(0.25)]
        );
        assert_eq!(table.rows[1][2], CellValue::Empty);
    }

    /// Two sheets: a decoy first, then the faculties table under `Hoja1`.
    fn write_workbook(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("FACUL123.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();

        let other = workbook.add_worksheet();
        other.set_name("Otra").unwrap();
        other.write_string(0, 0, "X").unwrap();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Hoja1").unwrap();
        let headers = ["REGION", "FINANCIAMIENTO", "FACULTAD UDLA", "Instituto", "AÑO", "Participación"];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        let rows = [("A", 2020.0, 0.10), ("A", 2020.0, 0.05), ("B", 2021.0, 0.20)];
        for (i, (institute, year, share)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, "Metropolitana").unwrap();
            sheet.write_string(r, 1, "PRIVADA").unwrap();
            sheet.write_string(r, 2, "Ingeniería").unwrap();
            sheet.write_string(r, 3, *institute).unwrap();
            sheet.write_number(r, 4, *year).unwrap();
            sheet.write_number(r, 5, *share).unwrap();
        }

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn spreadsheet_sheet_is_picked_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir);

        let table = load_table(&path, Some("Hoja1")).unwrap();
        assert_eq!(table.headers[3], "Instituto");
        assert_eq!(table.rows.len(), 3);
        let year_col = table.column_index(&["AÑO"]).unwrap();
        assert_eq!(table.rows[0][year_col], CellValue::Float(2020.0));

        let first = load_table(&path, None).unwrap();
        assert_eq!(first.headers, vec!["X"]);

        let err = load_table(&path, Some("Nope")).unwrap_err();
        assert!(format!("{err:#}").contains("worksheet 'Nope' not found"));
    }

    #[test]
    fn spreadsheet_feeds_the_pivot() {
        let dir = tempfile::tempdir().unwrap();
        let faculties = write_workbook(&dir);
        let programs = write_file(&dir, "carreras.csv", CSV_PROGRAMS);

        let ds = load_datasets(
            TableSource { path: &faculties, sheet: Some("Hoja1") },
            TableSource { path: &programs, sheet: None },
        )
        .unwrap();
        assert_eq!(ds.faculties.len(), 3);
        assert_eq!(ds.faculties.records[0].year, 2020);

        let pivot = crate::data::pivot::aggregate(&ds.faculties.records, &ds.faculties.dictionaries.institute).unwrap();
        assert_eq!(pivot.years(), [2020, 2021]);
        assert!((pivot.lookup("A", 2020).unwrap() - 15.0).abs() < 1e-9);
        assert_eq!(pivot.lookup("B", 2020), Some(0.0));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_table(Path::new("datos.txt"), None).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn loads_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let faculties = write_file(&dir, "facultades.csv", CSV_FACULTIES);
        let programs = write_file(&dir, "carreras.csv", CSV_PROGRAMS);

        let ds = load_datasets(
            TableSource { path: &faculties, sheet: None },
            TableSource { path: &programs, sheet: None },
        )
        .unwrap();
        assert_eq!(ds.faculties.len(), 2);
        assert_eq!(ds.programs.len(), 1);
        assert_eq!(ds.faculties.distinct_values(Facet::Financing), vec!["PRIVADA", "PÚBLICA"]);
        assert_eq!(ds.programs.distinct_values(Facet::Program), vec!["Software"]);
    }

    #[test]
    fn schema_violation_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let faculties = write_file(&dir, "facultades.csv", "REGION,Instituto\nRM,A\n");
        let programs = write_file(&dir, "carreras.csv", CSV_PROGRAMS);

        let err = load_datasets(
            TableSource { path: &faculties, sheet: None },
            TableSource { path: &programs, sheet: None },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("missing column 'FINANCIAMIENTO'"));
    }
}
