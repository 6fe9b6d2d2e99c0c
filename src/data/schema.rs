use std::fmt;

use thiserror::Error;

use super::model::{
    CellValue, Dataset, Dictionaries, FacultyDataset, ParticipationRecord,
    ProgramParticipationRecord, ProgramDataset, RawTable,
};

// ---------------------------------------------------------------------------
// Canonical columns
// ---------------------------------------------------------------------------

const REGION: &[&str] = &["REGION", "REGIÓN"];
const FINANCING: &[&str] = &["FINANCIAMIENTO"];
const FACULTY: &[&str] = &["FACULTAD UDLA"];
const PROGRAM: &[&str] = &["CARRERA UDLA"];
const INSTITUTE: &[&str] = &["Instituto"];
const YEAR: &[&str] = &["AÑO", "ANO", "ANIO"];
/// Older exports name the metric after the table it came from.
const SHARE: &[&str] = &[
    "Participación",
    "Participación por facultad",
    "Participación por carrera",
];

/// Which of the two input tables is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Faculties,
    Programs,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Faculties => write!(f, "faculties"),
            TableKind::Programs => write!(f, "programs"),
        }
    }
}

/// The input does not conform to the documented layout. Always fatal.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{table} table is missing column '{column}' (found: {found:?})")]
    MissingColumn {
        table: TableKind,
        column: &'static str,
        found: Vec<String>,
    },
    #[error("{table} table, row {row}: column '{column}' has invalid value '{value}'")]
    InvalidCell {
        table: TableKind,
        /// 1-based, counting the header row, i.e. the row number a
        /// spreadsheet application shows.
        row: usize,
        column: &'static str,
        value: String,
    },
}

struct Columns {
    region: usize,
    financing: usize,
    faculty: usize,
    institute: usize,
    year: usize,
    share: usize,
}

impl Columns {
    fn locate(raw: &RawTable, table: TableKind) -> Result<Self, SchemaError> {
        Ok(Columns {
            region: require(raw, table, REGION)?,
            financing: require(raw, table, FINANCING)?,
            faculty: require(raw, table, FACULTY)?,
            institute: require(raw, table, INSTITUTE)?,
            year: require(raw, table, YEAR)?,
            share: require(raw, table, SHARE)?,
        })
    }
}

fn require(
    raw: &RawTable,
    table: TableKind,
    aliases: &'static [&'static str],
) -> Result<usize, SchemaError> {
    raw.column_index(aliases).ok_or_else(|| SchemaError::MissingColumn {
        table,
        column: aliases[0],
        found: raw.headers.clone(),
    })
}

// ---------------------------------------------------------------------------
// RawTable → typed datasets
// ---------------------------------------------------------------------------

/// Convert the faculties sheet.
pub fn faculties_from_raw(raw: &RawTable) -> Result<FacultyDataset, SchemaError> {
    let columns = Columns::locate(raw, TableKind::Faculties)?;
    let mut dictionaries = Dictionaries::default();
    let mut records = Vec::with_capacity(raw.rows.len());

    for (row_no, row) in data_rows(raw, TableKind::Faculties) {
        records.push(convert_row(row, row_no, &columns, TableKind::Faculties, &mut dictionaries)?);
    }

    Ok(Dataset { records, dictionaries })
}

/// Convert the programs sheet (same layout plus `CARRERA UDLA`).
pub fn programs_from_raw(raw: &RawTable) -> Result<ProgramDataset, SchemaError> {
    let columns = Columns::locate(raw, TableKind::Programs)?;
    let program_col = require(raw, TableKind::Programs, PROGRAM)?;
    let mut dictionaries = Dictionaries::default();
    let mut records = Vec::with_capacity(raw.rows.len());

    for (row_no, row) in data_rows(raw, TableKind::Programs) {
        let record = convert_row(row, row_no, &columns, TableKind::Programs, &mut dictionaries)?;
        let program = dictionaries.program.intern(&category_text(cell(row, program_col)));
        records.push(ProgramParticipationRecord { program, record });
    }

    Ok(Dataset { records, dictionaries })
}

/// Non-blank rows with their spreadsheet row number.
fn data_rows(raw: &RawTable, table: TableKind) -> impl Iterator<Item = (usize, &[CellValue])> {
    let blank = raw
        .rows
        .iter()
        .filter(|row| row.iter().all(CellValue::is_empty))
        .count();
    if blank > 0 {
        log::warn!("{table} table: skipping {blank} blank row(s)");
    }

    raw.rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(CellValue::is_empty))
        .map(|(i, row)| (i + 2, row.as_slice()))
}

fn cell(row: &[CellValue], idx: usize) -> &CellValue {
    row.get(idx).unwrap_or(&CellValue::Empty)
}

fn convert_row(
    row: &[CellValue],
    row_no: usize,
    columns: &Columns,
    table: TableKind,
    dicts: &mut Dictionaries,
) -> Result<ParticipationRecord, SchemaError> {
    let year = parse_year(cell(row, columns.year)).ok_or_else(|| SchemaError::InvalidCell {
        table,
        row: row_no,
        column: YEAR[0],
        value: cell(row, columns.year).to_string(),
    })?;
    let share = parse_share(cell(row, columns.share)).ok_or_else(|| SchemaError::InvalidCell {
        table,
        row: row_no,
        column: SHARE[0],
        value: cell(row, columns.share).to_string(),
    })?;

    Ok(ParticipationRecord {
        region: dicts.region.intern(&category_text(cell(row, columns.region))),
        financing: dicts.financing.intern(&category_text(cell(row, columns.financing))),
        faculty: dicts.faculty.intern(&category_text(cell(row, columns.faculty))),
        institute: dicts.institute.intern(&category_text(cell(row, columns.institute))),
        year,
        share,
    })
}

// -- Cell conversions --

/// Categorical cells are kept verbatim; numbers render without a trailing
/// `.0` when integral.
fn category_text(value: &CellValue) -> String {
    value.to_string()
}

fn parse_year(value: &CellValue) -> Option<i32> {
    match value {
        CellValue::Integer(i) => i32::try_from(*i).ok(),
        CellValue::Float(f) if f.fract() == 0.0 => i32::try_from(*f as i64).ok(),
        CellValue::Text(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                // "2020.0": a float column written out as text.
                let f = s.parse::<f64>().ok().filter(|f| f.fract() == 0.0)?;
                i32::try_from(f as i64).ok()
            })
        }
        _ => None,
    }
}

/// Missing shares count as zero, the same as a sum that skips blanks.
fn parse_share(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Float(f) if f.is_finite() => Some(*f),
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Text(s) if s.trim().is_empty() => Some(0.0),
        CellValue::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|f| f.is_finite()),
        CellValue::Empty => Some(0.0),
        _ => None,
    }
}
