use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a freshly read table
// ---------------------------------------------------------------------------

/// A loosely-typed cell as produced by the spreadsheet / CSV / Parquet / JSON
/// readers, before the schema layer converts it into typed record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// Header row plus data rows, exactly as read from the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Position of the first header matching any of `aliases`.
    /// Headers are compared after trimming surrounding whitespace.
    pub fn column_index(&self, aliases: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| aliases.iter().any(|a| h.trim() == *a))
    }
}

// ---------------------------------------------------------------------------
// Category dictionaries
// ---------------------------------------------------------------------------

/// Dense code for an interned category value. Only meaningful together with
/// the [`Dictionary`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(u32);

/// Interns the distinct values of one categorical column.
///
/// Values are stored verbatim: no trimming, no case folding, no Unicode
/// normalisation. `"PÚBLICA"` and `"PUBLICA"` are two different categories.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    values: Vec<String>,
    index: HashMap<String, CategoryId>,
}

impl Dictionary {
    pub fn intern(&mut self, value: &str) -> CategoryId {
        if let Some(id) = self.index.get(value) {
            return *id;
        }
        let id = CategoryId(self.values.len() as u32);
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), id);
        id
    }

    /// Exact lookup; `None` when the value never occurs in the column.
    pub fn lookup(&self, value: &str) -> Option<CategoryId> {
        self.index.get(value).copied()
    }

    pub fn name(&self, id: CategoryId) -> &str {
        &self.values[id.0 as usize]
    }

    /// All distinct values, sorted ascending.
    pub fn sorted_values(&self) -> Vec<String> {
        let mut values = self.values.clone();
        values.sort();
        values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

// ---------------------------------------------------------------------------
// Facets and records
// ---------------------------------------------------------------------------

/// Categorical columns that can be constrained by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    Region,
    Financing,
    Faculty,
    Program,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Region, Facet::Financing, Facet::Faculty, Facet::Program];

    /// Label shown next to the selector in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Facet::Region => "Región",
            Facet::Financing => "Financiamiento",
            Facet::Faculty => "Facultad",
            Facet::Program => "Carrera",
        }
    }
}

/// Read access shared by both row types, so the filter and pivot engines
/// work on either table.
pub trait Record {
    /// Category code of `facet`, or `None` when the row has no such column.
    fn facet(&self, facet: Facet) -> Option<CategoryId>;
    fn institute(&self) -> CategoryId;
    fn year(&self) -> i32;
    /// Fraction in `[0, 1]`.
    fn share(&self) -> f64;
}

/// One row of the faculty-level table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticipationRecord {
    pub region: CategoryId,
    pub financing: CategoryId,
    pub faculty: CategoryId,
    pub institute: CategoryId,
    pub year: i32,
    pub share: f64,
}

impl Record for ParticipationRecord {
    fn facet(&self, facet: Facet) -> Option<CategoryId> {
        match facet {
            Facet::Region => Some(self.region),
            Facet::Financing => Some(self.financing),
            Facet::Faculty => Some(self.faculty),
            Facet::Program => None,
        }
    }

    fn institute(&self) -> CategoryId {
        self.institute
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn share(&self) -> f64 {
        self.share
    }
}

/// One row of the program-level table: a faculty row plus the program it
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramParticipationRecord {
    pub program: CategoryId,
    pub record: ParticipationRecord,
}

impl Record for ProgramParticipationRecord {
    fn facet(&self, facet: Facet) -> Option<CategoryId> {
        match facet {
            Facet::Program => Some(self.program),
            other => self.record.facet(other),
        }
    }

    fn institute(&self) -> CategoryId {
        self.record.institute
    }

    fn year(&self) -> i32 {
        self.record.year
    }

    fn share(&self) -> f64 {
        self.record.share
    }
}

// ---------------------------------------------------------------------------
// Dataset – records plus their dictionaries
// ---------------------------------------------------------------------------

/// One dictionary per categorical column of a table.
#[derive(Debug, Clone, Default)]
pub struct Dictionaries {
    pub region: Dictionary,
    pub financing: Dictionary,
    pub faculty: Dictionary,
    pub program: Dictionary,
    pub institute: Dictionary,
}

impl Dictionaries {
    pub fn facet(&self, facet: Facet) -> &Dictionary {
        match facet {
            Facet::Region => &self.region,
            Facet::Financing => &self.financing,
            Facet::Faculty => &self.faculty,
            Facet::Program => &self.program,
        }
    }
}

/// A fully typed, read-only table.
#[derive(Debug, Clone)]
pub struct Dataset<R> {
    pub records: Vec<R>,
    pub dictionaries: Dictionaries,
}

impl<R> Default for Dataset<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dictionaries: Dictionaries::default(),
        }
    }
}

impl<R: Record> Dataset<R> {
    /// Sorted distinct values of a facet column. Blank cells are not a
    /// choice.
    pub fn distinct_values(&self, facet: Facet) -> Vec<String> {
        let mut values = self.dictionaries.facet(facet).sorted_values();
        values.retain(|v| !v.is_empty());
        values
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub type FacultyDataset = Dataset<ParticipationRecord>;
pub type ProgramDataset = Dataset<ProgramParticipationRecord>;

/// Both tables, loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub faculties: FacultyDataset,
    pub programs: ProgramDataset,
}
