use std::collections::BTreeSet;

use super::filter::{filter, FilterCriteria, Selection};
use super::model::{Datasets, ProgramDataset};
use super::pivot::{aggregate, PivotTable};

// ---------------------------------------------------------------------------
// Program choices for a faculty
// ---------------------------------------------------------------------------

/// Sorted distinct programs that belong to `faculty` in the programs table.
/// Rows with a blank program name are not listed.
pub fn programs_for_faculty(programs: &ProgramDataset, faculty: &str) -> Vec<String> {
    let Some(faculty_id) = programs.dictionaries.faculty.lookup(faculty) else {
        return Vec::new();
    };

    programs
        .records
        .iter()
        .filter(|r| r.record.faculty == faculty_id)
        .map(|r| programs.dictionaries.program.name(r.program))
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// One full recompute: filter → aggregate
// ---------------------------------------------------------------------------

/// What the chart is about, which also decides the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Faculty,
    Program(String),
}

impl Subject {
    pub fn title(&self) -> &'static str {
        match self {
            Subject::Faculty => "Participación por Facultad por Año (%)",
            Subject::Program(_) => "Participación por Carrera por Año (%)",
        }
    }

    pub fn value_label(&self) -> &'static str {
        match self {
            Subject::Faculty => "Participación por facultad (%)",
            Subject::Program(_) => "Participación por carrera (%)",
        }
    }
}

/// Result of one interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No record matched; show a message instead of a chart.
    NoData { subject: Subject },
    Chart {
        subject: Subject,
        matched: usize,
        pivot: PivotTable,
    },
}

impl Outcome {
    pub fn subject(&self) -> &Subject {
        match self {
            Outcome::NoData { subject } | Outcome::Chart { subject, .. } => subject,
        }
    }
}

/// Pick the table for the criteria and run it through filter + aggregate.
///
/// A program selection only counts once a specific faculty is chosen; then
/// the programs table is filtered by region, financing, faculty *and*
/// program. Otherwise the faculties table is used and any program selection
/// is ignored.
pub fn run(datasets: &Datasets, criteria: &FilterCriteria) -> Outcome {
    let (subject, matched, pivot) = match (&criteria.faculty, &criteria.program) {
        (Selection::Value(_), Selection::Value(program)) => {
            let ds = &datasets.programs;
            let rows = filter(ds, criteria);
            let matched = rows.len();
            (
                Subject::Program(program.clone()),
                matched,
                aggregate(rows, &ds.dictionaries.institute),
            )
        }
        _ => {
            let ds = &datasets.faculties;
            let rows = filter(ds, &criteria.without_program());
            let matched = rows.len();
            (Subject::Faculty, matched, aggregate(rows, &ds.dictionaries.institute))
        }
    };

    log::debug!(
        "criteria {:?} matched {matched} row(s) for {:?}",
        criteria.constraints().collect::<Vec<_>>(),
        subject
    );

    match pivot {
        Some(pivot) => {
            log::debug!(
                "pivot: {} institute(s) x {} year(s)",
                pivot.institutes().len(),
                pivot.years().len()
            );
            Outcome::Chart { subject, matched, pivot }
        }
        None => Outcome::NoData { subject },
    }
}
