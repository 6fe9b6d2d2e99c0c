use std::sync::Arc;

use crate::chart::{ChartLayout, Highlight};
use crate::config::AppConfig;
use crate::data::drilldown::{programs_for_faculty, run, Outcome};
use crate::data::filter::{FilterCriteria, Selection};
use crate::data::model::{Datasets, Facet};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Choices offered by the three always-visible selectors, taken from the
/// faculties table once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub financings: Vec<String>,
    pub faculties: Vec<String>,
}

impl FilterOptions {
    pub fn for_facet(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Region => &self.regions,
            Facet::Financing => &self.financings,
            Facet::Faculty => &self.faculties,
            Facet::Program => &[],
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Both tables; shared read-only for the life of the process.
    pub datasets: Arc<Datasets>,

    pub options: FilterOptions,

    /// Programs of the selected faculty (empty while faculty is the wildcard).
    pub programs: Vec<String>,

    /// Current selections.
    pub criteria: FilterCriteria,

    /// Result of the last recompute.
    pub outcome: Outcome,

    /// Chart geometry for `outcome`, when there is something to draw.
    pub layout: Option<ChartLayout>,

    pub highlight: Highlight,

    /// Label of the "no constraint" choice.
    pub wildcard_label: String,

    /// Whether the pivot table view is shown under the chart.
    pub show_table: bool,
}

impl AppState {
    pub fn new(datasets: Arc<Datasets>, config: &AppConfig) -> Self {
        let faculties = &datasets.faculties;
        let options = FilterOptions {
            regions: faculties.distinct_values(Facet::Region),
            financings: faculties.distinct_values(Facet::Financing),
            faculties: faculties.distinct_values(Facet::Faculty),
        };
        let criteria = FilterCriteria::default();
        let outcome = run(&datasets, &criteria);

        let mut state = Self {
            datasets,
            options,
            programs: Vec::new(),
            criteria,
            outcome,
            layout: None,
            highlight: Highlight::new(&config.highlight),
            wildcard_label: config.wildcard_label.clone(),
            show_table: false,
        };
        state.rebuild_layout();
        state
    }

    /// Change one selector and recompute from scratch.
    ///
    /// A new faculty refreshes the program choices and resets the program to
    /// the wildcard.
    pub fn select(&mut self, facet: Facet, selection: Selection) {
        if self.criteria.get(facet) == &selection {
            return;
        }
        log::debug!("{} -> {:?}", facet.label(), selection);

        if facet == Facet::Faculty {
            self.programs = match selection.value() {
                Some(faculty) => programs_for_faculty(&self.datasets.programs, faculty),
                None => Vec::new(),
            };
            self.criteria.program = Selection::All;
        }
        self.criteria.set(facet, selection);
        self.recompute();
    }

    /// Back to all wildcards.
    pub fn reset(&mut self) {
        self.criteria = FilterCriteria::default();
        self.programs.clear();
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.outcome = run(&self.datasets, &self.criteria);
        self.rebuild_layout();
    }

    fn rebuild_layout(&mut self) {
        self.layout = match &self.outcome {
            Outcome::Chart { subject, pivot, .. } => {
                Some(ChartLayout::new(pivot, subject, &self.highlight))
            }
            Outcome::NoData { .. } => None,
        };
    }

    /// Whether the program selector should be shown.
    pub fn program_choice_available(&self) -> bool {
        !self.criteria.faculty.is_all()
    }
}
