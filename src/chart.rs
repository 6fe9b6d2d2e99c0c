use eframe::egui::Color32;

use crate::color::blues;
use crate::data::drilldown::Subject;
use crate::data::pivot::PivotTable;

/// Width of one bar in plot units; a group of bars starts at the integer
/// index of its institute.
pub const BAR_WIDTH: f64 = 0.2;

pub const X_LABEL: &str = "Universidad";

/// Height of the institute label band under the axis, relative to the
/// tallest bar.
const LABEL_BAND: f64 = 0.08;

// ---------------------------------------------------------------------------
// Highlight predicate
// ---------------------------------------------------------------------------

/// Case-insensitive substring match on institute names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    needle: String,
}

impl Highlight {
    pub fn new(pattern: &str) -> Self {
        Self {
            needle: pattern.to_uppercase(),
        }
    }

    pub fn matches(&self, institute: &str) -> bool {
        !self.needle.is_empty() && institute.to_uppercase().contains(&self.needle)
    }
}

// ---------------------------------------------------------------------------
// Chart layout – everything the plot widget needs, no egui types beyond Color32
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub value: f64,
    /// Text drawn above the bar; zero-height bars have none.
    pub label: Option<String>,
    pub highlighted: bool,
}

/// All bars of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub year: i32,
    pub name: String,
    pub color: Color32,
    pub bars: Vec<Bar>,
}

/// Position and text of an institute label on the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTick {
    pub x: f64,
    pub institute: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub title: &'static str,
    pub subtitle: Option<String>,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Tallest bar, in percent.
    pub y_max: f64,
    /// Bottom of the visible range; the band below zero holds the institute
    /// labels.
    pub y_min: f64,
    pub series: Vec<Series>,
    pub ticks: Vec<GroupTick>,
}

impl ChartLayout {
    /// Build the grouped bar layout: one group per institute, one bar per
    /// year inside a group.
    pub fn new(pivot: &PivotTable, subject: &Subject, highlight: &Highlight) -> Self {
        let years = pivot.years();
        let highlighted: Vec<bool> = pivot.institutes().iter().map(|i| highlight.matches(i)).collect();

        let series = years
            .iter()
            .zip(blues(years.len()))
            .enumerate()
            .map(|(col, (&year, color))| Series {
                year,
                name: format!("Año {year}"),
                color,
                bars: pivot
                    .column_percents(col)
                    .into_iter()
                    .enumerate()
                    .map(|(row, value)| Bar {
                        x: row as f64 + col as f64 * BAR_WIDTH,
                        value,
                        label: bar_label(value),
                        highlighted: highlighted[row],
                    })
                    .collect(),
            })
            .collect();

        let group_center = BAR_WIDTH * years.len().saturating_sub(1) as f64 / 2.0;
        let ticks = pivot
            .institutes()
            .iter()
            .enumerate()
            .map(|(row, institute)| GroupTick {
                x: row as f64 + group_center,
                institute: institute.clone(),
                highlighted: highlighted[row],
            })
            .collect();

        let subtitle = match subject {
            Subject::Program(program) => Some(format!("Carrera: {program}")),
            Subject::Faculty => None,
        };

        ChartLayout {
            title: subject.title(),
            subtitle,
            x_label: X_LABEL,
            y_label: subject.value_label(),
            y_max: pivot.max_percent(),
            y_min: -(pivot.max_percent() * LABEL_BAND + 1.0),
            series,
            ticks,
        }
    }

}

/// Rounded percentage, or nothing for empty cells.
pub fn bar_label(value: f64) -> Option<String> {
    (value > 0.0).then(|| format!("{value:.0}%"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FacultyDataset, ParticipationRecord};
    use crate::data::pivot::aggregate;

    fn pivot(rows: &[(&str, i32, f64)]) -> PivotTable {
        let mut ds = FacultyDataset::default();
        for &(institute, year, share) in rows {
            let d = &mut ds.dictionaries;
            ds.records.push(ParticipationRecord {
                region: d.region.intern("RM"),
                financing: d.financing.intern("PRIVADA"),
                faculty: d.faculty.intern("Ingeniería"),
                institute: d.institute.intern(institute),
                year,
                share,
            });
        }
        aggregate(&ds.records, &ds.dictionaries.institute).unwrap()
    }

    #[test]
    fn highlight_is_case_insensitive() {
        let h = Highlight::new("UNIVERSIDAD DE LAS AMERICAS");
        assert!(h.matches("Universidad de las Americas"));
        assert!(h.matches("UNIVERSIDAD DE LAS AMERICAS (SEDE VIÑA)"));
        assert!(!h.matches("UNIVERSIDAD DE CHILE"));
        assert!(!Highlight::new("").matches("anything"));
    }

    #[test]
    fn zero_bars_are_unlabeled() {
        assert_eq!(bar_label(0.0), None);
        assert_eq!(bar_label(15.2), Some("15%".to_string()));
        assert_eq!(bar_label(0.4), Some("0%".to_string()));
    }

    #[test]
    fn one_series_per_year_one_bar_per_institute() {
        let p = pivot(&[("A", 2020, 0.15), ("B", 2021, 0.20), ("C", 2022, 0.05)]);
        let layout = ChartLayout::new(&p, &Subject::Faculty, &Highlight::new("zzz"));

        assert_eq!(layout.series.len(), 3);
        assert_eq!(layout.series[0].name, "Año 2020");
        assert!((layout.y_max - 20.0).abs() < 1e-9);
        for series in &layout.series {
            assert_eq!(series.bars.len(), 3);
        }
        let a_2020 = &layout.series[0].bars[0];
        assert_eq!(a_2020.x, 0.0);
        assert_eq!(a_2020.label.as_deref(), Some("15%"));
        let a_2021 = &layout.series[1].bars[0];
        assert!((a_2021.x - BAR_WIDTH).abs() < 1e-12);
        assert_eq!(a_2021.label, None);
    }

    #[test]
    fn ticks_sit_in_the_middle_of_each_group() {
        let p = pivot(&[("A", 2020, 0.1), ("B", 2021, 0.1), ("B", 2022, 0.1)]);
        let layout = ChartLayout::new(&p, &Subject::Faculty, &Highlight::new("zzz"));
        assert!((layout.ticks[0].x - BAR_WIDTH).abs() < 1e-12);
        assert!((layout.ticks[1].x - (1.0 + BAR_WIDTH)).abs() < 1e-12);
    }

    #[test]
    fn labels_get_room_below_the_axis() {
        let p = pivot(&[("A", 2020, 0.5)]);
        let layout = ChartLayout::new(&p, &Subject::Faculty, &Highlight::new(""));
        assert!((layout.y_min - -(50.0 * LABEL_BAND + 1.0)).abs() < 1e-9);
        assert!(layout.y_min < 0.0);
    }

    #[test]
    fn highlighted_institute_is_flagged_everywhere() {
        let p = pivot(&[("UNIVERSIDAD DE LAS AMERICAS", 2020, 0.1), ("OTRA", 2020, 0.2)]);
        let layout = ChartLayout::new(&p, &Subject::Faculty, &Highlight::new("universidad de las americas"));
        let flagged: Vec<_> = layout.ticks.iter().filter(|t| t.highlighted).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].institute, "UNIVERSIDAD DE LAS AMERICAS");
        // Institutes are sorted: OTRA first.
        assert!(!layout.series[0].bars[0].highlighted);
        assert!(layout.series[0].bars[1].highlighted);
    }

    #[test]
    fn program_subject_changes_texts() {
        let p = pivot(&[("A", 2020, 0.1)]);
        let layout = ChartLayout::new(&p, &Subject::Program("Software".into()), &Highlight::new(""));
        assert_eq!(layout.title, "Participación por Carrera por Año (%)");
        assert_eq!(layout.y_label, "Participación por carrera (%)");
        assert_eq!(layout.subtitle.as_deref(), Some("Carrera: Software"));
        assert_eq!(layout.x_label, X_LABEL);
    }
}
