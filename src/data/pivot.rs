use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::model::{CategoryId, Dictionary, Record};

// ---------------------------------------------------------------------------
// PivotTable – institutes × years
// ---------------------------------------------------------------------------

/// Dense institute × year matrix of summed participation shares.
///
/// Rows are institutes sorted by name, columns are years sorted ascending.
/// Every combination has a cell; combinations with no contributing record
/// hold `0.0`. Cells store the raw fractional sums, percentages are derived
/// on read.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    institutes: Vec<String>,
    years: Vec<i32>,
    /// Row-major, `institutes.len() * years.len()` entries.
    shares: Vec<f64>,
}

impl PivotTable {
    pub fn institutes(&self) -> &[String] {
        &self.institutes
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Number of cells; always `institutes × years`.
    #[cfg(test)]
    pub fn cell_count(&self) -> usize {
        self.shares.len()
    }

    /// Summed share before percentage scaling.
    pub fn share(&self, row: usize, col: usize) -> f64 {
        self.shares[row * self.years.len() + col]
    }

    /// Cell value as a percentage (share × 100).
    pub fn percent(&self, row: usize, col: usize) -> f64 {
        self.share(row, col) * 100.0
    }

    /// Percentage for one institute / year, `None` if either is not part of
    /// the table.
    #[cfg(test)]
    pub fn lookup(&self, institute: &str, year: i32) -> Option<f64> {
        let row = self.institutes.iter().position(|i| i == institute)?;
        let col = self.years.iter().position(|y| *y == year)?;
        Some(self.percent(row, col))
    }

    /// Percentages of one institute, in year order.
    pub fn row_percents(&self, row: usize) -> Vec<f64> {
        (0..self.years.len()).map(|col| self.percent(row, col)).collect()
    }

    /// Percentages of one year, in institute order.
    pub fn column_percents(&self, col: usize) -> Vec<f64> {
        (0..self.institutes.len()).map(|row| self.percent(row, col)).collect()
    }

    /// Largest percentage in the table.
    pub fn max_percent(&self) -> f64 {
        self.shares.iter().fold(0.0_f64, |acc, s| acc.max(s * 100.0))
    }

    /// Nested map view: institute → year → percentage.
    pub fn to_percent_map(&self) -> BTreeMap<String, BTreeMap<i32, f64>> {
        self.institutes
            .iter()
            .enumerate()
            .map(|(row, name)| {
                let years = self
                    .years
                    .iter()
                    .enumerate()
                    .map(|(col, year)| (*year, self.percent(row, col)))
                    .collect();
                (name.clone(), years)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group by (institute, year), sum the shares, and reshape into a dense
/// [`PivotTable`].
///
/// Returns `None` for an empty input: there is nothing to chart and callers
/// show a "no data" message instead.
pub fn aggregate<'a, R, I>(records: I, institutes: &Dictionary) -> Option<PivotTable>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut sums: HashMap<(CategoryId, i32), f64> = HashMap::new();
    let mut seen_institutes: BTreeSet<CategoryId> = BTreeSet::new();
    let mut seen_years: BTreeSet<i32> = BTreeSet::new();

    for record in records {
        *sums.entry((record.institute(), record.year())).or_insert(0.0) += record.share();
        seen_institutes.insert(record.institute());
        seen_years.insert(record.year());
    }

    if sums.is_empty() {
        return None;
    }

    let mut rows: Vec<(String, CategoryId)> = seen_institutes
        .into_iter()
        .map(|id| (institutes.name(id).to_string(), id))
        .collect();
    rows.sort();
    let years: Vec<i32> = seen_years.into_iter().collect();

    let mut shares = Vec::with_capacity(rows.len() * years.len());
    for (_, id) in &rows {
        for year in &years {
            shares.push(sums.get(&(*id, *year)).copied().unwrap_or(0.0));
        }
    }

    Some(PivotTable {
        institutes: rows.into_iter().map(|(name, _)| name).collect(),
        years,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterCriteria, Selection};
    use crate::data::model::{FacultyDataset, ParticipationRecord};

    const EPS: f64 = 1e-9;

    fn dataset(rows: &[(&str, &str, i32, f64)]) -> FacultyDataset {
        let mut ds = FacultyDataset::default();
        for &(financing, institute, year, share) in rows {
            let d = &mut ds.dictionaries;
            ds.records.push(ParticipationRecord {
                region: d.region.intern("RM"),
                financing: d.financing.intern(financing),
                faculty: d.faculty.intern("Ingeniería"),
                institute: d.institute.intern(institute),
                year,
                share,
            });
        }
        ds
    }

    fn worked_example() -> FacultyDataset {
        dataset(&[
            ("PRIVADA", "A", 2020, 0.10),
            ("PRIVADA", "A", 2020, 0.05),
            ("PRIVADA", "B", 2021, 0.20),
        ])
    }

    #[test]
    fn sums_and_fills_missing_cells_with_zero() {
        let ds = worked_example();
        let pivot = aggregate(&ds.records, &ds.dictionaries.institute).unwrap();

        assert_eq!(pivot.institutes(), ["A", "B"]);
        assert_eq!(pivot.years(), [2020, 2021]);
        assert!((pivot.lookup("A", 2020).unwrap() - 15.0).abs() < EPS);
        assert_eq!(pivot.lookup("A", 2021), Some(0.0));
        assert_eq!(pivot.lookup("B", 2020), Some(0.0));
        assert!((pivot.lookup("B", 2021).unwrap() - 20.0).abs() < EPS);
    }

    #[test]
    fn table_is_dense() {
        let ds = dataset(&[
            ("PRIVADA", "C", 2019, 0.1),
            ("PRIVADA", "A", 2021, 0.1),
            ("PRIVADA", "B", 2020, 0.1),
            ("PRIVADA", "A", 2019, 0.1),
        ]);
        let pivot = aggregate(&ds.records, &ds.dictionaries.institute).unwrap();
        assert_eq!(pivot.cell_count(), 3 * 3);
        assert_eq!(pivot.to_percent_map().values().map(|y| y.len()).sum::<usize>(), 9);
    }

    #[test]
    fn rows_sorted_by_name_and_years_ascending() {
        let ds = dataset(&[
            ("PRIVADA", "Zeta", 2022, 0.1),
            ("PRIVADA", "Alfa", 2018, 0.1),
            ("PRIVADA", "Mu", 2020, 0.1),
        ]);
        let pivot = aggregate(&ds.records, &ds.dictionaries.institute).unwrap();
        assert_eq!(pivot.institutes(), ["Alfa", "Mu", "Zeta"]);
        assert_eq!(pivot.years(), [2018, 2020, 2022]);
    }

    #[test]
    fn percent_is_share_times_hundred() {
        let ds = worked_example();
        let pivot = aggregate(&ds.records, &ds.dictionaries.institute).unwrap();
        for row in 0..pivot.institutes().len() {
            for col in 0..pivot.years().len() {
                assert_eq!(pivot.percent(row, col), pivot.share(row, col) * 100.0);
                assert!(pivot.percent(row, col) >= 0.0);
            }
        }
        // Scaling does not touch the stored shares.
        assert!((pivot.share(0, 0) - 0.15).abs() < EPS);
        assert!((ds.records[0].share - 0.10).abs() < EPS);
    }

    #[test]
    fn empty_input_signals_empty_result() {
        let ds = dataset(&[("PÚBLICA", "A", 2020, 0.1)]);
        let criteria = FilterCriteria {
            financing: Selection::Value("PRIVADA".into()),
            ..Default::default()
        };
        let matched = filter(&ds, &criteria);
        assert!(matched.is_empty());
        assert!(aggregate(matched, &ds.dictionaries.institute).is_none());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let ds = dataset(&[
            ("PRIVADA", "A", 2020, 0.1),
            ("PÚBLICA", "B", 2020, 0.2),
            ("PRIVADA", "A", 2020, 0.3),
            ("PRIVADA", "C", 2021, 0.4),
        ]);
        let criteria = FilterCriteria {
            financing: Selection::Value("PRIVADA".into()),
            ..Default::default()
        };
        let first = aggregate(filter(&ds, &criteria), &ds.dictionaries.institute).unwrap();
        let second = aggregate(filter(&ds, &criteria), &ds.dictionaries.institute).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.institutes(), ["A", "C"]);
        assert!((first.lookup("A", 2020).unwrap() - 40.0).abs() < EPS);
    }

    #[test]
    fn row_and_column_views_agree() {
        let ds = worked_example();
        let pivot = aggregate(&ds.records, &ds.dictionaries.institute).unwrap();
        assert_eq!(pivot.row_percents(1)[1], pivot.column_percents(1)[1]);
        assert!((pivot.max_percent() - 20.0).abs() < EPS);
    }
}
