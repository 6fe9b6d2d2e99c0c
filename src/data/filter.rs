use super::model::{CategoryId, Dataset, Dictionaries, Facet, Record};

// ---------------------------------------------------------------------------
// Filter criteria: one optional equality constraint per facet
// ---------------------------------------------------------------------------

/// Selection for a single facet. `All` is the wildcard ("Todos"); it is its
/// own variant so it can never collide with a real category value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Value(v) => Some(v),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Equality constraints combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub region: Selection,
    pub financing: Selection,
    pub faculty: Selection,
    pub program: Selection,
}

impl FilterCriteria {
    pub fn get(&self, facet: Facet) -> &Selection {
        match facet {
            Facet::Region => &self.region,
            Facet::Financing => &self.financing,
            Facet::Faculty => &self.faculty,
            Facet::Program => &self.program,
        }
    }

    pub fn set(&mut self, facet: Facet, selection: Selection) {
        match facet {
            Facet::Region => self.region = selection,
            Facet::Financing => self.financing = selection,
            Facet::Faculty => self.faculty = selection,
            Facet::Program => self.program = selection,
        }
    }

    /// The same criteria with the program constraint dropped.
    pub fn without_program(&self) -> Self {
        FilterCriteria {
            program: Selection::All,
            ..self.clone()
        }
    }

    /// Non-wildcard constraints in facet order.
    pub fn constraints(&self) -> impl Iterator<Item = (Facet, &str)> + '_ {
        Facet::ALL
            .into_iter()
            .filter_map(|facet| self.get(facet).value().map(|v| (facet, v)))
    }
}

/// Translate the textual constraints into category codes of one table.
///
/// Returns `None` when a constrained value does not occur in the table: no
/// record can match it.
fn resolve(criteria: &FilterCriteria, dicts: &Dictionaries) -> Option<Vec<(Facet, CategoryId)>> {
    criteria
        .constraints()
        .map(|(facet, value)| dicts.facet(facet).lookup(value).map(|id| (facet, id)))
        .collect()
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Indices of records that satisfy every constraint, in their original order.
///
/// A record passes a constraint when its category for that facet is exactly
/// the selected value. Records without the facet (faculty rows have no
/// program) never pass a constraint on it.
pub fn filtered_indices<R: Record>(dataset: &Dataset<R>, criteria: &FilterCriteria) -> Vec<usize> {
    let Some(constraints) = resolve(criteria, &dataset.dictionaries) else {
        return Vec::new();
    };

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            constraints
                .iter()
                .all(|&(facet, id)| record.facet(facet) == Some(id))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Matching records, borrowed from the dataset.
pub fn filter<'a, R: Record>(dataset: &'a Dataset<R>, criteria: &FilterCriteria) -> Vec<&'a R> {
    filtered_indices(dataset, criteria)
        .into_iter()
        .map(|i| &dataset.records[i])
        .collect()
}
