/// Data layer: typed tables, loading, filtering and the pivot.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable (headers + loose cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  canonical columns, interned categories → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality constraints per facet → matching rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  pivot    │  sum by (institute, year) → dense PivotTable
///   └──────────┘
/// ```
///
/// `drilldown` picks the faculties or the programs table for a selection and
/// runs it through filter and pivot.

pub mod drilldown;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pivot;
pub mod schema;
