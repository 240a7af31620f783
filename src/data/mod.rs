/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  data/FINAL_data_for_regression.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, column names, typed accessors
///   └──────────┘
///        │
///        ▼
///   stats (group summaries, cell means, quadratic fit)
/// ```

pub mod loader;
pub mod model;

pub use model::{CellValue, DataError, Dataset};
