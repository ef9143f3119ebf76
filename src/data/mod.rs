/// Data layer: core types, loading, filtering, and summaries.
///
/// Architecture:
/// ```text
///   student-mat.csv  (',' or ';')
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterRegistry (seed-once defaults) → working subset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  pure summaries over the subset → SummaryBundle
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
