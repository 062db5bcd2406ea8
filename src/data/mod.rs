/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///   sleep export .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<SleepRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range + weekend predicate → Vec<SleepRecord>
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
