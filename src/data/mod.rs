/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (text cells)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  currency → f64 / missing, month ranks → Dataset
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  five set-membership predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  metrics + grouped tables → Dashboard
///   └───────────┘      (export writes a FilteredView back to CSV)
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
