/// Data layer: client records, loading, filtering and export.
///
/// Architecture:
/// ```text
///  https://{bucket}.s3.amazonaws.com/{key}   (public CSV object)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  GET → parse CSV → fold headers → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  coerce follow-up dates → priorities ∩ date bound
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered Dataset → CSV file
///   └──────────┘
/// ```

pub mod dates;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
