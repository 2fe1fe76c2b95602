//! Data layer: core types, loading, filtering, summaries and export.
//!
//! Architecture:
//! ```text
//!  .json / .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  Vec<Row>, column schema, derived year
//!   └──────────┘
//!        │
//!        ├──────────────┬───────────────┐
//!        ▼              ▼               ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!   │  filter   │   │ summary  │   │  export  │
//!   └──────────┘   └──────────┘   └──────────┘
//! ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
