/// Data layer: observation types, validation and loading.
///
/// Architecture:
/// ```text
///  table (.dat/.csv) + covariance      .json
///        │                               │
///        ▼                               ▼
///   ┌──────────────────────────────────────┐
///   │  loader   parse numeric text / JSON   │
///   └──────────────────────────────────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ObservationSet │  Vec<Observation>, sigma = sqrt(diag(cov))
///   └────────────────┘
/// ```

pub mod error;
pub mod loader;
pub mod model;

pub use error::DataError;
pub use model::{Observation, ObservationSet};
