// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod domains;
pub mod error;
pub mod fusion;
pub mod metrics;
pub mod pipeline;
pub mod scorers;
pub mod scrape;
pub mod source_prior;
pub mod text;
pub mod verdict;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::PipelineConfig;
pub use crate::pipeline::{PipelineInput, VeracityPipeline};
pub use crate::verdict::{BinaryLabel, Fine6Label, GatedLabel, PredictionReport};
