//! AI comparison relay: fetches cases for a disease from the store, asks a
//! text generator to compare hospitals and treatments, returns the analysis.

pub mod config;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod router;
pub mod source;

pub use config::RelayConfig;
pub use error::RelayError;
pub use generator::{GeminiGenerator, TextGenerator};
pub use prompt::{build_prompt, ComparisonDataset, ComparisonRow};
pub use router::{build_router, cors_layer, RelayState, NO_DATA_MESSAGE};
pub use source::{CaseSource, SupabaseSource};
