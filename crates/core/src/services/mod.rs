//! Operations issued over an open daemon session

pub mod artifact_resolver;
pub mod diagnostics;
pub mod model_query;

pub use artifact_resolver::ArtifactResolver;
pub use diagnostics::{BuildDiagnosticsRunner, NO_ERRORS, TaskOutcome};
pub use model_query::ModelQueryService;
