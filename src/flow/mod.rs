//! The flow engine.
//!
//! Every command first runs its [guard]s, which only read repository state,
//! and then performs its sequence of git and hosting calls. Sequences are not
//! transactional: if a later step fails, earlier steps stay done.

pub mod feature;
pub mod guard;
pub mod release;

pub use feature::{FeatureFlow, FinishOutcome};
pub use guard::Guard;
pub use release::{ReleaseFlow, ReleaseSettings};
