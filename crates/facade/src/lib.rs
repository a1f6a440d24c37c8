//! Facade crate re-exporting stable APIs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod session;
pub mod training;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use factor_rec_core as core;
pub use factor_rec_prng as prng;

pub use config::TrainingConfig;
pub use factor_rec_core::prelude as core_prelude;
pub use factor_rec_core::{
    content_based_cost, hypothesis, joint_cost, mean_squared_error, GradientEngine, HeldOutRater,
    Item, ItemId, Items, Rater, RaterId, RaterModel, Raters, RawItem, RawRatings, RecError, Result,
    Scalar,
};
pub use factor_rec_prng::SeedKey;
pub use session::{ColdStartCohort, FoldInReport, Recommender};
pub use training::{DiagnosticRecord, FoldInTrainer, JointTrainer, TrainingLog};

/// Convenience prelude covering sessions, trainers and the core model.
pub mod prelude {
    pub use crate::config::TrainingConfig;
    pub use crate::session::{ColdStartCohort, FoldInReport, Recommender};
    pub use crate::training::{DiagnosticRecord, FoldInTrainer, JointTrainer, TrainingLog};
    pub use factor_rec_core::prelude::*;
    pub use factor_rec_prng::prelude::*;
}
