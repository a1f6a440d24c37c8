//! Core latent-factor rating model primitives.
//!
//! This crate provides the entity model (items, raters, cold-start raters),
//! the regularized objectives, their partial derivatives, and the accuracy
//! metrics. Nothing here mutates parameters except the explicit
//! `apply_step` methods that training loops call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cost;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod gradient;
pub mod metrics;
pub mod sampling;
pub mod vector;

pub use cost::{content_based_cost, joint_cost};
pub use dataset::{
    admit_held_out_raters, build_items, build_raters, check_consistency, check_known_items,
    Admission, Items, Raters, RawItem, HELD_OUT_STREAM, ITEM_STREAM, RATER_STREAM,
};
pub use entity::{
    hypothesis, parse_ratings, BiasedPreference, HeldOutRater, Item, ItemId, Rater, RaterId,
    RaterModel, Ratings, RawRatings, DEFAULT_DIMENSION, DEFAULT_HELD_OUT,
};
pub use error::{RecError, Result};
pub use gradient::{derivative_norm, GradientEngine, GradientMap, GradientMode, GradientSnapshot};
pub use metrics::{mean_squared_error, rmse};
pub use sampling::{partition_held_out, sample_without_replacement};
pub use vector::{dot, l2_norm, squared_norm, uniform_vector, Scalar, Vector};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{
        admit_held_out_raters, build_items, build_raters, check_consistency, check_known_items,
        content_based_cost, derivative_norm, hypothesis, joint_cost, mean_squared_error, rmse,
        Admission, BiasedPreference, GradientEngine, GradientMap, GradientMode, GradientSnapshot,
        HeldOutRater, Item, ItemId, Items, Rater, RaterId, RaterModel, Raters, Ratings, RawItem,
        RawRatings, RecError, Result, Scalar, Vector,
    };
}
