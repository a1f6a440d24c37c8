//! Regularized squared-error objectives.
//!
//! Both objectives have the form
//!
//! ```text
//! J = (1 / 2m) * sum (h - y)^2  +  (lambda / 2m) * sum ||params||^2
//! ```
//!
//! where `m` is the number of ratings in the error sum. The regularization
//! term shares that `m`, so its weight scales with rating density.

use crate::dataset::{Items, Raters};
use crate::entity::{hypothesis, Item, RaterModel};
use crate::error::{RecError, Result};
use crate::vector::{squared_norm, Scalar};

/// Joint objective over every (item, viewer) pair, penalizing item features
/// and rater preferences.
pub fn joint_cost<R: RaterModel>(items: &Items, raters: &Raters<R>, lambda: Scalar) -> Result<Scalar> {
    let mut sq_error = 0.0;
    let mut m = 0usize;
    for (item_id, item) in items {
        for rater_id in item.viewers() {
            let rater = raters.get(rater_id).ok_or_else(|| {
                RecError::inconsistent(item_id.as_str(), rater_id.as_str(), "viewer is not a known rater")
            })?;
            let actual = rater.rating(item_id).ok_or_else(|| {
                RecError::inconsistent(item_id.as_str(), rater_id.as_str(), "viewer has no rating for the item")
            })?;
            let err = hypothesis(item, rater) - actual;
            sq_error += err * err;
            m += 1;
        }
    }
    if m == 0 {
        return Err(RecError::degenerate("joint cost"));
    }
    let m = m as Scalar;

    let mut regularized = 0.0;
    for item in items.values() {
        regularized += squared_norm(item.feature());
    }
    for rater in raters.values() {
        regularized += rater.penalty();
    }

    Ok(regularized * (0.5 * lambda / m) + sq_error * (0.5 / m))
}

/// Content-based objective over each rater's training ratings with item
/// features held fixed; only rater preferences are penalized.
pub fn content_based_cost<R: RaterModel>(
    raters: &Raters<R>,
    items: &Items,
    lambda: Scalar,
) -> Result<Scalar> {
    let mut sq_error = 0.0;
    let mut m = 0usize;
    for (rater_id, rater) in raters {
        for (item_id, &actual) in rater.ratings() {
            let item = lookup_item(items, item_id, rater_id)?;
            let err = hypothesis(item, rater) - actual;
            sq_error += err * err;
            m += 1;
        }
    }
    if m == 0 {
        return Err(RecError::degenerate("content-based cost"));
    }
    let m = m as Scalar;

    let regularized: Scalar = raters.values().map(|r| r.penalty()).sum();
    Ok(regularized * (0.5 * lambda / m) + sq_error * (0.5 / m))
}

pub(crate) fn lookup_item<'a>(items: &'a Items, item_id: &str, rater_id: &str) -> Result<&'a Item> {
    items
        .get(item_id)
        .ok_or_else(|| RecError::inconsistent(item_id, rater_id, "rated item is not known"))
}
