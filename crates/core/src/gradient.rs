//! Partial derivatives of the rating objectives.
//!
//! [`GradientEngine`] evaluates derivatives with respect to item features and
//! rater preferences. With `normalize` set, each derivative (error sum and
//! regularization term alike) is divided by the number of ratings that
//! contribute to it; otherwise the raw sum is returned.
//!
//! All derivatives in a [`GradientSnapshot`] are computed from one read-only
//! view of the parameters. Applying them is the training loop's job.

use std::collections::BTreeMap;

use crate::cost::lookup_item;
use crate::dataset::{Items, Raters};
use crate::entity::{hypothesis, Item, RaterModel};
use crate::error::{RecError, Result};
use crate::vector::{l2_norm, Scalar, Vector};

/// Gradient vectors keyed by entity id.
pub type GradientMap = BTreeMap<String, Vector>;

/// Which objective rater gradients are taken against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradientMode {
    /// Joint objective: every preference coefficient is penalized.
    #[default]
    Joint,
    /// Content-based objective: unpenalized coefficients use the bias
    /// derivative.
    ContentBased,
}

/// Regularized gradient policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientEngine {
    /// Regularization strength.
    pub lambda: Scalar,
    /// Divide each derivative by its contributing rating count.
    pub normalize: bool,
}

impl Default for GradientEngine {
    fn default() -> Self {
        Self {
            lambda: 0.1,
            normalize: true,
        }
    }
}

impl GradientEngine {
    /// Create an engine.
    pub fn new(lambda: Scalar, normalize: bool) -> Self {
        Self { lambda, normalize }
    }

    fn finish(&self, sum: Scalar, param: Scalar, m: usize) -> Scalar {
        if self.normalize && m > 0 {
            let m = m as Scalar;
            sum / m + self.lambda * param / m
        } else {
            sum + self.lambda * param
        }
    }

    fn finish_unpenalized(&self, sum: Scalar, m: usize) -> Scalar {
        if self.normalize && m > 0 {
            sum / m as Scalar
        } else {
            sum
        }
    }

    /// `dJ/d feature[k]` for one item.
    pub fn item_feature_derivative<R: RaterModel>(
        &self,
        item: &Item,
        raters: &Raters<R>,
        k: usize,
    ) -> Result<Scalar> {
        let mut sum = 0.0;
        let residuals = item_residuals(item, raters)?;
        for (err, rater) in &residuals {
            sum += err * rater.coefficient(k);
        }
        Ok(self.finish(sum, item.feature()[k], residuals.len()))
    }

    /// `dJ/d theta[k]` for one rater, penalized.
    pub fn rater_preference_derivative<R: RaterModel>(
        &self,
        rater: &R,
        items: &Items,
        k: usize,
    ) -> Result<Scalar> {
        let mut sum = 0.0;
        let residuals = rater_residuals(rater, items)?;
        for (err, item) in &residuals {
            sum += err * item.feature()[k];
        }
        Ok(self.finish(sum, rater.coefficient(k), residuals.len()))
    }

    /// `dJ/d theta[0]` for one rater with no regularization term.
    pub fn bias_derivative<R: RaterModel>(&self, rater: &R, items: &Items) -> Result<Scalar> {
        let mut sum = 0.0;
        let residuals = rater_residuals(rater, items)?;
        for (err, item) in &residuals {
            sum += err * item.feature()[0];
        }
        Ok(self.finish_unpenalized(sum, residuals.len()))
    }

    /// Full feature gradient for one item.
    pub fn item_gradient<R: RaterModel>(&self, item: &Item, raters: &Raters<R>) -> Result<Vector> {
        let residuals = item_residuals(item, raters)?;
        let mut sums = Vector::zeros(item.dim());
        for (err, rater) in &residuals {
            for (k, s) in sums.iter_mut().enumerate() {
                *s += err * rater.coefficient(k);
            }
        }
        let m = residuals.len();
        Ok(sums
            .iter()
            .zip(item.feature().iter())
            .map(|(&sum, &param)| self.finish(sum, param, m))
            .collect())
    }

    /// Full preference gradient for one rater.
    pub fn rater_gradient<R: RaterModel>(
        &self,
        rater: &R,
        items: &Items,
        mode: GradientMode,
    ) -> Result<Vector> {
        let residuals = rater_residuals(rater, items)?;
        let mut sums = Vector::zeros(rater.dim());
        for (err, item) in &residuals {
            for (s, x) in sums.iter_mut().zip(item.feature().iter()) {
                *s += err * x;
            }
        }
        let m = residuals.len();
        Ok(sums
            .iter()
            .enumerate()
            .map(|(k, &sum)| {
                if mode == GradientMode::ContentBased && !rater.is_penalized(k) {
                    self.finish_unpenalized(sum, m)
                } else {
                    self.finish(sum, rater.coefficient(k), m)
                }
            })
            .collect())
    }

    /// Gradients of the joint objective for every item and rater.
    pub fn joint_snapshot<R: RaterModel>(
        &self,
        items: &Items,
        raters: &Raters<R>,
    ) -> Result<GradientSnapshot> {
        let mut snapshot = GradientSnapshot::default();
        for (id, item) in items {
            snapshot
                .items
                .insert(id.clone(), self.item_gradient(item, raters)?);
        }
        for (id, rater) in raters {
            snapshot.raters.insert(
                id.clone(),
                self.rater_gradient(rater, items, GradientMode::Joint)?,
            );
        }
        Ok(snapshot)
    }

    /// Gradients of the content-based objective for every rater; items are
    /// frozen and get no entry.
    pub fn content_snapshot<R: RaterModel>(
        &self,
        items: &Items,
        raters: &Raters<R>,
    ) -> Result<GradientSnapshot> {
        let mut snapshot = GradientSnapshot::default();
        for (id, rater) in raters {
            snapshot.raters.insert(
                id.clone(),
                self.rater_gradient(rater, items, GradientMode::ContentBased)?,
            );
        }
        Ok(snapshot)
    }
}

/// Item and rater gradients taken from a single parameter state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradientSnapshot {
    /// Item feature gradients.
    pub items: GradientMap,
    /// Rater preference gradients.
    pub raters: GradientMap,
}

impl GradientSnapshot {
    /// Summed item gradient norm.
    pub fn item_norm(&self) -> Scalar {
        derivative_norm(&self.items)
    }

    /// Summed rater gradient norm.
    pub fn rater_norm(&self) -> Scalar {
        derivative_norm(&self.raters)
    }
}

/// Sum of the Euclidean norms of every gradient vector in the map.
pub fn derivative_norm(gradients: &GradientMap) -> Scalar {
    gradients.values().map(l2_norm).sum()
}

fn item_residuals<'a, R: RaterModel>(
    item: &Item,
    raters: &'a Raters<R>,
) -> Result<Vec<(Scalar, &'a R)>> {
    item.viewers()
        .iter()
        .map(|rater_id| {
            let rater = raters.get(rater_id).ok_or_else(|| {
                RecError::inconsistent(item.id(), rater_id.as_str(), "viewer is not a known rater")
            })?;
            let actual = rater.rating(item.id()).ok_or_else(|| {
                RecError::inconsistent(item.id(), rater_id.as_str(), "viewer has no rating for the item")
            })?;
            Ok((hypothesis(item, rater) - actual, rater))
        })
        .collect()
}

fn rater_residuals<'a, R: RaterModel>(
    rater: &R,
    items: &'a Items,
) -> Result<Vec<(Scalar, &'a Item)>> {
    rater
        .ratings()
        .iter()
        .map(|(item_id, &actual)| {
            let item = lookup_item(items, item_id, rater.id())?;
            Ok((hypothesis(item, rater) - actual, item))
        })
        .collect()
}
