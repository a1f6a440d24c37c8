//! Items, raters and the shared prediction function.
//!
//! An [`Item`] carries a latent feature vector and the set of raters that
//! rated it. A [`Rater`] carries a preference vector and its observed ratings.
//! A [`HeldOutRater`] is a cold-start rater: part of its ratings are withheld
//! for evaluation, and its preference vector carries a bias coefficient that is
//! never penalized.
//!
//! Cost, gradient and metric code is written against [`RaterModel`] so it works
//! for both rater kinds.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::error::{RecError, Result};
use crate::sampling::partition_held_out;
use crate::vector::{dot, squared_norm, uniform_vector, Scalar, Vector};

/// Opaque item identifier.
pub type ItemId = String;

/// Opaque rater identifier.
pub type RaterId = String;

/// Parsed ratings keyed by item.
pub type Ratings = BTreeMap<ItemId, Scalar>;

/// Ratings as delivered by ingestion, still in text form.
pub type RawRatings = BTreeMap<ItemId, String>;

/// Default latent dimensionality.
pub const DEFAULT_DIMENSION: usize = 14;

/// Default number of ratings withheld from each cold-start rater.
pub const DEFAULT_HELD_OUT: usize = 2;

/// Parse text ratings into numbers.
pub fn parse_ratings(rater: &str, raw: &RawRatings) -> Result<Ratings> {
    raw.iter()
        .map(|(item, value)| {
            let parsed = value
                .trim()
                .parse::<Scalar>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| RecError::MalformedRating {
                    rater: rater.to_string(),
                    item: item.clone(),
                    value: value.clone(),
                })?;
            Ok((item.clone(), parsed))
        })
        .collect()
}

/// A rated entity with a latent feature vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    id: ItemId,
    label: String,
    viewers: BTreeSet<RaterId>,
    feature: Vector,
}

impl Item {
    /// Create an item with a uniformly initialized feature vector.
    pub fn new<R: Rng + ?Sized>(
        id: impl Into<ItemId>,
        label: impl Into<String>,
        viewers: BTreeSet<RaterId>,
        dim: usize,
        rng: &mut R,
    ) -> Self {
        Self::from_parts(id, label, viewers, uniform_vector(dim, rng))
    }

    /// Create an item with an explicit feature vector.
    pub fn from_parts(
        id: impl Into<ItemId>,
        label: impl Into<String>,
        viewers: BTreeSet<RaterId>,
        feature: Vector,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            viewers,
            feature,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Raters who rated this item.
    pub fn viewers(&self) -> &BTreeSet<RaterId> {
        &self.viewers
    }

    /// Latent feature vector.
    pub fn feature(&self) -> &Vector {
        &self.feature
    }

    /// Latent dimensionality.
    pub fn dim(&self) -> usize {
        self.feature.len()
    }

    /// Take one descent step: `feature -= learning_rate * gradient`.
    pub fn apply_step(&mut self, gradient: &Vector, learning_rate: Scalar) {
        debug_assert_eq!(gradient.len(), self.feature.len());
        self.feature.scaled_add(-learning_rate, gradient);
    }
}

/// Behavior shared by every rater kind.
pub trait RaterModel {
    /// Rater identifier.
    fn id(&self) -> &str;

    /// Ratings used for training.
    fn ratings(&self) -> &Ratings;

    /// Latent dimensionality.
    fn dim(&self) -> usize;

    /// Preference coefficient `k`.
    fn coefficient(&self, k: usize) -> Scalar;

    /// Whether coefficient `k` carries a regularization penalty.
    fn is_penalized(&self, _k: usize) -> bool {
        true
    }

    /// Predicted rating for an item feature vector.
    fn predict(&self, feature: &Vector) -> Scalar;

    /// Sum of squares of the penalized coefficients.
    fn penalty(&self) -> Scalar;

    /// Dense copy of the full preference vector.
    fn preference(&self) -> Vector;

    /// Take one descent step on every coefficient.
    fn apply_step(&mut self, gradient: &Vector, learning_rate: Scalar);

    /// Training rating for an item, if any.
    fn rating(&self, item: &str) -> Option<Scalar> {
        self.ratings().get(item).copied()
    }
}

/// Predicted rating of `rater` for `item`: the dot product of the item's
/// feature vector with the rater's preference vector.
pub fn hypothesis<R: RaterModel + ?Sized>(item: &Item, rater: &R) -> Scalar {
    rater.predict(item.feature())
}

/// A training-set rater.
#[derive(Clone, Debug, PartialEq)]
pub struct Rater {
    id: RaterId,
    ratings: Ratings,
    theta: Vector,
}

impl Rater {
    /// Create a rater from text ratings with a uniformly initialized
    /// preference vector.
    pub fn new<R: Rng + ?Sized>(
        id: impl Into<RaterId>,
        raw: &RawRatings,
        dim: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let id = id.into();
        let ratings = parse_ratings(&id, raw)?;
        Ok(Self::from_parts(id, ratings, uniform_vector(dim, rng)))
    }

    /// Create a rater with explicit ratings and preference vector.
    pub fn from_parts(id: impl Into<RaterId>, ratings: Ratings, theta: Vector) -> Self {
        Self {
            id: id.into(),
            ratings,
            theta,
        }
    }

    /// Preference vector.
    pub fn theta(&self) -> &Vector {
        &self.theta
    }
}

impl RaterModel for Rater {
    fn id(&self) -> &str {
        &self.id
    }

    fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    fn dim(&self) -> usize {
        self.theta.len()
    }

    fn coefficient(&self, k: usize) -> Scalar {
        self.theta[k]
    }

    fn predict(&self, feature: &Vector) -> Scalar {
        dot(feature, &self.theta)
    }

    fn penalty(&self) -> Scalar {
        squared_norm(&self.theta)
    }

    fn preference(&self) -> Vector {
        self.theta.clone()
    }

    fn apply_step(&mut self, gradient: &Vector, learning_rate: Scalar) {
        debug_assert_eq!(gradient.len(), self.theta.len());
        self.theta.scaled_add(-learning_rate, gradient);
    }
}

/// Preference vector with a designated bias coefficient at index 0.
///
/// The bias starts at 1.0 and is exempt from regularization; `free` holds the
/// remaining `K - 1` coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct BiasedPreference {
    /// Bias coefficient (index 0).
    pub bias: Scalar,
    /// Coefficients 1..K.
    pub free: Vector,
}

impl BiasedPreference {
    /// Bias fixed to 1.0, free coefficients drawn uniformly from `[0, 1)`.
    pub fn new<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Self {
        Self {
            bias: 1.0,
            free: uniform_vector(dim.saturating_sub(1), rng),
        }
    }

    /// Total dimensionality including the bias.
    pub fn dim(&self) -> usize {
        self.free.len() + 1
    }

    /// Coefficient `k` of the flattened vector.
    pub fn coefficient(&self, k: usize) -> Scalar {
        if k == 0 {
            self.bias
        } else {
            self.free[k - 1]
        }
    }

    /// Flattened `[bias, free...]` vector.
    pub fn to_dense(&self) -> Vector {
        std::iter::once(self.bias)
            .chain(self.free.iter().copied())
            .collect()
    }

    fn dot(&self, feature: &Vector) -> Scalar {
        debug_assert_eq!(feature.len(), self.dim());
        let mut acc = feature[0] * self.bias;
        for (x, y) in feature.iter().skip(1).zip(self.free.iter()) {
            acc += x * y;
        }
        acc
    }
}

/// A cold-start rater with withheld evaluation ratings.
#[derive(Clone, Debug, PartialEq)]
pub struct HeldOutRater {
    id: RaterId,
    visible: Ratings,
    held_out: Ratings,
    preference: BiasedPreference,
}

impl HeldOutRater {
    /// Withhold `held_out_count` ratings chosen uniformly at random, then
    /// initialize the preference vector from the same stream.
    pub fn new<R: Rng + ?Sized>(
        id: impl Into<RaterId>,
        raw: &RawRatings,
        dim: usize,
        held_out_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let id = id.into();
        if dim == 0 {
            return Err(RecError::invalid("dimension must be positive"));
        }
        let ratings = parse_ratings(&id, raw)?;
        if ratings.len() < held_out_count {
            return Err(RecError::InsufficientHeldOutSample {
                rater: id,
                available: ratings.len(),
                required: held_out_count,
            });
        }
        let (visible, held_out) = partition_held_out(ratings, held_out_count, rng);
        let preference = BiasedPreference::new(dim, rng);
        Ok(Self {
            id,
            visible,
            held_out,
            preference,
        })
    }

    /// Create a held-out rater from explicit parts.
    pub fn from_parts(
        id: impl Into<RaterId>,
        visible: Ratings,
        held_out: Ratings,
        preference: BiasedPreference,
    ) -> Self {
        Self {
            id: id.into(),
            visible,
            held_out,
            preference,
        }
    }

    /// Ratings withheld for evaluation.
    pub fn held_out(&self) -> &Ratings {
        &self.held_out
    }

    /// Tagged preference vector.
    pub fn biased_preference(&self) -> &BiasedPreference {
        &self.preference
    }
}

impl RaterModel for HeldOutRater {
    fn id(&self) -> &str {
        &self.id
    }

    fn ratings(&self) -> &Ratings {
        &self.visible
    }

    fn dim(&self) -> usize {
        self.preference.dim()
    }

    fn coefficient(&self, k: usize) -> Scalar {
        self.preference.coefficient(k)
    }

    fn is_penalized(&self, k: usize) -> bool {
        k != 0
    }

    fn predict(&self, feature: &Vector) -> Scalar {
        self.preference.dot(feature)
    }

    fn penalty(&self) -> Scalar {
        squared_norm(&self.preference.free)
    }

    fn preference(&self) -> Vector {
        self.preference.to_dense()
    }

    fn apply_step(&mut self, gradient: &Vector, learning_rate: Scalar) {
        debug_assert_eq!(gradient.len(), self.preference.dim());
        self.preference.bias -= learning_rate * gradient[0];
        for (p, g) in self.preference.free.iter_mut().zip(gradient.iter().skip(1)) {
            *p -= learning_rate * g;
        }
    }
}
