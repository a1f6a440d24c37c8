//! Assembling entity collections from ingested mappings.

use std::collections::{BTreeMap, BTreeSet};

use factor_rec_prng::SeedKey;

use crate::entity::{HeldOutRater, Item, ItemId, Rater, RaterId, RaterModel, RawRatings};
use crate::error::{RecError, Result};

/// Items keyed by id.
pub type Items = BTreeMap<ItemId, Item>;

/// Raters keyed by id.
pub type Raters<R = Rater> = BTreeMap<RaterId, R>;

/// Stream label for item feature initialization.
pub const ITEM_STREAM: &str = "item";

/// Stream label for training-rater preference initialization.
pub const RATER_STREAM: &str = "rater";

/// Stream label for cold-start sample selection and initialization.
pub const HELD_OUT_STREAM: &str = "held-out";

/// Item description as delivered by ingestion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawItem {
    /// Display label.
    pub label: String,
    /// Raters who rated the item.
    pub viewers: BTreeSet<RaterId>,
}

impl RawItem {
    /// Create a raw item.
    pub fn new<I, S>(label: impl Into<String>, viewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<RaterId>,
    {
        Self {
            label: label.into(),
            viewers: viewers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build items, each initialized from its own stream under `key`.
pub fn build_items(raw: &BTreeMap<ItemId, RawItem>, dim: usize, key: SeedKey) -> Items {
    let stream = key.fold_in_str(ITEM_STREAM);
    raw.iter()
        .map(|(id, item)| {
            let mut rng = stream.fold_in_str(id).to_rng();
            let built = Item::new(id.clone(), item.label.clone(), item.viewers.clone(), dim, &mut rng);
            (id.clone(), built)
        })
        .collect()
}

/// Build training raters, each initialized from its own stream under `key`.
pub fn build_raters(
    raw: &BTreeMap<RaterId, RawRatings>,
    dim: usize,
    key: SeedKey,
) -> Result<Raters> {
    let stream = key.fold_in_str(RATER_STREAM);
    raw.iter()
        .map(|(id, ratings)| {
            let mut rng = stream.fold_in_str(id).to_rng();
            Ok((id.clone(), Rater::new(id.clone(), ratings, dim, &mut rng)?))
        })
        .collect()
}

/// Check that item viewer sets and rater rating maps describe the same
/// (item, rater) pairs.
pub fn check_consistency<R: RaterModel>(items: &Items, raters: &Raters<R>) -> Result<()> {
    for (item_id, item) in items {
        for rater_id in item.viewers() {
            let rater = raters.get(rater_id).ok_or_else(|| {
                RecError::inconsistent(item_id.as_str(), rater_id.as_str(), "viewer is not a known rater")
            })?;
            if rater.rating(item_id).is_none() {
                return Err(RecError::inconsistent(
                    item_id.as_str(),
                    rater_id.as_str(),
                    "viewer has no rating for the item",
                ));
            }
        }
    }
    for (rater_id, rater) in raters {
        for item_id in rater.ratings().keys() {
            let item = items.get(item_id).ok_or_else(|| {
                RecError::inconsistent(item_id.as_str(), rater_id.as_str(), "rated item is not known")
            })?;
            if !item.viewers().contains(rater_id) {
                return Err(RecError::inconsistent(
                    item_id.as_str(),
                    rater_id.as_str(),
                    "item does not list the rater as a viewer",
                ));
            }
        }
    }
    Ok(())
}

/// Check that every rating of every rater names a known item.
///
/// Cold-start raters are not listed as viewers, so this is one-directional.
pub fn check_known_items<R: RaterModel>(items: &Items, raters: &Raters<R>) -> Result<()> {
    for (rater_id, rater) in raters {
        for item_id in rater.ratings().keys() {
            if !items.contains_key(item_id) {
                return Err(RecError::inconsistent(
                    item_id.as_str(),
                    rater_id.as_str(),
                    "rated item is not known",
                ));
            }
        }
    }
    Ok(())
}

/// Cold-start raters admitted for fold-in training.
#[derive(Clone, Debug, Default)]
pub struct Admission {
    /// Admitted raters.
    pub raters: Raters<HeldOutRater>,
    /// Raters skipped for having too few ratings.
    pub skipped: Vec<RaterId>,
}

impl Admission {
    /// Total number of withheld ratings across admitted raters.
    pub fn held_out_count(&self) -> usize {
        self.raters.values().map(|r| r.held_out().len()).sum()
    }

    /// Total number of visible ratings across admitted raters.
    pub fn visible_count(&self) -> usize {
        self.raters.values().map(|r| r.ratings().len()).sum()
    }
}

/// Build held-out raters from every rater with at least `min_ratings` ratings.
///
/// Raters below the threshold are reported in [`Admission::skipped`]; every
/// admitted rater also withholds `held_out_count` entries, so a threshold below
/// `held_out_count` surfaces as `InsufficientHeldOutSample`.
pub fn admit_held_out_raters(
    raw: &BTreeMap<RaterId, RawRatings>,
    dim: usize,
    key: SeedKey,
    min_ratings: usize,
    held_out_count: usize,
) -> Result<Admission> {
    let stream = key.fold_in_str(HELD_OUT_STREAM);
    let mut admission = Admission::default();
    for (id, ratings) in raw {
        if ratings.len() < min_ratings {
            tracing::debug!(rater = %id, ratings = ratings.len(), min_ratings, "skipping cold-start rater");
            admission.skipped.push(id.clone());
            continue;
        }
        let mut rng = stream.fold_in_str(id).to_rng();
        let rater = HeldOutRater::new(id.clone(), ratings, dim, held_out_count, &mut rng)?;
        admission.raters.insert(id.clone(), rater);
    }
    Ok(admission)
}
