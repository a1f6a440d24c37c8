//! Training sessions over one item catalogue.
//!
//! A [`Recommender`] owns the items and training raters, runs joint training
//! on them, and then folds in cold-start cohorts against the learned (frozen)
//! item features.

use std::collections::BTreeMap;

use factor_rec_core::{
    admit_held_out_raters, build_items, build_raters, check_consistency, check_known_items,
    hypothesis, joint_cost, mean_squared_error, rmse, Admission, HeldOutRater, ItemId, Items,
    RaterId, RaterModel, Raters, RawItem, RawRatings, RecError, Result, Scalar,
};
use factor_rec_prng::SeedKey;

use crate::config::TrainingConfig;
use crate::training::{FoldInTrainer, JointTrainer, TrainingLog};

/// Cold-start raters prepared for fold-in training.
#[derive(Clone, Debug)]
pub struct ColdStartCohort {
    admission: Admission,
}

impl ColdStartCohort {
    /// Admitted raters.
    pub fn raters(&self) -> &Raters<HeldOutRater> {
        &self.admission.raters
    }

    /// Raters skipped for having too few ratings.
    pub fn skipped(&self) -> &[RaterId] {
        &self.admission.skipped
    }

    /// Number of admitted raters.
    pub fn len(&self) -> usize {
        self.admission.raters.len()
    }

    /// Whether no rater was admitted.
    pub fn is_empty(&self) -> bool {
        self.admission.raters.is_empty()
    }

    /// Total withheld ratings.
    pub fn held_out_count(&self) -> usize {
        self.admission.held_out_count()
    }
}

/// Held-out error around a fold-in run.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldInReport {
    /// Held-out MSE with the initial preferences.
    pub before: Scalar,
    /// Held-out MSE after fold-in training.
    pub after: Scalar,
    /// Fold-in diagnostics.
    pub log: TrainingLog,
}

impl FoldInReport {
    /// Reduction in held-out MSE; negative when fold-in made things worse.
    pub fn improvement(&self) -> Scalar {
        self.before - self.after
    }
}

/// Latent-factor recommender session.
#[derive(Clone, Debug)]
pub struct Recommender {
    config: TrainingConfig,
    items: Items,
    raters: Raters,
}

impl Recommender {
    /// Build a session from ingested mappings, initializing every latent
    /// vector from the configured seed.
    pub fn new(
        items: &BTreeMap<ItemId, RawItem>,
        ratings: &BTreeMap<RaterId, RawRatings>,
        config: TrainingConfig,
    ) -> Result<Self> {
        config.validate()?;
        let key = SeedKey::new(config.seed);
        let items = build_items(items, config.dimension, key);
        let raters = build_raters(ratings, config.dimension, key)?;
        check_consistency(&items, &raters)?;
        tracing::info!(
            items = items.len(),
            raters = raters.len(),
            dimension = config.dimension,
            seed = config.seed,
            "recommender session initialized"
        );
        Ok(Self {
            config,
            items,
            raters,
        })
    }

    /// Build a session from already constructed entities.
    pub fn from_parts(items: Items, raters: Raters, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let wrong_item = items.values().find(|i| i.dim() != config.dimension);
        if let Some(item) = wrong_item {
            return Err(RecError::invalid(format!(
                "item {} has dimension {}, expected {}",
                item.id(),
                item.dim(),
                config.dimension
            )));
        }
        let wrong_rater = raters.values().find(|r| r.dim() != config.dimension);
        if let Some(rater) = wrong_rater {
            return Err(RecError::invalid(format!(
                "rater {} has dimension {}, expected {}",
                rater.id(),
                rater.dim(),
                config.dimension
            )));
        }
        check_consistency(&items, &raters)?;
        Ok(Self {
            config,
            items,
            raters,
        })
    }

    /// Replace regularization strength and learning rate.
    pub fn configure(&mut self, regularization: Scalar, learning_rate: Scalar) -> Result<()> {
        let updated = TrainingConfig {
            regularization,
            learning_rate,
            ..self.config.clone()
        };
        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    /// Active configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Items with their current features.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Training raters with their current preferences.
    pub fn raters(&self) -> &Raters {
        &self.raters
    }

    /// Current joint objective value.
    pub fn cost(&self) -> Result<Scalar> {
        joint_cost(&self.items, &self.raters, self.config.regularization)
    }

    /// Root mean squared training error.
    pub fn rmse(&self) -> Result<Scalar> {
        rmse(&self.raters, &self.items)
    }

    /// Predicted rating of a training rater for an item.
    pub fn predict(&self, item_id: &str, rater_id: &str) -> Result<Scalar> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| RecError::inconsistent(item_id, rater_id, "item is not known"))?;
        let rater = self
            .raters
            .get(rater_id)
            .ok_or_else(|| RecError::inconsistent(item_id, rater_id, "rater is not known"))?;
        Ok(hypothesis(item, rater))
    }

    /// Jointly train item features and rater preferences.
    pub fn run_joint_training(&mut self) -> Result<TrainingLog> {
        let trainer = JointTrainer::from_config(&self.config);
        let log = trainer.run(&mut self.items, &mut self.raters)?;
        tracing::info!(
            iterations = log.iterations,
            final_cost = log.final_cost,
            "joint training finished"
        );
        Ok(log)
    }

    /// Admit cold-start raters from ingested ratings.
    ///
    /// Every rating, visible or withheld, must name a known item.
    pub fn cold_start_cohort(
        &self,
        ratings: &BTreeMap<RaterId, RawRatings>,
    ) -> Result<ColdStartCohort> {
        let admission = admit_held_out_raters(
            ratings,
            self.config.dimension,
            SeedKey::new(self.config.seed),
            self.config.min_ratings_for_admission,
            self.config.held_out_per_rater,
        )?;
        check_known_items(&self.items, &admission.raters)?;
        for (rater_id, rater) in &admission.raters {
            if let Some(item_id) = rater.held_out().keys().find(|id| !self.items.contains_key(*id)) {
                return Err(RecError::inconsistent(
                    item_id.as_str(),
                    rater_id.as_str(),
                    "held-out item is not known",
                ));
            }
        }
        tracing::info!(
            admitted = admission.raters.len(),
            skipped = admission.skipped.len(),
            held_out = admission.held_out_count(),
            "cold-start cohort admitted"
        );
        Ok(ColdStartCohort { admission })
    }

    /// Held-out MSE of a cohort against the current item features.
    pub fn held_out_error(&self, cohort: &ColdStartCohort) -> Result<Scalar> {
        mean_squared_error(cohort.raters(), &self.items)
    }

    /// Fit the cohort's preferences to the frozen item features and report
    /// held-out error before and after.
    pub fn run_fold_in_training(&self, cohort: &mut ColdStartCohort) -> Result<FoldInReport> {
        let before = self.held_out_error(cohort)?;
        let trainer = FoldInTrainer::from_config(&self.config);
        let log = trainer.run(&self.items, &mut cohort.admission.raters)?;
        let after = self.held_out_error(cohort)?;
        tracing::info!(before, after, final_cost = log.final_cost, "fold-in training finished");
        Ok(FoldInReport { before, after, log })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRatings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn catalogue() -> (BTreeMap<ItemId, RawItem>, BTreeMap<RaterId, RawRatings>) {
        let items = BTreeMap::from([
            ("m1".to_string(), RawItem::new("Heat", ["u1", "u2"])),
            ("m2".to_string(), RawItem::new("Ronin", ["u1", "u2"])),
            ("m3".to_string(), RawItem::new("Thief", ["u2"])),
        ]);
        let ratings = BTreeMap::from([
            ("u1".to_string(), raw(&[("m1", "5"), ("m2", "4")])),
            ("u2".to_string(), raw(&[("m1", "1"), ("m2", "2"), ("m3", "4")])),
        ]);
        (items, ratings)
    }

    fn config() -> TrainingConfig {
        TrainingConfig {
            learning_rate: 0.05,
            min_ratings_for_admission: 3,
            ..TrainingConfig::default()
        }
        .with_dimension(3)
        .with_iterations(50, 50)
    }

    #[test]
    fn predict_reports_unknown_ids() {
        let (items, ratings) = catalogue();
        let session = Recommender::new(&items, &ratings, config()).expect("session");
        assert!(session.predict("m1", "u1").is_ok());
        let err = session.predict("m9", "u1").unwrap_err();
        assert!(matches!(err, RecError::InconsistentReference { .. }));
        assert!(session.predict("m1", "u9").is_err());
    }

    #[test]
    fn configure_rejects_invalid_values_and_keeps_old() {
        let (items, ratings) = catalogue();
        let mut session = Recommender::new(&items, &ratings, config()).expect("session");
        assert!(session.configure(0.1, -1.0).is_err());
        assert_eq!(session.config().learning_rate, 0.05);
        session.configure(0.2, 0.01).expect("configure");
        assert_eq!(session.config().regularization, 0.2);
    }

    #[test]
    fn from_parts_checks_dimension() {
        let (items, ratings) = catalogue();
        let session = Recommender::new(&items, &ratings, config()).expect("session");
        let err = Recommender::from_parts(
            session.items().clone(),
            session.raters().clone(),
            config().with_dimension(4),
        )
        .unwrap_err();
        assert!(matches!(err, RecError::InvalidParameters { .. }));
    }

    #[test]
    fn cohort_with_unknown_held_out_item_is_rejected() {
        let (items, ratings) = catalogue();
        let session = Recommender::new(&items, &ratings, config()).expect("session");
        let cold = BTreeMap::from([(
            "c1".to_string(),
            raw(&[("m1", "3"), ("m2", "3"), ("m3", "3"), ("m9", "3")]),
        )]);
        assert!(matches!(
            session.cold_start_cohort(&cold),
            Err(RecError::InconsistentReference { .. })
        ));
    }

    #[test]
    fn fold_in_report_improvement() {
        let report = FoldInReport {
            before: 2.5,
            after: 1.0,
            log: TrainingLog::default(),
        };
        assert_eq!(report.improvement(), 1.5);
    }
}
