//! Batch gradient descent training loops.
//!
//! Each iteration computes a full [`GradientSnapshot`] from the current
//! parameters and only then applies it, so every derivative within an
//! iteration sees pre-update values. Loops always run their full iteration
//! budget; there is no convergence-based early exit.

use factor_rec_core::{
    content_based_cost, joint_cost, GradientEngine, GradientSnapshot, Items, RaterModel, Raters,
    RecError, Result, Scalar,
};

use crate::config::TrainingConfig;

/// Periodic training diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticRecord {
    /// Iteration the record was taken at, before its update.
    pub iteration: usize,
    /// Objective value before the update.
    pub cost: Scalar,
    /// Item gradient norm averaged over items; `None` when items are frozen.
    pub item_gradient_norm: Option<Scalar>,
    /// Rater gradient norm (averaged over raters in joint training).
    pub rater_gradient_norm: Scalar,
}

impl DiagnosticRecord {
    fn emit(&self, phase: &'static str) {
        match self.item_gradient_norm {
            Some(item_norm) => tracing::info!(
                phase,
                iteration = self.iteration,
                cost = self.cost,
                item_gradient_norm = item_norm,
                rater_gradient_norm = self.rater_gradient_norm,
                "training progress"
            ),
            None => tracing::info!(
                phase,
                iteration = self.iteration,
                cost = self.cost,
                rater_gradient_norm = self.rater_gradient_norm,
                "training progress"
            ),
        }
    }
}

/// Outcome of a training run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingLog {
    /// Diagnostics in iteration order.
    pub records: Vec<DiagnosticRecord>,
    /// Update steps performed.
    pub iterations: usize,
    /// Objective value after the last update.
    pub final_cost: Scalar,
}

impl TrainingLog {
    /// Objective value before the first update, if it was recorded.
    pub fn initial_cost(&self) -> Option<Scalar> {
        self.records.first().map(|r| r.cost)
    }

    /// Recorded objective values followed by the final one.
    pub fn cost_trace(&self) -> Vec<Scalar> {
        self.records
            .iter()
            .map(|r| r.cost)
            .chain(std::iter::once(self.final_cost))
            .collect()
    }
}

fn ensure_finite(cost: Scalar, phase: &str, iteration: usize) -> Result<Scalar> {
    if cost.is_finite() {
        Ok(cost)
    } else {
        Err(RecError::numerical(format!(
            "{phase} cost became non-finite at iteration {iteration}"
        )))
    }
}

fn apply_rater_steps<R: RaterModel>(
    raters: &mut Raters<R>,
    snapshot: &GradientSnapshot,
    learning_rate: Scalar,
) {
    debug_assert_eq!(raters.len(), snapshot.raters.len());
    for (rater, gradient) in raters.values_mut().zip(snapshot.raters.values()) {
        rater.apply_step(gradient, learning_rate);
    }
}

/// Joint training: item features and rater preferences descend together.
#[derive(Clone, Debug, PartialEq)]
pub struct JointTrainer {
    /// Gradient policy.
    pub engine: GradientEngine,
    /// Step size.
    pub learning_rate: Scalar,
    /// Update steps to perform.
    pub max_iterations: usize,
    /// Diagnostic interval.
    pub report_every: usize,
}

impl JointTrainer {
    /// Build a trainer from a session configuration.
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            engine: config.gradient_engine(),
            learning_rate: config.learning_rate,
            max_iterations: config.joint_iterations,
            report_every: config.report_every,
        }
    }

    /// Run the full iteration budget over `items` and `raters`.
    pub fn run(&self, items: &mut Items, raters: &mut Raters) -> Result<TrainingLog> {
        let report_every = self.report_every.max(1);
        let item_count = items.len().max(1) as Scalar;
        let rater_count = raters.len().max(1) as Scalar;
        let mut records = Vec::new();

        for iteration in 0..self.max_iterations {
            let snapshot = self.engine.joint_snapshot(items, raters)?;

            if iteration % report_every == 0 {
                let cost = joint_cost(items, raters, self.engine.lambda)?;
                let record = DiagnosticRecord {
                    iteration,
                    cost: ensure_finite(cost, "joint", iteration)?,
                    item_gradient_norm: Some(snapshot.item_norm() / item_count),
                    rater_gradient_norm: snapshot.rater_norm() / rater_count,
                };
                record.emit("joint");
                records.push(record);
            }

            debug_assert_eq!(items.len(), snapshot.items.len());
            for (item, gradient) in items.values_mut().zip(snapshot.items.values()) {
                item.apply_step(gradient, self.learning_rate);
            }
            apply_rater_steps(raters, &snapshot, self.learning_rate);
        }

        let final_cost = joint_cost(items, raters, self.engine.lambda)?;
        Ok(TrainingLog {
            records,
            iterations: self.max_iterations,
            final_cost: ensure_finite(final_cost, "joint", self.max_iterations)?,
        })
    }
}

/// Fold-in training: item features are frozen and only rater preferences
/// descend on the content-based objective.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldInTrainer {
    /// Gradient policy.
    pub engine: GradientEngine,
    /// Step size.
    pub learning_rate: Scalar,
    /// Update steps to perform.
    pub max_iterations: usize,
    /// Diagnostic interval.
    pub report_every: usize,
}

impl FoldInTrainer {
    /// Build a trainer from a session configuration.
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            engine: config.gradient_engine(),
            learning_rate: config.learning_rate,
            max_iterations: config.fold_in_iterations,
            report_every: config.report_every,
        }
    }

    /// Run the full iteration budget, adapting `raters` to fixed `items`.
    pub fn run<R: RaterModel>(
        &self,
        items: &Items,
        raters: &mut Raters<R>,
    ) -> Result<TrainingLog> {
        let report_every = self.report_every.max(1);
        let mut records = Vec::new();

        for iteration in 0..self.max_iterations {
            let snapshot = self.engine.content_snapshot(items, raters)?;

            if iteration % report_every == 0 {
                let cost = content_based_cost(raters, items, self.engine.lambda)?;
                let record = DiagnosticRecord {
                    iteration,
                    cost: ensure_finite(cost, "fold-in", iteration)?,
                    item_gradient_norm: None,
                    rater_gradient_norm: snapshot.rater_norm(),
                };
                record.emit("fold-in");
                records.push(record);
            }

            apply_rater_steps(raters, &snapshot, self.learning_rate);
        }

        let final_cost = content_based_cost(raters, items, self.engine.lambda)?;
        Ok(TrainingLog {
            records,
            iterations: self.max_iterations,
            final_cost: ensure_finite(final_cost, "fold-in", self.max_iterations)?,
        })
    }
}
