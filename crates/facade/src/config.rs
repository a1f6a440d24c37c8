//! Training configuration.

use factor_rec_core::{
    GradientEngine, RecError, Result, Scalar, DEFAULT_DIMENSION, DEFAULT_HELD_OUT,
};

/// Hyperparameters and budgets for a training session.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingConfig {
    /// Regularization strength (lambda).
    pub regularization: Scalar,
    /// Gradient descent step size (alpha).
    pub learning_rate: Scalar,
    /// Latent dimensionality K.
    pub dimension: usize,
    /// Update steps for joint training.
    pub joint_iterations: usize,
    /// Update steps for fold-in training.
    pub fold_in_iterations: usize,
    /// Record diagnostics every this many iterations.
    pub report_every: usize,
    /// Divide each derivative by its contributing rating count.
    pub normalize_gradients: bool,
    /// Ratings withheld from each cold-start rater.
    pub held_out_per_rater: usize,
    /// Minimum ratings a cold-start rater needs to be admitted.
    pub min_ratings_for_admission: usize,
    /// Session seed for every random draw.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            regularization: 0.1,
            learning_rate: 0.0008,
            dimension: DEFAULT_DIMENSION,
            joint_iterations: 2000,
            fold_in_iterations: 5000,
            report_every: 100,
            normalize_gradients: true,
            held_out_per_rater: DEFAULT_HELD_OUT,
            min_ratings_for_admission: 6,
            seed: 0,
        }
    }
}

impl TrainingConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(RecError::invalid("regularization must be non-negative"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(RecError::invalid("learning_rate must be positive"));
        }
        if self.dimension == 0 {
            return Err(RecError::invalid("dimension must be positive"));
        }
        if self.report_every == 0 {
            return Err(RecError::invalid("report_every must be positive"));
        }
        if self.held_out_per_rater == 0 {
            return Err(RecError::invalid("held_out_per_rater must be positive"));
        }
        if self.min_ratings_for_admission < self.held_out_per_rater {
            return Err(RecError::invalid(
                "min_ratings_for_admission must be at least held_out_per_rater",
            ));
        }
        Ok(())
    }

    /// Gradient engine for these settings.
    pub fn gradient_engine(&self) -> GradientEngine {
        GradientEngine::new(self.regularization, self.normalize_gradients)
    }

    /// Set both iteration budgets.
    pub fn with_iterations(mut self, joint: usize, fold_in: usize) -> Self {
        self.joint_iterations = joint;
        self.fold_in_iterations = fold_in;
        self
    }

    /// Set the session seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the latent dimensionality.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}
