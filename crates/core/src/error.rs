//! Error types for rating-model construction and training.

/// Errors that can occur while building or training a rating model.
#[derive(Debug, thiserror::Error)]
pub enum RecError {
    /// A cost, gradient or metric was requested over an empty rating population.
    #[error("degenerate input: {context} has no ratings")]
    DegenerateInput {
        /// What was being computed.
        context: String,
    },

    /// A rating value could not be parsed as a finite number.
    #[error("malformed rating {value:?} from rater {rater} for item {item}")]
    MalformedRating {
        /// Rater that supplied the value.
        rater: String,
        /// Item the value refers to.
        item: String,
        /// The offending text.
        value: String,
    },

    /// Items and raters disagree about which (item, rater) pairs exist.
    #[error("inconsistent reference between item {item} and rater {rater}: {msg}")]
    InconsistentReference {
        /// Item side of the broken pair.
        item: String,
        /// Rater side of the broken pair.
        rater: String,
        /// Human-readable error description.
        msg: String,
    },

    /// Too few ratings to withhold an evaluation sample.
    #[error("rater {rater} has {available} ratings, {required} are needed to hold out a sample")]
    InsufficientHeldOutSample {
        /// Rater being constructed.
        rater: String,
        /// Ratings available.
        available: usize,
        /// Ratings required.
        required: usize,
    },

    /// Invalid parameter provided.
    #[error("invalid parameter: {msg}")]
    InvalidParameters {
        /// Human-readable error description.
        msg: String,
    },

    /// Training produced a non-finite value.
    #[error("numerical error: {msg}")]
    NumericalError {
        /// Human-readable error description.
        msg: String,
    },
}

/// Result type for rating-model operations.
pub type Result<T> = std::result::Result<T, RecError>;

impl RecError {
    /// Create an invalid parameter error.
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameters { msg: msg.into() }
    }

    /// Create a numerical error.
    pub fn numerical<S: Into<String>>(msg: S) -> Self {
        Self::NumericalError { msg: msg.into() }
    }

    /// Create a degenerate-input error.
    pub fn degenerate<S: Into<String>>(context: S) -> Self {
        Self::DegenerateInput {
            context: context.into(),
        }
    }

    /// Create an inconsistent-reference error.
    pub fn inconsistent<I, R, S>(item: I, rater: R, msg: S) -> Self
    where
        I: Into<String>,
        R: Into<String>,
        S: Into<String>,
    {
        Self::InconsistentReference {
            item: item.into(),
            rater: rater.into(),
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_pair() {
        let err = RecError::inconsistent("m1", "u7", "viewer has no rating");
        let text = err.to_string();
        assert!(text.contains("m1"));
        assert!(text.contains("u7"));
    }

    #[test]
    fn malformed_rating_quotes_value() {
        let err = RecError::MalformedRating {
            rater: "u1".into(),
            item: "m2".into(),
            value: "four".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed rating \"four\" from rater u1 for item m2"
        );
    }
}
