//! Prediction accuracy metrics.

use crate::cost::lookup_item;
use crate::dataset::{Items, Raters};
use crate::entity::{hypothesis, HeldOutRater, RaterModel};
use crate::error::{RecError, Result};
use crate::vector::Scalar;

/// Mean squared error over every withheld rating.
pub fn mean_squared_error(raters: &Raters<HeldOutRater>, items: &Items) -> Result<Scalar> {
    let mut sq_error = 0.0;
    let mut m = 0usize;
    for (rater_id, rater) in raters {
        for (item_id, &actual) in rater.held_out() {
            let item = lookup_item(items, item_id, rater_id)?;
            let err = hypothesis(item, rater) - actual;
            sq_error += err * err;
            m += 1;
        }
    }
    if m == 0 {
        return Err(RecError::degenerate("held-out evaluation"));
    }
    Ok(sq_error / m as Scalar)
}

/// Root mean squared error over the training ratings of a rater collection.
pub fn rmse<R: RaterModel>(raters: &Raters<R>, items: &Items) -> Result<Scalar> {
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
        return Err(RecError::degenerate("rmse"));
    }
    Ok((sq_error / m as Scalar).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BiasedPreference, Item, Rater, Ratings};
    use ndarray::array;
    use std::collections::BTreeSet;

    fn ratings(pairs: &[(&str, f64)]) -> Ratings {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn items() -> Items {
        Items::from([
            (
                "m1".to_string(),
                Item::from_parts("m1", "Heat", BTreeSet::new(), array![1.0, 2.0]),
            ),
            (
                "m2".to_string(),
                Item::from_parts("m2", "Ronin", BTreeSet::new(), array![3.0, 0.0]),
            ),
        ])
    }

    #[test]
    fn exact_predictions_give_zero_error() {
        // h(m1) = 1*1 + 2*1.5 = 4, h(m2) = 3*1 = 3
        let pref = BiasedPreference {
            bias: 1.0,
            free: array![1.5],
        };
        let rater = HeldOutRater::from_parts(
            "u1",
            Ratings::new(),
            ratings(&[("m1", 4.0), ("m2", 3.0)]),
            pref,
        );
        let raters = Raters::from([("u1".to_string(), rater)]);
        assert_eq!(mean_squared_error(&raters, &items()).expect("mse"), 0.0);
    }

    #[test]
    fn mse_averages_over_held_out_ratings() {
        let pref = BiasedPreference {
            bias: 1.0,
            free: array![0.0],
        };
        // h(m1) = 1, h(m2) = 3; errors -1 and -3
        let rater = HeldOutRater::from_parts(
            "u1",
            ratings(&[("m1", 100.0)]),
            ratings(&[("m1", 2.0), ("m2", 6.0)]),
            pref,
        );
        let raters = Raters::from([("u1".to_string(), rater)]);
        assert!((mean_squared_error(&raters, &items()).expect("mse") - 5.0).abs() < 1e-12);
    }

    #[test]
    fn no_held_out_ratings_is_degenerate() {
        let raters: Raters<HeldOutRater> = Raters::new();
        assert!(matches!(
            mean_squared_error(&raters, &items()),
            Err(RecError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn rmse_over_training_ratings() {
        let rater = Rater::from_parts("u1", ratings(&[("m1", 1.0), ("m2", 7.0)]), array![1.0, 1.0]);
        // h(m1) = 3 err 2, h(m2) = 3 err -4 -> sqrt((4 + 16) / 2)
        let raters = Raters::from([("u1".to_string(), rater)]);
        assert!((rmse(&raters, &items()).expect("rmse") - 10f64.sqrt()).abs() < 1e-12);
    }
}
