//! Train on a synthetic catalogue, then fold in cold-start raters and report
//! held-out error before and after.
//!
//! ```text
//! cargo run -p factor-rec --example cold_start_demo
//! ```

use std::collections::BTreeMap;

use factor_rec::{RawItem, RawRatings, Recommender, TrainingConfig};

const ITEMS: usize = 20;
const RATERS: usize = 30;
const COLD: usize = 5;

fn taste(seed: usize, k: usize) -> f64 {
    ((seed * 31 + k * 17) % 13) as f64 / 12.0
}

fn rating(item: usize, rater: usize) -> String {
    let score: f64 = (0..3).map(|k| taste(item, k) * taste(rater + 7, k)).sum();
    format!("{:.2}", 1.0 + score)
}

fn main() -> factor_rec::Result<()> {
    tracing_subscriber::fmt().init();

    let rater_ids: Vec<String> = (0..RATERS).map(|u| format!("rater-{u}")).collect();
    let items: BTreeMap<String, RawItem> = (0..ITEMS)
        .map(|i| {
            let viewers = rater_ids.iter().enumerate().filter(|(u, _)| (u + i) % 3 != 0);
            let raw = RawItem::new(format!("Film {i}"), viewers.map(|(_, id)| id.clone()));
            (format!("film-{i}"), raw)
        })
        .collect();
    let ratings: BTreeMap<String, RawRatings> = rater_ids
        .iter()
        .enumerate()
        .map(|(u, id)| {
            let seen = (0..ITEMS)
                .filter(|i| (u + i) % 3 != 0)
                .map(|i| (format!("film-{i}"), rating(i, u)))
                .collect();
            (id.clone(), seen)
        })
        .collect();
    let cold: BTreeMap<String, RawRatings> = (0..COLD)
        .map(|c| {
            let seen = (0..ITEMS)
                .filter(|i| i % (c + 2) != 0)
                .map(|i| (format!("film-{i}"), rating(i, 1000 + c)))
                .collect();
            (format!("newcomer-{c}"), seen)
        })
        .collect();

    let config = TrainingConfig {
        learning_rate: 0.05,
        ..TrainingConfig::default()
    }
    .with_dimension(4)
    .with_seed(7);

    let mut session = Recommender::new(&items, &ratings, config)?;
    let joint = session.run_joint_training()?;
    println!(
        "joint training: cost {:.4} -> {:.4}, rmse {:.4}",
        joint.initial_cost().unwrap_or(f64::NAN),
        joint.final_cost,
        session.rmse()?
    );

    let mut cohort = session.cold_start_cohort(&cold)?;
    let report = session.run_fold_in_training(&mut cohort)?;
    println!(
        "fold-in over {} raters: held-out mse {:.4} -> {:.4} (improvement {:.4})",
        cohort.len(),
        report.before,
        report.after,
        report.improvement()
    );
    Ok(())
}
