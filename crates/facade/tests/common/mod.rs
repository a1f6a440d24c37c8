#![allow(dead_code)]

use std::collections::BTreeMap;

use factor_rec::{ItemId, RaterId, RawItem, RawRatings, TrainingConfig};

pub const ITEMS: usize = 8;
pub const TRAINING_RATERS: usize = 10;

fn item_id(i: usize) -> ItemId {
    format!("m{i:02}")
}

fn true_feature(i: usize) -> [f64; 3] {
    [1.0, ((i * 37) % 11) as f64 / 10.0, ((i * 53) % 7) as f64 / 6.0]
}

fn true_preference(seed: usize) -> [f64; 3] {
    [
        ((seed * 13) % 5) as f64 / 4.0 + 0.5,
        ((seed * 29) % 9) as f64 / 8.0,
        ((seed * 17) % 6) as f64 / 5.0,
    ]
}

fn rating(item: usize, rater: usize) -> String {
    let f = true_feature(item);
    let p = true_preference(rater);
    format!("{:.3}", f[0] * p[0] + f[1] * p[1] + f[2] * p[2])
}

/// Catalogue where every training rater rated every item.
pub fn catalogue() -> (BTreeMap<ItemId, RawItem>, BTreeMap<RaterId, RawRatings>) {
    let rater_ids: Vec<RaterId> = (0..TRAINING_RATERS).map(|u| format!("u{u:02}")).collect();
    let items = (0..ITEMS)
        .map(|i| (item_id(i), RawItem::new(format!("Title {i}"), rater_ids.clone())))
        .collect();
    let ratings = rater_ids
        .iter()
        .enumerate()
        .map(|(u, id)| {
            let r: RawRatings = (0..ITEMS).map(|i| (item_id(i), rating(i, u))).collect();
            (id.clone(), r)
        })
        .collect();
    (items, ratings)
}

/// Three dense cold-start raters and one with too few ratings.
pub fn cold_start() -> BTreeMap<RaterId, RawRatings> {
    let mut cold: BTreeMap<RaterId, RawRatings> = (0..3)
        .map(|c| {
            let r: RawRatings = (0..ITEMS)
                .map(|i| (item_id(i), rating(i, 100 + c)))
                .collect();
            (format!("c{c}"), r)
        })
        .collect();
    let sparse: RawRatings = (0..3).map(|i| (item_id(i), rating(i, 200))).collect();
    cold.insert("c9".to_string(), sparse);
    cold
}

pub fn config() -> TrainingConfig {
    TrainingConfig {
        learning_rate: 0.01,
        report_every: 50,
        ..TrainingConfig::default()
    }
    .with_dimension(3)
    .with_iterations(300, 200)
    .with_seed(42)
}
