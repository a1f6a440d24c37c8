mod common;

use factor_rec::{RaterModel, Recommender, TrainingConfig};

#[test]
fn joint_then_fold_in() {
    let (items, ratings) = common::catalogue();
    let mut session = Recommender::new(&items, &ratings, common::config()).expect("session");
    assert_eq!(session.items().len(), common::ITEMS);
    assert_eq!(session.raters().len(), common::TRAINING_RATERS);

    let start = session.cost().expect("cost");
    let log = session.run_joint_training().expect("joint");
    assert_eq!(log.iterations, 300);
    assert_eq!(log.records.len(), 6);
    assert_eq!(log.initial_cost(), Some(start));
    assert!(log.final_cost < start);
    assert_eq!(session.cost().expect("cost"), log.final_cost);
    assert!(session.rmse().expect("rmse").is_finite());

    let mut cohort = session.cold_start_cohort(&common::cold_start()).expect("cohort");
    assert_eq!(cohort.len(), 3);
    assert_eq!(cohort.skipped().to_vec(), vec!["c9".to_string()]);
    assert_eq!(cohort.held_out_count(), 6);
    for rater in cohort.raters().values() {
        assert_eq!(rater.coefficient(0), 1.0);
        assert_eq!(rater.ratings().len(), common::ITEMS - 2);
    }

    let items_before = session.items().clone();
    let report = session.run_fold_in_training(&mut cohort).expect("fold-in");
    assert_eq!(session.items(), &items_before);
    assert_eq!(report.log.iterations, 200);
    assert!(report.log.records.iter().all(|r| r.item_gradient_norm.is_none()));
    assert!(report.log.final_cost < report.log.initial_cost().expect("initial"));
    assert!(report.before.is_finite() && report.after.is_finite());
    assert_eq!(report.after, session.held_out_error(&cohort).expect("mse"));
    assert_eq!(report.improvement(), report.before - report.after);
}

#[test]
fn zero_iteration_fold_in_leaves_preferences() {
    let (items, ratings) = common::catalogue();
    let config = common::config().with_iterations(0, 0);
    let mut session = Recommender::new(&items, &ratings, config).expect("session");
    let raters_before = session.raters().clone();
    let log = session.run_joint_training().expect("joint");
    assert!(log.records.is_empty());
    assert_eq!(session.raters(), &raters_before);

    let mut cohort = session.cold_start_cohort(&common::cold_start()).expect("cohort");
    let cohort_before = cohort.raters().clone();
    let report = session.run_fold_in_training(&mut cohort).expect("fold-in");
    assert_eq!(cohort.raters(), &cohort_before);
    assert_eq!(report.before, report.after);
    assert_eq!(report.improvement(), 0.0);
}

#[test]
fn same_seed_same_model() {
    let (items, ratings) = common::catalogue();
    let config = common::config().with_iterations(40, 40);
    let mut a = Recommender::new(&items, &ratings, config.clone()).expect("a");
    let mut b = Recommender::new(&items, &ratings, config.clone()).expect("b");
    let log_a = a.run_joint_training().expect("a");
    let log_b = b.run_joint_training().expect("b");
    assert_eq!(log_a, log_b);
    assert_eq!(a.items(), b.items());
    assert_eq!(a.raters(), b.raters());

    let mut cohort_a = a.cold_start_cohort(&common::cold_start()).expect("cohort");
    let mut cohort_b = b.cold_start_cohort(&common::cold_start()).expect("cohort");
    assert_eq!(cohort_a.raters(), cohort_b.raters());
    let report_a = a.run_fold_in_training(&mut cohort_a).expect("fold-in");
    let report_b = b.run_fold_in_training(&mut cohort_b).expect("fold-in");
    assert_eq!(report_a, report_b);

    let other = Recommender::new(&items, &ratings, config.with_seed(43)).expect("other");
    assert_ne!(a.items()["m00"].feature(), other.items()["m00"].feature());
}

#[test]
fn joint_cost_is_monotone_with_small_step() {
    let (items, ratings) = common::catalogue();
    let config = TrainingConfig {
        report_every: 1,
        ..TrainingConfig::default()
    }
    .with_dimension(3)
    .with_iterations(200, 0);
    let mut session = Recommender::new(&items, &ratings, config).expect("session");
    let log = session.run_joint_training().expect("joint");
    let trace = log.cost_trace();
    assert_eq!(trace.len(), 201);
    for pair in trace.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "cost rose from {} to {}", pair[0], pair[1]);
    }
}
