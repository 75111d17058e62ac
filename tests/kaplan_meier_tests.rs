use incident_survival::survival::{kaplan_meier, KaplanMeier, KaplanMeierTable, SurvivalEstimate};

const EPS: f64 = 1e-12;

fn table(durations: &[i64]) -> KaplanMeierTable {
    match kaplan_meier(durations, None) {
        KaplanMeier::Table(t) => t,
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn empty_sample_returns_default_triple() {
    match kaplan_meier(&[], None) {
        KaplanMeier::At(est) => {
            assert_eq!(est, SurvivalEstimate::NoData);
            assert_eq!(est.triple(), (1.0, 0.0, 0.0));
        }
        other => panic!("expected default estimate, got {:?}", other),
    }
    match kaplan_meier(&[], Some(7)) {
        KaplanMeier::At(est) => assert_eq!(est.triple(), (1.0, 0.0, 0.0)),
        other => panic!("expected default estimate, got {:?}", other),
    }
}

#[test]
fn recurrence_matches_hand_computation() {
    // Sorted: 1, 3, 3, 3, 6, 10 (n = 6)
    let t = table(&[3, 10, 1, 3, 6, 3]);
    let rows = t.rows();
    let times: Vec<i64> = rows.iter().map(|r| r.time).collect();
    assert_eq!(times, vec![1, 3, 6, 10]);

    let at_risk: Vec<usize> = rows.iter().map(|r| r.at_risk).collect();
    assert_eq!(at_risk, vec![6, 5, 2, 1]);

    let expected_h = [1.0 / 6.0, 3.0 / 5.0, 1.0 / 2.0, 1.0];
    let mut s = 1.0;
    let mut h_cum = 0.0;
    for (row, h) in rows.iter().zip(expected_h) {
        s *= 1.0 - h;
        h_cum += h;
        assert!((row.hazard - h).abs() < EPS);
        assert!((row.survival - s).abs() < EPS);
        assert!((row.cumulative_hazard - h_cum).abs() < EPS);
    }
}

#[test]
fn survival_non_increasing_and_cumulative_hazard_non_decreasing() {
    let samples: [&[i64]; 4] = [
        &[5],
        &[2, 2, 2, 2],
        &[1, 4, 4, 9, 12, 12, 12, 40, 41],
        &[30, 7, 7, 1, 90, 15, 15, 15, 2, 60],
    ];
    for d in samples {
        let t = table(d);
        let mut prev_s = 1.0;
        let mut prev_h = 0.0;
        for row in t.rows() {
            assert!(row.survival <= prev_s, "{:?}", d);
            assert!(row.cumulative_hazard >= prev_h, "{:?}", d);
            prev_s = row.survival;
            prev_h = row.cumulative_hazard;
        }
        let events: usize = t.rows().iter().map(|r| r.events).sum();
        assert_eq!(events, d.len());
    }
}

#[test]
fn nearest_lookup_prefers_closest_time() {
    let t = table(&[3, 10, 20]);
    match t.nearest(14) {
        SurvivalEstimate::Observed(row) => assert_eq!(row.time, 10),
        SurvivalEstimate::NoData => panic!("expected row"),
    }
    match kaplan_meier(&[3, 10, 20], Some(14)) {
        KaplanMeier::At(SurvivalEstimate::Observed(row)) => {
            assert_eq!(row.time, 10);
            // h = 1/2 at the second step, S = 2/3 * 1/2
            assert!((row.hazard - 0.5).abs() < EPS);
            assert!((row.survival - 1.0 / 3.0).abs() < EPS);
        }
        other => panic!("expected row, got {:?}", other),
    }
}

#[test]
fn nearest_lookup_clamps_outside_range() {
    let t = table(&[3, 10, 20]);
    assert_eq!(t.nearest(-5).survival(), t.rows()[0].survival);
    assert_eq!(t.nearest(500).survival(), t.rows()[2].survival);
    assert_eq!(t.nearest(500).survival(), 0.0);
}

#[test]
fn equidistant_query_takes_first_row() {
    let t = table(&[4, 8, 8]);
    match t.nearest(6) {
        SurvivalEstimate::Observed(row) => assert_eq!(row.time, 4),
        SurvivalEstimate::NoData => panic!("expected row"),
    }
}

#[test]
fn refitting_is_bit_identical() {
    let d = [17, 3, 3, 48, 9, 1, 1, 1, 26, 9];
    let a = KaplanMeierTable::fit(&d);
    let b = KaplanMeierTable::fit(&d);
    assert_eq!(a.rows().len(), b.rows().len());
    for (x, y) in a.rows().iter().zip(b.rows()) {
        assert_eq!(x.survival.to_bits(), y.survival.to_bits());
        assert_eq!(x.hazard.to_bits(), y.hazard.to_bits());
        assert_eq!(x.cumulative_hazard.to_bits(), y.cumulative_hazard.to_bits());
    }
}

#[test]
fn extreme_query_times_clamp_to_edge_rows() {
    match kaplan_meier(&[1, 5], Some(i64::MIN)) {
        KaplanMeier::At(est) => {
            assert!((est.survival() - 0.5).abs() < EPS);
            assert!((est.hazard() - 0.5).abs() < EPS);
        }
        other => panic!("expected estimate, got {:?}", other),
    }
    match kaplan_meier(&[1, 5], Some(i64::MAX)) {
        KaplanMeier::At(est) => {
            assert!(est.survival().abs() < EPS);
            assert!((est.cumulative_hazard() - 1.5).abs() < EPS);
        }
        other => panic!("expected estimate, got {:?}", other),
    }
}
