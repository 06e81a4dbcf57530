//! Aggregation scenarios through the public API.

use unwind_bench::{divide_by_positive, CaseSummary, Tally, TrialPair, Verdict};

fn tally_of(pairs: &[(f64, f64)]) -> Tally {
    let mut tally = Tally::new();
    for &(no_unwind, may_unwind) in pairs {
        tally.record(TrialPair::new(no_unwind, may_unwind));
    }
    tally
}

/// No-unwind wins every trial.
#[test]
fn no_unwind_always_faster() {
    let tally = tally_of(&[(5.0, 7.0), (4.0, 6.0), (3.0, 9.0)]);
    let summary = CaseSummary::from_tally("inline function calls", 10_000, &tally);

    assert_eq!(summary.trials, 3);
    assert_eq!(summary.no_unwind_faster, 3);
    assert_eq!(summary.may_unwind_faster, 0);
    assert_eq!(summary.shortest_no_unwind_ns, Some(3.0));
    assert_eq!(summary.shortest_may_unwind_ns, Some(6.0));
    assert_eq!(summary.sum_no_unwind_ns, 12.0);
    assert_eq!(summary.sum_may_unwind_ns, 22.0);

    match summary.verdict {
        Verdict::NoUnwindFaster { ratio } => assert!((ratio - 22.0 / 12.0).abs() < 1e-12),
        other => panic!("expected no-unwind faster, got {:?}", other),
    }
    assert!(summary.verdict.to_string().contains("no-unwind functions always appear faster"));
}

/// Each side wins once.
#[test]
fn mixed_wins_inconclusive() {
    let tally = tally_of(&[(5.0, 3.0), (2.0, 6.0)]);
    assert_eq!(tally.no_unwind_faster(), 1);
    assert_eq!(tally.may_unwind_faster(), 1);
    assert_eq!(tally.verdict(), Verdict::Inconclusive);
    assert!(tally
        .verdict()
        .to_string()
        .contains("neither no-unwind nor may-unwind"));
}

/// May-unwind wins every trial.
#[test]
fn may_unwind_always_faster() {
    let tally = tally_of(&[(8.0, 4.0), (6.0, 5.0)]);
    match tally.verdict() {
        Verdict::MayUnwindFaster { ratio } => assert!((ratio - 14.0 / 9.0).abs() < 1e-12),
        other => panic!("expected may-unwind faster, got {:?}", other),
    }
}

/// Ties count for neither side.
#[test]
fn ties_are_neutral() {
    let tally = tally_of(&[(4.0, 4.0), (4.0, 4.0)]);
    assert_eq!(tally.trials(), 2);
    assert_eq!(tally.no_unwind_faster() + tally.may_unwind_faster(), 0);
    assert_eq!(tally.verdict(), Verdict::Inconclusive);
    assert_eq!(tally.ratio_no_unwind_to_may_unwind(), 1.0);
}

/// A zero-duration winner gives a large finite ratio but no verdict.
#[test]
fn zero_denominator() {
    let tally = tally_of(&[(0.0, 4.0)]);
    assert_eq!(tally.no_unwind_faster(), 1);

    let ratio = tally.ratio_may_unwind_to_no_unwind();
    assert!(ratio.is_finite());
    assert!(ratio >= 1.0 / f64::MIN_POSITIVE);
    assert_eq!(tally.verdict(), Verdict::Inconclusive);
}

/// No trials at all.
#[test]
fn empty_tally() {
    let summary = CaseSummary::from_tally("vector reserve", 42, &Tally::new());
    assert_eq!(summary.trials, 0);
    assert_eq!(summary.shortest_no_unwind_ns, None);
    assert_eq!(summary.verdict, Verdict::Inconclusive);
    assert!(summary.ratio_no_unwind_to_may_unwind.is_finite());
}

/// Win counts never exceed the trial count, whatever the input.
#[test]
fn tally_invariant_holds() {
    let mut tally = Tally::new();
    let values = [0.0, 1.5, 1.5, 3.0, 0.25, 7.0, 0.0, 2.0];
    for (i, &a) in values.iter().enumerate() {
        for &b in &values[i..] {
            tally.record(TrialPair::new(a, b));
            assert!(tally.no_unwind_faster() + tally.may_unwind_faster() <= tally.trials());
        }
    }
    assert!(tally.shortest_no_unwind_ns().unwrap() <= tally.sum_no_unwind_ns());
}

/// Division by a non-positive value stays finite and positive.
#[test]
fn divide_by_non_positive() {
    assert_eq!(divide_by_positive(6.0, 3.0), 2.0);
    for y in [0.0, -0.0, -1.0] {
        for x in [0.0, 1.0, 1e300, f64::MAX] {
            let q = divide_by_positive(x, y);
            assert!(q.is_finite() && q > 0.0, "{} / {} = {}", x, y, q);
        }
    }
}
