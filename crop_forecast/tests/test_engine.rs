use approx::assert_abs_diff_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

use crop_forecast::engine::{DISASTER_DEMAND_FACTOR, DISASTER_PRICE_FACTOR};
use crop_forecast::prediction::round2;
use crop_forecast::{
    Event, EventKind, EventScope, PairKey, Prediction, PredictionEngine,
};

fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn fitted_engine(seed: u64) -> PredictionEngine {
    let mut rng = StdRng::seed_from_u64(seed);
    PredictionEngine::with_defaults(2024, &mut rng).unwrap()
}

fn event(name: &str, kind: EventKind, impact_factor: f64) -> Event {
    let now = test_now();
    Event {
        id: format!("{}_test", name.to_lowercase()),
        name: name.to_string(),
        kind,
        impact_factor,
        start: now - Duration::days(1),
        end: now + Duration::days(14),
        affected_locations: EventScope::All,
        affected_crops: EventScope::All,
        description: String::new(),
    }
}

fn predict(engine: &PredictionEngine, key: &PairKey, current_month: u32, seed: u64) -> Prediction {
    let mut rng = StdRng::seed_from_u64(seed);
    engine
        .predict(key, 2024, current_month, test_now(), &mut rng)
        .unwrap()
}

#[test]
fn test_predict_returns_twelve_ordered_months() {
    let engine = fitted_engine(1);
    let prediction = predict(&engine, &PairKey::new("district1", "wheat"), 6, 10);

    assert_eq!(prediction.demand_series.len(), 12);
    assert_eq!(prediction.price_series.len(), 12);
    for (i, (demand, price)) in prediction
        .demand_series
        .iter()
        .zip(prediction.price_series.iter())
        .enumerate()
    {
        assert_eq!(demand.month, i as u32 + 1);
        assert_eq!(price.month, i as u32 + 1);
        assert!(demand.event_label.is_none());
        assert!(price.event_label.is_none());
    }
}

#[test]
fn test_percentage_derives_from_value_and_baseline() {
    let engine = fitted_engine(2);
    let key = PairKey::new("district2", "rice");
    let prediction = predict(&engine, &key, 3, 20);

    let (baseline_demand, baseline_price) = engine.baselines_for(&key);
    assert_abs_diff_eq!(prediction.baseline_demand, baseline_demand);
    assert_abs_diff_eq!(prediction.baseline_price, baseline_price);

    for point in &prediction.demand_series {
        assert_abs_diff_eq!(
            point.percentage,
            round2(100.0 * point.value / baseline_demand),
            epsilon = 1e-9
        );
    }
    for point in &prediction.price_series {
        assert_abs_diff_eq!(
            point.percentage,
            round2(100.0 * point.value / baseline_price),
            epsilon = 1e-9
        );
    }
}

#[rstest]
fn test_historical_count_tracks_current_month(
    #[values(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)] current_month: u32,
) {
    let engine = fitted_engine(3);
    let prediction = predict(&engine, &PairKey::new("district1", "corn"), current_month, 30);

    let historical = prediction
        .demand_series
        .iter()
        .filter(|p| p.is_historical)
        .count();
    assert_eq!(historical, current_month as usize - 1);

    for point in &prediction.demand_series {
        assert_eq!(point.is_historical, point.month < current_month);
    }
    for point in &prediction.price_series {
        assert_eq!(point.is_historical, point.month < current_month);
    }
}

#[test]
fn test_unknown_pair_falls_back_to_stock_baselines() {
    let engine = fitted_engine(4);
    let (demand, price) = engine.baselines_for(&PairKey::new("Atlantis", "kelp"));
    assert_abs_diff_eq!(demand, 2500.0);
    assert_abs_diff_eq!(price, 50.0);
}

#[test]
fn test_disaster_scales_forecast_months_only() {
    let engine = fitted_engine(5);
    let before = predict(&engine, &PairKey::new("district3", "cotton"), 6, 50);

    let after = engine.apply_events(&before, &[event("Cyclone", EventKind::Disaster, 1.3)], test_now());

    for (old, new) in before.demand_series.iter().zip(after.demand_series.iter()) {
        if old.is_historical {
            assert_eq!(new, old);
        } else {
            assert_abs_diff_eq!(new.value, old.value * DISASTER_DEMAND_FACTOR, epsilon = 1e-9);
            assert_eq!(new.event_label.as_deref(), Some("Cyclone"));
        }
    }
    for (old, new) in before.price_series.iter().zip(after.price_series.iter()) {
        if old.is_historical {
            assert_eq!(new, old);
        } else {
            assert_abs_diff_eq!(new.value, old.value * DISASTER_PRICE_FACTOR, epsilon = 1e-9);
            assert_eq!(new.event_label.as_deref(), Some("Cyclone"));
        }
    }
}

#[test]
fn test_economic_event_scales_price_only() {
    let engine = fitted_engine(6);
    let before = predict(&engine, &PairKey::new("district4", "potato"), 4, 60);

    let after = engine.apply_events(
        &before,
        &[event("Export Surge", EventKind::Economic, 1.25)],
        test_now(),
    );

    // Demand is bit-identical to the pre-event series
    assert_eq!(after.demand_series, before.demand_series);

    for (old, new) in before.price_series.iter().zip(after.price_series.iter()) {
        if old.is_historical {
            assert_eq!(new, old);
        } else {
            assert_abs_diff_eq!(new.value, old.value * 1.25, epsilon = 1e-9);
            assert_abs_diff_eq!(
                new.percentage,
                round2(100.0 * new.value / before.baseline_price),
                epsilon = 1e-9
            );
            assert_eq!(new.event_label.as_deref(), Some("Export Surge"));
        }
    }
}

#[test]
fn test_positive_and_manual_kinds_are_not_auto_applied() {
    let engine = fitted_engine(7);
    let before = predict(&engine, &PairKey::new("district5", "tomato"), 5, 70);

    let after = engine.apply_events(
        &before,
        &[
            event("Good Weather Forecast", EventKind::Positive, 0.9),
            event("Operator Note", EventKind::Manual, 1.1),
        ],
        test_now(),
    );

    assert_eq!(after.demand_series, before.demand_series);
    assert_eq!(after.price_series, before.price_series);
}

#[test]
fn test_events_compound_in_input_order() {
    let engine = fitted_engine(8);
    let before = predict(&engine, &PairKey::new("district1", "sugarcane"), 6, 80);

    let after = engine.apply_events(
        &before,
        &[
            event("Hailstorm", EventKind::Disaster, 1.2),
            event("Policy Change", EventKind::Economic, 1.25),
        ],
        test_now(),
    );

    let old = &before.price_series[8];
    let new = &after.price_series[8];
    assert_abs_diff_eq!(new.value, old.value * DISASTER_PRICE_FACTOR * 1.25, epsilon = 1e-9);
    // The label records the last event applied to the point
    assert_eq!(new.event_label.as_deref(), Some("Policy Change"));
    assert_eq!(
        after.demand_series[8].event_label.as_deref(),
        Some("Hailstorm")
    );
}

#[test]
fn test_apply_events_leaves_the_input_untouched_and_stamps_the_copy() {
    let engine = fitted_engine(9);
    let before = predict(&engine, &PairKey::new("district2", "wheat"), 6, 90);
    let input_stamp = before.last_updated;

    let later = test_now() + Duration::minutes(5);
    let after = engine.apply_events(&before, &[event("Flood", EventKind::Disaster, 1.4)], later);

    assert_eq!(before.last_updated, input_stamp);
    assert_eq!(after.last_updated, later);
    assert!(before.demand_series.iter().all(|p| p.event_label.is_none()));
}

#[test]
fn test_flood_labels_exactly_the_forecast_months() {
    let engine = fitted_engine(10);
    // A pair outside the corpus: baselines fall back to 2500 / 50
    let key = PairKey::new("Alpha", "quinoa");
    let before = predict(&engine, &key, 6, 100);
    assert_abs_diff_eq!(before.baseline_demand, 2500.0);
    assert_abs_diff_eq!(before.baseline_price, 50.0);

    let after = engine.apply_events(&before, &[event("Flood", EventKind::Disaster, 1.4)], test_now());

    for series in [&after.demand_series, &after.price_series] {
        let labeled: Vec<u32> = series
            .iter()
            .filter(|p| p.event_label.as_deref() == Some("Flood"))
            .map(|p| p.month)
            .collect();
        assert_eq!(labeled, vec![6, 7, 8, 9, 10, 11, 12]);

        for point in series.iter().filter(|p| p.month < 6) {
            assert!(point.event_label.is_none());
        }
    }
}

#[test]
fn test_manual_override_fields_are_independent() {
    let engine = fitted_engine(11);
    let before = predict(&engine, &PairKey::new("district3", "rice"), 6, 110);

    let after = engine.apply_manual_override(&before, 8, 0.0, 10.0, test_now());

    // Zero demand change: the demand point is completely untouched
    assert_eq!(after.demand_series[7], before.demand_series[7]);

    let old_price = &before.price_series[7];
    let new_price = &after.price_series[7];
    assert_abs_diff_eq!(new_price.value, round2(old_price.value * 1.10), epsilon = 1e-9);
    assert_abs_diff_eq!(
        new_price.percentage,
        round2(100.0 * new_price.value / before.baseline_price),
        epsilon = 1e-9
    );
    assert_eq!(new_price.event_label.as_deref(), Some("Manual Adjustment"));

    // Other months untouched on both series
    for month in (0..12).filter(|&m| m != 7) {
        assert_eq!(after.demand_series[month], before.demand_series[month]);
        assert_eq!(after.price_series[month], before.price_series[month]);
    }
}

#[test]
fn test_manual_override_applies_both_changes() {
    let engine = fitted_engine(12);
    let before = predict(&engine, &PairKey::new("district4", "corn"), 3, 120);

    let after = engine.apply_manual_override(&before, 5, -20.0, 15.0, test_now());

    assert_abs_diff_eq!(
        after.demand_series[4].value,
        round2(before.demand_series[4].value * 0.80),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        after.price_series[4].value,
        round2(before.price_series[4].value * 1.15),
        epsilon = 1e-9
    );
    assert_eq!(
        after.demand_series[4].event_label.as_deref(),
        Some("Manual Adjustment")
    );
}

#[rstest]
fn test_manual_override_out_of_range_month_is_a_noop(#[values(0, 13, 99)] month: u32) {
    let engine = fitted_engine(13);
    let before = predict(&engine, &PairKey::new("district5", "potato"), 6, 130);

    let after = engine.apply_manual_override(
        &before,
        month,
        25.0,
        25.0,
        test_now() + Duration::hours(1),
    );

    // Identical to the input, timestamp included
    assert_eq!(after, before);
}

#[test]
fn test_predict_with_events_matches_manual_composition() {
    let engine = fitted_engine(14);
    let key = PairKey::new("district1", "tomato");
    let events = vec![event("Pest Attack", EventKind::Disaster, 1.2)];
    let now = test_now();

    let mut rng = StdRng::seed_from_u64(140);
    let composed = engine
        .predict_with_events(&key, 2024, 6, &events, now, &mut rng)
        .unwrap();

    let mut rng = StdRng::seed_from_u64(140);
    let base = engine.predict(&key, 2024, 6, now, &mut rng).unwrap();
    let expected = engine.apply_events(&base, &events, now);

    assert_eq!(composed, expected);
}

#[test]
fn test_same_seed_reproduces_the_prediction() {
    let engine = fitted_engine(15);
    let key = PairKey::new("district2", "cotton");

    let a = predict(&engine, &key, 7, 150);
    let b = predict(&engine, &key, 7, 150);
    assert_eq!(a, b);

    let c = predict(&engine, &key, 7, 151);
    assert_ne!(a.demand_series, c.demand_series);
}
