use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crop_forecast::{Event, EventDraft, EventKind, EventScope, EventStore, RandomEventConfig};

fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn timed_event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
    Event {
        id: id.to_string(),
        name: id.to_string(),
        kind: EventKind::Disaster,
        impact_factor: 1.3,
        start,
        end,
        affected_locations: EventScope::All,
        affected_crops: EventScope::All,
        description: String::new(),
    }
}

#[test]
fn test_active_returns_live_events_and_evicts_expired_ones() {
    let now = test_now();
    let store = EventStore::default();

    store.inject(timed_event("expired", now - Duration::days(20), now - Duration::days(1)));
    store.inject(timed_event("live", now - Duration::days(1), now + Duration::days(5)));
    store.inject(timed_event("future", now + Duration::days(2), now + Duration::days(9)));
    assert_eq!(store.len(), 3);

    let active = store.active(now);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "live");

    // The expired event is gone for good; the future one is retained
    assert_eq!(store.len(), 2);

    let later = store.active(now + Duration::days(3));
    let ids: Vec<&str> = later.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["live", "future"]);
}

#[test]
fn test_eviction_boundary_is_exact() {
    let now = test_now();
    let store = EventStore::default();
    store.inject(timed_event("closing", now - Duration::days(5), now));

    // An event whose window ends exactly at `now` is no longer active
    assert!(store.active(now).is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_relevant_to_matches_scopes() {
    let now = test_now();
    let store = EventStore::default();

    let mut scoped = timed_event("scoped", now - Duration::days(1), now + Duration::days(5));
    scoped.affected_locations = EventScope::only(["Pune", "Mumbai"]);
    scoped.affected_crops = EventScope::only(["wheat"]);
    store.inject(scoped);
    store.inject(timed_event("global", now - Duration::days(1), now + Duration::days(5)));

    let pune_wheat = store.relevant_to("Pune", "wheat", now);
    assert_eq!(pune_wheat.len(), 2);

    let pune_rice = store.relevant_to("Pune", "rice", now);
    assert_eq!(pune_rice.len(), 1);
    assert_eq!(pune_rice[0].id, "global");

    let delhi_wheat = store.relevant_to("Delhi", "wheat", now);
    assert_eq!(delhi_wheat.len(), 1);
}

#[test]
fn test_poll_synthesizes_nothing_when_disabled() {
    let now = test_now();
    let config = RandomEventConfig {
        enabled: false,
        probability: 1.0,
        ..RandomEventConfig::default()
    };
    let store = EventStore::new(config);
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..10 {
        store.poll(now, &mut rng);
    }
    assert!(store.is_empty());
}

#[test]
fn test_poll_synthesizes_catalog_events_when_enabled() {
    let now = test_now();
    let config = RandomEventConfig {
        enabled: true,
        probability: 1.0,
        ..RandomEventConfig::default()
    };
    let store = EventStore::new(config);
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..20 {
        store.poll(now, &mut rng);
    }
    assert_eq!(store.len(), 20);

    for event in store.active(now) {
        assert_eq!(event.start, now);
        let days = (event.end - event.start).num_days();
        assert!((7..=45).contains(&days), "duration out of range: {}", days);

        let (low, high) = match event.kind {
            EventKind::Disaster => (1.2, 1.5),
            EventKind::Economic => (1.1, 1.3),
            EventKind::Positive => (0.8, 0.95),
            EventKind::Manual => panic!("synthesizer never emits manual events"),
        };
        assert!(event.impact_factor >= low && event.impact_factor <= high);

        match &event.affected_locations {
            EventScope::Only(names) => assert!((1..=3).contains(&names.len())),
            EventScope::All => panic!("synthesized events list concrete locations"),
        }
        match &event.affected_crops {
            EventScope::Only(names) => assert!((2..=5).contains(&names.len())),
            EventScope::All => panic!("synthesized events list concrete crops"),
        }
    }
}

#[test]
fn test_synthesized_ids_are_unique_within_a_second() {
    let now = test_now();
    let config = RandomEventConfig {
        enabled: true,
        probability: 1.0,
        ..RandomEventConfig::default()
    };
    let store = EventStore::new(config);
    let mut rng = StdRng::seed_from_u64(3);

    store.poll(now, &mut rng);
    store.poll(now, &mut rng);

    let events = store.active(now);
    assert_eq!(events.len(), 2);
    assert_ne!(events[0].id, events[1].id);
}

#[test]
fn test_manual_event_fills_stock_defaults() {
    let now = test_now();
    let store = EventStore::default();

    let event = store.manual_event(EventDraft::default(), now);

    assert_eq!(event.name, "Manual Event");
    assert_eq!(event.kind, EventKind::Manual);
    assert_eq!(event.impact_factor, 1.1);
    assert_eq!(event.start, now);
    assert_eq!(event.end, now + Duration::days(30));
    assert_eq!(event.affected_locations, EventScope::All);
    assert_eq!(event.affected_crops, EventScope::All);
    assert!(event.id.starts_with("manual_"));

    // The built event is live in the store
    assert_eq!(store.active(now).len(), 1);
}

#[test]
fn test_manual_event_honors_draft_fields() {
    let now = test_now();
    let store = EventStore::default();

    let draft = EventDraft {
        name: Some("Port Strike".to_string()),
        kind: Some(EventKind::Economic),
        impact_factor: Some(1.2),
        duration_days: Some(10),
        locations: Some(EventScope::only(["Chennai"])),
        crops: Some(EventScope::only(["rice", "cotton"])),
        description: Some("Export backlog at the port".to_string()),
    };
    let event = store.manual_event(draft, now);

    assert_eq!(event.name, "Port Strike");
    assert_eq!(event.kind, EventKind::Economic);
    assert_eq!(event.impact_factor, 1.2);
    assert_eq!(event.end, now + Duration::days(10));
    assert!(event.applies_to("Chennai", "rice"));
    assert!(!event.applies_to("Chennai", "wheat"));
}

#[test]
fn test_demo_seeds_install_three_active_events() {
    let now = test_now();
    let store = EventStore::default();
    store.seed_demo_events(now);

    let active = store.active(now);
    assert_eq!(active.len(), 3);

    let drought = active.iter().find(|e| e.id.starts_with("drought")).unwrap();
    assert_eq!(drought.kind, EventKind::Disaster);
    assert_eq!(drought.impact_factor, 1.3);
    assert!(drought.applies_to("Pune", "wheat"));
    assert!(!drought.applies_to("Kolkata", "wheat"));

    let flood = active.iter().find(|e| e.id.starts_with("flood")).unwrap();
    assert!(flood.applies_to("Kolkata", "rice"));
    assert!(!flood.applies_to("Pune", "rice"));

    let fuel = active.iter().find(|e| e.id.starts_with("economic")).unwrap();
    assert_eq!(fuel.kind, EventKind::Economic);
    // Economy-wide: reaches every pair
    assert!(fuel.applies_to("Anywhere", "anything"));
}

#[test]
fn test_demo_seeds_expire_on_schedule() {
    let now = test_now();
    let store = EventStore::default();
    store.seed_demo_events(now);

    // After 20 days the flood (15-day window) has expired
    let active = store.active(now + Duration::days(20));
    let ids: Vec<&str> = active.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().all(|id| !id.starts_with("flood")));

    // After 70 days everything is gone
    assert!(store.active(now + Duration::days(70)).is_empty());
    assert!(store.is_empty());
}
