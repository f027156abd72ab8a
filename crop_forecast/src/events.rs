//! Market events and the event store
//!
//! An [`Event`] is a time-bounded exogenous factor (disaster, economic
//! shock, positive development, manual entry) that perturbs forecast values
//! for the locations and crops it covers. The [`EventStore`] owns the live
//! set: it expires events whose window has closed, accepts injected ones,
//! and can synthesize random demonstration events on refresh ticks.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RandomEventConfig;
use crate::prediction::round2;

/// Impact factor assumed when an event record carries none
pub const DEFAULT_IMPACT_FACTOR: f64 = 1.1;

/// Label applied by manual overrides rather than by stored events
pub const MANUAL_ADJUSTMENT_LABEL: &str = "Manual Adjustment";

/// Category of a market event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Natural disaster: drives demand and price up
    Disaster,
    /// Economic shock: drives price up, demand untouched
    Economic,
    /// Favorable development: informational, never auto-applied
    Positive,
    /// Operator-entered event: applied through the override path only
    Manual,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Disaster => write!(f, "disaster"),
            EventKind::Economic => write!(f, "economic"),
            EventKind::Positive => write!(f, "positive"),
            EventKind::Manual => write!(f, "manual"),
        }
    }
}

/// The locations or crops an event reaches
///
/// Wire format is a plain string list with `["all"]` as the wildcard, so
/// records interchange cleanly with external detection feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum EventScope {
    /// Covers every name
    All,
    /// Covers exactly the listed names
    Only(BTreeSet<String>),
}

impl EventScope {
    /// Scope covering the listed names
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EventScope::Only(names.into_iter().map(Into::into).collect())
    }

    /// Whether this scope reaches `name`
    pub fn covers(&self, name: &str) -> bool {
        match self {
            EventScope::All => true,
            EventScope::Only(names) => names.contains(name),
        }
    }
}

impl From<Vec<String>> for EventScope {
    fn from(names: Vec<String>) -> Self {
        if names.iter().any(|n| n == "all") {
            EventScope::All
        } else {
            EventScope::Only(names.into_iter().collect())
        }
    }
}

impl From<EventScope> for Vec<String> {
    fn from(scope: EventScope) -> Self {
        match scope {
            EventScope::All => vec!["all".to_string()],
            EventScope::Only(names) => names.into_iter().collect(),
        }
    }
}

/// A time-bounded market event
///
/// Active over the half-open window `[start, end)`; never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: String,
    /// Human-readable name; recorded on adjusted prediction points
    pub name: String,
    /// Category, which selects the adjustment rule
    pub kind: EventKind,
    /// Multiplier applied by kind-specific adjustment rules
    #[serde(default = "default_impact_factor")]
    pub impact_factor: f64,
    /// Instant the event takes effect
    pub start: DateTime<Utc>,
    /// Instant the event stops applying (exclusive)
    pub end: DateTime<Utc>,
    /// Locations the event reaches
    pub affected_locations: EventScope,
    /// Crops the event reaches
    pub affected_crops: EventScope,
    /// Free-form context for operators
    pub description: String,
}

fn default_impact_factor() -> f64 {
    DEFAULT_IMPACT_FACTOR
}

impl Event {
    /// Whether the event's window covers `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// Whether the event's window has fully closed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end <= now
    }

    /// Whether the event reaches the given pair
    pub fn applies_to(&self, location: &str, crop: &str) -> bool {
        self.affected_locations.covers(location) && self.affected_crops.covers(crop)
    }
}

/// Partial input for operator-created events; absent fields take stock
/// defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    pub name: Option<String>,
    pub kind: Option<EventKind>,
    pub impact_factor: Option<f64>,
    pub duration_days: Option<i64>,
    pub locations: Option<EventScope>,
    pub crops: Option<EventScope>,
    pub description: Option<String>,
}

/// Name pool and impact range for one kind of synthesized event
struct RandomEventProfile {
    kind: EventKind,
    names: [&'static str; 4],
    impact_range: (f64, f64),
}

const RANDOM_EVENT_PROFILES: [RandomEventProfile; 3] = [
    RandomEventProfile {
        kind: EventKind::Disaster,
        names: [
            "Unexpected Hailstorm",
            "Pest Attack",
            "Disease Outbreak",
            "Water Shortage",
        ],
        impact_range: (1.2, 1.5),
    },
    RandomEventProfile {
        kind: EventKind::Economic,
        names: [
            "Market Volatility",
            "Export Demand Surge",
            "Currency Fluctuation",
            "Policy Change",
        ],
        impact_range: (1.1, 1.3),
    },
    RandomEventProfile {
        kind: EventKind::Positive,
        names: [
            "Good Weather Forecast",
            "New Farming Technology",
            "Government Subsidy",
            "Improved Seeds",
        ],
        impact_range: (0.8, 0.95),
    },
];

/// Owner of the live event set
///
/// Shared between the request path and the refresh driver; all methods take
/// `&self` and serialize access internally.
#[derive(Debug)]
pub struct EventStore {
    events: Mutex<Vec<Event>>,
    sequence: AtomicU64,
    config: RandomEventConfig,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(RandomEventConfig::default())
    }
}

impl EventStore {
    pub fn new(config: RandomEventConfig) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
            config,
        }
    }

    /// Drop expired events, then return clones of those active at `now`
    ///
    /// Future-dated events are retained but not returned.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.events.lock().unwrap();
        Self::evict_expired(&mut events, now);
        events.iter().filter(|e| e.is_active(now)).cloned().collect()
    }

    /// Append an event unconditionally
    pub fn inject(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    /// Refresh-tick entry: evict expired events, possibly synthesize one
    /// random event, and return the active set
    ///
    /// Synthesis only happens when enabled in the store's configuration and
    /// a draw against the configured probability succeeds.
    pub fn poll(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> Vec<Event> {
        let mut events = self.events.lock().unwrap();
        Self::evict_expired(&mut events, now);

        if self.config.enabled && rng.gen::<f64>() < self.config.probability {
            let event = self.synthesize(now, rng);
            debug!(id = %event.id, kind = %event.kind, "synthesized random event");
            events.push(event);
        }

        events.iter().filter(|e| e.is_active(now)).cloned().collect()
    }

    /// Active events whose scopes cover the given pair
    pub fn relevant_to(&self, location: &str, crop: &str, now: DateTime<Utc>) -> Vec<Event> {
        self.active(now)
            .into_iter()
            .filter(|e| e.applies_to(location, crop))
            .collect()
    }

    /// Build an event from an operator draft, filling absent fields with
    /// stock defaults, and inject it
    pub fn manual_event(&self, draft: EventDraft, now: DateTime<Utc>) -> Event {
        let duration = Duration::days(draft.duration_days.unwrap_or(30));
        let event = Event {
            id: self.next_id("manual", now),
            name: draft.name.unwrap_or_else(|| "Manual Event".to_string()),
            kind: draft.kind.unwrap_or(EventKind::Manual),
            impact_factor: draft.impact_factor.unwrap_or(DEFAULT_IMPACT_FACTOR),
            start: now,
            end: now + duration,
            affected_locations: draft.locations.unwrap_or(EventScope::All),
            affected_crops: draft.crops.unwrap_or(EventScope::All),
            description: draft
                .description
                .unwrap_or_else(|| "Manually added event for testing".to_string()),
        };
        self.inject(event.clone());
        event
    }

    /// Install the three stock demonstration events around `now`
    pub fn seed_demo_events(&self, now: DateTime<Utc>) {
        let year = now.format("%Y");
        let demos = [
            Event {
                id: format!("drought_{}_1", year),
                name: "Drought in Western Region".to_string(),
                kind: EventKind::Disaster,
                impact_factor: 1.3,
                start: now - Duration::days(10),
                end: now + Duration::days(30),
                affected_locations: EventScope::only(["Mumbai", "Pune", "Ahmedabad"]),
                affected_crops: EventScope::only(["wheat", "cotton", "sugarcane"]),
                description: "Severe drought conditions affecting crop yields".to_string(),
            },
            Event {
                id: format!("flood_{}_1", year),
                name: "Flooding in Eastern States".to_string(),
                kind: EventKind::Disaster,
                impact_factor: 1.4,
                start: now - Duration::days(5),
                end: now + Duration::days(15),
                affected_locations: EventScope::only(["Kolkata", "Hyderabad"]),
                affected_crops: EventScope::only(["rice", "potato", "tomato"]),
                description: "Heavy flooding damaging standing crops".to_string(),
            },
            Event {
                id: format!("economic_{}_1", year),
                name: "Fuel Price Increase".to_string(),
                kind: EventKind::Economic,
                impact_factor: 1.15,
                start: now - Duration::days(3),
                end: now + Duration::days(60),
                affected_locations: EventScope::All,
                affected_crops: EventScope::All,
                description: "Rising fuel costs affecting transportation and farming costs"
                    .to_string(),
            },
        ];

        let mut events = self.events.lock().unwrap();
        events.extend(demos);
    }

    /// Number of events currently held, active or not
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    fn evict_expired(events: &mut Vec<Event>, now: DateTime<Utc>) {
        let before = events.len();
        events.retain(|e| !e.is_expired(now));
        let evicted = before - events.len();
        if evicted > 0 {
            debug!(evicted, "dropped expired events");
        }
    }

    fn synthesize(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> Event {
        let profile = &RANDOM_EVENT_PROFILES[rng.gen_range(0..RANDOM_EVENT_PROFILES.len())];
        let name = profile.names[rng.gen_range(0..profile.names.len())];
        let impact = round2(rng.gen_range(profile.impact_range.0..=profile.impact_range.1));
        let duration = Duration::days(rng.gen_range(7..=45));

        Event {
            id: self.next_id(&profile.kind.to_string(), now),
            name: name.to_string(),
            kind: profile.kind,
            impact_factor: impact,
            start: now,
            end: now + duration,
            affected_locations: sample_scope(&self.config.location_pool, 1, 3, rng),
            affected_crops: sample_scope(&self.config.crop_pool, 2, 5, rng),
            description: format!("Simulated {} event affecting crop predictions", profile.kind),
        }
    }

    // Timestamp plus a store-wide sequence number: ids stay unique even for
    // events created within the same second.
    fn next_id(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}", prefix, now.format("%Y%m%d_%H%M%S"), seq)
    }
}

fn sample_scope(pool: &[String], min: usize, max: usize, rng: &mut impl Rng) -> EventScope {
    if pool.is_empty() {
        return EventScope::All;
    }
    let count = rng.gen_range(min..=max).min(pool.len());
    EventScope::only(pool.choose_multiple(rng, count).cloned())
}
