use std::thread;
use std::time::Duration;

use chrono::{Datelike, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crop_forecast::{
    EngineConfig, EventStore, ForecastService, PredictionEngine, RandomEventConfig,
    RefreshOutcome,
};
use crop_forecast::corpus::{default_training_pairs, BaselineCorpus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Crop Forecast: Live Refresh Example");
    println!("===================================\n");

    let mut rng = StdRng::seed_from_u64(7);
    let now = Utc::now();

    // Demo configuration: random event synthesis on, high probability so a
    // short run actually shows one
    let mut config = EngineConfig::default();
    config.random_events = RandomEventConfig {
        enabled: true,
        probability: 0.5,
        ..RandomEventConfig::default()
    };

    println!("Fitting prediction engine...");
    let corpus = BaselineCorpus::generate(&default_training_pairs(), now.year(), &config, &mut rng);
    let events = EventStore::new(config.random_events.clone());
    events.seed_demo_events(now);
    let engine = PredictionEngine::new(corpus, config)?;
    let service = ForecastService::new(engine, events);
    println!("Engine fitted, {} demo events seeded\n", service.current_events(now).len());

    // Track a few pairs so the refresh cycle has work to do
    for (location, crop) in [
        ("district1", "wheat"),
        ("district2", "rice"),
        ("Pune", "cotton"),
    ] {
        let outlook = service.predict_and_track(location, crop, now, &mut rng)?;
        println!(
            "Tracking {}/{} (baseline demand {:.2}, baseline price {:.2})",
            location, crop, outlook.baseline_demand, outlook.baseline_price
        );
    }

    // An external timer would tick every five minutes; the demo ticks a few
    // times in quick succession
    for tick in 1..=3 {
        thread::sleep(Duration::from_millis(200));
        let tick_now = Utc::now();

        match service.refresh_tick(tick_now, &mut rng) {
            RefreshOutcome::Completed { refreshed, failed } => {
                println!(
                    "\nTick {}: refreshed {} pairs, {} failed, {} active events",
                    tick,
                    refreshed,
                    failed,
                    service.current_events(tick_now).len()
                );
            }
            RefreshOutcome::Skipped => {
                println!("\nTick {}: skipped, cycle already running", tick);
            }
        }

        let status = service.status(tick_now);
        println!(
            "Status: {} tracked, {} active events, last refresh {:?}",
            status.tracked_predictions, status.active_events, status.last_refresh
        );
    }

    // Show the published snapshot for one pair after refreshing
    let snapshot = service
        .prediction_store()
        .get(&crop_forecast::PairKey::new("district1", "wheat"))
        .expect("pair was tracked above");
    println!("\ndistrict1/wheat after refresh (month, demand, label):");
    for point in &snapshot.demand_series {
        println!(
            "  {:>2}  {:>8.2}  {:?}",
            point.month, point.value, point.event_label
        );
    }

    Ok(())
}
