use chrono::{Datelike, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crop_forecast::{
    EventDraft, EventKind, EventScope, EventStore, ForecastService, PredictionEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Crop Forecast: Basic Outlook Example");
    println!("====================================\n");

    let mut rng = StdRng::seed_from_u64(42);
    let now = Utc::now();

    // Fit the engine once, at startup
    println!("Fitting prediction engine...");
    let engine = PredictionEngine::with_defaults(now.year(), &mut rng)?;
    let service = ForecastService::new(engine, EventStore::default());
    println!("Engine fitted\n");

    // Produce and track a twelve-month outlook
    let outlook = service.predict_and_track("district1", "wheat", now, &mut rng)?;
    println!(
        "Outlook for {} in {} (current month {}):",
        outlook.key.crop, outlook.key.location, outlook.current_month
    );
    println!("  baseline demand: {:.2}", outlook.baseline_demand);
    println!("  baseline price:  {:.2}\n", outlook.baseline_price);

    for (demand, price) in outlook.demand_series.iter().zip(outlook.price_series.iter()) {
        let flag = if demand.is_historical { "hist" } else { "fcst" };
        println!(
            "  month {:>2} [{}]  demand {:>8.2} ({:>6.2}%)  price {:>6.2} ({:>6.2}%)",
            demand.month, flag, demand.value, demand.percentage, price.value, price.percentage
        );
    }

    // Inject a disaster event covering this pair and recompute
    println!("\nInjecting a drought event...");
    let drought = service.event_store().manual_event(
        EventDraft {
            name: Some("Regional Drought".to_string()),
            kind: Some(EventKind::Disaster),
            impact_factor: Some(1.3),
            duration_days: Some(30),
            locations: Some(EventScope::only(["district1"])),
            crops: Some(EventScope::only(["wheat"])),
            description: Some("Severe drought affecting wheat yields".to_string()),
        },
        now,
    );
    println!("Injected event: {} ({})", drought.name, drought.id);

    let events = service.event_store().relevant_to("district1", "wheat", now);
    let adjusted = service.updated_prediction("district1", "wheat", &events, now, &mut rng)?;

    println!("\nAdjusted outlook (forecast months carry the event label):");
    for (demand, price) in adjusted.demand_series.iter().zip(adjusted.price_series.iter()) {
        println!(
            "  month {:>2}  demand {:>8.2}  price {:>6.2}  label {:?}",
            demand.month, demand.value, price.value, demand.event_label
        );
    }

    // Apply an operator override to a single forecast month
    let target_month = adjusted.current_month;
    let overridden = service.manual_adjust("district1", "wheat", target_month, 10.0, -5.0, now)?;
    let demand = &overridden.demand_series[(target_month - 1) as usize];
    let price = &overridden.price_series[(target_month - 1) as usize];
    println!(
        "\nAfter a +10% demand / -5% price override on month {}:",
        target_month
    );
    println!("  demand {:>8.2}  label {:?}", demand.value, demand.event_label);
    println!("  price  {:>8.2}  label {:?}", price.value, price.event_label);

    println!("\nSerialized prediction:\n{}", overridden.to_json()?);
    Ok(())
}
