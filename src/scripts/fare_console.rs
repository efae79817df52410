use chrono::Utc;
use fare_friend::config::AppConfig;
use fare_friend::functions::{estimate_trip, RouteQuery, TripEstimate, TripServices};
use fare_friend::storage::{FareReport, LocalStore, LocationStore, ReportDraft, ReportStore, Trip, TripStore};
use fare_friend::utils::{local_now, resolve_fare_time};
use log::error;
use std::collections::BTreeSet;
use std::io::{self, Write};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    let offset = match config.utc_offset() {
        Ok(offset) => offset,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    let services = match TripServices::from_config(&config) {
        Ok(services) => services,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    let store = match &config.storage.data_dir {
        Some(dir) => match LocalStore::open(dir, config.storage.history_capacity) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        },
        None => LocalStore::in_memory(config.storage.history_capacity),
    };

    let mut last_estimate: Option<TripEstimate> = None;

    loop {
        println!("FareFriend - Auto fare estimator");
        println!("1. Estimate fare");
        println!("2. Save last estimate to history");
        println!("3. Show trip history");
        println!("4. Report actual fare for last estimate");
        println!("5. Exit");

        let choice = match prompt("Choose an option: ") {
            Some(choice) => choice,
            None => break,
        };

        match choice.as_str() {
            "1" => {
                let last = store.last_used();
                let pickup = prompt_with_default("Pickup", last.as_ref().map(|q| q.pickup.as_str()));
                let dropoff = prompt_with_default("Dropoff", last.as_ref().map(|q| q.dropoff.as_str()));
                let when = prompt("Journey time (YYYY-MM-DDTHH:MM, empty = now): ").unwrap_or_default();

                let at = match resolve_fare_time(Some(when.as_str()), offset, local_now(offset)) {
                    Ok(at) => at,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        continue;
                    }
                };

                let query = RouteQuery::new(pickup, dropoff);
                match estimate_trip(&services, &query, at).await {
                    Ok(estimate) => {
                        print_estimate(&estimate);
                        if let Err(e) = store.remember(&estimate.query) {
                            error!("Could not remember locations: {}", e);
                        }
                        last_estimate = Some(estimate);
                    }
                    Err(e) => {
                        error!("{}", e);
                        eprintln!("{}", e.user_message());
                    }
                }
            }
            "2" => match &last_estimate {
                Some(estimate) => {
                    match Trip::from_estimate(estimate, Utc::now()).and_then(|trip| store.save(trip)) {
                        Ok(()) => println!("Trip saved to history!"),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                None => println!("Estimate a fare first."),
            },
            "3" => {
                let history = store.list();
                if history.is_empty() {
                    println!("No trip history yet. Your saved trips will appear here.");
                }
                for trip in history {
                    println!(
                        "{} → {}  {} km · {}  ₹{}",
                        trip.pickup,
                        trip.dropoff,
                        trip.distance_km,
                        trip.timestamp.with_timezone(&offset).format("%d/%m/%Y %H:%M"),
                        trip.fare
                    );
                }
            }
            "4" => match &last_estimate {
                Some(estimate) => report_fare(&store, estimate),
                None => println!("Estimate a fare first."),
            },
            "5" => break,
            _ => println!("Invalid choice, please try again."),
        }
    }
}

fn print_estimate(estimate: &TripEstimate) {
    let (route, fare) = (&estimate.route, &estimate.fare);
    println!(
        "Distance: {} km · Time: {} min (traffic: {}, +{} min)",
        route.distance_km, route.traffic_duration_min, route.traffic_condition, route.traffic_delay_min
    );
    println!("  Base fare:        ₹{}", fare.base_fare);
    println!("  Distance ({} km): ₹{}", fare.chargeable_distance_km, fare.distance_fare);
    if fare.is_night_time && fare.night_charge > 0 {
        println!("  Night charge:     ₹{}", fare.night_charge);
    }
    if fare.waiting_charge > 0 {
        println!("  Waiting charge:   ₹{}", fare.waiting_charge);
    }
    println!("  Total:            ₹{}", fare.total_fare);
    println!(
        "Ola Mini ≈ ₹{} · Uber Go ≈ ₹{} · Confidence {}%",
        estimate.comparison.service_a, estimate.comparison.service_b, fare.confidence_score
    );
    println!("{}", estimate.share_text);
}

fn report_fare(store: &LocalStore, estimate: &TripEstimate) {
    let actual_fare = match prompt("Actual fare paid: ").and_then(|v| v.parse::<u32>().ok()) {
        Some(fare) => fare,
        None => {
            println!("Please enter a valid fare amount");
            return;
        }
    };
    let issues: BTreeSet<String> = prompt("Issues (comma separated): ")
        .unwrap_or_default()
        .split(',')
        .map(|issue| issue.trim().to_string())
        .filter(|issue| !issue.is_empty())
        .collect();
    let comments = prompt("Additional comments: ").unwrap_or_default();

    let draft = ReportDraft {
        pickup: estimate.query.pickup.clone(),
        dropoff: estimate.query.dropoff.clone(),
        distance_km: estimate.route.distance_km,
        estimated_fare: estimate.fare.total_fare,
        actual_fare,
        issues,
        comments,
    };

    match FareReport::new(draft, Utc::now()).and_then(|report| store.submit(report)) {
        Ok(()) => println!("Thanks for reporting! Your data helps make fare estimation more accurate for everyone."),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn prompt_with_default(label: &str, default: Option<&str>) -> String {
    let text = match default {
        Some(value) if !value.is_empty() => format!("{} [{}]: ", label, value),
        _ => format!("{}: ", label),
    };
    match prompt(&text) {
        Some(value) if !value.is_empty() => value,
        _ => default.unwrap_or_default().to_string(),
    }
}
