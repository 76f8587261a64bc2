use std::time::Instant;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use events_models::{Category, Event};
use json_store::{JsonStore, StoreConfig};
use rand::{Rng, rng};
use tracing::{Level, info};

const CATEGORIES: &[(&str, &str)] = &[
    ("1", "Music"),
    ("2", "Theatre"),
    ("3", "Food & Wine"),
    ("4", "Sport"),
    ("5", "Art & Culture"),
    ("6", "Festivals"),
    ("7", "Nightlife"),
    ("8", "Markets"),
];

const THEMES: &[&str] = &[
    "Jazz",
    "Opera",
    "Street Food",
    "Wine",
    "Folk",
    "Rock",
    "Cinema",
    "Craft Beer",
    "Vintage",
    "Classical",
];

const KINDS: &[&str] = &[
    "Night",
    "Festival",
    "Gala",
    "Fair",
    "Tasting",
    "Parade",
    "Workshop",
    "Showcase",
    "Marathon",
    "Market",
];

const LOCATIONS: &[&str] = &[
    "Naples",
    "Salerno",
    "Sorrento",
    "Amalfi",
    "Positano",
    "Caserta",
    "Benevento",
    "Pompeii",
    "Capri",
    "Ischia",
];

#[derive(Parser)]
#[command(name = "seeder")]
#[command(about = "Demo-data seeder for the piazza event store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path of the JSON database file
    #[arg(short, long)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the canonical category list
    Categories,
    /// Generate random events across the seeded categories
    Events {
        #[arg(long, default_value = "30")]
        count: usize,
    },
    /// Categories plus events in one run
    All {
        #[arg(long, default_value = "30")]
        events: usize,
    },
}

impl Cli {
    fn db_path(&self) -> String {
        self.db.clone().unwrap_or_else(|| {
            std::env::var("PIAZZA_DB")
                .unwrap_or_else(|_| "db.json".to_string())
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let start_time = Instant::now();
    info!("🚀 Starting piazza store seeding");

    let config = StoreConfig::new(cli.db_path());
    let store = JsonStore::open(&config).await?;
    info!("📚 Opened store at {}", store.path().display());

    match cli.command {
        Commands::Categories => {
            seed_categories(&store).await?;
        }
        Commands::Events { count } => {
            seed_events(&store, count).await?;
        }
        Commands::All { events } => {
            seed_categories(&store).await?;
            seed_events(&store, events).await?;
        }
    }

    info!(
        "✅ Seeding completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Insert any of the canonical categories the store does not have yet.
/// Re-running never duplicates.
async fn seed_categories(store: &JsonStore) -> Result<()> {
    let categories = store.collection::<Category>("categories");

    let mut written = 0;
    for (id, name) in CATEGORIES {
        if categories.find(|c| c.id == *id).await?.is_some() {
            continue;
        }
        categories
            .insert(&Category {
                id: (*id).to_string(),
                name: (*name).to_string(),
            })
            .await?;
        written += 1;
    }

    info!(
        "Seeded {} categories ({} already present)",
        written,
        CATEGORIES.len() - written
    );
    Ok(())
}

/// Generate `count` events with names, locations and dates drawn from the
/// pools above. Dates land between two months back and three months out;
/// ids continue from the highest numeric id already stored.
async fn seed_events(store: &JsonStore, count: usize) -> Result<()> {
    let events = store.collection::<Event>("events");

    let existing = events.all().await?;
    let mut next_id = existing
        .iter()
        .filter_map(|e| e.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;

    let now = Utc::now();
    for _ in 0..count {
        // rand's thread rng must not live across an await
        let (theme, kind, location, category, day_offset, hour) = {
            let mut rng = rng();
            (
                THEMES[rng.random_range(0..THEMES.len())],
                KINDS[rng.random_range(0..KINDS.len())],
                LOCATIONS[rng.random_range(0..LOCATIONS.len())],
                rng.random_range(1..=CATEGORIES.len()),
                rng.random_range(-60..=90_i64),
                rng.random_range(10..=22_u32),
            )
        };

        let name = format!("{theme} {kind}");
        let date = (now + Duration::days(day_offset))
            .date_naive()
            .and_hms_opt(hour, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);

        let event = Event::builder()
            .id(next_id.to_string())
            .name(name.clone())
            .description(format!("{name} in {location}"))
            .location(location.to_string())
            .date(date)
            .category_id(category.to_string())
            .build();
        events.insert(&event).await?;
        next_id += 1;
    }

    info!("Seeded {} events", count);
    Ok(())
}
