use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

use roleta_core::{
    chance_table, DropoutVariant, Item, LocalRng, PacerMode, SeedSource, SelectionFormat,
    SpinPacer, WheelController, WheelSettings,
};

#[derive(Parser)]
#[command(name = "roleta-cli", about = "Admin and simulation CLI for the roleta relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Database URL, default sqlite://roleta.db
    #[arg(long, value_parser, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Normal,
    Dropout,
    BattleRoyal,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Classic,
    Simulated,
}

impl From<FormatArg> for SelectionFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Normal => SelectionFormat::Normal,
            FormatArg::Dropout => SelectionFormat::Dropout,
            FormatArg::BattleRoyal => SelectionFormat::BattleRoyal,
        }
    }
}

impl From<VariantArg> for DropoutVariant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Classic => DropoutVariant::Classic,
            VariantArg::Simulated => DropoutVariant::Simulated,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run offline wheel simulations and print a win distribution
    Simulate {
        #[arg(long, value_enum, default_value_t = FormatArg::Normal)]
        format: FormatArg,
        #[arg(long, value_enum, default_value_t = VariantArg::Classic)]
        variant: VariantArg,
        /// JSON file with the item list; a built-in demo set when omitted
        #[arg(long)]
        items: Option<PathBuf>,
        /// Number of full wheel runs
        #[arg(long, default_value_t = 1)]
        runs: u32,
        /// Base seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// View last N spin-log entries
    ViewLogs {
        #[arg(default_value_t = 20)]
        n: i64,
    },
    /// Export the spin log to a CSV path
    ExportCsv { path: String },
}

fn demo_items() -> Vec<Item> {
    vec![
        Item::new("1", "alpha", 300.0).with_color("#e74c3c"),
        Item::new("2", "beta", 150.0).with_color("#3498db"),
        Item::new("3", "gamma", 75.0).with_color("#2ecc71"),
        Item::new("4", "delta", 25.0).with_color("#f1c40f"),
    ]
}

fn load_items(path: Option<&PathBuf>) -> anyhow::Result<Vec<Item>> {
    match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(demo_items()),
    }
}

async fn run_once(
    items: Vec<Item>,
    settings: WheelSettings,
    seed: Option<u64>,
) -> anyhow::Result<String> {
    let source = match seed {
        Some(s) => SeedSource::Local(LocalRng::seeded(s)),
        None => SeedSource::Local(LocalRng::from_entropy()),
    };
    let normal = settings.format == SelectionFormat::Normal;
    let mut controller =
        WheelController::new(items, settings, SpinPacer::new(PacerMode::Immediate), source);
    controller.set_removal_delay(Duration::ZERO);
    let rounds = controller.run_to_completion().await?;
    let champion = if normal {
        rounds.last().map(|r| r.winner_id.clone()).unwrap_or_default()
    } else {
        controller
            .items()
            .first()
            .map(|i| i.id.clone())
            .unwrap_or_default()
    };
    Ok(champion)
}

async fn simulate(
    format: FormatArg,
    variant: VariantArg,
    items: Option<PathBuf>,
    runs: u32,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let items = load_items(items.as_ref())?;
    let settings = WheelSettings {
        format: format.into(),
        dropout_variant: variant.into(),
        spin_time_secs: 1,
        ..WheelSettings::default()
    };

    println!("chances:");
    for (name, chance) in chance_table(&items) {
        println!("  {name:>12} {chance:>5.1}%");
    }

    if runs <= 1 {
        let source = match seed {
            Some(s) => SeedSource::Local(LocalRng::seeded(s)),
            None => SeedSource::Local(LocalRng::from_entropy()),
        };
        let normal = settings.format == SelectionFormat::Normal;
        let mut controller = WheelController::new(
            items.clone(),
            settings,
            SpinPacer::new(PacerMode::Immediate),
            source,
        );
        controller.set_removal_delay(Duration::ZERO);
        let rounds = controller.run_to_completion().await?;
        for (i, round) in rounds.iter().enumerate() {
            println!(
                "round {:>2}: {} {}",
                i + 1,
                round.winner_id,
                if round.is_final_spin { "(final)" } else { "" }
            );
        }
        let champion = if normal {
            rounds.last().map(|r| r.winner_id.clone()).unwrap_or_default()
        } else {
            controller
                .items()
                .first()
                .map(|i| i.id.clone())
                .unwrap_or_default()
        };
        let name = items
            .iter()
            .find(|i| i.id == champion)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| champion.clone());
        println!("champion: {name} ({champion})");
        return Ok(());
    }

    let mut wins: BTreeMap<String, u32> = BTreeMap::new();
    for run in 0..runs {
        let champion = run_once(
            items.clone(),
            settings.clone(),
            seed.map(|s| s.wrapping_add(run as u64)),
        )
        .await?;
        *wins.entry(champion).or_default() += 1;
    }
    println!("wins over {runs} runs:");
    for item in &items {
        let count = wins.get(&item.id).copied().unwrap_or(0);
        println!(
            "  {:>12} {:>6} ({:>5.1}%)",
            item.name,
            count,
            count as f64 / runs as f64 * 100.0
        );
    }
    Ok(())
}

async fn get_pool(url: Option<String>) -> anyhow::Result<SqlitePool> {
    let url = url.unwrap_or_else(|| "sqlite://roleta.db".into());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            format,
            variant,
            items,
            runs,
            seed,
        } => {
            simulate(format, variant, items, runs, seed).await?;
        }
        Commands::ViewLogs { n } => {
            let pool = get_pool(cli.database_url).await?;
            let rows = sqlx::query(
                "SELECT id, ts, winner, angle, duration FROM spins ORDER BY id DESC LIMIT ?",
            )
            .bind(n)
            .fetch_all(&pool)
            .await?;
            for r in rows {
                let id: i64 = r.get("id");
                let ts: String = r.get("ts");
                let winner: String = r.get("winner");
                let angle: f64 = r.get("angle");
                let duration: f64 = r.get("duration");
                println!("#{id:>6} {ts} winner={winner} angle={angle:.1} duration={duration}");
            }
        }
        Commands::ExportCsv { path } => {
            let pool = get_pool(cli.database_url).await?;
            let mut wtr = csv::Writer::from_path(&path)?;
            let rows = sqlx::query(
                "SELECT id, ts, winner, angle, duration FROM spins ORDER BY id ASC",
            )
            .fetch_all(&pool)
            .await?;
            let total = rows.len();
            for r in &rows {
                wtr.write_record(&[
                    r.get::<i64, _>("id").to_string(),
                    r.get::<String, _>("ts"),
                    r.get::<String, _>("winner"),
                    r.get::<f64, _>("angle").to_string(),
                    r.get::<f64, _>("duration").to_string(),
                ])?;
            }
            wtr.flush()?;
            println!("Exported {} rows to {}", total, path);
        }
    }

    Ok(())
}
