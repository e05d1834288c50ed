//! mini - smallest example for the rust_abm demand-simulation framework.
//!
//! Eight agents on a 10 km × 6 km synthetic area, each with a home–activity–
//! home day and an initial mode.  The loop runs a handful of iterations of
//! replanning, teleportation mobsim and scoring, and writes
//! `scorestats.csv`, `modestats.csv` and `agent_scores.csv` to
//! `output/mini`.
//!
//! Usage: `cargo run -p mini [-- config.json]`.  Without an argument the
//! built-in defaults are used with 20 iterations.

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

use abm_core::TransportMode;
use abm_core::time::format_hms;
use abm_mobility::TeleportationDiagnostics;
use abm_output::{ControlerOutputListener, CsvWriter};
use abm_population::load_population_reader;
use abm_sim::{Config, ControlerBuilder, EventHandlerListener, ScoreItem};

// ── Constants ─────────────────────────────────────────────────────────────────

const LAST_ITERATION: u32  = 20;
const SEED:           u64  = 42;
const OUTPUT_DIR:     &str = "output/mini";

// ── Population CSV ────────────────────────────────────────────────────────────

// One row per plan element; legs are unrouted and get routed before
// iteration 0.
const POPULATION_CSV: &str = "\
agent_id,seq,kind,type,x,y,end_time,max_duration,mode,dep_time,travel_time,distance\n\
1,0,act,home,0,0,07:00:00,,,,,\n\
1,1,leg,,,,,,car,,,\n\
1,2,act,work,5000,0,16:00:00,,,,,\n\
1,3,leg,,,,,,car,,,\n\
1,4,act,home,0,0,,,,,,\n\
2,0,act,home,1200,800,07:30:00,,,,,\n\
2,1,leg,,,,,,pt,,,\n\
2,2,act,work,8000,3000,17:00:00,,,,,\n\
2,3,leg,,,,,,pt,,,\n\
2,4,act,home,1200,800,,,,,,\n\
3,0,act,home,300,2500,08:15:00,,,,,\n\
3,1,leg,,,,,,bicycle,,,\n\
3,2,act,education,2500,3000,14:00:00,,,,,\n\
3,3,leg,,,,,,bicycle,,,\n\
3,4,act,home,300,2500,,,,,,\n\
4,0,act,home,4000,4000,10:00:00,,,,,\n\
4,1,leg,,,,,,walk,,,\n\
4,2,act,shop,4600,4300,,01:00:00,,,,\n\
4,3,leg,,,,,,walk,,,\n\
4,4,act,home,4000,4000,,,,,,\n\
5,0,act,home,9000,6000,06:45:00,,,,,\n\
5,1,leg,,,,,,car,,,\n\
5,2,act,work,1000,500,15:30:00,,,,,\n\
5,3,leg,,,,,,car,,,\n\
5,4,act,home,9000,6000,,,,,,\n\
6,0,act,home,7000,1000,08:00:00,,,,,\n\
6,1,leg,,,,,,bicycle,,,\n\
6,2,act,work,5000,0,17:30:00,,,,,\n\
6,3,leg,,,,,,bicycle,,,\n\
6,4,act,leisure,6500,2000,21:00:00,,,,,\n\
6,5,leg,,,,,,walk,,,\n\
6,6,act,home,7000,1000,,,,,,\n\
7,0,act,home,2000,5500,09:00:00,,,,,\n\
7,1,leg,,,,,,pt,,,\n\
7,2,act,shop,5200,3100,,02:00:00,,,,\n\
7,3,leg,,,,,,pt,,,\n\
7,4,act,home,2000,5500,,,,,,\n\
8,0,act,home,500,500,07:45:00,,,,,\n\
8,1,leg,,,,,,walk,,,\n\
8,2,act,work,1400,900,16:30:00,,,,,\n\
8,3,leg,,,,,,walk,,,\n\
8,4,act,home,500,500,,,,,,\n\
";

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    TermLogger::init(LevelFilter::Info, LogConfig::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .context("failed to initialise logging")?;

    // 1. Configuration: a JSON file if given, otherwise defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json_file(Path::new(&path))
            .with_context(|| format!("loading config {path}"))?,
        None => {
            let mut config = Config::default();
            config.controler.last_iteration = LAST_ITERATION;
            config.controler.seed = SEED;
            config
        }
    };

    // 2. Population from the embedded CSV.
    let population = load_population_reader(Cursor::new(POPULATION_CSV))?;
    info!("loaded {} persons", population.len());

    // 3. Controler and output.
    let mut controler = ControlerBuilder::new(config, population).build()?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut listeners = (
        ControlerOutputListener::new(writer),
        EventHandlerListener::new(TeleportationDiagnostics::new()),
    );

    // 4. Run.
    let t0 = Instant::now();
    controler.run(&mut listeners)?;
    let elapsed = t0.elapsed();

    let (mut output, diagnostics) = listeners;
    if let Some(e) = output.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    let stats = controler.score_stats();
    println!();
    println!("Run complete in {:.3} s, {} iterations, output in {OUTPUT_DIR}/", elapsed.as_secs_f64(), stats.len());
    println!();
    println!("{:<10} {:>10} {:>10} {:>10} {:>10}", "Iteration", "executed", "average", "best", "worst");
    println!("{}", "-".repeat(54));
    for r in stats.history() {
        println!(
            "{:<10} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            r.iteration,
            r.get(ScoreItem::Executed),
            r.get(ScoreItem::Average),
            r.get(ScoreItem::Best),
            r.get(ScoreItem::Worst),
        );
    }

    if let Some(last) = controler.completed_iteration() {
        println!();
        println!("Mode shares in iteration {last}:");
        for mode in TransportMode::ALL {
            if let Some(share) = controler.mode_stats().share(mode, last).filter(|&s| s > 0.0) {
                println!("  {:<16} {:>6.1} %", mode.as_str(), share * 100.0);
            }
        }
    }

    println!();
    println!("{:<12} {:<7} {:>10} {:>14}", "Agent", "Plans", "Score", "Teleported");
    println!("{}", "-".repeat(46));
    for person in controler.population().persons() {
        let teleported: f64 = diagnostics.handler.travel_times(person.id()).iter().sum();
        println!(
            "{:<12} {:<7} {:>10.3} {:>14}",
            person.id().0,
            person.plan_count(),
            person.selected_score().unwrap_or(f64::NAN),
            format_hms(teleported),
        );
    }

    Ok(())
}
