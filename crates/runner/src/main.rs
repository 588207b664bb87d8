use chrono::Utc;
use trailstop_runner::{Backtest, PriceFeed, SimulationConfig, TrailingStopSimulation};

fn print_help() {
    eprintln!(
        r#"Trailstop Simulator - trailing-stop exit for a single position

USAGE:
    trailstop-sim [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --backtest          Replay the feed in virtual time instead of real time
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Random walk with defaults, in real time
    trailstop-sim

    # Instant replay of a configured feed
    trailstop-sim --config position.json --backtest
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut backtest = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            "--backtest" => backtest = true,
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => {
            log::info!("Loading configuration from: {}", path);
            SimulationConfig::from_file(&path)?
        }
        None => SimulationConfig::default(),
    };

    log::info!(
        "Entry {} | offset {} | up delay {}ms | down delay {}ms | {} prices",
        config.entry_price,
        config.strategy.stop_offset,
        config.strategy.up_delay_ms,
        config.strategy.down_delay_ms,
        config.feed.len()
    );

    if backtest {
        let start = Utc::now();
        let ticks = PriceFeed::new(config.feed.clone()).ticks(start)?;
        let report = Backtest::new(config.strategy.clone(), config.entry_price).run(start, &ticks)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let results = TrailingStopSimulation::with_config(config)?.run().await?;
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}
