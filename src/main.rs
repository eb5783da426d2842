// src/main.rs
//
// Postal-code lookup that races every configured provider and prints the
// fastest usable answer.

use cep_race::config::{default_config_template, Config};
use cep_race::connectors::stub::demo_fetchers;
use cep_race::models::{CepCode, RaceOutcome, RacePolicy};
use cep_race::race::Race;
use cep_race::render::{error_line, exit_code, render_json, render_text, EXIT_INVALID_INPUT};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cep-race")]
#[command(about = "Resolve a Brazilian postal code by racing several lookup services")]
struct Args {
    /// Postal code to look up (separators are ignored)
    #[arg(default_value = "22450000")]
    code: String,

    /// Path to configuration file (TOML)
    #[arg(long, short)]
    config: Option<String>,

    /// Race deadline in milliseconds (overrides the config file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Race policy: first-success or first-arrival (overrides the config file)
    #[arg(long)]
    policy: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Race offline stub providers instead of the network
    #[arg(long)]
    demo: bool,

    /// Generate a default configuration file
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.generate_config {
        println!("{}", default_config_template());
        return;
    }

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => invalid_input(&e),
    };

    init_logging(config.global.log_level.as_deref());

    let code = match CepCode::parse(&args.code) {
        Ok(c) => c,
        Err(e) => invalid_input(&e),
    };

    let race = if args.demo {
        Race::new(demo_fetchers(&code), config.timeout()).with_policy(config.global.policy)
    } else {
        match config.build_race() {
            Ok(r) => r,
            Err(e) => invalid_input(&e),
        }
    };

    let outcome = race.run(&code).await;
    std::process::exit(report(&outcome, args.json));
}

// =============================================================================
// Helpers
// =============================================================================

fn load_config(args: &Args) -> Result<Config, String> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(ms) = args.timeout_ms {
        config.global.timeout_ms = ms;
    }
    if let Some(policy) = &args.policy {
        config.global.policy = RacePolicy::parse(policy)?;
    }

    config.resolved()
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("warn"));
    env_logger::Builder::from_env(env).init();
}

/// Prints the outcome and returns the process exit code.
fn report(outcome: &RaceOutcome, json: bool) -> i32 {
    if json {
        match render_json(outcome) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error: {}", e),
        }
    } else {
        println!("{}", render_text(outcome));
    }

    if let Some(line) = error_line(outcome) {
        eprintln!("{}", line);
    }
    exit_code(outcome)
}

/// Bad code or configuration: nothing was raced.
fn invalid_input(message: &str) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(EXIT_INVALID_INPUT);
}
