use std::process::ExitCode;

use abc_algo::config::AlgoConfig;
use abc_algo::logging::init_tracing;
use abc_algo::simulate::{simulate, SimParams};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, value = %value, "ignoring unparsable setting");
                default
            }
        },
        Err(_) => default,
    }
}

fn sim_params_from_env() -> SimParams {
    let defaults = SimParams::default();
    SimParams {
        learners: env_or("ABC_SIM_LEARNERS", defaults.learners),
        runs: env_or("ABC_SIM_RUNS", defaults.runs),
        seed: env_or("ABC_SIM_SEED", defaults.seed),
        skill: env_or("ABC_SIM_SKILL", defaults.skill),
        rounds: std::env::var("ABC_SIM_ROUNDS")
            .ok()
            .and_then(|value| value.trim().parse::<u32>().ok()),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AlgoConfig::from_env();
    config.validate()?;

    let params = sim_params_from_env();
    tracing::info!(
        learners = params.learners,
        runs = params.runs,
        seed = params.seed,
        skill = params.skill,
        "starting simulation"
    );

    let report = simulate(&config, &params)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(
        reached = report.reached_full_alphabet,
        mean_runs = ?report.mean_runs_to_full_alphabet,
        "simulation complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    init_tracing(&log_level);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
