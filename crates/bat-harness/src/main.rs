use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bat_client::{CiaoCli, CiaoClient};
use bat_core::{
    load_harness_config, require_env, Credentials, HarnessConfig, ENV_CONTROLLER, ENV_IDENTITY,
};
use bat_harness::{run_suite, write_report, JsonlRunLog, ScenarioRunner};

/// Basic acceptance tests for a ciao cluster, driven through ciao-cli.
///
/// Requires CIAO_IDENTITY, CIAO_CONTROLLER, CIAO_USERNAME, CIAO_PASSWORD,
/// CIAO_ADMIN_USERNAME and CIAO_ADMIN_PASSWORD in the environment.
#[derive(Debug, Parser)]
#[command(name = "ciao-bat")]
struct Cli {
    /// Seconds to wait for a single ciao-cli command to complete
    /// (default 300).
    #[arg(long)]
    command_timeout: Option<u64>,
    /// Attempts to wait for the cluster to reach an expected state
    /// (default 60).
    #[arg(long)]
    cluster_timeout: Option<u32>,
    /// Optional TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path of the ciao-cli binary.
    #[arg(long)]
    cli_binary: Option<PathBuf>,
    /// Where to write the TAP report.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Print the redacted credential environment before the run.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("[bat] error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = build_config(&cli)?;
    config.validate()?;

    let base: BTreeMap<String, String> = env::vars().collect();
    require_env(&base)?;

    let user = Credentials::user(&base);
    let admin = Credentials::admin(&base)?;

    if cli.verbose {
        for (key, value) in user.redacted() {
            if key.starts_with("CIAO_") {
                eprintln!("[bat] env {key}={value}");
            }
        }
    }
    eprintln!(
        "[bat] identity {} controller {}",
        base.get(ENV_IDENTITY).map(String::as_str).unwrap_or(""),
        base.get(ENV_CONTROLLER).map(String::as_str).unwrap_or(""),
    );

    let timeout = config.command_timeout();
    let ciao = CiaoCli::new(&config.cli_binary);
    let runner = ScenarioRunner::new(
        CiaoClient::new(ciao.clone(), user, timeout),
        CiaoClient::new(ciao, admin, timeout),
        config.clone(),
    );

    let log = JsonlRunLog::new(&config.event_log_root);
    let suite = run_suite(&runner, &log);

    write_report(&config.report_path, &suite)?;
    eprintln!("[bat] report written to {}", config.report_path.display());

    Ok(suite.all_passed())
}

fn build_config(cli: &Cli) -> Result<HarnessConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => load_harness_config(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(secs) = cli.command_timeout {
        config.command_timeout_secs = secs;
    }
    if let Some(attempts) = cli.cluster_timeout {
        config.cluster_poll_attempts = attempts;
    }
    if let Some(binary) = &cli.cli_binary {
        config.cli_binary = binary.clone();
    }
    if let Some(report) = &cli.report {
        config.report_path = report.clone();
    }
    Ok(config)
}
