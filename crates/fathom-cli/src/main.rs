//! Binary entry point. Builds one `SmartBrowser` from `FathomConfig::from_env`
//! plus any `--data-dir` override, runs the requested subcommand, exits.
//!
//! Grounded on `riptide-cli::main`'s init-then-dispatch shape, minus the
//! HTTP client: this binary calls `fathom-facade` in-process rather than a
//! deployed server, since there is no server in this architecture.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use fathom_facade::SmartBrowserBuilder;
use fathom_types::{BatchOptions, BatchOverrides, BrowseRequest, Budget, FathomConfig, Tier};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut builder = SmartBrowserBuilder::new().with_config(FathomConfig::from_env());
    if let Some(dir) = &cli.data_dir {
        builder = builder.with_persistence(dir);
    }

    let browser = match builder.build().await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Browse { url, max_tier, session_profile } => {
            let mut request = BrowseRequest::new(url);
            if let Some(profile) = session_profile {
                request = request.with_session_profile(profile);
            }
            if let Some(tier) = max_tier {
                match tier.parse::<Tier>() {
                    Ok(tier) => {
                        request = request.with_budget(Budget { max_cost_tier: Some(tier), ..Budget::default() });
                    }
                    Err(e) => {
                        eprintln!("{e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            let result = browser.browse(request).await;
            let failed = result.is_err();
            output::browse_result(&result, cli.json);
            if failed {
                return ExitCode::FAILURE;
            }
        }
        Command::BatchBrowse { urls, concurrency, stop_on_error } => {
            let common = BrowseRequest::new("https://placeholder.invalid");
            let options = BatchOptions { concurrency, stop_on_error, ..BatchOptions::default() };
            let report = browser.batch_browse(urls, common, BatchOverrides::new(), options).await;
            output::batch_report(&report, cli.json);
            if report.failure_count > 0 {
                return ExitCode::FAILURE;
            }
        }
        Command::DomainIntelligence { domain } => {
            let info = browser.get_domain_intelligence(&domain);
            output::domain_intelligence(&info, cli.json);
        }
        Command::Stats => match browser.get_learning_stats().await {
            Ok(stats) => output::learning_stats(&stats, cli.json),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

