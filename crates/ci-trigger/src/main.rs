use std::process::ExitCode;

use anyhow::Context;
use ci_trigger_core::{
    workflow,
    RunReport,
    TravisClient,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    ci_trigger_core::logging::init();

    println!("Started Time : {}", chrono::Utc::now());

    match run().await {
        Ok(report) => {
            print_report(&report);
            if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<RunReport> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            on_signal.cancel();
        }
    });

    workflow::run_from_lookup(
        |key| std::env::var(key).ok(),
        TravisClient::from_config,
        cancel,
    )
    .await
    .context("Travis build run failed")
}

fn print_report(report: &RunReport) {
    println!("Travis request id : {}", report.request_id);
    println!("Result : {}", report.outcome);
    println!(
        "E2E test execution on Travis is passed - {}",
        report.passed()
    );
    println!("Finish Time : {}", report.finished_at);
    println!("Duration Time : {:.1?}", report.duration);
}
