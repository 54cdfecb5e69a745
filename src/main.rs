use std::io::Read;

use anyhow::{Context, Result};
use tracing::info;

use seka_judge::{config, languages, JudgeConfig, JudgeOrchestrator, JudgePool, Submission};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seka_judge=info".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    languages::init_languages()?;
    let judge_config = config::init_config(JudgeConfig::from_env());
    info!(
        "worker configured: {}MiB memory ceiling, {} cpus, {} concurrent submissions",
        judge_config.sandbox_memory_mb, judge_config.sandbox_cpus, judge_config.max_concurrent
    );

    let request = read_request().context("failed to read judge request")?;
    let submission: Submission =
        serde_json::from_str(&request).context("invalid judge request")?;
    info!(
        "received submission: language={}, cases={}",
        submission.language,
        submission.test_cases.len()
    );

    let pool = JudgePool::new(judge_config.max_concurrent);
    let orchestrator = JudgeOrchestrator::new();
    let result = pool.judge(&orchestrator, &submission).await?;

    serde_json::to_writer_pretty(std::io::stdout().lock(), &result)?;
    println!();
    Ok(())
}

/// Read the request JSON from the path argument, or stdin if none given.
fn read_request() -> Result<String> {
    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
