//! Run-mode handlers. Each returns the process exit code; per-target
//! failures still count as a completed run.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use igstats_client::{
    AuthError, FileSessionStore, InstagramClient, LoginPolicy, PublicPageScraper, Session,
    SessionManager,
};
use igstats_collector::{run_public, BatchOptions, BatchRunner};
use igstats_core::{AppConfig, ConfigError, Credentials, ResultBatch, RunMode};

use crate::{manual, output, targets};

const ANONYMOUS_USERNAME: &str = "unknown";

pub(crate) async fn links(
    config: &AppConfig,
    file: Option<PathBuf>,
    fallback_public: bool,
) -> anyhow::Result<ExitCode> {
    let links_path = file.unwrap_or_else(|| config.links_path.clone());
    links_with(config, fallback_public, || gather_links(links_path)).await
}

/// Link mode over an arbitrary target source. Credentials are checked before
/// `gather` runs so nobody types links into a run that cannot log in.
async fn links_with<G, F>(
    config: &AppConfig,
    fallback_public: bool,
    gather: G,
) -> anyhow::Result<ExitCode>
where
    G: FnOnce() -> F,
    F: Future<Output = anyhow::Result<Option<Vec<String>>>>,
{
    let Some(credentials) = checked_credentials(config) else {
        return Ok(ExitCode::FAILURE);
    };
    let Some(urls) = gather().await? else {
        return Ok(ExitCode::FAILURE);
    };

    let client = InstagramClient::from_config(config)?;
    let session = match login(config, &client, &credentials).await {
        Ok(session) => session,
        Err(e) if fallback_public => {
            report_auth_failure(&e);
            println!("Falling back to public page access.");
            return public_batch(config, &urls).await;
        }
        Err(e) => {
            report_auth_failure(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("\nProcessing {} post(s)...", urls.len());
    let runner = BatchRunner::new(&client, &session, BatchOptions::from_config(config));
    let batch = runner.run_links(&urls).await;
    output::report(&config.output_dir, &batch)?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn account(
    config: &AppConfig,
    username: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<ExitCode> {
    let Some(credentials) = checked_credentials(config) else {
        return Ok(ExitCode::FAILURE);
    };

    let client = InstagramClient::from_config(config)?;
    let session = match login(config, &client, &credentials).await {
        Ok(session) => session,
        Err(e) => {
            report_auth_failure(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let handle = username.unwrap_or_else(|| session.username.clone());
    let limit = limit.unwrap_or(config.account_post_limit);
    println!("\nFetching the last {limit} post(s) of @{handle}...");

    let runner = BatchRunner::new(&client, &session, BatchOptions::from_config(config));
    match runner.run_account(&handle, limit).await {
        Ok(batch) => {
            output::report(&config.output_dir, &batch)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Try the links or manual mode instead.");
            Ok(ExitCode::FAILURE)
        }
    }
}

pub(crate) async fn manual(config: &AppConfig, count: usize) -> anyhow::Result<ExitCode> {
    let username = config
        .username
        .clone()
        .unwrap_or_else(|| ANONYMOUS_USERNAME.to_string());
    println!("Manual entry for @{username}: {count} post(s).");

    let posts = tokio::task::spawn_blocking(move || {
        manual::prompt_manual_entries(io::stdin().lock(), io::stdout(), count)
    })
    .await
    .context("manual entry task failed")??;

    let batch = ResultBatch::new(username, RunMode::ManualEntry, posts);
    output::report(&config.output_dir, &batch)?;
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn public(config: &AppConfig, file: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let links_path = file.unwrap_or_else(|| config.links_path.clone());
    let urls = targets::read_link_file(&links_path);
    if urls.is_empty() {
        eprintln!("No links found in '{}'.", links_path.display());
        return Ok(ExitCode::FAILURE);
    }
    println!("Note: public access is limited and yields no engagement counters.");
    public_batch(config, &urls).await
}

async fn public_batch(config: &AppConfig, urls: &[String]) -> anyhow::Result<ExitCode> {
    let scraper = PublicPageScraper::new(config.request_timeout_secs, &config.web_base_url)?;
    let username = config.username.as_deref().unwrap_or(ANONYMOUS_USERNAME);
    let batch = run_public(
        &scraper,
        urls,
        username,
        Duration::from_millis(config.inter_request_delay_ms),
    )
    .await;
    output::report(&config.output_dir, &batch)?;
    Ok(ExitCode::SUCCESS)
}

/// Link file first, interactive entry otherwise. `None` means no targets.
async fn gather_links(links_path: PathBuf) -> anyhow::Result<Option<Vec<String>>> {
    let shown = links_path.display().to_string();
    let urls = tokio::task::spawn_blocking(move || targets::collect_links(&links_path))
        .await
        .context("link input task failed")??;

    if urls.is_empty() {
        eprintln!("No links found.");
        eprintln!("Tip: put one link per line in '{shown}' and run again.");
        return Ok(None);
    }
    Ok(Some(urls))
}

/// Validated credentials, or `None` after reporting what is missing.
fn checked_credentials(config: &AppConfig) -> Option<Credentials> {
    match config.credentials() {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            report_config_failure(&e);
            None
        }
    }
}

fn report_config_failure(error: &ConfigError) {
    eprintln!("Configuration error: {error}");
    eprintln!("Set INSTAGRAM_USERNAME and INSTAGRAM_PASSWORD in .env.");
}

fn report_auth_failure(error: &AuthError) {
    eprintln!("Login failed: {error}");
    eprintln!("Hint: {}", error.remedy());
}

async fn login(
    config: &AppConfig,
    client: &InstagramClient,
    credentials: &Credentials,
) -> Result<Session, AuthError> {
    let store = FileSessionStore::new(&config.session_dir);
    println!("Signing in as @{}...", credentials.username);
    SessionManager::new(client, &store, LoginPolicy::from_config(config))
        .acquire(credentials)
        .await
}
