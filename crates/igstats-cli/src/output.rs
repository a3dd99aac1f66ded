//! JSON artifact writer and console summary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use igstats_core::{NormalizedResult, ResultBatch};

/// Writes `batch` as pretty JSON to `<dir>/<mode file name>`.
pub(crate) fn write_batch(dir: &Path, batch: &ResultBatch) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(batch.method.output_file_name());
    let body = serde_json::to_string_pretty(batch).context("serializing results")?;
    std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), posts = batch.total_posts, "results written");
    Ok(path)
}

/// One progress line per entry.
pub(crate) fn describe(index: usize, total: usize, post: &NormalizedResult) -> String {
    match &post.error {
        Some(error) => format!("[{index}/{total}] {}: error: {error}", post.source_url),
        None => format!(
            "[{index}/{total}] {}: likes {}, comments {}, saves {}",
            post.identifier, post.likes, post.comments, post.saves
        ),
    }
}

pub(crate) fn summary(batch: &ResultBatch) -> String {
    let totals = batch.totals();
    let mut lines = vec![
        "Summary:".to_string(),
        format!("  Successful: {}/{}", totals.successful, batch.total_posts),
        format!("  Total likes: {}", totals.likes),
        format!("  Total comments: {}", totals.comments),
        format!("  Total saves: {}", totals.saves),
    ];
    if let Some(profile) = &batch.profile {
        lines.push(format!(
            "  Profile @{}: followers {}, following {}, posts {}",
            profile.username,
            display_count(profile.follower_count),
            display_count(profile.following_count),
            display_count(profile.media_count),
        ));
    }
    if let Some(note) = &batch.note {
        lines.push(format!("  Note: {note}"));
    }
    lines.join("\n")
}

/// Prints every entry, writes the artifact and prints the summary.
pub(crate) fn report(dir: &Path, batch: &ResultBatch) -> anyhow::Result<()> {
    let total = batch.posts.len();
    for (i, post) in batch.posts.iter().enumerate() {
        println!("{}", describe(i + 1, total, post));
    }
    let path = write_batch(dir, batch)?;
    println!("\nResults saved to '{}'.", path.display());
    println!("{}", summary(batch));
    Ok(())
}

fn display_count(value: Option<u64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}
