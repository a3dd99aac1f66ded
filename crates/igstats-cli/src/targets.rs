//! Target collection: the link file first, interactive entry otherwise.

use std::io::{self, BufRead, Write};
use std::path::Path;

use igstats_core::PLATFORM_DOMAIN;

/// Keeps non-blank, non-comment lines that mention the platform domain.
pub(crate) fn parse_link_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut links = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains(PLATFORM_DOMAIN) {
            links.push(line.to_string());
        } else {
            tracing::warn!(line, "skipping line without {PLATFORM_DOMAIN}");
        }
    }
    Ok(links)
}

/// Reads the link file. A missing file is not an error and yields no links;
/// an unreadable one is logged and treated the same way.
pub(crate) fn read_link_file(path: &Path) -> Vec<String> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not open link file");
            return Vec::new();
        }
    };
    match parse_link_lines(io::BufReader::new(file)) {
        Ok(links) => {
            tracing::info!(path = %path.display(), count = links.len(), "links read from file");
            links
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read link file");
            Vec::new()
        }
    }
}

/// Prompts for post URLs one per line until an empty line or end of input.
pub(crate) fn prompt_links<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    links_path: &Path,
) -> io::Result<Vec<String>> {
    writeln!(output, "Enter Instagram post links, one per line.")?;
    writeln!(output, "Press Enter on an empty line to finish.")?;
    writeln!(
        output,
        "Or list them in '{}' and run again.",
        links_path.display()
    )?;
    writeln!(output, "Examples:")?;
    writeln!(output, "  https://www.instagram.com/p/ABC123/")?;
    writeln!(output, "  https://www.instagram.com/reel/XYZ789/")?;

    let mut links = Vec::new();
    loop {
        write!(output, "Post link (empty to finish): ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if line.contains(PLATFORM_DOMAIN) {
            links.push(line.to_string());
            writeln!(output, "Added link #{}", links.len())?;
        } else {
            writeln!(output, "Not an Instagram link, ignored.")?;
        }
    }
    Ok(links)
}

/// Links from `links_path`, falling back to interactive entry on stdin.
pub(crate) fn collect_links(links_path: &Path) -> io::Result<Vec<String>> {
    let links = read_link_file(links_path);
    if !links.is_empty() {
        return Ok(links);
    }
    prompt_links(io::stdin().lock(), io::stdout(), links_path)
}
