//! Manual-entry form for when automatic retrieval is not possible.

use std::io::{self, BufRead, Write};

use chrono::Utc;
use igstats_core::{extract_shortcode, NormalizedResult};

/// Captions entered by hand are cut to this many characters.
const MANUAL_CAPTION_LIMIT: usize = 100;

/// Asks for `count` posts. An empty URL skips that slot; unparseable numbers
/// count as 0, or as absent for reach and impressions.
pub(crate) fn prompt_manual_entries<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    count: usize,
) -> io::Result<Vec<NormalizedResult>> {
    writeln!(output, "Open each post on Instagram and copy its numbers.")?;

    let mut posts = Vec::new();
    for slot in 1..=count {
        writeln!(output, "\n--- Post {slot} ---")?;
        let url = ask(
            &mut input,
            &mut output,
            "Post URL (e.g. https://www.instagram.com/p/ABC123/): ",
        )?;
        if url.is_empty() {
            writeln!(output, "No URL entered, skipping.")?;
            continue;
        }

        let identifier = extract_shortcode(&url)
            .map_or_else(|| format!("post_{slot}"), |code| code.as_str().to_string());
        let mut post = NormalizedResult::new(identifier, url);
        post.likes = parse_count(&ask(&mut input, &mut output, "Likes: ")?).unwrap_or(0);
        post.comments = parse_count(&ask(&mut input, &mut output, "Comments: ")?).unwrap_or(0);
        post.saves = parse_count(&ask(&mut input, &mut output, "Saves: ")?).unwrap_or(0);
        post.reach = parse_count(&ask(
            &mut input,
            &mut output,
            "Reach (business accounts only, Enter to skip): ",
        )?);
        post.impressions = parse_count(&ask(
            &mut input,
            &mut output,
            "Impressions (business accounts only, Enter to skip): ",
        )?);
        let caption = ask(&mut input, &mut output, "Caption (first 100 characters, optional): ")?;
        post.caption = (!caption.is_empty())
            .then(|| caption.chars().take(MANUAL_CAPTION_LIMIT).collect());
        post.entered_at = Some(Utc::now());

        posts.push(post);
        writeln!(output, "Post {slot} saved.")?;
    }
    Ok(posts)
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.replace([',', '.'], "").parse().ok()
}
