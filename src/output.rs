//! Rendering of search reports and source listings for the terminal.

use std::io::Write;

use meme_search::{ProviderDescriptor, SearchReport};

const URL_DISPLAY_CHARS: usize = 60;

/// Write `report` as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_report_json<W: Write>(out: &mut W, report: &SearchReport) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Write a human-readable summary of `report`.
///
/// URLs are shortened to 60 characters unless `verbose` is set.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_report_pretty<W: Write>(
    out: &mut W,
    report: &SearchReport,
    verbose: bool,
) -> anyhow::Result<()> {
    writeln!(out, "Search time: {}ms", report.duration_ms)?;
    writeln!(out, "Results: {}", report.total)?;
    if !report.sources.is_empty() {
        writeln!(out, "Sources: {}", report.sources.join(", "))?;
    }
    if report.has_errors() {
        writeln!(out, "Failed sources:")?;
        for (id, message) in &report.errors {
            writeln!(out, "  - {id}: {message}")?;
        }
    }
    writeln!(out)?;

    if report.items.is_empty() {
        writeln!(out, "No memes found.")?;
        return Ok(());
    }

    for (index, meme) in report.items.iter().enumerate() {
        let url = if verbose {
            meme.url.clone()
        } else {
            truncate_chars(&meme.url, URL_DISPLAY_CHARS)
        };
        writeln!(out, "{:>3}. {} [{}]", index + 1, meme.title, meme.platform)?;
        writeln!(out, "     {url}")?;
        if verbose {
            let mut details = Vec::new();
            if let (Some(w), Some(h)) = (meme.width, meme.height) {
                details.push(format!("{w}x{h}"));
            }
            if let Some(format) = meme.format {
                details.push(format.to_string());
            }
            if !details.is_empty() {
                writeln!(out, "     {}", details.join(" "))?;
            }
        }
    }
    Ok(())
}

/// Write the provider listing as a table, or as JSON when `json` is set.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_sources<W: Write>(
    out: &mut W,
    sources: &[ProviderDescriptor],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, sources)?;
        writeln!(out)?;
        return Ok(());
    }

    let id_width = sources.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    writeln!(out, "{:<id_width$}  AUTH  DESCRIPTION", "ID")?;
    for source in sources {
        let auth = if source.requires_auth { "yes" } else { "no" };
        writeln!(
            out,
            "{:<id_width$}  {auth:<4}  {} ({})",
            source.id, source.description, source.name
        )?;
    }
    Ok(())
}

/// Shorten `s` to at most `max` characters, ending in `...` when cut.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}
