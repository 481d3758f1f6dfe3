//! Human-readable run summaries written to standard output.

use std::io::{self, Write};

use crowdmap_core::{ContributionAnalysis, ContributionStats};
use crowdmap_data::sync::FullRefreshReason;
use crowdmap_data::{CentroidPassReport, DiscoveryReport, SyncConfig, SyncMode, SyncReport};

const RULE_WIDTH: usize = 60;
const SUMMARY_CONTRIBUTORS: usize = 10;
const SUMMARY_DAYS: usize = 10;
const EDITS_PER_BAR_CELL: usize = 10;
const MAX_BAR_CELLS: usize = 50;

fn rule(writer: &mut dyn Write) -> io::Result<()> {
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))
}

pub(crate) fn write_sync_summary(
    writer: &mut dyn Write,
    config: &SyncConfig,
    report: &SyncReport,
) -> io::Result<()> {
    match report.mode {
        SyncMode::Incremental => writeln!(writer, "Incremental update since {}", report.since)?,
        SyncMode::FullRefresh(reason) => writeln!(
            writer,
            "Full refresh from {} ({})",
            report.since,
            describe(reason)
        )?,
    }
    writeln!(writer, "Received {} elements", report.received)?;
    writeln!(
        writer,
        "Dropped {} without geometry, {} malformed",
        report.dropped_no_geometry, report.dropped_malformed
    )?;
    if report.mode == SyncMode::Incremental {
        writeln!(
            writer,
            "Merged: {} updated, {} new features",
            report.updated, report.added
        )?;
    }
    writeln!(
        writer,
        "Saved {} features to {}",
        report.feature_count, config.collection_path
    )?;
    writeln!(writer)?;
    write_contribution_summary(writer, &report.analysis)
}

const fn describe(reason: FullRefreshReason) -> &'static str {
    match reason {
        FullRefreshReason::Requested => "requested",
        FullRefreshReason::NoState => "no previous state",
        FullRefreshReason::NoCollection => "no existing collection",
        FullRefreshReason::UnreadableCollection => "existing collection unreadable",
    }
}

pub(crate) fn write_contribution_summary(
    writer: &mut dyn Write,
    analysis: &ContributionAnalysis,
) -> io::Result<()> {
    rule(writer)?;
    writeln!(writer, "CONTRIBUTION ANALYSIS")?;
    rule(writer)?;
    match analysis {
        ContributionAnalysis::NoFeatures => writeln!(writer, "No features found")?,
        ContributionAnalysis::Stats(stats) => write_stats(writer, stats)?,
    }
    rule(writer)
}

fn write_stats(writer: &mut dyn Write, stats: &ContributionStats) -> io::Result<()> {
    writeln!(writer, "Total features mapped: {}", stats.total_features)?;
    writeln!(writer, "Unique contributors: {}", stats.unique_contributors)?;
    if let (Some(earliest), Some(latest)) = (&stats.date_range.earliest, &stats.date_range.latest)
    {
        writeln!(writer, "Date range: {earliest} to {latest}")?;
    }

    writeln!(writer)?;
    writeln!(writer, "Top {SUMMARY_CONTRIBUTORS} contributors:")?;
    for (user, count) in stats.top_contributors.iter().take(SUMMARY_CONTRIBUTORS) {
        writeln!(writer, "  {user}: {count} edits")?;
    }

    writeln!(writer)?;
    writeln!(writer, "Edits by date (last {SUMMARY_DAYS} days):")?;
    let skip = stats.edits_by_date.len().saturating_sub(SUMMARY_DAYS);
    for (day, count) in stats.edits_by_date.iter().skip(skip) {
        writeln!(writer, "  {day}: {count:5} {}", bar(*count))?;
    }
    Ok(())
}

/// One cell per ten edits, capped.
pub(crate) fn bar(count: usize) -> String {
    "█".repeat((count / EDITS_PER_BAR_CELL).min(MAX_BAR_CELLS))
}

pub(crate) fn write_centroid_summary(
    writer: &mut dyn Write,
    output: &camino::Utf8Path,
    report: &CentroidPassReport,
) -> io::Result<()> {
    writeln!(writer, "Total features: {}", report.input_features)?;
    writeln!(
        writer,
        "Computed {} centroids, skipped {} features",
        report.produced, report.skipped
    )?;
    writeln!(writer, "Input size:  {} bytes", report.sizes.bytes_in)?;
    writeln!(writer, "Output size: {} bytes", report.sizes.bytes_out)?;
    writeln!(writer, "Size reduction: {:.1}%", report.sizes.percent())?;
    writeln!(writer, "Output: {output}")
}

pub(crate) fn write_projects_summary(
    writer: &mut dyn Write,
    output: &camino::Utf8Path,
    report: &DiscoveryReport,
) -> io::Result<()> {
    writeln!(
        writer,
        "Considered {} projects: {} accepted, {} rejected, {} failed",
        report.candidates,
        report.collection.len(),
        report.rejected,
        report.failed
    )?;
    writeln!(
        writer,
        "Saved {} project boundaries to {output}",
        report.collection.len()
    )
}
