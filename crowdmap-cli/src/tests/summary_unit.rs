//! Rendering of run summaries.

use crate::summary::{bar, write_contribution_summary};
use crowdmap_core::test_support::{collection_of, keyed_feature};
use crowdmap_core::{ContributionAnalysis, ElementKind, analyze_contributions};
use rstest::rstest;
use serde_json::json;

fn render(analysis: &ContributionAnalysis) -> String {
    let mut out = Vec::new();
    write_contribution_summary(&mut out, analysis).expect("write to memory");
    String::from_utf8(out).expect("utf-8 summary")
}

#[rstest]
#[case(0, 0)]
#[case(9, 0)]
#[case(25, 2)]
#[case(10_000, 50)]
fn bars_scale_by_tens_and_cap(#[case] count: usize, #[case] cells: usize) {
    assert_eq!(bar(count).chars().count(), cells);
}

#[rstest]
fn empty_collections_say_so() {
    let text = render(&ContributionAnalysis::NoFeatures);
    assert!(text.contains("CONTRIBUTION ANALYSIS"));
    assert!(text.contains("No features found"));
    assert!(!text.contains("Top 10"));
}

#[rstest]
fn summary_lists_contributors_and_recent_days() {
    let mut features = Vec::new();
    for day in 1..=12 {
        let count = if day == 12 { 20 } else { 1 };
        for n in 0..count {
            features.push(keyed_feature(
                day * 100 + n,
                ElementKind::Node,
                json!({"user": format!("mapper{day}"), "timestamp": format!("2026-01-{day:02}T10:00:00Z")}),
            ));
        }
    }
    let text = render(&analyze_contributions(&collection_of(features)));

    assert!(text.contains("Total features mapped: 31"));
    assert!(text.contains("Unique contributors: 12"));
    assert!(text.contains("Date range: 2026-01-01 to 2026-01-12"));
    assert!(text.contains("  mapper12: 20 edits"));
    assert_eq!(text.matches(" edits\n").count(), 10);
    assert!(!text.contains("  2026-01-02:"));
    assert!(text.contains("  2026-01-03:     1 \n"));
    assert!(text.contains("  2026-01-12:    20 ██\n"));
}
