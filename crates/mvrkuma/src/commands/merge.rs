//! `merge`: copy scanned networks into a show file.

use std::path::PathBuf;

use tabled::Tabled;

use mvrkuma_core::MergeSummary;
use mvrkuma_core::merge::DEFAULT_MERGE_OUTPUT;

use crate::cli::{GlobalOpts, MergeArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "Target #")]
    target: usize,
    #[tabled(rename = "Source #")]
    source: usize,
    #[tabled(rename = "Matched by")]
    rule: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
}

fn render_summary(summary: &MergeSummary) -> String {
    let header = format!(
        "{} of {} target fixtures received a network from {} source fixtures\nWritten to {}",
        summary.assignments.len(),
        summary.target_fixtures,
        summary.source_fixtures,
        summary.output.display()
    );
    if summary.assignments.is_empty() {
        return header;
    }
    let rows: Vec<AssignmentRow> = summary
        .assignments
        .iter()
        .map(|a| AssignmentRow {
            target: a.target_index,
            source: a.source_index,
            rule: a.rule.to_string(),
            ipv4: a.network.ipv4().unwrap_or_default().to_owned(),
        })
        .collect();
    format!("{}\n{header}", output::render_table(&rows))
}

pub fn handle(args: MergeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = args.out.unwrap_or_else(|| PathBuf::from(DEFAULT_MERGE_OUTPUT));
    let summary = mvrkuma_core::merge_files(&args.target, &args.source, &out)?;

    let rendered = output::render_single(&global.output, &summary, render_summary, |s| {
        s.output.display().to_string()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}
