//! `holesync sync`: one startup pass, then exit.

use serde::Serialize;
use tabled::Tabled;

use holesync_config::Config;
use holesync_core::{CycleReport, SyncReport};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct SyncSummary {
    collections: Vec<CollectionSummary>,
    value_writes: usize,
    errors: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct CollectionSummary {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Created")]
    created: usize,
    #[tabled(rename = "Renamed")]
    renamed: usize,
    #[tabled(rename = "Removed")]
    removed: usize,
    #[tabled(rename = "Unallocated")]
    unallocated: usize,
}

impl From<&SyncReport> for CollectionSummary {
    fn from(r: &SyncReport) -> Self {
        Self {
            kind: r.kind.to_string(),
            created: r.created.len(),
            renamed: r.renamed.len(),
            removed: r.removed.len(),
            unallocated: r.failed_allocations.len(),
        }
    }
}

fn summarize(report: &CycleReport) -> SyncSummary {
    let refresh_errors = report.refresh.iter().flat_map(|r| r.errors.iter());
    SyncSummary {
        collections: report.syncs.iter().map(CollectionSummary::from).collect(),
        value_writes: report.refresh.as_ref().map_or(0, |r| r.writes),
        errors: report
            .errors
            .iter()
            .chain(refresh_errors)
            .map(ToString::to_string)
            .collect(),
    }
}

fn detail(summary: &SyncSummary) -> String {
    let mut out = tabled::Table::new(&summary.collections)
        .with(tabled::settings::Style::rounded())
        .to_string();
    out.push_str(&format!("\nvalue writes: {}", summary.value_writes));
    for err in &summary.errors {
        out.push_str(&format!("\nerror: {err}"));
    }
    out
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let mut controller = super::build_controller(cfg)?;
    let report = controller.start().await?;
    let summary = summarize(&report);

    let rendered = output::render_single(&global.output, &summary, detail, |s| {
        s.collections
            .iter()
            .map(|c| format!("{} {} {} {}", c.kind, c.created, c.renamed, c.removed))
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
