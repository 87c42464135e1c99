//! Human-readable and JSON renderings of a triaged ticket.

use serde::Serialize;
use triage_core::{Status, Triage};

/// `--json` output.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub title: &'a str,
    pub description: &'a str,
    #[serde(flatten)]
    pub triage: &'a Triage,
}

/// Plain-text analysis dashboard.
pub fn dashboard(title: &str, triage: &Triage) -> String {
    let heading = if triage.status == Status::Resolved {
        "Proposed Resolution"
    } else {
        "Action Taken"
    };
    let mut out = format!(
        "Ticket: {title}\n\
         \n\
         Category:          {}\n\
         Assigned Priority: {}\n\
         Ticket Status:     {}\n\
         \n\
         {heading}:\n{}\n",
        label(triage.category.as_ref()),
        label(triage.priority.as_ref()),
        label(triage.status.as_ref()),
        triage.resolution,
    );
    if triage.degraded {
        out.push_str(
            "\nWARNING: the model could not be reached for every stage; \
             fallback values were used.\n",
        );
    }
    out
}

/// `in_progress` → `In progress`.
fn label(wire: &str) -> String {
    let spaced = wire.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
