use crate::types::Status;

/// Marker that marks a resolution as a proposed fix. Matched case-insensitively.
pub const RESOLVED_MARKER: &str = "suggested solution";

/// `Resolved` when the text carries [`RESOLVED_MARKER`], otherwise `Escalated`.
pub fn derive_status(resolution: &str) -> Status {
    if resolution.to_lowercase().contains(RESOLVED_MARKER) {
        Status::Resolved
    } else {
        Status::Escalated
    }
}
