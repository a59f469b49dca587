//! Splits raw gateway replies into independently-paced display segments.
//!
//! The workflow separates logical messages with a blank line, so one
//! `output` field may carry several bubbles worth of text. Each segment
//! is trimmed; empty or whitespace-only pieces vanish rather than
//! becoming empty bubbles. Order is preserved across and within payloads.

use crate::gateway::ReplyPayload;

/// Boundary the workflow uses between logical messages.
const SEGMENT_SEPARATOR: &str = "\n\n";

pub fn fragment(payloads: &[ReplyPayload]) -> Vec<String> {
    payloads
        .iter()
        .filter_map(|payload| payload.output.as_deref())
        .flat_map(|output| output.split(SEGMENT_SEPARATOR))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
