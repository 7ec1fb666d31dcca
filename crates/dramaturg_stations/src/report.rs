//! Plain-text rendering of station outputs for the per-station reports.

/// A station output that can be written as a readable report.
pub trait StationReport {
    /// Report heading.
    fn title(&self) -> &'static str;

    /// Plain-text body.
    fn render_text(&self) -> String;
}

/// Render `items` as indented lines under `label`.
pub(crate) fn list_block(label: &str, items: &[String]) -> String {
    let mut block = format!("{}:\n", label);
    for item in items {
        block.push_str("  ");
        block.push_str(item);
        block.push('\n');
    }
    block
}
