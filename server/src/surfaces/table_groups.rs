//! Table-group surface. Passive: it only re-publishes the registry.

use table_groups::ApplyReport;

use crate::app::SharedState;

/// Publish the registry after a row's `added` tokens were applied.
pub fn on_applied(state: &SharedState, row_id: i64, report: &ApplyReport) {
    if report.dropped > 0 {
        tracing::debug!(row_id, dropped = report.dropped, "Row carried malformed added tokens");
    }
    if !report.changed() {
        return;
    }
    tracing::info!(
        row_id,
        groups_created = report.groups_created,
        tables_added = report.tables_added,
        "Table groups updated"
    );
    state.broadcast_table_groups();
}

/// Publish the registry after it was reset to `default` only.
pub fn on_reset(state: &SharedState) {
    state.broadcast_table_groups();
}
