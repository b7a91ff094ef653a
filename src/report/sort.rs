//! Report sorting

use crate::report::Report;

/// Sorts the messages from the most to the least severe
///
/// The order is `FATAL`, `ERROR`, `WARNING`, `INFO`, then every other severity.
/// The sort is stable, messages of the same rank keep the validator order.
pub fn sort_report(report: &mut Report) -> &mut Report {
    report.messages.sort_by_key(|msg| msg.severity.rank());
    report
}
