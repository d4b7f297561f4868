use crate::order::{ExecutionReport, OrderFields, Tag};
use pricelevel::UuidGenerator;
use uuid::Uuid;

/// Tag key carrying the id shared by both halves of an internal match.
pub const MATCH_ID_TAG: &str = "match_id";

/// Market code stamped on internally crossed fills.
pub const INTERNAL_MARKET: &str = "INTERNAL";

/// Annotates the pair of reports produced by an internal match.
///
/// The engine fills in id, status, quantity and price before calling
/// [`MatchReportBuilder::make`]; sequence and timestamp are assigned after.
pub trait MatchReportBuilder: Send + Sync {
    /// Decorate the passive and active reports of one match.
    fn make(
        &self,
        passive_fields: &OrderFields,
        active_fields: &OrderFields,
        passive_report: &mut ExecutionReport,
        active_report: &mut ExecutionReport,
    );
}

/// Marks the passive side as adding liquidity, the active side as removing it,
/// and links both reports with a common match id.
pub struct TaggingMatchReportBuilder {
    match_ids: UuidGenerator,
}

impl TaggingMatchReportBuilder {
    /// Create a builder drawing match ids from `namespace`.
    pub fn new(namespace: Uuid) -> Self {
        Self {
            match_ids: UuidGenerator::new(namespace),
        }
    }
}

impl Default for TaggingMatchReportBuilder {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl MatchReportBuilder for TaggingMatchReportBuilder {
    fn make(
        &self,
        _passive_fields: &OrderFields,
        _active_fields: &OrderFields,
        passive_report: &mut ExecutionReport,
        active_report: &mut ExecutionReport,
    ) {
        let match_id = self.match_ids.next().to_string();
        passive_report.liquidity_flag = "P".to_string();
        active_report.liquidity_flag = "A".to_string();
        for report in [passive_report, active_report] {
            report.last_market = INTERNAL_MARKET.to_string();
            report.tags.push(Tag::new(MATCH_ID_TAG, &match_id));
        }
    }
}
