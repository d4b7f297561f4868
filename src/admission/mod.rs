//! Admission: the submission checks an order must clear before it reaches
//! the matcher, chained with rollback.

mod board_lot;
mod buying_power;
mod check;
mod compliance;
mod error;
mod pipeline;
mod risk_state;
mod tests;

pub use board_lot::{BoardLotCheck, BoardLotTier, default_board_lots};
pub use buying_power::{BuyingPowerCheck, RiskParameters};
pub use check::SubmissionCheck;
pub use compliance::{
    ComplianceCheck, ComplianceRule, MaxOrderQuantityRule, OpposingOrderRule,
    RestrictedSecuritiesRule,
};
pub use error::SubmissionCheckError;
pub use pipeline::AdmissionPipeline;
pub use risk_state::{RiskState, RiskStateCheck};
