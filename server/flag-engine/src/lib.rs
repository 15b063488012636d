//! SafeShift Flag Engine: deterministic, rule-based report escalation.
//!
//! Validates submitted reports, scores them with a fixed additive rule set, decides the
//! auto-flag outcome and picks the senior admin for Critical reports.
//!
//! No DB, no network; the caller supplies department counts and admin accounts.

pub mod assign;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod keywords;
pub mod normalize;
pub mod rules;
pub mod token;
pub mod types;

pub use config::FlagConfig;
pub use error::EngineError;
pub use evaluator::{FlagContext, FlagEvaluator};
pub use token::TokenKey;
pub use types::{AdminAccount, AdminRef, FlagEvaluation, InboundReport, Report, ReportId, Severity};
