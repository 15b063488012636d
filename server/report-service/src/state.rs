//! Shared handler state.

use flag_engine::{FlagEvaluator, TokenKey};
use wellness_engine::WellnessConfig;

use crate::store::ReportStore;

pub struct AppState<S> {
  pub store: S,
  pub evaluator: FlagEvaluator,
  pub wellness: WellnessConfig,
  pub token_key: TokenKey,
}

impl<S: ReportStore> AppState<S> {
  pub fn new(store: S, token_key: TokenKey) -> Self {
    Self {
      store,
      evaluator: FlagEvaluator::with_defaults(),
      wellness: WellnessConfig::default(),
      token_key,
    }
  }
}
