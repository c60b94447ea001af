//! Recommendation generator
//!
//! Turns the insight records of a report into short guidance texts. This is
//! a fixed priority table, not generation: the same signals always produce
//! the same recommendations in the same order.

use serde::{Deserialize, Serialize};

use crate::report::{InsightKind, InsightRecord, Severity};

/// At most this many recommendations are emitted.
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Attached to every recommendation set.
pub const DISCLAIMER: &str =
  "Recommendations are informational only and are not medical advice.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
  pub items: Vec<String>,
  pub disclaimer: String,
}

/// Signals the priority table reacts to, in order: an abrupt load spike,
/// a monotonous load pattern, a downward trend, good consistency. When
/// none fire, a single generic "stable pattern" message is emitted.
pub fn build_recommendations(insights: &[InsightRecord]) -> RecommendationSet {
  let fired = |kind: InsightKind, severity: Severity| {
    insights.iter().any(|i| i.kind == kind && i.severity == severity)
  };

  let mut items = Vec::new();

  if fired(InsightKind::Spike, Severity::Warning) {
    items.push(
      "Your load rose abruptly. Aim for a more gradual progression next week."
        .to_string(),
    );
  }
  if fired(InsightKind::Monotony, Severity::Warning) {
    items.push(
      "Weekly load shows little variation. Alternate training types and intensities to diversify the stimulus."
        .to_string(),
    );
  }
  // (trend, warning) is only ever emitted for a downward trend.
  if fired(InsightKind::Trend, Severity::Warning) {
    items.push(
      "The recent trend points to falling volume. If that is unintentional, adjust frequency or duration to regain consistency."
        .to_string(),
    );
  }
  if fired(InsightKind::Consistency, Severity::Info) {
    items.push(
      "Good consistency over the last weeks. Keep the rhythm and monitor load variation."
        .to_string(),
    );
  }

  if items.is_empty() {
    items.push(
      "Stable pattern for the period. Maintain consistency and watch load variation across the weeks."
        .to_string(),
    );
  }

  items.truncate(RECOMMENDATION_LIMIT);

  RecommendationSet {
    items,
    disclaimer: DISCLAIMER.to_string(),
  }
}
