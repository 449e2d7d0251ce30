//! Normalization of raw analytics envelopes into the canonical view model
//! consumed by renderers.
//!
//! [`normalize_envelope`] never fails: absent payloads become empty lists and
//! unknown labels fall back to their defaults. Ordering rules are applied
//! here rather than in the view, using stable sorts so that normalizing an
//! already-normalized view is a no-op.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::types::{
    Action, AnalysisStatus, AnalyticsEnvelope, AnalyticsPayload, AttributeRow, Priority, QueryRow,
    SourceRow,
};

/// Canonical analytics snapshot handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub status: AnalysisStatus,
    /// Always present; lists are empty rather than missing.
    pub analytics: AnalyticsPayload,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AnalyticsView {
    /// `true` until the backend reports `completed`.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status != AnalysisStatus::Completed
    }

    /// Queries scoring at least `min_score`, in payload order, capped at `limit`.
    #[must_use]
    pub fn top_queries(&self, min_score: f64, limit: usize) -> Vec<&QueryRow> {
        self.analytics
            .drilldowns
            .query_explorer
            .iter()
            .filter(|q| q.performance_score.is_some_and(|s| s >= min_score))
            .take(limit)
            .collect()
    }

    /// The `limit` most relevant sources.
    #[must_use]
    pub fn top_sources(&self, limit: usize) -> &[SourceRow] {
        let sources = &self.analytics.drilldowns.sources_list;
        &sources[..limit.min(sources.len())]
    }

    /// High-priority actions only, capped at `limit`.
    #[must_use]
    pub fn priority_actions(&self, limit: usize) -> Vec<&Action> {
        self.analytics
            .recommended_actions
            .iter()
            .filter(|a| a.priority == Priority::High)
            .take(limit)
            .collect()
    }
}

impl From<AnalyticsView> for AnalyticsEnvelope {
    fn from(view: AnalyticsView) -> Self {
        AnalyticsEnvelope {
            id: view.id,
            kind: view.kind,
            status: Some(view.status.as_str().to_owned()),
            analytics: Some(view.analytics),
            created_at: view.created_at.map(|t| t.to_rfc3339()),
            updated_at: view.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Converts a raw envelope into an [`AnalyticsView`].
///
/// `None` yields a pending view with every list empty. The input is never
/// modified.
#[must_use]
pub fn normalize_envelope(envelope: Option<&AnalyticsEnvelope>) -> AnalyticsView {
    let Some(envelope) = envelope else {
        return AnalyticsView::default();
    };

    let mut analytics = envelope.analytics.clone().unwrap_or_default();
    sort_actions(&mut analytics.recommended_actions);
    sort_sources(&mut analytics.drilldowns.sources_list);
    sort_attributes(&mut analytics.drilldowns.attributes_matrix);

    AnalyticsView {
        id: envelope.id.clone(),
        kind: envelope.kind.clone(),
        status: envelope
            .status
            .as_deref()
            .map_or(AnalysisStatus::Pending, AnalysisStatus::parse),
        analytics,
        created_at: envelope.created_at.as_deref().and_then(parse_timestamp),
        updated_at: envelope.updated_at.as_deref().and_then(parse_timestamp),
    }
}

/// High priority first; everything else keeps its relative order.
fn sort_actions(actions: &mut [Action]) {
    actions.sort_by_key(|a| a.priority != Priority::High);
}

/// Descending relevance. Missing or NaN scores rank last; `-0.0` ties `0.0`.
fn sort_sources(sources: &mut [SourceRow]) {
    fn score(row: &SourceRow) -> f64 {
        row.relevance_score
            .filter(|s| !s.is_nan())
            .unwrap_or(f64::NEG_INFINITY)
    }
    sources.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(Ordering::Equal)
    });
}

fn sort_attributes(attributes: &mut [AttributeRow]) {
    attributes.sort_by_key(|a| !a.is_high_importance());
}

/// Parses RFC 3339 timestamps, or naive ISO timestamps read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
