//! Analytics backend response types.
//!
//! The backend returns an analytics record wrapped in an envelope carrying a
//! processing `status`. Every field is read leniently (see `lenient`): payloads
//! change shape while a backend rollout is in progress, and a half-migrated
//! field must degrade to its default rather than fail the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Processing state reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Case-insensitive parse; unrecognized labels read as `Pending`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnalysisStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::label(deserializer)?
            .as_deref()
            .map_or(Self::Pending, Self::parse))
    }
}

/// Direction of an insight metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
    #[default]
    Unknown,
}

impl Trend {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" | "emerging" => Self::Up,
            "down" => Self::Down,
            "stable" => Self::Stable,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Trend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::label(deserializer)?
            .as_deref()
            .map_or(Self::Unknown, Self::parse))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    /// Case-insensitive parse; anything unrecognized is `Low`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::label(deserializer)?
            .as_deref()
            .map_or(Self::Low, Self::parse))
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Raw analytics record as returned by `GET /api/v1/analytics/{products|keywords}/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEnvelope {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    /// Wire status, case as sent. Parse with [`AnalysisStatus::parse`].
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub analytics: Option<AnalyticsPayload>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPayload {
    /// Display order is significant and preserved.
    #[serde(default, deserialize_with = "lenient::seq")]
    pub insight_cards: Vec<InsightCard>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub recommended_actions: Vec<Action>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub drilldowns: Drilldowns,
    /// Backend explanation when analytics could not be produced.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason_missing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightCard {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub value: String,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
}

/// A recommended strategic action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub impact: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub effort: Option<String>,
}

// ---------------------------------------------------------------------------
// Drill-downs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drilldowns {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub query_explorer: Vec<QueryRow>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub sources_list: Vec<SourceRow>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub attributes_matrix: Vec<AttributeRow>,
}

/// One user query observed in AI answers.
///
/// Keys the crate does not model are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub query: String,
    /// 0–5 scale.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub performance_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub search_volume: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A cited source and how strongly it drives the answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub frequency: Option<u64>,
    /// 0–10 scale.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub relevance_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub attribute: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub importance: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub frequency: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttributeRow {
    #[must_use]
    pub fn is_high_importance(&self) -> bool {
        self.importance
            .as_deref()
            .is_some_and(|i| i.trim().eq_ignore_ascii_case("high"))
    }
}
