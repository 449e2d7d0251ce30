use chrono::TimeZone;
use serde_json::json;

use super::*;
use crate::types::Trend;

fn envelope(value: serde_json::Value) -> AnalyticsEnvelope {
    serde_json::from_value(value).expect("fixture envelope should deserialize")
}

fn full_envelope() -> AnalyticsEnvelope {
    envelope(json!({
        "id": "an-1",
        "type": "product",
        "status": "Processing",
        "analytics": {
            "insight_cards": [
                { "title": "AI share of answers", "value": "23%", "trend": "up", "description": "46 of 200 answers" },
                { "title": "Top competitor", "value": "Zendesk", "trend": "DOWN" },
                { "title": "Citations", "value": 847 }
            ],
            "recommended_actions": [
                { "category": "Reviews", "priority": "low", "action": "Optimize G2 listing" },
                { "category": "Pricing", "priority": "high", "action": "Publish pricing anchor" },
                { "category": "Content", "priority": "medium" },
                { "category": "Defense", "priority": "High" }
            ],
            "drilldowns": {
                "query_explorer": [
                    { "query": "best help desk", "performance_score": 5, "search_volume": "high" },
                    { "query": "cheap chatbot", "performance_score": 2, "search_volume": "low" },
                    { "query": "zendesk alternatives", "performance_score": 4, "search_volume": "medium" }
                ],
                "sources_list": [
                    { "source": "reddit.com", "frequency": 65, "relevance_score": 6.1 },
                    { "source": "g2.com", "frequency": 156, "relevance_score": 9.2 },
                    { "source": "forbes.com", "frequency": 32 },
                    { "source": "capterra.com", "frequency": 134, "relevance_score": 9.2 }
                ],
                "attributes_matrix": [
                    { "attribute": "Pricing", "importance": "medium", "frequency": 12, "value": "Rarely quoted" },
                    { "attribute": "Ticketing", "importance": "HIGH", "frequency": 30 },
                    { "attribute": "Integrations", "importance": "low" },
                    { "attribute": "AI chatbot", "importance": "high", "frequency": 44 }
                ]
            }
        },
        "created_at": "2024-01-01T10:00:00Z",
        "updated_at": "2024-01-01T10:05:00.250+02:00"
    }))
}

fn categories(view: &AnalyticsView) -> Vec<&str> {
    view.analytics
        .recommended_actions
        .iter()
        .map(|a| a.category.as_str())
        .collect()
}

// -----------------------------------------------------------------------
// defaults
// -----------------------------------------------------------------------

#[test]
fn missing_envelope_is_pending_with_empty_lists() {
    let view = normalize_envelope(None);
    assert_eq!(view.status, AnalysisStatus::Pending);
    assert!(view.analytics.insight_cards.is_empty());
    assert!(view.analytics.recommended_actions.is_empty());
    assert!(view.analytics.drilldowns.query_explorer.is_empty());
    assert!(view.analytics.drilldowns.sources_list.is_empty());
    assert!(view.analytics.drilldowns.attributes_matrix.is_empty());
}

#[test]
fn completed_with_null_analytics_fills_empty_lists() {
    let env = envelope(json!({ "status": "completed", "analytics": null }));
    let view = normalize_envelope(Some(&env));
    assert_eq!(view.status, AnalysisStatus::Completed);
    assert!(view.analytics.insight_cards.is_empty());
    assert!(view.analytics.recommended_actions.is_empty());
    assert!(view.analytics.drilldowns.query_explorer.is_empty());
    assert!(view.analytics.drilldowns.sources_list.is_empty());
    assert!(view.analytics.drilldowns.attributes_matrix.is_empty());
}

#[test]
fn serialized_view_always_carries_list_keys() {
    let env = envelope(json!({ "status": "completed", "analytics": null }));
    let rendered = serde_json::to_value(normalize_envelope(Some(&env))).unwrap();
    assert_eq!(rendered["analytics"]["insight_cards"], json!([]));
    assert_eq!(rendered["analytics"]["recommended_actions"], json!([]));
    assert_eq!(rendered["analytics"]["drilldowns"]["sources_list"], json!([]));
    assert_eq!(rendered["status"], json!("completed"));
}

#[test]
fn status_is_lowercased_and_missing_status_is_pending() {
    let view = normalize_envelope(Some(&envelope(json!({ "status": "COMPLETED" }))));
    assert_eq!(view.status, AnalysisStatus::Completed);
    let view = normalize_envelope(Some(&envelope(json!({ "id": "x" }))));
    assert_eq!(view.status, AnalysisStatus::Pending);
}

#[test]
fn trend_and_priority_defaults_are_filled() {
    let view = normalize_envelope(Some(&full_envelope()));
    let trends: Vec<Trend> = view
        .analytics
        .insight_cards
        .iter()
        .map(|c| c.trend)
        .collect();
    assert_eq!(trends, vec![Trend::Up, Trend::Down, Trend::Unknown]);
    assert_eq!(view.analytics.insight_cards[2].value, "847");
}

// -----------------------------------------------------------------------
// ordering
// -----------------------------------------------------------------------

#[test]
fn high_priority_actions_come_first_in_input_order() {
    let env = envelope(json!({
        "status": "completed",
        "analytics": {
            "recommended_actions": [
                { "category": "A", "priority": "low" },
                { "category": "B", "priority": "high" },
                { "category": "C", "priority": "high" }
            ]
        }
    }));
    let view = normalize_envelope(Some(&env));
    assert_eq!(categories(&view), vec!["B", "C", "A"]);
}

#[test]
fn non_high_actions_keep_relative_order() {
    let view = normalize_envelope(Some(&full_envelope()));
    assert_eq!(
        categories(&view),
        vec!["Pricing", "Defense", "Reviews", "Content"]
    );
}

#[test]
fn sources_sorted_by_descending_relevance_with_stable_ties() {
    let view = normalize_envelope(Some(&full_envelope()));
    let sources: Vec<&str> = view
        .analytics
        .drilldowns
        .sources_list
        .iter()
        .map(|s| s.source.as_str())
        .collect();
    assert_eq!(
        sources,
        vec!["g2.com", "capterra.com", "reddit.com", "forbes.com"]
    );
}

#[test]
fn signed_zero_relevance_scores_tie() {
    let view = normalize_envelope(Some(&envelope(json!({
        "analytics": {
            "drilldowns": {
                "sources_list": [
                    { "source": "first", "relevance_score": -0.0 },
                    { "source": "second", "relevance_score": 0.0 },
                    { "source": "third", "relevance_score": 1.5 }
                ]
            }
        }
    }))));
    let sources: Vec<&str> = view
        .analytics
        .drilldowns
        .sources_list
        .iter()
        .map(|s| s.source.as_str())
        .collect();
    assert_eq!(sources, vec!["third", "first", "second"]);
}

#[test]
fn high_importance_attributes_come_first() {
    let view = normalize_envelope(Some(&full_envelope()));
    let attrs: Vec<&str> = view
        .analytics
        .drilldowns
        .attributes_matrix
        .iter()
        .map(|a| a.attribute.as_str())
        .collect();
    assert_eq!(
        attrs,
        vec!["Ticketing", "AI chatbot", "Pricing", "Integrations"]
    );
}

#[test]
fn insight_cards_keep_display_order() {
    let view = normalize_envelope(Some(&full_envelope()));
    let titles: Vec<&str> = view
        .analytics
        .insight_cards
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["AI share of answers", "Top competitor", "Citations"]
    );
}

// -----------------------------------------------------------------------
// idempotence and purity
// -----------------------------------------------------------------------

#[test]
fn normalizing_twice_is_idempotent() {
    let once = normalize_envelope(Some(&full_envelope()));
    let twice = normalize_envelope(Some(&AnalyticsEnvelope::from(once.clone())));
    assert_eq!(once, twice);
}

#[test]
fn normalizing_a_sparse_envelope_twice_is_idempotent() {
    let env = envelope(json!({ "status": "weird", "created_at": "not a date" }));
    let once = normalize_envelope(Some(&env));
    let twice = normalize_envelope(Some(&AnalyticsEnvelope::from(once.clone())));
    assert_eq!(once, twice);
}

#[test]
fn input_envelope_is_not_mutated() {
    let env = full_envelope();
    let before = env.clone();
    let _ = normalize_envelope(Some(&env));
    assert_eq!(env, before);
    assert_eq!(
        env.analytics.unwrap().recommended_actions[0].category,
        "Reviews"
    );
}

// -----------------------------------------------------------------------
// timestamps
// -----------------------------------------------------------------------

#[test]
fn timestamps_parse_rfc3339_with_offset() {
    let view = normalize_envelope(Some(&full_envelope()));
    assert_eq!(
        view.created_at,
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
    );
    let updated = view.updated_at.unwrap();
    assert_eq!(updated.to_rfc3339(), "2024-01-01T08:05:00.250+00:00");
}

#[test]
fn naive_timestamps_are_read_as_utc() {
    let parsed = parse_timestamp("2024-03-05T07:08:09.123456").unwrap();
    assert_eq!(parsed.to_rfc3339(), "2024-03-05T07:08:09.123456+00:00");
    assert_eq!(parse_timestamp("yesterday"), None);
}

// -----------------------------------------------------------------------
// view helpers
// -----------------------------------------------------------------------

#[test]
fn top_queries_filters_by_score_and_caps() {
    let view = normalize_envelope(Some(&full_envelope()));
    let queries: Vec<&str> = view
        .top_queries(4.0, 8)
        .iter()
        .map(|q| q.query.as_str())
        .collect();
    assert_eq!(queries, vec!["best help desk", "zendesk alternatives"]);
    assert_eq!(view.top_queries(4.0, 1).len(), 1);
}

#[test]
fn top_sources_caps_at_available_length() {
    let view = normalize_envelope(Some(&full_envelope()));
    assert_eq!(view.top_sources(2).len(), 2);
    assert_eq!(view.top_sources(6).len(), 4);
}

#[test]
fn priority_actions_only_returns_high() {
    let view = normalize_envelope(Some(&full_envelope()));
    let picked: Vec<&str> = view
        .priority_actions(4)
        .iter()
        .map(|a| a.category.as_str())
        .collect();
    assert_eq!(picked, vec!["Pricing", "Defense"]);
}

#[test]
fn in_progress_until_completed() {
    let view = normalize_envelope(Some(&full_envelope()));
    assert!(view.is_in_progress());
    let done = normalize_envelope(Some(&envelope(json!({ "status": "completed" }))));
    assert!(!done.is_in_progress());
}
