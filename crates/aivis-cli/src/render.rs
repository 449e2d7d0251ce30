//! Plain-text rendering of analytics snapshots.

use std::fmt::Write as _;

use aivis_client::{AnalyticsView, Trend};
use aivis_poller::PollError;

const MIN_QUERY_SCORE: f64 = 4.0;
const MAX_QUERIES: usize = 8;
const MAX_SOURCES: usize = 6;
const MAX_ACTIONS: usize = 4;

fn trend_marker(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "+",
        Trend::Down => "-",
        Trend::Stable => "=",
        Trend::Unknown => " ",
    }
}

/// Summary of one snapshot, ending with a newline.
pub(crate) fn snapshot(attempt: u32, view: &AnalyticsView) -> String {
    let mut out = String::new();
    let analytics = &view.analytics;
    let _ = writeln!(out, "[attempt {attempt}] status: {}", view.status);

    if view.is_in_progress() && analytics.insight_cards.is_empty() {
        return out;
    }
    if let Some(reason) = &analytics.reason_missing {
        let _ = writeln!(out, "  no analytics: {reason}");
    }

    if !analytics.insight_cards.is_empty() {
        let _ = writeln!(out, "  insights");
        for card in &analytics.insight_cards {
            let _ = writeln!(
                out,
                "    {} {:<28} {}",
                trend_marker(card.trend),
                card.title,
                card.value
            );
        }
    }

    let actions = view.priority_actions(MAX_ACTIONS);
    if !actions.is_empty() {
        let _ = writeln!(out, "  priority actions");
        for action in actions {
            let _ = writeln!(
                out,
                "    [{}] {}",
                action.category,
                action.action.as_deref().unwrap_or("-")
            );
        }
    }

    let queries = view.top_queries(MIN_QUERY_SCORE, MAX_QUERIES);
    if !queries.is_empty() {
        let _ = writeln!(out, "  top queries");
        for query in queries {
            let _ = writeln!(
                out,
                "    {:>4.1}  {}",
                query.performance_score.unwrap_or_default(),
                query.query
            );
        }
    }

    let sources = view.top_sources(MAX_SOURCES);
    if !sources.is_empty() {
        let _ = writeln!(out, "  top sources");
        for source in sources {
            let score = source
                .relevance_score
                .map_or_else(|| "-".to_owned(), |s| format!("{s:.1}"));
            let _ = writeln!(out, "    {score:>4}  {}", source.source);
        }
    }

    out
}

pub(crate) fn failure(attempt: u32, error: &PollError) -> String {
    let hint = match error.client_kind() {
        Some(aivis_client::ErrorKind::Auth) => "; run `aivis login` again",
        Some(aivis_client::ErrorKind::NotFound) => "; check the product or keyword id",
        _ => "",
    };
    format!("[attempt {attempt}] failed: {error}{hint}")
}
