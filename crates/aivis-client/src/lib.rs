pub mod auth;
pub mod client;
pub mod error;
pub mod normalize;
pub mod products;
pub mod retry;
pub mod types;

mod lenient;

pub use auth::RegisterRequest;
pub use client::{AnalyticsClient, EntityRef};
pub use error::{ClientError, ErrorKind};
pub use normalize::{normalize_envelope, AnalyticsView};
pub use products::{NewProduct, Product, SearchKeyword};
pub use retry::{is_retriable, retry_with_backoff};
pub use types::{
    Action, AnalysisStatus, AnalyticsEnvelope, AnalyticsPayload, AttributeRow, Drilldowns,
    InsightCard, Priority, QueryRow, SourceRow, Trend,
};
