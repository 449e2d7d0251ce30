//! Product and search-keyword endpoints.

use aivis_core::AuthSession;
use serde::{Deserialize, Serialize};

use crate::client::AnalyticsClient;
use crate::error::ClientError;
use crate::lenient;

/// A product to create together with the keywords to track for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub website: String,
    pub business_domain: String,
    /// Falls back to the session's application when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    pub search_keywords: Vec<String>,
}

impl NewProduct {
    /// Builds a product from a single brand string, the way the input form
    /// submits it: the trimmed brand fills every descriptive field.
    #[must_use]
    pub fn from_brand<I, S>(brand: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let brand = brand.trim().to_owned();
        Self {
            name: brand.clone(),
            description: brand.clone(),
            website: brand.clone(),
            business_domain: brand,
            application_id: None,
            search_keywords: clean_keywords(keywords),
        }
    }
}

/// Trims keywords, drops blanks and duplicates, keeps first-seen order.
#[must_use]
pub fn clean_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim();
        if !keyword.is_empty() && !out.iter().any(|k| k == keyword) {
            out.push(keyword.to_owned());
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKeyword {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub keyword: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub search_keywords: Vec<SearchKeyword>,
}

impl AnalyticsClient {
    /// `POST /api/v1/products/with-keywords`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] if the session token is rejected.
    /// - [`ClientError::UnexpectedStatus`] / [`ClientError::Http`] otherwise.
    /// - [`ClientError::Deserialize`] if the response is not a product.
    pub async fn create_product_with_keywords(
        &self,
        product: &NewProduct,
        session: &AuthSession,
    ) -> Result<Product, ClientError> {
        let url = self.endpoint(&["products", "with-keywords"])?;

        let mut body = product.clone();
        body.search_keywords = clean_keywords(&product.search_keywords);
        if body.application_id.is_none() {
            body.application_id.clone_from(&session.application_id);
        }
        if body.application_id.is_none() {
            tracing::warn!(product = %body.name, "creating product without an application id");
        }

        let created: Product = self
            .post_typed(
                url,
                Some(&session.access_token),
                &body,
                "create_product_with_keywords",
            )
            .await?;
        tracing::info!(
            product_id = %created.id,
            keywords = created.search_keywords.len(),
            "product created"
        );
        Ok(created)
    }

    /// `GET /api/v1/products/application/{application_id}`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::create_product_with_keywords`].
    pub async fn products_by_application(
        &self,
        application_id: &str,
        token: &str,
    ) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint(&["products", "application", application_id])?;
        let body = self
            .send_json(self.client.get(url).bearer_auth(token), "products_by_application")
            .await?;
        lenient::seq(body).map_err(|e| ClientError::Deserialize {
            context: "products_by_application".to_owned(),
            source: e,
        })
    }

    /// `GET /api/v1/search/keywords/product/{product_id}`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::create_product_with_keywords`].
    pub async fn keywords_by_product(
        &self,
        product_id: &str,
        token: &str,
    ) -> Result<Vec<SearchKeyword>, ClientError> {
        let url = self.endpoint(&["search", "keywords", "product", product_id])?;
        let body = self
            .send_json(self.client.get(url).bearer_auth(token), "keywords_by_product")
            .await?;
        lenient::seq(body).map_err(|e| ClientError::Deserialize {
            context: "keywords_by_product".to_owned(),
            source: e,
        })
    }
}
