//! Typed HTTP client for the catalogue API

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use super::ClientError;
use crate::models::{
    CatalogStats, ListQuery, LoanAction, MessageResponse, RecordId, RecordList, RecordListing,
    SearchQuery, StatsResponse, TypeList,
};

/// Endpoints the views depend on
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn list_records(&self, query: &ListQuery) -> Result<RecordListing, ClientError>;

    async fn document_types(&self) -> Result<Vec<String>, ClientError>;

    /// Returns the confirmation message
    async fn set_loan_state(&self, id: &RecordId, action: LoanAction) -> Result<String, ClientError>;

    async fn stats(&self) -> Result<CatalogStats, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` points at the API root, e.g. `http://localhost:3000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a success envelope, or turn an error envelope into `ClientError::Api`
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("Erreur HTTP: {}", status.as_u16()),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Title/author search, at most 100 records
    pub async fn search(&self, query: &SearchQuery) -> Result<RecordList, ClientError> {
        let response = self
            .http
            .get(self.url("/livres/search"))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl CatalogBackend for ApiClient {
    async fn list_records(&self, query: &ListQuery) -> Result<RecordListing, ClientError> {
        let response = self
            .http
            .get(self.url("/livres"))
            .query(query)
            .send()
            .await?;
        let listing: RecordListing = Self::decode(response).await?;
        if !listing.success {
            return Err(ClientError::InvalidPayload);
        }
        Ok(listing)
    }

    async fn document_types(&self) -> Result<Vec<String>, ClientError> {
        let response = self.http.get(self.url("/livres/types")).send().await?;
        let types: TypeList = Self::decode(response).await?;
        Ok(types.data)
    }

    async fn set_loan_state(&self, id: &RecordId, action: LoanAction) -> Result<String, ClientError> {
        let response = self
            .http
            .patch(self.url(&format!("/livres/{}", id)))
            .json(&json!({ "action": action.as_str() }))
            .send()
            .await?;
        let body: MessageResponse = Self::decode(response).await?;
        Ok(body.message)
    }

    async fn stats(&self) -> Result<CatalogStats, ClientError> {
        let response = self.http.get(self.url("/stats")).send().await?;
        let body: StatsResponse = Self::decode(response).await?;
        if !body.success {
            return Err(ClientError::InvalidPayload);
        }
        Ok(body.stats)
    }
}
