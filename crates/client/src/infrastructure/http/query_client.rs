//! Reqwest adapter for the catalog query endpoint
//!
//! Implements [`MovieQueryPort`] against `GET {base}/movies` with the
//! query pairs rendered by `QueryParams`. The endpoint itself is an
//! external collaborator; this adapter only translates its answers and
//! failures into the port's vocabulary.

use kinoview_protocol::{MoviePage, QueryParams};

use crate::ports::outbound::{MovieQueryPort, QueryError};

pub struct HttpQueryAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl HttpQueryAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl MovieQueryPort for HttpQueryAdapter {
    async fn fetch_page(&self, params: QueryParams) -> Result<MoviePage, QueryError> {
        let response = self
            .http
            .get(format!("{}/movies", self.base_url))
            .query(&params.to_query_pairs())
            .send()
            .await
            .map_err(|e| QueryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "catalog endpoint returned an error");
            return Err(QueryError::Status(status.as_u16()));
        }

        response
            .json::<MoviePage>()
            .await
            .map_err(|e| QueryError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let adapter = HttpQueryAdapter::new("http://localhost:8080/api/");
        assert_eq!(adapter.base_url(), "http://localhost:8080/api");
    }
}
