//! HTTP client for the drafting assistance backend.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use folio::{AssistService, ClauseLookup, ClauseMatch, Error, Result};

/// Request timeout for every backend call.
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct RewriteResponse {
    suggestion: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<ClauseMatch>,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Deserialize)]
struct ConsistencyResponse {
    issues: Vec<String>,
}

/// [`AssistService`] backed by the JSON endpoints under `/api`.
pub struct HttpAssistService {
    base: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpAssistService {
    /// Create a client for the server at `base` (e.g. `http://localhost:3001`).
    pub fn new(base: &str) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| Error::ExternalService(e.to_string()))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
            runtime,
        })
    }

    fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/{}", self.base, endpoint);
        log::debug!("POST {}", url);

        self.runtime.block_on(async {
            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::ExternalService(format!("{}: {}", endpoint, e)))?;
            response
                .json::<R>()
                .await
                .map_err(|e| Error::ExternalService(format!("{}: {}", endpoint, e)))
        })
    }
}

impl AssistService for HttpAssistService {
    fn suggest_rewrite(&self, text: &str) -> Result<String> {
        let response: RewriteResponse = self.post("suggest-rewrite", &json!({ "text": text }))?;
        Ok(response.suggestion)
    }

    fn search_clauses(&self, query: &str) -> Result<Vec<ClauseMatch>> {
        let response: SearchResponse = self.post("rag-search", &json!({ "query": query }))?;
        Ok(response.results)
    }

    fn find_clause(&self, document: &str, clause: &str) -> Result<ClauseLookup> {
        self.post("find-clause", &json!({ "doc": document, "clause": clause }))
    }

    fn summarize(&self, document: &str) -> Result<String> {
        let response: SummaryResponse = self.post("summarize", &json!({ "doc": document }))?;
        Ok(response.summary)
    }

    fn check_consistency(&self, document: &str) -> Result<Vec<String>> {
        let response: ConsistencyResponse =
            self.post("check-consistency", &json!({ "doc": document }))?;
        Ok(response.issues)
    }
}
