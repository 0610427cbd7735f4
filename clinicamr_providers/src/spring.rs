use std::time::Duration;

use async_trait::async_trait;
use clinicamr_core::{AmrFailure, AmrParser, AmrSentence};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::retry::retry_with_backoff;

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    sents: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    amrs: Vec<Prediction>,
}

/// One parsed sentence; `graph` is absent when `error` is set.
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    sent: Option<String>,
    #[serde(default)]
    graph: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client of a SPRING AMR parse service (`POST {url}/parse`).
pub struct SpringAmrParser {
    client: Client,
    base_url: String,
    model: String,
    retry_delays: Vec<Duration>,
    final_retries: usize,
}

impl SpringAmrParser {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        info!("Creating SpringAmrParser for {}", base_url);
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            retry_delays: vec![Duration::from_secs(1), Duration::from_secs(2)],
            final_retries: 1,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry_delays: Vec<Duration>, final_retries: usize) -> Self {
        self.retry_delays = retry_delays;
        self.final_retries = final_retries;
        self
    }

    async fn try_parse(&self, request: &ParseRequest<'_>) -> anyhow::Result<ParseResponse> {
        let response = self
            .client
            .post(format!("{}/parse", self.base_url))
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<ParseResponse>()
            .await?;
        Ok(response)
    }

    fn to_sentence(pred: Prediction, sent: &str) -> AmrSentence {
        let failure = |message: String| {
            AmrSentence::failure(AmrFailure {
                message,
                sent: Some(sent.to_string()),
            })
        };
        if let Some(error) = pred.error {
            return failure(error);
        }
        let Some(graph) = pred.graph else {
            return failure("no graph in parse response".to_string());
        };
        match AmrSentence::parse(&graph) {
            Ok(mut amr) => {
                if !amr.metadata.contains("snt") {
                    amr.metadata.set("snt", pred.sent.as_deref().unwrap_or(sent));
                }
                amr
            }
            Err(e) => {
                warn!("could not decode graph for <{sent}>: {e}");
                failure(e.to_string())
            }
        }
    }
}

#[async_trait]
impl AmrParser for SpringAmrParser {
    async fn parse(&self, sents: &[String]) -> anyhow::Result<Vec<AmrSentence>> {
        let request = ParseRequest { sents };

        debug!("Sending {} sentences to {}", sents.len(), self.base_url);

        let response = retry_with_backoff(
            || self.try_parse(&request),
            &self.retry_delays,
            self.final_retries,
        )
        .await?;

        anyhow::ensure!(
            response.amrs.len() == sents.len(),
            "parse service returned {} graphs for {} sentences",
            response.amrs.len(),
            sents.len()
        );

        Ok(response
            .amrs
            .into_iter()
            .zip(sents)
            .map(|(pred, sent)| Self::to_sentence(pred, sent))
            .collect())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
