use std::{pin::Pin, time::Duration};

use color_eyre::{
    Result,
    eyre::{ensure, eyre},
};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;

use crate::retry::{self, RetryPolicy};

use super::{ImageGenError, ImageModel, validate_prompt};

const PREDICTIONS_URL: &str =
    "https://api.replicate.com/v1/models/stability-ai/stable-diffusion-3/predictions";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Stable Diffusion 3 on Replicate, with a fixed parameter set tuned for
/// photorealistic single-shot output.
#[derive(Debug, Clone)]
pub struct ReplicateImageModel {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl ReplicateImageModel {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    fn input(prompt: &str, negative_prompt: &str) -> serde_json::Value {
        json!({
            "prompt": prompt,
            "negative_prompt": negative_prompt,
            "cfg": 5.0,
            "steps": 28,
            "aspect_ratio": "3:2",
            "output_format": "png",
            "output_quality": 90,
            "prompt_strength": 1.0,
        })
    }

    async fn run(&self, prompt: &str, negative_prompt: &str) -> Result<String> {
        // 1. Create prediction
        let body = json!({ "input": Self::input(prompt, negative_prompt) });
        let client = &self.client;
        let api_key = &self.api_key;
        let body = &body;

        let prediction_url =
            retry::retry(&self.retry, "prediction request", move || async move {
                let create_resp = client
                    .post(PREDICTIONS_URL)
                    .bearer_auth(api_key)
                    .json(body)
                    .send()
                    .await?;

                let status = create_resp.status();
                let body = create_resp.text().await?;
                ensure!(
                    status.is_success(),
                    "Prediction request error: {status} - {body}"
                );

                let prediction_infos = serde_json::from_str::<serde_json::Value>(&body)?;

                prediction_infos["urls"]["get"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| eyre!("Missing prediction get URL:\n{prediction_infos:#?}"))
            })
            .await?;

        // 2. Poll until finished
        loop {
            let resp = self
                .client
                .get(&prediction_url)
                .bearer_auth(&self.api_key)
                .send()
                .await?
                .error_for_status()?
                .json::<PredictionResponse>()
                .await?;

            match resp.status.as_str() {
                "succeeded" => {
                    return resp
                        .output
                        .and_then(|o| o.into_iter().next())
                        .ok_or_else(|| eyre!("No output image"));
                }
                "failed" | "canceled" => {
                    return Err(eyre!("Replicate prediction failed:\n{resp:#?}"));
                }
                _ => {
                    sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
}

impl ImageModel for ReplicateImageModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        negative_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            validate_prompt(prompt)?;
            debug!("starting prediction for prompt: {prompt:?}");

            match self.run(prompt, negative_prompt).await {
                Ok(url) => Ok(url),
                Err(err) => Err(ImageGenError::Generation(format!("{err:#}")).into()),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    status: String,
    output: Option<Vec<String>>,
}
