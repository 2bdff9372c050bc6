use color_eyre::eyre::{Context, eyre};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LLM, LLMFuture, OutputMessage, Request, Role};
use crate::retry::{self, RetryPolicy};

/// Client for any OpenAI-compatible chat-completion endpoint. The same type
/// serves the OpenAI API and the Perplexity search API, which only differ in
/// base URL and model name.
#[derive(Debug, Clone)]
pub struct OpenAIChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAIChat {
    pub fn new(api_key: String, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }
}

impl LLM for OpenAIChat {
    fn send_request(&mut self, req: Request) -> LLMFuture<'_> {
        Box::pin(async move {
            let body = build_body(&self.model, req);

            let client = &self.client;
            let api_key = &self.api_key;
            let base_url = &self.base_url;
            let body = &body;

            let response: OpenAIChatResponse =
                retry::retry(&self.retry, "chat completion", move || async move {
                    let res = client
                        .post(base_url)
                        .bearer_auth(api_key)
                        .json(body)
                        .send()
                        .await
                        .context("sending chat request")?;

                    if !res.status().is_success() {
                        let status = res.status();
                        let body = res.text().await.unwrap_or_default();
                        return Err(eyre!("OpenAI error {}: {}", status, body));
                    }

                    res.json().await.context("parsing chat response")
                })
                .await?;

            debug!("chat response:\n{response:#?}");

            let (input_tokens, output_tokens) = response
                .usage
                .as_ref()
                .map(|u| (u.prompt_tokens, u.completion_tokens))
                .unwrap_or((0, 0));

            let text = response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| eyre!("Chat response contained no message content"))?;

            Ok(OutputMessage {
                input_tokens,
                output_tokens,
                text,
            })
        })
    }
}

fn build_body(model: &str, req: Request) -> OpenAIChatRequest {
    let mut messages = Vec::new();

    if let Some(system) = req.system {
        messages.push(OpenAIMessage {
            role: "system",
            content: system,
        });
    }

    for msg in req.messages {
        messages.push(OpenAIMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: msg.content,
        });
    }

    OpenAIChatRequest {
        model: model.to_string(),
        messages,
    }
}

//
// ===== OpenAI wire types =====
//

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
