//! Orchestration of one request cycle: decide on a tool, dispatch to the
//! image pipeline or the web search, report the outcome.

use color_eyre::Result;

use crate::{
    ImgModBox, LLMBox,
    config::{
        Config, OPENAI_CHAT_MODEL, OPENAI_CHAT_URL, PERPLEXITY_CHAT_MODEL, PERPLEXITY_CHAT_URL,
    },
    image_model::{DEFAULT_NEGATIVE_PROMPT, ReplicateImageModel},
    llm::{InputMessage, OpenAIChat, Request},
    router::{self, Decision, Tool},
};

/// The phrase every authored image prompt must carry.
pub const REQUIRED_PROMPT_PHRASE: &str = "text saying Afarsemon AI Agency";

pub struct Agent {
    llm: LLMBox,
    searcher: LLMBox,
    imgmod: ImgModBox,
}

/// What one dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Image { prompt: String, url: String },
    Search { answer: String },
    Rejected { tool: String },
}

impl Agent {
    pub fn new(llm: LLMBox, searcher: LLMBox, imgmod: ImgModBox) -> Self {
        Self {
            llm,
            searcher,
            imgmod,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(OpenAIChat::new(
                config.openai_api_key.clone(),
                OPENAI_CHAT_URL,
                OPENAI_CHAT_MODEL,
            )),
            Box::new(OpenAIChat::new(
                config.perplexity_api_key.clone(),
                PERPLEXITY_CHAT_URL,
                PERPLEXITY_CHAT_MODEL,
            )),
            Box::new(ReplicateImageModel::new(
                config.replicate_api_token.clone(),
            )),
        )
    }

    pub async fn decide(&mut self, user_input: &str) -> Result<Decision> {
        router::route(self.llm.as_mut(), user_input).await
    }

    /// Dispatches a decision. An unrecognized tool is rejected without any
    /// external call and without an error.
    pub async fn execute(&mut self, decision: &Decision, user_input: &str) -> Result<Outcome> {
        match &decision.tool {
            Tool::GenerateImage => {
                let prompt = self.author_image_prompt(user_input).await?;
                let url = self
                    .imgmod
                    .generate(&prompt, DEFAULT_NEGATIVE_PROMPT)
                    .await?;
                Ok(Outcome::Image { prompt, url })
            }
            Tool::WebBrowsing => {
                let answer = self.search_web(user_input).await?;
                Ok(Outcome::Search { answer })
            }
            Tool::Unrecognized(tool) => Ok(Outcome::Rejected { tool: tool.clone() }),
        }
    }

    /// Has the chat model rewrite the raw request into a Stable Diffusion
    /// prompt. The model is instructed to embed [`REQUIRED_PROMPT_PHRASE`];
    /// its output is taken verbatim, without checking that it did.
    async fn author_image_prompt(&mut self, user_input: &str) -> Result<String> {
        println!("\nWriting prompt for image generation...");

        let req = Request {
            system: Some(
                "You are an expert prompt writer. You specialize in writing descriptive \
                 prompts for the AI image tool Stable Diffusion."
                    .to_string(),
            ),
            messages: vec![InputMessage::user(format!(
                "Write a concise prompt for this {user_input}. \
                 Always include: '{REQUIRED_PROMPT_PHRASE}'. \
                 Only output the prompt itself, no extra text."
            ))],
        };

        let prompt = self.llm.send_request(req).await?.text;
        println!("Generated prompt: {prompt}");
        Ok(prompt)
    }

    async fn search_web(&mut self, query: &str) -> Result<String> {
        println!("\nSearching the web...");

        let req = Request {
            system: Some("Provide a concise answer based on web search.".to_string()),
            messages: vec![InputMessage::user(query.to_string())],
        };

        Ok(self.searcher.send_request(req).await?.text)
    }
}
