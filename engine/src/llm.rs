use std::pin::Pin;

use serde::{Deserialize, Serialize};

use color_eyre::Result;

pub trait LLM {
    fn send_request(&mut self, req: Request) -> LLMFuture<'_>;
}

pub type LLMFuture<'a> = Pin<Box<dyn Future<Output = Result<OutputMessage>> + Send + 'a>>;

pub struct Request {
    pub system: Option<String>,
    pub messages: Vec<InputMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn user(user_message: String) -> InputMessage {
        Self {
            role: Role::User,
            content: user_message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputMessage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

mod open_ai_chat;
pub use open_ai_chat::OpenAIChat;
