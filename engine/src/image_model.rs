use std::pin::Pin;

use color_eyre::Result;
use thiserror::Error;

pub mod replicate;
pub use replicate::ReplicateImageModel;

/// Prompts shorter than this (after trimming) are rejected before any request
/// leaves the process.
pub const MIN_PROMPT_LEN: usize = 30;

pub const DEFAULT_NEGATIVE_PROMPT: &str = "blur, non-realistic, low quality";

/// Errors of the image generation pipeline
#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Prompt must be at least {MIN_PROMPT_LEN} characters, got {0}")]
    PromptTooShort(usize),

    #[error("Image generation failed: {0}")]
    Generation(String),
}

pub trait ImageModel {
    /// Resolves to the URL of the first generated image.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        negative_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

pub fn validate_prompt(prompt: &str) -> Result<(), ImageGenError> {
    let len = prompt.trim().len();
    if len < MIN_PROMPT_LEN {
        Err(ImageGenError::PromptTooShort(len))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prompt_at_minimum_length() {
        let prompt = "a".repeat(MIN_PROMPT_LEN);
        assert!(validate_prompt(&prompt).is_ok());
    }

    #[test]
    fn rejects_prompt_below_minimum_length() {
        let prompt = "a".repeat(MIN_PROMPT_LEN - 1);

        let err = validate_prompt(&prompt).unwrap_err();
        assert!(matches!(err, ImageGenError::PromptTooShort(29)));
        assert!(err.to_string().contains("at least 30 characters"));
    }

    #[test]
    fn whitespace_padding_does_not_count() {
        let prompt = format!("   short prompt{}   ", " ".repeat(40));

        let err = validate_prompt(&prompt).unwrap_err();
        assert!(matches!(err, ImageGenError::PromptTooShort(_)));
    }
}
