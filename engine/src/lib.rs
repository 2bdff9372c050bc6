use crate::{image_model::ImageModel, llm::LLM};

pub mod agent;
pub mod config;
pub mod image_model;
pub mod llm;
pub mod retry;
pub mod router;

pub type LLMBox = Box<dyn LLM + Send>;
pub type ImgModBox = Box<dyn ImageModel + Send>;
