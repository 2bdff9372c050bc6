use clap::Parser;
use color_eyre::Result;
use engine::llm::{InputMessage, LLM, OpenAIChat, Request};

/// Sends one message to an OpenAI-compatible chat endpoint and prints the
/// completion.
#[derive(clap::Parser)]
pub struct Cli {
    api_key: String,
    base_url: String,
    model: String,
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    pretty_env_logger::init();
    color_eyre::install()?;

    let mut model = OpenAIChat::new(args.api_key, args.base_url, args.model);
    let output = model
        .send_request(Request {
            system: None,
            messages: vec![InputMessage::user(args.message)],
        })
        .await?;

    println!("{}", output.text);
    println!(
        "Tokens: input: {}, output: {}",
        output.input_tokens, output.output_tokens
    );
    Ok(())
}
