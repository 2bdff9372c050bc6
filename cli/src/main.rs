use std::io::{Write, stdin, stdout};

use color_eyre::{Result, eyre::ensure};
use engine::{
    agent::{Agent, Outcome},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;

    let config = resolve_config()?;
    let mut agent = Agent::from_config(&config);

    let user_input = prompt_line("\nWhat would you like to create or research? ")?;
    ensure!(!user_input.is_empty(), "No request entered");

    let decision = agent.decide(&user_input).await?;
    println!("\nDecision: {}", decision.tool.to_string().to_uppercase());
    println!("Reason: {}", decision.reasoning);

    match agent.execute(&decision, &user_input).await? {
        Outcome::Image { url, .. } => println!("\nGenerated image URL: {url}"),
        Outcome::Search { answer } => {
            println!("\nSearch results:");
            println!("{answer}");
        }
        Outcome::Rejected { .. } => println!("Invalid tool selected"),
    }

    Ok(())
}

fn resolve_config() -> Result<Config> {
    Ok(Config {
        openai_api_key: resolve_secret("OPENAI_API_KEY", "OpenAI API Key")?,
        replicate_api_token: resolve_secret("REPLICATE_API_TOKEN", "Replicate API Token")?,
        perplexity_api_key: resolve_secret("PERPLEXITY_API_KEY", "Perplexity API Key")?,
    })
}

/// Reads a key from the environment, falling back to an interactive prompt.
/// The resolved value only ever lives in the returned string, not in the
/// process environment.
fn resolve_secret(env_var: &str, label: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => prompt_line(&format!("Please enter your {label}: ")),
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush()?;

    let mut line = String::new();
    stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
