use clap::Parser;
use color_eyre::Result;
use engine::image_model::{DEFAULT_NEGATIVE_PROMPT, ImageModel, ReplicateImageModel};

#[derive(clap::Parser)]
struct Arg {
    key: String,
    prompt: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let Arg { key, prompt } = Arg::parse();
    let model = ReplicateImageModel::new(key);

    let url = model.generate(&prompt, DEFAULT_NEGATIVE_PROMPT).await?;
    println!("Generated image URL: {url}");

    Ok(())
}
