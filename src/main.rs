use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod chat;
mod cli;
mod config;
mod faq;
mod openai;
mod pipeline;
mod store;
#[cfg(test)]
mod tests;
use config::Config;
use openai::{Embedder, OpenAiChat, OpenAiEmbeddings};
use pipeline::Pipeline;
use store::FaqStore;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = cli::Args::parse();
    let config = Config::from_env()?;

    match args.command {
        cli::Command::Chat {} => {
            let pipeline = build_pipeline(&config)?;
            chat::run(&pipeline)
        }

        cli::Command::Ask { question } => {
            let pipeline = build_pipeline(&config)?;
            let reply = pipeline.ask(&question)?;
            println!("{reply}");
            Ok(())
        }

        cli::Command::Rebuild { input } => {
            let records = faq::load_faqs(&input)?;
            let embedder = OpenAiEmbeddings::new(&config);
            let store = FaqStore::create(Path::new(&config.data_dir), embedder.fingerprint())?;
            let count = store.rebuild(&records, &embedder)?;
            println!("Vector store created with {count} FAQs");
            Ok(())
        }
    }
}

fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let embedder = OpenAiEmbeddings::new(config);
    let store = FaqStore::open(Path::new(&config.data_dir), embedder.fingerprint())?;
    if store.is_empty() {
        log::warn!("FAQ collection is empty; every question will get the fallback reply");
    }

    let generator = OpenAiChat::new(config);

    Ok(Pipeline::new(
        Box::new(embedder),
        Box::new(generator),
        store,
        config.distance_threshold,
    ))
}
