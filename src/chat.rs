//! Interactive chat loop.

use anyhow::bail;
use inquire::error::{InquireError, InquireResult};

use crate::pipeline::Pipeline;

const FAREWELL: &str = "Goodbye. See you soon!";

/// Run the read-ask-print loop until the user leaves.
///
/// "exit" and "quit" (case-insensitive) end the session, as do Ctrl-C
/// and Esc. Every other line, including an empty one, is forwarded to
/// the pipeline unmodified. Pipeline errors end the session; they are
/// never disguised as replies.
pub fn run(pipeline: &Pipeline) -> anyhow::Result<()> {
    println!("TechShop FAQ chatbot (type 'exit' to quit)");

    loop {
        let line = match inquire::Text::new("You:").prompt() {
            InquireResult::Ok(line) => line,
            InquireResult::Err(InquireError::OperationCanceled)
            | InquireResult::Err(InquireError::OperationInterrupted) => {
                println!("{FAREWELL}");
                return Ok(());
            }
            InquireResult::Err(err) => bail!("An error occurred: {}", err),
        };

        if is_exit(&line) {
            println!("{FAREWELL}");
            return Ok(());
        }

        let reply = pipeline.ask(&line)?;
        println!("Bot: {reply}");
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}
