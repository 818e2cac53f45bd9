use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start an interactive chat session.
    /// Type "exit" or "quit" to leave.
    Chat {},

    /// Ask a single question and print the reply.
    Ask {
        /// The question to ask
        question: String,
    },

    /// Rebuild the vector store from a FAQ source file.
    /// Replaces any previously persisted collection.
    Rebuild {
        /// Path to the FAQ source json
        #[clap(short, long, default_value = "data/faqs.json")]
        input: String,
    },
}
