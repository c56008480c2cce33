use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rulebook_qa::cli;

#[derive(Parser)]
#[command(name = "rulebook-qa")]
#[command(about = "Retrieval-augmented question answering over a rulebook", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question about a rulebook document
    Ask {
        /// Path to the rulebook (txt, md, or pdf with the pdf feature)
        #[arg(short, long)]
        document: String,

        /// The question to answer (the stock question is used if omitted)
        #[arg(short, long)]
        question: Option<String>,

        /// Number of passages to retrieve
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Chunk size in characters
        #[arg(long, default_value = "125")]
        chunk_size: usize,

        /// Chunk overlap in characters (must be smaller than chunk size)
        #[arg(long, default_value = "120")]
        chunk_overlap: usize,

        /// Prompt template: default, explanatory, or step_by_step
        #[arg(long, default_value = "default")]
        template: String,

        /// Hosted embedding model id
        #[arg(long, default_value = "text-embedding-ada-002")]
        embedding_model: String,

        /// Hosted generation model id
        #[arg(long, default_value = "gpt-3.5-turbo")]
        generation_model: String,

        /// Print the retrieved source passages with the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Evaluate retrieval quality over a parameter grid
    Eval {
        /// Path to the rulebook document
        #[arg(short, long)]
        document: String,

        /// Path to the JSON eval set (question + expected_phrase pairs)
        #[arg(long)]
        data: String,

        /// Chunk sizes to sweep
        #[arg(long, value_delimiter = ',', default_value = "125")]
        chunk_sizes: Vec<usize>,

        /// Chunk overlaps to sweep
        #[arg(long, value_delimiter = ',', default_value = "120")]
        chunk_overlaps: Vec<usize>,

        /// Top-k values to sweep
        #[arg(long, value_delimiter = ',', default_value = "5")]
        top_k: Vec<usize>,

        /// Hosted embedding model id
        #[arg(long, default_value = "text-embedding-ada-002")]
        embedding_model: String,

        /// Use the deterministic offline embedder instead of the hosted one
        #[arg(long)]
        offline: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulebook_qa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            document,
            question,
            top_k,
            chunk_size,
            chunk_overlap,
            template,
            embedding_model,
            generation_model,
            show_context,
        } => {
            cli::ask(
                document,
                question,
                top_k,
                chunk_size,
                chunk_overlap,
                template,
                embedding_model,
                generation_model,
                show_context,
            )?;
        }

        Commands::Eval {
            document,
            data,
            chunk_sizes,
            chunk_overlaps,
            top_k,
            embedding_model,
            offline,
        } => {
            cli::eval(
                document,
                data,
                chunk_sizes,
                chunk_overlaps,
                top_k,
                embedding_model,
                offline,
            )?;
        }
    }

    Ok(())
}
