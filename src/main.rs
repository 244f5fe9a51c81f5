use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use groundrag::{context, Config, RagContext};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Words that end the chat loop (compared case-insensitively).
const EXIT_WORDS: &[&str] = &["q", "exit", "quit", "çıkış"];

#[derive(Parser, Debug)]
#[command(name = "groundrag", version)]
#[command(about = "Answer questions from a knowledge file, or say there is no information")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive question loop (default)
    Chat,
    /// Answer a single question and exit
    Ask {
        question: String,
    },
    /// Index the knowledge file without answering anything
    Ingest {
        /// Re-chunk and re-embed even if the file is unchanged
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;

    // Logs go to stderr; stdout carries only prompts and answers
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.groundrag.log_level.as_str())
    ).init();

    log::info!("Starting groundrag v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Knowledge file: {}", config.knowledge_file().display());
    log::info!("Database path: {}", config.db_path().display());

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(config).await,
        Command::Ask { question } => run_ask(config, &question).await,
        Command::Ingest { force } => run_ingest(config, force).await,
    }
}

/// Read questions from stdin until an exit word or EOF.
async fn run_chat(config: Config) -> Result<()> {
    let ctx = RagContext::initialize(config)
        .await
        .context("Failed to initialize")?;
    let pipeline = ctx.pipeline();

    println!("Ready. Ask a question ('q' to quit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nQuestion: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_word(question) {
            break;
        }

        match pipeline.ask(question).await {
            Ok(answer) => {
                println!("\n--- ANSWER ---");
                println!("{}", answer);
            }
            // a failed interaction is reported; the session goes on
            Err(e) => log::error!("Interaction failed: {}", e),
        }
    }

    ctx.shutdown().await?;
    Ok(())
}

async fn run_ask(config: Config, question: &str) -> Result<()> {
    let ctx = RagContext::initialize(config)
        .await
        .context("Failed to initialize")?;

    let interaction = ctx.run_once(question).await?;
    let path: Vec<&str> = interaction.trace.iter().map(|node| node.name()).collect();
    log::info!("Path: {} -> END ({:?})", path.join(" -> "), interaction.termination);

    println!("{}", interaction.outcome.as_str());
    Ok(())
}

async fn run_ingest(config: Config, force: bool) -> Result<()> {
    let report = context::ingest(&config, force)
        .await
        .context("Ingestion failed")?;

    if report.skipped {
        log::info!("{} unchanged ({} passages embedded)", report.doc_path, report.embedded);
    } else {
        log::info!(
            "{}: {} passages, ~{} tokens, {} embedded",
            report.doc_path,
            report.passages,
            report.tokens,
            report.embedded
        );
    }
    Ok(())
}

fn is_exit_word(input: &str) -> bool {
    let lowered = input.to_lowercase();
    EXIT_WORDS.iter().any(|word| *word == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words_case_insensitive() {
        assert!(is_exit_word("q"));
        assert!(is_exit_word("EXIT"));
        assert!(is_exit_word("Quit"));
        assert!(is_exit_word("Çıkış"));
        assert!(!is_exit_word("quite"));
        assert!(!is_exit_word("What is q?"));
    }

    #[test]
    fn test_default_command_is_chat() {
        let cli = Cli::parse_from(["groundrag"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["groundrag", "ask", "What is the capital of France?"]);
        assert!(matches!(cli.command, Some(Command::Ask { .. })));

        let cli = Cli::parse_from(["groundrag", "ingest", "--force"]);
        assert!(matches!(cli.command, Some(Command::Ingest { force: true })));
    }
}
