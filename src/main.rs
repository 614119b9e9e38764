//! Notecast CLI - summarise PDF notes and listen to them
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use notecast::{
    extract::read_upload,
    model::{BackendLoader, DefaultEngine},
    telemetry::init_tracing_subscriber,
    ui, ChunkedSummarizer, Config, GoogleTts, NarrationEngine, Session,
};

#[derive(Parser)]
#[command(name = "notecast")]
#[command(author, version, about = "Summarise PDF notes and listen to the summary", long_about = None)]
struct Cli {
    /// Config file to use instead of notecast.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a PDF once and exit
    Summarise {
        /// PDF file to summarise
        file: PathBuf,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Also narrate the summary and write the MP3 here
        #[arg(long, value_name = "PATH")]
        audio: Option<PathBuf>,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_subscriber("warn")?;

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Summarise { file, raw, audio }) => {
            let mut session = Session::from_config(&config);
            let bytes = read_upload(&file, config.upload.max_bytes)?;
            let name = file.display().to_string();

            println!("Extracting: {}", name);
            let text = session.upload(name, bytes)?;

            if raw {
                println!("{}", text);
                println!("\n--- Extracted {} characters ---", text.chars().count());
                return Ok(());
            }

            println!("Summarising {} characters...\n", text.chars().count());
            let engine = DefaultEngine::new(BackendLoader::new(&config));
            let summarizer = ChunkedSummarizer::from_config(&engine, &config.summary);
            let summary = session.summarize(&summarizer).await?;
            println!("{}", summary.text);

            if let Some(target) = audio {
                let narrator = NarrationEngine::new(GoogleTts::new(&config.narration)?);
                let artifact = session.narrate(&narrator).await?;
                std::fs::write(&target, &artifact.bytes)?;
                println!("\nAudio written to {}", target.display());
            }
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "notecast", &mut std::io::stdout());
        }
        None => {
            // Default: interactive session
            ui::run(&config).await?;
        }
    }

    Ok(())
}
