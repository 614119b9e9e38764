//! Interactive terminal session.
//!
//! A menu loop over a single [`Session`]: each entry is one user action, and only the
//! actions valid for the current stage are offered.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::document::{Document, PREVIEW_CHARS};
use crate::extract::read_upload;
use crate::model::{BackendLoader, DefaultEngine};
use crate::narration::{GoogleTts, NarrationEngine, AUDIO_FILE_NAME};
use crate::session::{DocumentSummary, Session, SessionError, SessionStage};
use crate::summarizer::ChunkedSummarizer;
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Upload,
    RetryExtraction,
    Preview,
    Summarize,
    ShowSummary,
    Narrate,
    SaveAudio,
    Quit,
}

impl Action {
    fn label(self, stage: SessionStage) -> &'static str {
        match self {
            Action::Upload if stage == SessionStage::Idle => "📄 Upload PDF notes",
            Action::Upload => "📄 Upload a different PDF",
            Action::RetryExtraction => "📖 Retry text extraction",
            Action::Preview => "📘 Preview extracted text",
            Action::Summarize if stage == SessionStage::Extracted => "📝 Generate summary",
            Action::Summarize => "📝 Regenerate summary",
            Action::ShowSummary => "📋 Show summary",
            Action::Narrate if stage == SessionStage::Narrated => "🔊 Regenerate audio summary",
            Action::Narrate => "🔊 Generate audio summary",
            Action::SaveAudio => "⬇️  Save audio",
            Action::Quit => "Quit",
        }
    }
}

fn available_actions<E: crate::TextExtractor>(session: &Session<E>) -> Vec<Action> {
    let mut actions = vec![Action::Upload];
    match session.stage() {
        SessionStage::Idle => {}
        SessionStage::Uploaded => actions.push(Action::RetryExtraction),
        SessionStage::Extracted => actions.extend([Action::Preview, Action::Summarize]),
        SessionStage::Summarized | SessionStage::Narrated => actions.extend([
            Action::Preview,
            Action::Summarize,
            Action::ShowSummary,
            Action::Narrate,
        ]),
    }
    if session.download().is_some() {
        actions.push(Action::SaveAudio);
    }
    actions.push(Action::Quit);
    actions
}

/// Run the interactive session until the user quits.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let engine = DefaultEngine::new(BackendLoader::new(config));
    let summarizer = ChunkedSummarizer::from_config(&engine, &config.summary);
    let narrator = NarrationEngine::new(GoogleTts::new(&config.narration)?);
    let mut session = Session::from_config(config);
    let theme = ColorfulTheme::default();

    println!("{}", "🧠 AI Notes Summarizer with Audio".bold());
    println!("Upload a PDF file, get a summarized version of your notes, and even listen to it!\n");

    loop {
        let stage = session.stage();
        let actions = available_actions(&session);
        let labels: Vec<&str> = actions.iter().map(|a| a.label(stage)).collect();

        let choice = Select::with_theme(&theme)
            .with_prompt(format!("What next? ({stage})"))
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice] {
            Action::Upload => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("Path to PDF")
                    .interact_text()?;
                upload(&mut session, Path::new(path.trim()), config.upload.max_bytes);
            }
            Action::RetryExtraction => match session.extract() {
                Ok(text) => println!("{} {} characters extracted", "✅".green(), text.chars().count()),
                Err(e) => report(&e),
            },
            Action::Preview => {
                if let (Some(document), Some(preview)) =
                    (session.document(), session.preview(PREVIEW_CHARS))
                {
                    println!("\n{}", "📘 Extracted Text Preview".bold());
                    println!("{}\n{}\n", document_status(document).dimmed(), preview);
                }
            }
            Action::Summarize => {
                println!("🧠 Summarizing...");
                match session.summarize(&summarizer).await {
                    Ok(summary) => {
                        println!("{}", "✅ Summary generated!".green());
                        print_summary(summary);
                    }
                    Err(e) => report(&e),
                }
                if session.is_audio_stale() {
                    println!("{}", "The audio summary no longer matches this summary.".yellow());
                }
            }
            Action::ShowSummary => {
                if let Some(summary) = session.summary() {
                    print_summary(summary);
                }
            }
            Action::Narrate => {
                println!("🎙️ Creating audio...");
                match session.narrate(&narrator).await {
                    Ok(audio) => println!(
                        "{} Audio summary ready ({} KiB, generated {})",
                        "🔉".green(),
                        audio.bytes.len() / 1024,
                        timestamp(audio.generated_at)
                    ),
                    Err(e) => report(&e),
                }
            }
            Action::SaveAudio => {
                let target: String = Input::with_theme(&theme)
                    .with_prompt("Save as")
                    .default(AUDIO_FILE_NAME.to_string())
                    .interact_text()?;
                save_audio(&session, PathBuf::from(target.trim()));
            }
            Action::Quit => {
                session.reset();
                break;
            }
        }
    }

    Ok(())
}

fn upload<E: crate::TextExtractor>(session: &mut Session<E>, path: &Path, max_bytes: usize) {
    let bytes = match read_upload(path, max_bytes) {
        Ok(bytes) => bytes,
        Err(e) => return report(&SessionError::from(e)),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    println!("📖 Extracting text from PDF...");
    match session.upload(name, bytes) {
        Ok(text) if text.trim().is_empty() => {
            println!("{}", "No text found in the document.".yellow())
        }
        Ok(text) => println!("{} {} characters extracted", "✅".green(), text.chars().count()),
        Err(e) => report(&e),
    }
}

fn save_audio<E: crate::TextExtractor>(session: &Session<E>, target: PathBuf) {
    let Some(download) = session.download() else {
        return;
    };
    match std::fs::write(&target, download.bytes) {
        Ok(()) => println!(
            "{} Saved {} ({}) to {}",
            "⬇️".green(),
            download.file_name,
            download.mime_type,
            target.display()
        ),
        Err(e) => eprintln!("{} failed to save audio: {}", "❌".red(), e),
    }
}

fn print_summary(summary: &DocumentSummary) {
    println!("\n{}", "📋 Summary Output".bold());
    println!("{}\n{}\n", summary_status(summary).dimmed(), summary.text);
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn document_status(document: &Document) -> String {
    let mut status = format!("{}, uploaded {}", document.name, timestamp(document.uploaded_at));
    if let Some(at) = document.extracted_at() {
        status.push_str(&format!(", extracted {}", timestamp(at)));
    }
    status
}

fn summary_status(summary: &DocumentSummary) -> String {
    format!(
        "Revision {}, {} chunk(s), generated {}",
        summary.revision,
        summary.chunk_count,
        timestamp(summary.generated_at)
    )
}

fn report(error: &SessionError) {
    eprintln!("{} {}", "❌".red(), error.to_string().red());
}
