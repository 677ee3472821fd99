// src/cli.rs
use crate::app_log;
use crate::core::{AnalysisServiceClient, ConfigManager};
use crate::cv_analysis::extractor;
use crate::utils::{base_file_name, cv_content_type, BYTES_PER_MB};
use crate::workflow::{
    Attachment, ConsoleNotifier, MemoryAttachments, MemoryText, PageSession, ResultLayout,
    SessionHandle, SubmissionController, SubmitOutcome, WorkflowConfig, DEFAULT_MAX_FILE_BYTES,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::num::NonZeroU8;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "musecareer")]
#[command(about = "AI career analysis for uploaded CVs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the analysis API server
    Serve {
        /// Overrides PORT and config.yaml
        #[arg(long)]
        port: Option<u16>,
    },
    /// Submit a CV to a running API and page through the results
    Analyze {
        file: PathBuf,
        #[arg(long, default_value = "")]
        interests: String,
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        api_url: String,
        #[arg(long, value_enum, default_value_t = ResultLayout::Profile)]
        layout: ResultLayout,
        #[arg(long, default_value = "4")]
        pages: NonZeroU8,
        #[arg(long, default_value_t = DEFAULT_MAX_FILE_BYTES / BYTES_PER_MB)]
        max_file_mb: u64,
    },
    /// Print the text extracted from a CV file
    Extract { file: PathBuf },
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            let mut config = ConfigManager::load()?;
            if let Some(port) = port {
                config.server.port = port;
            }
            crate::start_web_server(config).await
        }

        Command::Analyze {
            file,
            interests,
            api_url,
            layout,
            pages,
            max_file_mb,
        } => {
            let config = WorkflowConfig {
                max_file_bytes: max_file_mb.saturating_mul(BYTES_PER_MB),
                total_pages: pages,
                layout,
            };
            analyze_file(&file, interests, &api_url, config).await
        }

        Command::Extract { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = display_name(&file);
            let text = extractor::extract_text_guessing(&bytes, &name)?;
            println!("{}", text);
            app_log!(info, "Extracted {} chars from {}", text.chars().count(), name);
            Ok(())
        }
    }
}

fn display_name(path: &Path) -> String {
    base_file_name(&path.to_string_lossy()).to_string()
}

async fn analyze_file(
    file: &Path,
    interests: String,
    api_url: &str,
    config: WorkflowConfig,
) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let name = display_name(file);
    let attachment = Attachment::new(name.as_str(), cv_content_type(&name), data);

    let session = PageSession::in_memory(
        MemoryAttachments::with_file(attachment),
        MemoryText::new(interests),
    )
    .into_handle();

    let invoker = AnalysisServiceClient::new(api_url)?;
    match invoker.health().await {
        Ok(health) => app_log!(info, "Analysis service at {} is up: {}", api_url, health),
        Err(e) => app_log!(warn, "Health check failed, submitting anyway: {:#}", e),
    }
    let controller = SubmissionController::new(Arc::new(invoker), Arc::new(ConsoleNotifier), config);

    controller.on_file_selected(&session).await?;

    match controller.submit_form(&session).await {
        SubmitOutcome::Stored(normalized) => {
            if let Some(reason) = normalized.reason() {
                println!("(the service reply could not be read as an analysis: {})", reason);
            }
            print_pages(&controller, &session).await;
            Ok(())
        }
        SubmitOutcome::Rejected(e) => Err(e.into()),
        SubmitOutcome::Failed(e) => Err(e.into()),
        SubmitOutcome::InFlight => anyhow::bail!("An analysis is already running"),
    }
}

/// Print each results page once, advancing the way the page's "next"
/// button does.
async fn print_pages(controller: &SubmissionController, session: &SessionHandle) {
    for _ in 0..controller.config().total_pages.get() {
        {
            let page = session.lock().await;
            if let Some(analysis) = &page.state.analysis {
                let content = analysis.page(page.state.page);
                println!("\n== {} ({}/{}) ==", content.title, page.state.page, controller.config().total_pages);
                if content.lines.is_empty() {
                    println!("(nothing here)");
                }
                for line in &content.lines {
                    println!("- {}", line);
                }
            }
        }
        controller.next_page(session).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "musecareer",
            "analyze",
            "cv.pdf",
            "--interests",
            "data engineering",
            "--layout",
            "recommendations",
            "--pages",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze {
                file,
                interests,
                api_url,
                layout,
                pages,
                max_file_mb,
            } => {
                assert_eq!(file, PathBuf::from("cv.pdf"));
                assert_eq!(interests, "data engineering");
                assert_eq!(api_url, "http://127.0.0.1:8000");
                assert_eq!(layout, ResultLayout::Recommendations);
                assert_eq!(pages.get(), 3);
                assert_eq!(max_file_mb, 200);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_zero_pages_is_rejected() {
        assert!(Cli::try_parse_from(["musecareer", "analyze", "cv.pdf", "--pages", "0"]).is_err());
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::try_parse_from(["musecareer", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(9000) }));
    }
}
