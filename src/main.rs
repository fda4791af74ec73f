mod artifact;
mod cli;
mod commands;
mod config;
mod error;
mod mcp;
mod page_range;
mod pdf;
mod selection;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default = if verbose { "pdfdesk=debug" } else { "pdfdesk=warn" };
    // stdout carries command output and MCP frames, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let render = cli.render.with_dpi(None).with_thumbnail_size(None);
    tracing::debug!(?render, "render settings");

    match cli.command {
        Commands::Mcp => {
            mcp::run_server(render).await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Merge {
            inputs,
            pages,
            deselect,
            output,
        } => {
            commands::merge::run(&inputs, pages.as_deref(), &deselect, output.as_ref())?;
        }
        Commands::Split {
            path,
            pages,
            output_dir,
        } => {
            commands::split::run(&path, pages.as_deref(), &output_dir)?;
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            commands::extract::run(&path, &pages, output.as_ref())?;
        }
        Commands::ToPng {
            path,
            pages,
            output,
            output_dir,
        } => {
            commands::to_png::run(
                &path,
                pages.as_deref(),
                output.as_ref(),
                output_dir.as_ref(),
                &render,
            )?;
        }
        Commands::ToText {
            path,
            pages,
            output,
            quiet,
        } => {
            commands::to_text::run(&path, pages.as_deref(), output.as_ref(), quiet)?;
        }
        Commands::ImagesToPdf { inputs, output } => {
            commands::images_to_pdf::run(&inputs, output.as_ref())?;
        }
        Commands::TextToPdf { text, file, output } => {
            commands::text_to_pdf::run(text.as_deref(), file.as_deref(), output.as_ref())?;
        }
        Commands::Thumbnails {
            path,
            pages,
            output_dir,
        } => {
            commands::thumbnails::run(&path, pages.as_deref(), &output_dir, &render)?;
        }
    }

    Ok(())
}
