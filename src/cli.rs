use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RenderOptions;

#[derive(Parser)]
#[command(name = "pdfdesk")]
#[command(about = "Merge, split, convert and preview PDFs from the command line or as an MCP server")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub render: RenderOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server on stdin/stdout
    Mcp,

    /// Show page count, page sizes and metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Combine pages from several PDFs into one
    Merge {
        /// PDF files to merge, in order
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Pages to take from every file (e.g., "1-3,5"); all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Untick one page of one file, as FILE:PAGE (1-based); repeatable
        #[arg(short, long, value_name = "FILE:PAGE")]
        deselect: Vec<String>,

        /// Output file [default: merged.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write every selected page to its own PDF
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Pages to split out (e.g., "2-4"); all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Copy a page range into a new PDF
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Page ranges (e.g., "1-5,10,15-end")
        pages: String,

        /// Output file [default: <name>-extract.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render pages to PNG images
    ToPng {
        /// PDF file to render
        path: PathBuf,

        /// Pages to render (e.g., "1-3,5"); all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Output ZIP file [default: pdf-to-png.zip]
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Write loose page-N.png files into this directory instead of a ZIP
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Extract text from pages
    ToText {
        /// PDF file to read
        path: PathBuf,

        /// Pages to read (e.g., "1-3,5"); all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Output text file [default: extracted-text.txt]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not print the extracted text
        #[arg(short, long)]
        quiet: bool,
    },

    /// Put each image (PNG or JPEG) on its own Letter page
    ImagesToPdf {
        /// Images to convert, in page order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file [default: images-to-pdf.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Typeset plain text into a PDF
    TextToPdf {
        /// Text to typeset
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file instead ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file [default: text-to-pdf.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render small page previews for choosing pages
    Thumbnails {
        /// PDF file to preview
        path: PathBuf,

        /// Pages to preview; all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = "thumbnails")]
        output_dir: PathBuf,
    },
}
