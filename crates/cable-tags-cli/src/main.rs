mod logger;

use anyhow::{Context, Result};
use cable_tags::{BuildControl, BuildProgress, PaperSize, TagOptions};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use logger::CliLogger;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser)]
#[command(
    name = "cable-tags",
    about = "Double-sided triangular cable tags from a cable schedule",
    version
)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a tag PDF from a cable schedule
    Generate {
        /// Input .csv, .xlsx, .xls or .ods file (columns: system, track, cable, length, quantity)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, required_unless_present = "stats_only")]
        output: Option<PathBuf>,

        /// Options file written by `cable-tags config`
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Triangle outline thickness in mm
        #[arg(long)]
        outline_mm: Option<f32>,

        /// Horizontal back-side print offset in mm
        #[arg(long, allow_hyphen_values = true)]
        offset_x_mm: Option<f32>,

        /// Vertical back-side print offset in mm
        #[arg(long, allow_hyphen_values = true)]
        offset_y_mm: Option<f32>,

        /// Triangle height in mm
        #[arg(long)]
        triangle_height_mm: Option<f32>,

        /// Rows per page
        #[arg(long)]
        rows: Option<usize>,

        /// TrueType font to embed
        #[arg(long)]
        font: Option<PathBuf>,

        /// Do not search system font directories
        #[arg(long)]
        no_system_fonts: bool,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Write the default options as JSON
    Config {
        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

/// Command-line values that override the options file
struct Overrides {
    paper: Option<PaperArg>,
    outline_mm: Option<f32>,
    offset_x_mm: Option<f32>,
    offset_y_mm: Option<f32>,
    triangle_height_mm: Option<f32>,
    rows: Option<usize>,
    font: Option<PathBuf>,
    no_system_fonts: bool,
}

impl Overrides {
    fn apply(self, options: &mut TagOptions) {
        if let Some(paper) = self.paper {
            options.paper_size = paper.into();
        }
        if let Some(outline) = self.outline_mm {
            options.outline_thickness_mm = outline;
        }
        if let Some(offset) = self.offset_x_mm {
            options.print_offset_x_mm = offset;
        }
        if let Some(offset) = self.offset_y_mm {
            options.print_offset_y_mm = offset;
        }
        if let Some(height) = self.triangle_height_mm {
            options.triangle_height_mm = height;
        }
        if let Some(rows) = self.rows {
            options.rows = rows;
        }
        if self.font.is_some() {
            options.font.font_path = self.font;
        }
        if self.no_system_fonts {
            options.font.use_system_fonts = false;
        }
    }
}

async fn generate(
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    overrides: Overrides,
    stats_only: bool,
) -> Result<()> {
    let mut options = match &config {
        Some(path) => TagOptions::load(path)
            .await
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => TagOptions::default(),
    };
    overrides.apply(&mut options);
    options.validate()?;

    let loaded = cable_tags::load_rows(&input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let stats = cable_tags::calculate_statistics(&loaded.rows, &options)?;
    println!("Tag Statistics:");
    println!("  Source rows: {}", stats.source_rows);
    println!("  Tags: {}", stats.tag_instances);
    println!("  Tags per page: {}", stats.tags_per_page);
    println!("  Page pairs: {}", stats.page_pairs);
    println!("  Output pages: {}", stats.output_pages);
    println!("  Free slots on last page: {}", stats.free_slots_on_last_page);
    if !loaded.warnings.is_empty() {
        println!("  Warnings: {}", loaded.warnings.len());
    }

    if stats_only {
        return Ok(());
    }
    let output = output.context("--output is required unless --stats-only is given")?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling build");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<BuildProgress>();
    let reporter = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            log::info!(
                "Rendered page side {}/{}",
                progress.sides_done,
                progress.sides_total
            );
        }
    });

    let control = BuildControl::new()
        .with_progress(move |progress| {
            let _ = tx.send(progress);
        })
        .with_cancel_flag(cancel);

    let tags = loaded.tags();
    cable_tags::generate_pdf(&tags, &options, &output, control).await?;
    reporter.await?;

    println!(
        "Generated {} tags on {} pages → {}",
        tags.len(),
        stats.output_pages,
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet)).init()?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            paper,
            outline_mm,
            offset_x_mm,
            offset_y_mm,
            triangle_height_mm,
            rows,
            font,
            no_system_fonts,
            stats_only,
        } => {
            let overrides = Overrides {
                paper,
                outline_mm,
                offset_x_mm,
                offset_y_mm,
                triangle_height_mm,
                rows,
                font,
                no_system_fonts,
            };
            generate(input, output, config, overrides, stats_only).await?;
        }

        Commands::Config { output } => {
            TagOptions::default().save(&output).await?;
            println!("Default options → {}", output.display());
        }
    }

    Ok(())
}
