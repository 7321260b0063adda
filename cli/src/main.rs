//! folio CLI - legal document structuring tool

mod remote;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use folio::export::export_pages_with_progress;
use folio::paginate::{count_breaks, paginate_manual};
use folio::{
    load_file, paginate, save_file, AssistService, Direction, Editor, HtmlBookExporter,
    PageSize, PageSurface, PaginateOptions, PlaceholderService, TextMetricsMeasurer,
};

use remote::HttpAssistService;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Outline, reorder and paginate legal documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the document outline
    Outline {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Move a section up or down
    #[command(alias = "mv")]
    Move {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Outline index of the section to move (0-based)
        #[arg(short, long)]
        index: usize,

        /// Direction to move the section
        #[arg(short, long, value_enum)]
        direction: MoveDirection,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Split the document into pages
    Paginate {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Usable content height per page in pixels
        #[arg(long, value_name = "PX")]
        page_height: Option<f32>,

        /// Page format
        #[arg(long, value_enum, default_value = "a4")]
        page_size: PageFormat,

        /// Only split at manual page breaks
        #[arg(long)]
        manual_only: bool,

        /// Measure blocks in parallel
        #[arg(long)]
        parallel: bool,

        /// Print pages as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the paginated document as a standalone HTML page book
    Export {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <FILE>_pages.html)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page format
        #[arg(long, value_enum, default_value = "a4")]
        page_size: PageFormat,
    },

    /// Show document information
    Info {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Insert a manual page break
    Break {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Position of the break (a top-level block boundary)
        #[arg(long, value_name = "POS")]
        at: usize,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Insert a built-in clause template
    Template {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Template name (e.g. "termination", "governing-law")
        #[arg(value_name = "NAME")]
        name: String,

        /// Insert position (end of document if not specified)
        #[arg(long, value_name = "POS")]
        at: Option<usize>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Summarize the document
    Summarize {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Assistance server URL (local placeholder if not specified)
        #[arg(long, env = "FOLIO_SERVER", value_name = "URL")]
        server: Option<String>,
    },

    /// Check the document for consistency issues
    Check {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Assistance server URL (local placeholder if not specified)
        #[arg(long, env = "FOLIO_SERVER", value_name = "URL")]
        server: Option<String>,
    },

    /// Check whether a clause occurs in the document
    FindClause {
        /// Input document (.html or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Clause text to look for
        #[arg(value_name = "CLAUSE")]
        clause: String,

        /// Assistance server URL (local placeholder if not specified)
        #[arg(long, env = "FOLIO_SERVER", value_name = "URL")]
        server: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveDirection {
    /// Swap with the previous section
    Up,
    /// Swap with the next section
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PageFormat {
    /// A4 portrait at 96 dpi
    A4,
    /// US Letter portrait at 96 dpi
    Letter,
}

impl From<PageFormat> for PageSize {
    fn from(format: PageFormat) -> Self {
        match format {
            PageFormat::A4 => PageSize::A4,
            PageFormat::Letter => PageSize::LETTER,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Outline { input } => cmd_outline(&input),
        Commands::Move {
            input,
            index,
            direction,
            output,
        } => cmd_move(&input, index, direction.into(), output.as_deref()),
        Commands::Paginate {
            input,
            page_height,
            page_size,
            manual_only,
            parallel,
            json,
        } => cmd_paginate(
            &input,
            page_height,
            page_size.into(),
            manual_only,
            parallel,
            json,
        ),
        Commands::Export {
            input,
            output,
            page_size,
        } => cmd_export(&input, output.as_deref(), page_size.into()),
        Commands::Info { input } => cmd_info(&input),
        Commands::Break { input, at, output } => cmd_break(&input, at, output.as_deref()),
        Commands::Template {
            input,
            name,
            at,
            output,
        } => cmd_template(&input, &name, at, output.as_deref()),
        Commands::Summarize { input, server } => cmd_summarize(&input, server.as_deref()),
        Commands::Check { input, server } => cmd_check(&input, server.as_deref()),
        Commands::FindClause {
            input,
            clause,
            server,
        } => cmd_find_clause(&input, &clause, server.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn open_editor(input: &Path) -> Result<Editor, Box<dyn std::error::Error>> {
    Ok(Editor::new(load_file(input)?))
}

/// Save to `output` by extension, or print the HTML content stream.
fn write_result(editor: Editor, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            save_file(editor.tree(), path)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        None => println!("{}", editor.serialize()),
    }
    Ok(())
}

fn service_for(server: Option<&str>) -> Result<Box<dyn AssistService>, Box<dyn std::error::Error>> {
    match server {
        Some(url) => {
            log::debug!("Using assistance server at {}", url);
            Ok(Box::new(HttpAssistService::new(url)?))
        }
        None => Ok(Box::new(PlaceholderService::new())),
    }
}

fn cmd_outline(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let outline = editor.outline();

    if outline.is_empty() {
        println!("{}", "No headings found".yellow());
        return Ok(());
    }

    println!("{}", "Outline".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (index, entry) in outline.iter().enumerate() {
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        println!(
            "{:>3} {}{} {}",
            index.to_string().dimmed(),
            indent,
            entry.display_text(),
            format!("#{}", entry.id).dimmed()
        );
    }

    Ok(())
}

fn cmd_move(
    input: &Path,
    index: usize,
    direction: Direction,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input)?;
    let title = editor
        .outline()
        .get(index)
        .map(|e| e.display_text().to_string())
        .unwrap_or_default();

    editor.move_section(index, direction)?;
    eprintln!("{} \"{}\" {}", "Moved".green(), title, direction);

    write_result(editor, output)
}

fn cmd_paginate(
    input: &Path,
    page_height: Option<f32>,
    page_size: PageSize,
    manual_only: bool,
    parallel: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let html = editor.serialize();

    let pages = if manual_only {
        paginate_manual(&html)
    } else {
        let mut options = PaginateOptions::new()
            .with_page_size(page_size)
            .with_parallel(parallel);
        if let Some(height) = page_height {
            options = options.with_capacity(height);
        }
        let measurer = TextMetricsMeasurer::for_page(&page_size);
        paginate(&html, Some(&measurer), &options)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    for page in &pages {
        let height = page
            .height
            .map(|h| format!("{:.0}px", h))
            .unwrap_or_else(|| "unmeasured".to_string());
        println!(
            "{} {:>3}  {} {}  {} {}  {}",
            "Page".bold(),
            page.number,
            "segment".dimmed(),
            page.segment,
            "blocks".dimmed(),
            page.block_count,
            height.dimmed()
        );
    }
    println!("\n{} {} pages", "Total:".green().bold(), pages.len());

    Ok(())
}

fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    page_size: PageSize,
) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let output = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_pages.html", stem))
    });

    let options = PaginateOptions::new().with_page_size(page_size);
    let measurer = TextMetricsMeasurer::for_page(&page_size);
    let pages = paginate(&editor.serialize(), Some(&measurer), &options);
    let title = editor.tree().metadata.display_title();
    let surfaces = PageSurface::from_pages(&pages, &page_size, title);

    let pb = ProgressBar::new(surfaces.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Exporting pages...");

    let mut out = BufWriter::new(File::create(&output)?);
    let mut exporter = HtmlBookExporter::new().with_title(title);
    let written = export_pages_with_progress(&mut exporter, &surfaces, &mut out, |_| pb.inc(1))?;
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} pages to {}",
        "Exported".green().bold(),
        written,
        output.display()
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let doc = editor.tree();
    let html = editor.serialize();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Title".bold(), doc.metadata.display_title());
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    println!("{}: {}", "Blocks".bold(), doc.block_count());
    println!("{}: {}", "Content size".bold(), doc.content_size());
    println!("{}: {}", "Headings".bold(), editor.outline().len());
    println!("{}: {}", "Sections".bold(), editor.sections().len());
    println!("{}: {}", "Page breaks".bold(), count_breaks(&html));
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    let measurer = TextMetricsMeasurer::default();
    let pages = paginate(&html, Some(&measurer), &PaginateOptions::default());
    println!("{}: {}", "Pages (A4)".bold(), pages.len());

    Ok(())
}

fn cmd_break(input: &Path, at: usize, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input)?;
    editor.insert_page_break(at)?;
    eprintln!("{} page break at {}", "Inserted".green(), at);

    write_result(editor, output)
}

fn cmd_template(
    input: &Path,
    name: &str,
    at: Option<usize>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = open_editor(input)?;
    let template = folio::templates::find(name)?;
    let pos = at.unwrap_or_else(|| editor.tree().content_size());

    editor.insert_template(template.name, pos)?;
    eprintln!("{} {} at {}", "Inserted".green(), template, pos);

    write_result(editor, output)
}

fn cmd_summarize(input: &Path, server: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let service = service_for(server)?;

    let summary = editor.consult(service.as_ref(), |svc, text| svc.summarize(text))?;

    println!("{}", "Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", summary);

    Ok(())
}

fn cmd_check(input: &Path, server: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let service = service_for(server)?;

    let issues = editor.consult(service.as_ref(), |svc, text| svc.check_consistency(text))?;

    if issues.is_empty() {
        println!("{}", "No consistency issues found".green());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{} {} issues", "Found".yellow().bold(), issues.len())?;
    for issue in &issues {
        writeln!(out, "  {} {}", "•".yellow(), issue)?;
    }

    Ok(())
}

fn cmd_find_clause(
    input: &Path,
    clause: &str,
    server: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let editor = open_editor(input)?;
    let service = service_for(server)?;

    let lookup = editor.consult(service.as_ref(), |svc, text| svc.find_clause(text, clause))?;

    if lookup.exists {
        println!("{} {}", "Found:".green().bold(), lookup.snippet);
    } else {
        println!("{}", "Clause not found".yellow());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "folio".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Legal document structuring tool");
    println!();
    println!(
        "Templates: {}",
        folio::templates::names().collect::<Vec<_>>().join(", ").dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CONTRACT: &str = "<h1>Intro</h1><p>text</p><h1>Terms</h1><p>text2</p>";

    fn write_contract(dir: &Path) -> PathBuf {
        let path = dir.join("lease.html");
        std::fs::write(&path, CONTRACT).unwrap();
        path
    }

    #[test]
    fn test_move_writes_output() {
        let dir = tempdir().unwrap();
        let input = write_contract(dir.path());
        let output = dir.path().join("moved.html");

        cmd_move(&input, 0, Direction::Down, Some(&output)).unwrap();

        let saved = std::fs::read_to_string(&output).unwrap();
        assert_eq!(saved, "<h1>Terms</h1><p>text2</p><h1>Intro</h1><p>text</p>");
    }

    #[test]
    fn test_move_out_of_range_fails() {
        let dir = tempdir().unwrap();
        let input = write_contract(dir.path());
        let output = dir.path().join("moved.html");

        assert!(cmd_move(&input, 1, Direction::Down, Some(&output)).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_template_saved_as_json() {
        let dir = tempdir().unwrap();
        let input = write_contract(dir.path());
        let output = dir.path().join("lease.json");

        cmd_template(&input, "termination", None, Some(&output)).unwrap();

        let editor = Editor::new(load_file(&output).unwrap());
        assert_eq!(
            editor.outline().last().map(|e| e.text.as_str()),
            Some("Termination")
        );
    }

    #[test]
    fn test_export_writes_page_book() {
        let dir = tempdir().unwrap();
        let input = write_contract(dir.path());
        cmd_break(&input, 13, Some(&input)).unwrap();
        let output = dir.path().join("book.html");

        cmd_export(&input, Some(&output), PageSize::A4).unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert_eq!(html.matches("<section class=\"page\"").count(), 2);
        assert!(html.contains("<title>lease</title>"));
    }
}
