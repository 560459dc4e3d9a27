//! covercrop CLI - catalogue cover extraction tool

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use covercrop::{
    bind_pdfium, inventory, CropRegion, PageSelection, PdfiumBackend, ScanConfig, ScanEvent,
    Scanner,
};

#[derive(Parser)]
#[command(name = "covercrop")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Crop ISBN-named covers out of a catalogue PDF", long_about = None)]
struct Cli {
    /// Catalogue PDF (scans with default settings)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract covers from every qualifying page
    Scan(ScanArgs),

    /// Show what the scanner sees on a single page
    Inspect {
        /// Catalogue PDF
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (1-indexed)
        #[arg(short, long)]
        page: u32,

        /// JSON config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Password for an encrypted catalogue
        #[arg(long)]
        password: Option<String>,

        /// Directory holding the PDFium shared library
        #[arg(long, value_name = "DIR", env = "PDFIUM_LIB_DIR")]
        pdfium_lib: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the ISBNs that already have a cover in a directory
    Inventory {
        /// Covers directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct ScanArgs {
    /// Catalogue PDF
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// JSON config file (command-line options override it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory receiving every qualifying page
    #[arg(short, long, value_name = "DIR")]
    staging: Option<PathBuf>,

    /// Directory receiving covers with a detected ISBN
    #[arg(long, value_name = "DIR")]
    highres: Option<PathBuf>,

    /// Subject to look for (repeatable)
    #[arg(long = "subject", value_name = "NAME")]
    subjects: Vec<String>,

    /// Keyword to look for (repeatable)
    #[arg(long = "keyword", value_name = "WORD")]
    keywords: Vec<String>,

    /// Cover region as page fractions "left,top,right,bottom"
    #[arg(long, value_name = "L,T,R,B")]
    crop: Option<String>,

    /// Render scale relative to 72 dpi
    #[arg(long)]
    scale: Option<f32>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Password for an encrypted catalogue
    #[arg(long)]
    password: Option<String>,

    /// Directory holding the PDFium shared library
    #[arg(long, value_name = "DIR", env = "PDFIUM_LIB_DIR")]
    pdfium_lib: Option<PathBuf>,

    /// Report what would be written without writing
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl ScanArgs {
    /// Defaults, then the config file, then command-line options.
    fn to_config(&self) -> Result<ScanConfig, Box<dyn std::error::Error>> {
        let mut config = match self.config {
            Some(ref path) => ScanConfig::from_json_file(path)?,
            None => ScanConfig::default(),
        };

        if let Some(ref input) = self.input {
            config = config.with_input(input);
        }
        if let Some(ref dir) = self.staging {
            config = config.with_staging_dir(dir);
        }
        if let Some(ref dir) = self.highres {
            config = config.with_highres_dir(dir);
        }
        if !self.subjects.is_empty() {
            config = config.with_subjects(self.subjects.iter().cloned());
        }
        if !self.keywords.is_empty() {
            config = config.with_keywords(self.keywords.iter().cloned());
        }
        if let Some(ref crop) = self.crop {
            config = config.with_crop(CropRegion::parse(crop)?);
        }
        if let Some(scale) = self.scale {
            config = config.with_scale(scale);
        }
        if let Some(quality) = self.quality {
            config = config.with_jpeg_quality(quality);
        }
        if let Some(ref pages) = self.pages {
            config = config.with_pages(PageSelection::parse(pages)?);
        }
        if let Some(ref password) = self.password {
            config = config.with_password(password);
        }

        Ok(config.with_dry_run(self.dry_run))
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Scan(args)) => cmd_scan(&args),
        Some(Commands::Inspect {
            input,
            page,
            config,
            password,
            pdfium_lib,
            json,
        }) => {
            let config = inspect_config(&input, config.as_deref(), password.as_deref());
            config.and_then(|config| cmd_inspect(config, page, pdfium_lib.as_deref(), json))
        }
        Some(Commands::Inventory { dir, json }) => cmd_inventory(&dir, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: scan if input is provided
            if let Some(input) = cli.input {
                cmd_scan(&ScanArgs {
                    input: Some(input),
                    pdfium_lib: std::env::var_os("PDFIUM_LIB_DIR").map(PathBuf::from),
                    ..Default::default()
                })
            } else {
                println!("{}", "Usage: covercrop <FILE>".yellow());
                println!("       covercrop --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_scan(args: &ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let scanner = Scanner::new(args.to_config()?)?;
    let config = scanner.config();
    log::debug!("Scan configuration: {:?}", config);

    let pdfium = bind_pdfium(args.pdfium_lib.as_deref())?;
    let backend = PdfiumBackend::open(&pdfium, &config.input, config.password.as_deref())?;

    if !args.json {
        println!("{} {}", "Opening".cyan(), config.input.display());
    }

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let summary = scanner.run_with(&backend, |event| match event {
        ScanEvent::ScanStart { page_count } => {
            let selected = (1..=*page_count)
                .filter(|n| config.pages.includes(*n))
                .count();
            pb.set_length(selected as u64);
        }
        ScanEvent::PageSkipped { number } => {
            pb.set_message(format!("page {}", number));
            pb.inc(1);
        }
        ScanEvent::PageMatched {
            number,
            subject,
            keyword,
        } => {
            pb.set_message(format!("page {}: {} {}", number, subject, keyword));
        }
        ScanEvent::ArtifactWritten(artifact) => {
            let name = format!("{}.jpg", artifact.stem);
            if artifact.secondary_path.is_some() {
                pb.println(format!(
                    "{} Page {}: saved & copied {} {}",
                    "✔".green(),
                    artifact.page_number,
                    "→".dimmed(),
                    name
                ));
            } else {
                pb.println(format!(
                    "{} Page {}: no ISBN detected, kept as {}",
                    "⚠".yellow(),
                    artifact.page_number,
                    name
                ));
            }
            pb.inc(1);
        }
    })?;

    pb.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{} {}", "Done!".green().bold(), summary.summary_line());
    if summary.dry_run {
        println!("{}", "(dry run: nothing was written)".dimmed());
    } else {
        println!("  {} {}", "├─ staging:".dimmed(), config.staging_dir.display());
        println!("  {} {}", "└─ highres:".dimmed(), config.highres_dir.display());
    }

    Ok(())
}

/// Configuration for `inspect`: the config file (if any), the input, a dry run,
/// and the password when one was given.
fn inspect_config(
    input: &Path,
    config_path: Option<&Path>,
    password: Option<&str>,
) -> Result<ScanConfig, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    let config = config.with_input(input).with_dry_run(true);
    Ok(match password {
        Some(password) => config.with_password(password),
        None => config,
    })
}

fn cmd_inspect(
    config: ScanConfig,
    page: u32,
    pdfium_lib: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let scanner = Scanner::new(config)?;
    let config = scanner.config();

    let pdfium = bind_pdfium(pdfium_lib)?;
    let backend = PdfiumBackend::open(&pdfium, &config.input, config.password.as_deref())?;
    let report = scanner.inspect_page(&backend, page)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", format!("Page {}", report.page_number).cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:.1} x {:.1} pt", "Size".bold(), report.width, report.height);
    match report.matched {
        Some((ref subject, ref keyword)) => {
            println!("{}: {} ({} / {})", "Qualifies".bold(), "yes".green(), subject, keyword)
        }
        None => println!("{}: {}", "Qualifies".bold(), "no".yellow()),
    }
    println!("{}: {}", "ISBNs".bold(), report.isbns.display_list());
    if let Some(ref planned) = report.planned {
        println!("{}: {}.jpg", "Saved as".bold(), planned.stem);
    }

    println!();
    println!("{}", "Text".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", report.text);

    Ok(())
}

fn cmd_inventory(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let isbns = inventory(dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&isbns)?);
        return Ok(());
    }

    for isbn in &isbns {
        println!("{}", isbn);
    }
    println!(
        "\n{} {} covers in {}",
        "Found".green().bold(),
        isbns.len(),
        dir.display()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "covercrop".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Catalogue cover extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scan_options() {
        let cli = Cli::try_parse_from([
            "covercrop",
            "scan",
            "cat.pdf",
            "--subject",
            "Geography",
            "--subject",
            "History",
            "--crop",
            "0.6,0,1,1",
            "--pages",
            "2-5",
            "--dry-run",
        ])
        .unwrap();

        let Some(Commands::Scan(args)) = cli.command else {
            panic!("expected scan command");
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.input, PathBuf::from("cat.pdf"));
        assert_eq!(config.subjects, vec!["Geography", "History"]);
        assert_eq!(config.keywords, vec!["Coursebook", "Workbook"]);
        assert_eq!(config.crop, CropRegion::new(0.6, 0.0, 1.0, 1.0));
        assert_eq!(config.pages, PageSelection::Range(2..=5));
        assert!(config.dry_run);
    }

    #[test]
    fn test_cli_options_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(&path, r#"{ "staging_dir": "from-file", "scale": 3.0 }"#).unwrap();

        let args = ScanArgs {
            config: Some(path),
            scale: Some(1.0),
            ..Default::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.staging_dir, PathBuf::from("from-file"));
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn test_cli_rejects_bad_crop() {
        let args = ScanArgs {
            crop: Some("1,0,0.5,1".to_string()),
            ..Default::default()
        };
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_cli_inspect_passes_password() {
        let cli = Cli::try_parse_from([
            "covercrop",
            "inspect",
            "cat.pdf",
            "--page",
            "2",
            "--password",
            "secret",
        ])
        .unwrap();

        let Some(Commands::Inspect {
            input,
            page,
            config,
            password,
            ..
        }) = cli.command
        else {
            panic!("expected inspect command");
        };
        assert_eq!(page, 2);
        let config = inspect_config(&input, config.as_deref(), password.as_deref()).unwrap();
        assert_eq!(config.input, PathBuf::from("cat.pdf"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert!(config.dry_run);
    }

    #[test]
    fn test_cli_default_input() {
        let cli = Cli::try_parse_from(["covercrop", "cat.pdf"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("cat.pdf")));
        assert!(cli.command.is_none());
    }
}
