use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use companyscout::assemble::RecordAssembler;
use companyscout::batch::{self, BatchReport};
use companyscout::cli::Cli;
use companyscout::config::{self, AppConfig, ConfigError, Credentials};
use companyscout::currency::CurrencyParser;
use companyscout::matcher::ScoredCandidate;
use companyscout::page::{ChromeFetcher, PageSource};
use companyscout::{auth, create_browser, export};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle --init flag first (before any other processing)
    if cli.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run companyscout again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = cli.validate() {
        eprintln!("❌ Invalid arguments: {}", e);
        std::process::exit(1);
    }

    init_logging(cli.verbose);

    // Load configuration
    let app_config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config() {
                Ok(Some(created_path)) => {
                    println!("✅ Created default configuration file at: {}", created_path.display());
                    println!("   Edit this file to customize settings, then run companyscout again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("❌ Configuration file not found at: {}", path.display());
                    eprintln!("   Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("❌ Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Credentials come from the environment (or a .env file); there is no
    // anonymous mode, so missing credentials are fatal before any browser
    // work starts.
    dotenvy::dotenv().ok();
    let credentials = match Credentials::from_env() {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!(
                "   Set {} and {} (directly or via a .env file).",
                config::EMAIL_ENV_VAR,
                config::PASSWORD_ENV_VAR
            );
            std::process::exit(1);
        }
    };

    let browser = create_browser()?;
    let mut fetcher = ChromeFetcher::new(
        &browser,
        app_config.browser.page_load_timeout(),
        app_config.browser.render_wait(),
    )?;

    if let Err(e) = auth::login(&mut fetcher, &app_config.site.base_url, &credentials) {
        eprintln!("❌ Login failed: {}", e);
        std::process::exit(1);
    }

    let assembler = RecordAssembler::new(
        app_config.site.financials_segment.clone(),
        CurrencyParser::new(app_config.currency.usd_rates.clone()),
    );

    let report = if let Some(input_file) = &cli.input_file {
        let queries = batch::read_company_list(Path::new(input_file))?;
        if queries.is_empty() {
            eprintln!("❌ No company names found in {}", input_file);
            std::process::exit(1);
        }
        println!("Processing {} companies from {}", queries.len(), input_file);
        batch::run_batch(
            &mut fetcher,
            &app_config,
            &assembler,
            &queries,
            &mut prompt_disambiguation,
        )
    } else if let Some(company) = &cli.company {
        batch::run_batch(
            &mut fetcher,
            &app_config,
            &assembler,
            std::slice::from_ref(company),
            &mut prompt_disambiguation,
        )
    } else {
        match prompt_mode()? {
            Mode::SingleNames => run_interactive(&mut fetcher, &app_config, &assembler)?,
            Mode::BatchFile(path) => {
                let queries = batch::read_company_list(Path::new(&path))?;
                if queries.is_empty() {
                    eprintln!("❌ No company names found in {}", path);
                    std::process::exit(1);
                }
                println!("Processing {} companies from {}", queries.len(), path);
                batch::run_batch(
                    &mut fetcher,
                    &app_config,
                    &assembler,
                    &queries,
                    &mut prompt_disambiguation,
                )
            }
        }
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| app_config.output.csv_path.clone());
    export::export_csv(&report.records, &output_path)?;

    println!();
    println!(
        "Done: {} processed, {} succeeded, {} skipped, {} failed",
        report.processed, report.succeeded, report.skipped, report.failed
    );
    println!("Results saved to: {}", output_path);

    Ok(())
}

/// Map -v counts onto a tracing filter; RUST_LOG wins when set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "companyscout=info",
        _ => "companyscout=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

enum Mode {
    SingleNames,
    BatchFile(String),
}

/// Ask the operator how to run when no CLI flag decided it. Without a
/// terminal there is nothing to ask; default to the single-name loop,
/// which ends immediately on EOF.
fn prompt_mode() -> Result<Mode> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(Mode::SingleNames);
    }

    println!("Select mode:");
    println!("  [1] Enter company names one at a time");
    println!("  [2] Process a file of company names");
    print!("Mode [1]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim() == "2" {
        print!("Path to company list file: ");
        io::stdout().flush()?;
        let mut path = String::new();
        io::stdin().read_line(&mut path)?;
        let path = path.trim().to_string();
        if path.is_empty() {
            eprintln!("❌ No file path given");
            std::process::exit(1);
        }
        return Ok(Mode::BatchFile(path));
    }

    Ok(Mode::SingleNames)
}

/// Read company names from the terminal until the operator quits.
fn run_interactive<S: PageSource>(
    source: &mut S,
    config: &AppConfig,
    assembler: &RecordAssembler,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    println!("Enter company names one at a time ('quit' to finish).");
    loop {
        print!("\nCompany name: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("q") {
            break;
        }

        report.processed += 1;
        match batch::process_company(source, config, assembler, query, &mut prompt_disambiguation)
        {
            Ok(Some(record)) => {
                println!("✅ Extracted '{}'", record.name);
                report.records.push(record);
                report.succeeded += 1;
            }
            Ok(None) => {
                println!("⚠️  Skipped '{}'", query);
                report.skipped += 1;
            }
            Err(e) => {
                eprintln!("❌ Failed on '{}': {:#}", query, e);
                report.failed += 1;
            }
        }

        if let Err(e) = export::export_csv(&report.records, &config.output.progress_csv_path) {
            eprintln!("⚠️  Failed to save progress: {:#}", e);
        }
    }

    Ok(report)
}

/// Ask the operator to pick among low-scoring candidates. Without a
/// terminal there is nobody to ask, so ambiguous companies are skipped.
fn prompt_disambiguation(query: &str, candidates: &[ScoredCandidate]) -> Option<String> {
    if !atty::is(atty::Stream::Stdin) {
        return None;
    }

    println!("\nNo confident match for '{}'. Candidates:", query);
    for (i, scored) in candidates.iter().enumerate() {
        println!(
            "  [{}] {} (similarity {:.0}%)",
            i + 1,
            scored.candidate.name,
            scored.score * 100.0
        );
    }
    print!("Select a candidate [1-{}] or 's' to skip: ", candidates.len());
    if io::stdout().flush().is_err() {
        return None;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return None;
    }
    let input = input.trim();
    if input.eq_ignore_ascii_case("s") || input.is_empty() {
        return None;
    }

    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=candidates.len()).contains(n))
        .map(|n| candidates[n - 1].candidate.url.clone())
}
