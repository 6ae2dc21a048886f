//! Batch processing of a company name list.
//!
//! Companies are processed strictly one at a time: search, resolve,
//! assemble, append. A failure on one company never aborts the run; it is
//! counted and the loop moves on. After every company the accumulated
//! records are rewritten to the progress CSV so a crash mid-run loses at
//! most the company in flight.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::assemble::RecordAssembler;
use crate::company::CompanyRecord;
use crate::config::AppConfig;
use crate::export;
use crate::matcher::{MatchOutcome, ScoredCandidate};
use crate::page::PageSource;
use crate::search;

/// Per-run tallies. `processed` counts every input line that reached the
/// pipeline; the other three partition it.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<CompanyRecord>,
    pub processed: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Read a company list: one name per line, blank lines and `#` comments
/// ignored, order preserved.
pub fn read_company_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read input file: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Run one company through search, resolution, and assembly.
///
/// `disambiguate` is consulted on an ambiguous match and returns the
/// chosen candidate URL, or `None` to skip the company. `Ok(None)` covers
/// every skip; `Err` is reserved for transport failures.
pub fn process_company<S, F>(
    source: &mut S,
    config: &AppConfig,
    assembler: &RecordAssembler,
    query: &str,
    disambiguate: &mut F,
) -> Result<Option<CompanyRecord>>
where
    S: PageSource,
    F: FnMut(&str, &[ScoredCandidate]) -> Option<String>,
{
    let outcome = search::search_company(source, &config.site, &config.matcher, query)?;

    let url = match outcome {
        MatchOutcome::Matched(best) => {
            info!(
                "Matched '{}' to '{}' (score {:.2})",
                query, best.candidate.name, best.score
            );
            best.candidate.url
        }
        MatchOutcome::Ambiguous(candidates) => match disambiguate(query, &candidates) {
            Some(url) => url,
            None => {
                info!("Skipping '{}' (no candidate accepted)", query);
                return Ok(None);
            }
        },
        MatchOutcome::NoResults => {
            warn!("No search results for '{}'", query);
            return Ok(None);
        }
    };

    Ok(assembler.assemble(source, &url)?)
}

/// Process every query in order, saving progress after each company.
pub fn run_batch<S, F>(
    source: &mut S,
    config: &AppConfig,
    assembler: &RecordAssembler,
    queries: &[String],
    disambiguate: &mut F,
) -> BatchReport
where
    S: PageSource,
    F: FnMut(&str, &[ScoredCandidate]) -> Option<String>,
{
    let progress = ProgressBar::new(queries.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut report = BatchReport::default();

    for query in queries {
        progress.set_message(query.clone());
        report.processed += 1;

        match process_company(source, config, assembler, query, disambiguate) {
            Ok(Some(record)) => {
                report.records.push(record);
                report.succeeded += 1;
            }
            Ok(None) => {
                report.skipped += 1;
            }
            Err(e) => {
                warn!("Failed to process '{}': {:#}", query, e);
                report.failed += 1;
            }
        }

        // A failed progress save must not kill the run.
        if let Err(e) = export::export_csv(&report.records, &config.output.progress_csv_path) {
            warn!("Failed to save progress: {:#}", e);
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(
        "Batch complete: {} processed, {} succeeded, {} skipped, {} failed",
        report.processed, report.succeeded, report.skipped, report.failed
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::currency::CurrencyParser;
    use crate::page::{Page, PageError};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    struct FakeSource {
        pages: HashMap<String, String>,
        current: String,
    }

    impl PageSource for FakeSource {
        fn goto(&mut self, url: &str) -> Result<Page, PageError> {
            match self.pages.get(url) {
                Some(html) => {
                    self.current = url.to_string();
                    Ok(Page::parse(url, html))
                }
                None => Err(PageError::Navigation {
                    url: url.to_string(),
                    reason: "unreachable".to_string(),
                }),
            }
        }

        fn current_url(&self) -> &str {
            &self.current
        }
    }

    fn test_config(dir: &Path) -> AppConfig {
        let mut config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.site.base_url = "https://companies.example".to_string();
        config.output.progress_csv_path = dir
            .join("progress.csv")
            .to_str()
            .unwrap()
            .to_string();
        config
    }

    fn test_assembler(config: &AppConfig) -> RecordAssembler {
        RecordAssembler::new(
            config.site.financials_segment.clone(),
            CurrencyParser::new(config.currency.usd_rates.clone()),
        )
    }

    /// A minimal fake site with one searchable company.
    fn acme_site() -> FakeSource {
        let mut pages = HashMap::new();
        pages.insert(
            "https://companies.example/textsearch?q=Acme".to_string(),
            r#"<search-results-section>
                 <mat-card><a href="/organization/acme"><span class="row-name">Acme</span></a></mat-card>
               </search-results-section>"#
                .to_string(),
        );
        pages.insert(
            "https://companies.example/organization/acme".to_string(),
            r#"<h1 class="profile-name">Acme</h1>"#.to_string(),
        );
        pages.insert(
            "https://companies.example/organization/acme/company_financials".to_string(),
            "<div></div>".to_string(),
        );
        FakeSource {
            pages,
            current: String::new(),
        }
    }

    fn no_choice(_query: &str, _candidates: &[ScoredCandidate]) -> Option<String> {
        None
    }

    #[test]
    fn test_read_company_list_skips_blanks_and_comments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Acme Corp").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "# commented out").unwrap();
        writeln!(file, "  Globex  ").unwrap();

        let names = read_company_list(file.path()).unwrap();
        assert_eq!(names, vec!["Acme Corp", "Globex"]);
    }

    #[test]
    fn test_read_company_list_missing_file_is_error() {
        assert!(read_company_list(Path::new("/nonexistent/list.txt")).is_err());
    }

    #[test]
    fn test_process_company_matched() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let assembler = test_assembler(&config);
        let mut source = acme_site();

        let record =
            process_company(&mut source, &config, &assembler, "Acme", &mut no_choice)
                .unwrap()
                .unwrap();
        assert_eq!(record.name, "Acme");
    }

    #[test]
    fn test_process_company_no_results_is_skip() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let assembler = test_assembler(&config);
        let mut source = acme_site();
        source.pages.insert(
            "https://companies.example/textsearch?q=Nothing".to_string(),
            "<div>no results</div>".to_string(),
        );

        let result =
            process_company(&mut source, &config, &assembler, "Nothing", &mut no_choice)
                .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_process_company_ambiguous_uses_callback_choice() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let assembler = test_assembler(&config);
        let mut source = acme_site();
        // The only result scores far below the threshold for this query.
        source.pages.insert(
            "https://companies.example/textsearch?q=Zeta+Industrial".to_string(),
            r#"<search-results-section>
                 <mat-card><a href="/organization/acme"><span class="row-name">Acme</span></a></mat-card>
               </search-results-section>"#
                .to_string(),
        );

        let mut pick_first = |_query: &str, candidates: &[ScoredCandidate]| {
            Some(candidates[0].candidate.url.clone())
        };
        let record = process_company(
            &mut source,
            &config,
            &assembler,
            "Zeta Industrial",
            &mut pick_first,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.name, "Acme");
    }

    #[test]
    fn test_run_batch_counts_and_saves_progress() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let assembler = test_assembler(&config);
        let mut source = acme_site();

        // "Missing" has no search page, so it fails on transport.
        let queries = vec!["Acme".to_string(), "Missing".to_string()];
        let report = run_batch(&mut source, &config, &assembler, &queries, &mut no_choice);

        assert_eq!(report.processed, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.records.len(), 1);

        let progress = fs::read_to_string(&config.output.progress_csv_path).unwrap();
        assert!(progress.contains("Acme"));
    }
}
