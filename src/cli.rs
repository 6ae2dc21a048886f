use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "companyscout")]
#[command(about = "Extract company profiles from a company database site into CSV")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/companyscout.toml
    #[arg(long)]
    pub init: bool,

    /// Single company name to look up (shorthand for an interactive session
    /// with one entry)
    #[arg(short, long)]
    pub company: Option<String>,

    /// Path to a text file with one company name per line (batch mode)
    #[arg(long, value_name = "FILE")]
    pub input_file: Option<String>,

    /// Output CSV file (overrides output.csv_path from config)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Verbose logging (use -v for INFO, -vv for DEBUG with page details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Check if running in batch mode (--input-file provided)
    pub fn is_batch_mode(&self) -> bool {
        self.input_file.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.company.is_some() && self.is_batch_mode() {
            return Err("--company and --input-file are mutually exclusive".to_string());
        }

        if let Some(company) = &self.company {
            if company.trim().is_empty() {
                return Err("Company name cannot be empty".to_string());
            }
        }

        if let Some(output) = &self.output {
            if output.trim().is_empty() {
                return Err("Output path cannot be empty".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_and_single_company_conflict() {
        let cli = Cli::parse_from(["companyscout", "--company", "Acme", "--input-file", "l.txt"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_single_company_is_valid() {
        let cli = Cli::parse_from(["companyscout", "--company", "Acme"]);
        assert!(cli.validate().is_ok());
        assert!(!cli.is_batch_mode());
    }

    #[test]
    fn test_no_arguments_is_valid_interactive_mode() {
        let cli = Cli::parse_from(["companyscout"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_empty_company_rejected() {
        let cli = Cli::parse_from(["companyscout", "--company", "  "]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["companyscout", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
