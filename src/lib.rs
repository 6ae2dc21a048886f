pub mod assemble;
pub mod auth;
pub mod batch;
pub mod cli;
pub mod company;
pub mod config;
pub mod currency;
pub mod export;
pub mod extract;
pub mod matcher;
pub mod page;
pub mod search;

pub use company::CompanyRecord;

/// Create a headless Chrome browser instance.
/// Automatically disables sandbox when running inside a container
/// (detected via /.dockerenv or COMPANYSCOUT_CONTAINER env var).
pub fn create_browser() -> anyhow::Result<headless_chrome::Browser> {
    let is_container = std::env::var("COMPANYSCOUT_CONTAINER").is_ok()
        || std::path::Path::new("/.dockerenv").exists();

    if is_container {
        let options = headless_chrome::LaunchOptions::default_builder()
            .sandbox(false)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build Chrome launch options: {}", e))?;
        headless_chrome::Browser::new(options)
            .map_err(|e| anyhow::anyhow!("Failed to launch headless Chrome (container mode): {}", e))
    } else {
        headless_chrome::Browser::default()
            .map_err(|e| anyhow::anyhow!("Failed to launch headless Chrome: {}", e))
    }
}
