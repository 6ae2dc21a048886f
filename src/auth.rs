//! Site login.
//!
//! The site gates company pages behind an account, so a session has to be
//! established on the shared tab before any search runs. Credentials come
//! from the environment; when the automatic form submission is rejected an
//! interactive operator gets one chance to finish logging in by hand.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Credentials;
use crate::page::{ChromeFetcher, PageError, PageSource};

const EMAIL_SELECTOR: &str = "input[type='email']";
const PASSWORD_SELECTOR: &str = "input[type='password']";
const SUBMIT_SELECTOR: &str = "button[type='submit']";

/// How long to wait for the post-submit redirect to settle.
const REDIRECT_WAIT: Duration = Duration::from_secs(4);

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Couldn't find {0} on the login form")]
    FormElement(&'static str),

    #[error("Login was rejected; check credentials")]
    Rejected,

    #[error("Terminal error during manual login: {0}")]
    Io(#[from] io::Error),
}

/// Log in to the site on the fetcher's tab.
///
/// Navigates to the login page, fills the form, submits, and verifies the
/// redirect left the login page behind. On rejection an interactive
/// operator may complete the login manually; non-interactive runs fail.
pub fn login(
    fetcher: &mut ChromeFetcher,
    base_url: &str,
    credentials: &Credentials,
) -> Result<(), AuthError> {
    let login_url = format!("{}/login", base_url.trim_end_matches('/'));
    fetcher.goto(&login_url)?;

    info!("Submitting login form");
    let tab = fetcher.tab();

    tab.wait_for_element(EMAIL_SELECTOR)
        .map_err(|_| AuthError::FormElement("email field"))?
        .type_into(&credentials.email)
        .map_err(|e| PageError::Browser(format!("typing email failed: {}", e)))?;

    tab.wait_for_element(PASSWORD_SELECTOR)
        .map_err(|_| AuthError::FormElement("password field"))?
        .type_into(&credentials.password)
        .map_err(|e| PageError::Browser(format!("typing password failed: {}", e)))?;

    tab.wait_for_element(SUBMIT_SELECTOR)
        .map_err(|_| AuthError::FormElement("submit button"))?
        .click()
        .map_err(|e| PageError::Browser(format!("clicking submit failed: {}", e)))?;

    thread::sleep(REDIRECT_WAIT);

    // Still on the login page means the form bounced.
    if fetcher.tab().get_url().contains("/login") {
        warn!("Login form was not accepted");
        return manual_fallback(fetcher);
    }

    info!("Logged in");
    Ok(())
}

/// Let an interactive operator finish the login by hand. Non-interactive
/// runs have nobody to ask, so rejection is final.
fn manual_fallback(fetcher: &mut ChromeFetcher) -> Result<(), AuthError> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(AuthError::Rejected);
    }

    println!("Automatic login failed. Complete the login in the browser,");
    print!("then press Enter to continue... ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    if fetcher.tab().get_url().contains("/login") {
        return Err(AuthError::Rejected);
    }

    info!("Manual login confirmed");
    Ok(())
}
