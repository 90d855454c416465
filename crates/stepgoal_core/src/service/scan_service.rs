//! Scanner result routing.
//!
//! # Responsibility
//! - Turn scanner results into the two display strings shown on screen.
//! - Ask the host to open URL codes in a browser.
//!
//! # Invariants
//! - Codes are processed in order; the last displayable one wins.
//! - URL codes with a missing or blank URL are skipped entirely.
//! - A missing browser handler is logged and never surfaced to the caller.

use crate::model::scan::{ScanDisplay, ScannedCode};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const URL_LABEL: &str = "URL";
pub const CONTACT_LABEL: &str = "Contact";
pub const OTHER_LABEL: &str = "Other";

/// Failure to hand a URL to the system browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// No installed application handles the URL.
    NoHandler,
    Failed(String),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHandler => write!(f, "no activity found to handle URL"),
            Self::Failed(message) => write!(f, "failed to open URL: {message}"),
        }
    }
}

impl Error for OpenError {}

/// Host hook that opens a URL in the default browser.
pub trait UrlOpener {
    fn open(&mut self, url: &str) -> Result<(), OpenError>;
}

/// Opener for hosts without a browser; every attempt reports `NoHandler`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrowser;

impl UrlOpener for NoBrowser {
    fn open(&mut self, _url: &str) -> Result<(), OpenError> {
        Err(OpenError::NoHandler)
    }
}

/// Outcome of routing one batch of scanner results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub display: Option<ScanDisplay>,
    /// URLs whose open attempt succeeded.
    pub opened_urls: Vec<String>,
}

/// Classifies one code; `None` for URL codes without a usable URL.
pub fn classify(code: &ScannedCode) -> Option<ScanDisplay> {
    match code {
        ScannedCode::Url { url } => url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| ScanDisplay::new(URL_LABEL, url)),
        ScannedCode::ContactInfo { contact } => Some(ScanDisplay::new(
            CONTACT_LABEL,
            contact
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        )),
        ScannedCode::Other { raw_value } => Some(ScanDisplay::new(
            OTHER_LABEL,
            raw_value.clone().unwrap_or_default(),
        )),
    }
}

/// Routes a batch of codes, opening every usable URL through `opener`.
pub fn route_scan_results(codes: &[ScannedCode], opener: &mut dyn UrlOpener) -> ScanReport {
    let mut report = ScanReport::default();

    for code in codes {
        let Some(display) = classify(code) else {
            info!("event=scan_route module=scan status=skipped reason=blank_url");
            continue;
        };

        if matches!(code, ScannedCode::Url { .. }) {
            match opener.open(display.content.as_str()) {
                Ok(()) => report.opened_urls.push(display.content.clone()),
                Err(err) => error!(
                    "event=url_open module=scan status=error error_code=url_open_failed error={}",
                    err
                ),
            }
        }

        info!(
            "event=scan_route module=scan status=ok type={}",
            display.type_label
        );
        report.display = Some(display);
    }

    report
}
