//! Summary Reporter seam and the SVG snapshot renderer.
//!
//! A reporter receives the post-commit statistics of a refresh cycle and
//! keeps an artifact that the query API serves later. A failed render never
//! affects the data that was just committed.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::store::RankedCountry;
use crate::UtcDateTime;

/// Number of countries listed in a summary.
pub const TOP_COUNTRIES: usize = 5;

/// Input handed to a [`SummaryReporter`] after a successful commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub total_countries: u64,
    /// Highest estimated GDPs first, at most [`TOP_COUNTRIES`] entries.
    pub top_countries: Vec<RankedCountry>,
    pub refreshed_at: UtcDateTime,
}

/// A rendered summary ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryArtifact {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("summary report failed: {0}")]
pub struct ReportError(pub String);

impl From<io::Error> for ReportError {
    fn from(error: io::Error) -> Self {
        Self(error.to_string())
    }
}

pub trait SummaryReporter: Send + Sync {
    fn render(&self, summary: &RefreshSummary) -> Result<(), ReportError>;

    /// The last rendered artifact, `None` if nothing was rendered yet.
    fn artifact(&self) -> Result<Option<SummaryArtifact>, ReportError>;
}

/// Renders the summary as an SVG file.
#[derive(Debug, Clone)]
pub struct SvgSummaryReporter {
    path: PathBuf,
}

impl SvgSummaryReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SummaryReporter for SvgSummaryReporter {
    fn render(&self, summary: &RefreshSummary) -> Result<(), ReportError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Written beside the target and renamed so readers never see a partial file.
        let staging = self.path.with_extension("svg.partial");
        fs::write(&staging, render_svg(summary))?;
        fs::rename(&staging, &self.path).map_err(|error| {
            let _ = fs::remove_file(&staging);
            ReportError::from(error)
        })
    }

    fn artifact(&self) -> Result<Option<SummaryArtifact>, ReportError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(SummaryArtifact {
                content_type: "image/svg+xml",
                bytes,
            })),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

const WIDTH: u32 = 640;
const LINE_HEIGHT: u32 = 28;

fn render_svg(summary: &RefreshSummary) -> String {
    let mut lines = vec![
        format!("Total countries: {}", summary.total_countries),
        format!("Last refreshed: {}", summary.refreshed_at),
        String::new(),
        format!("Top {TOP_COUNTRIES} by estimated GDP:"),
    ];
    if summary.top_countries.is_empty() {
        lines.push("(no countries with an estimated GDP)".to_string());
    }
    for (index, country) in summary.top_countries.iter().enumerate() {
        lines.push(format!(
            "{}. {} ({})",
            index + 1,
            country.name,
            format_gdp(country.estimated_gdp)
        ));
    }

    let height = 80 + LINE_HEIGHT * lines.len() as u32;
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\" \
         viewBox=\"0 0 {WIDTH} {height}\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n\
         <text x=\"24\" y=\"44\" font-family=\"sans-serif\" font-size=\"24\" \
         font-weight=\"bold\" fill=\"#1f2933\">Country Summary</text>\n"
    );
    for (index, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = 84 + LINE_HEIGHT * index as u32;
        svg.push_str(&format!(
            "<text x=\"24\" y=\"{y}\" font-family=\"sans-serif\" font-size=\"16\" \
             fill=\"#1f2933\">{}</text>\n",
            escape_xml(line)
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Two decimals with comma thousands separators, or `n/a` without an estimate.
pub fn format_gdp(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "n/a".to_string();
    };
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
