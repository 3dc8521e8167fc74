//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use pagefetch_fetch::{FetchError, FetchResponse};

use crate::config::Config;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the summary block printed above the body.
    pub fn format_summary(&self, response: &FetchResponse) -> String {
        let mut lines = Vec::new();

        let status = response.status_text();
        lines.push(format!("{} {}", self.green(&status), self.bold(response.url())));

        let expires = match response.expires() {
            Some(at) => self.format_expiry(at),
            None => self.dim("not given"),
        };
        lines.push(format!("Expires: {}", expires));

        let cache = if response.is_cacheable() {
            self.green("cacheable")
        } else {
            let reasons: Vec<&str> = response
                .reasons_not_to_cache()
                .iter()
                .map(|r| r.code())
                .collect();
            self.yellow(&format!("not cacheable ({})", reasons.join(", ")))
        };
        lines.push(format!("Cache:   {}", cache));
        lines.push(format!("Length:  {} bytes", response.body().len()));

        lines.join("\n")
    }

    /// Formats a response: summary, blank line, body.
    pub fn format_response(&self, response: &FetchResponse, body_only: bool) -> String {
        let body = response.body().text();
        if body_only {
            return body.into_owned();
        }
        format!("{}\n\n{}", self.format_summary(response), body)
    }

    /// Formats a fetch failure.
    pub fn format_error(&self, error: &FetchError) -> String {
        format!("{} {}", self.red(&format!("[{}]", error.kind())), error)
    }

    /// Formats the configuration.
    pub fn format_config(&self, config: &Config) -> String {
        let fetch = &config.fetch;
        let lines = [
            self.bold("pagefetch configuration"),
            "─".repeat(40),
            format!("Log level:        {}", config.general.log_level),
            format!("Timeout:          {}s", fetch.timeout.as_secs()),
            format!("Connect timeout:  {}s", fetch.connect_timeout.as_secs()),
            format!("Max redirects:    {}", fetch.max_redirects),
            format!("User agent:       {}", fetch.user_agent),
            format!("Render endpoint:  {}", self.cyan(&fetch.render_endpoint)),
            format!("Render wait:      {}s", fetch.render_wait),
            format!("Render timeout:   {}s", fetch.render_timeout),
        ];
        lines.join("\n")
    }

    fn format_expiry(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&Local);
        let remaining = at - Utc::now();
        let suffix = if remaining.num_seconds() <= 0 {
            "already stale".to_string()
        } else if remaining.num_hours() > 0 {
            format!("in {}h {}m", remaining.num_hours(), remaining.num_minutes() % 60)
        } else if remaining.num_minutes() > 0 {
            format!("in {}m", remaining.num_minutes())
        } else {
            format!("in {}s", remaining.num_seconds())
        };
        format!("{} {}", local.format("%Y-%m-%d %H:%M:%S"), self.dim(&format!("({})", suffix)))
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
