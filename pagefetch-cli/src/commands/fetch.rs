//! Fetch command - fetch one page and print it.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use pagefetch_core::{FetchRequest, FetcherType, HttpMethod};
use pagefetch_fetch::{FetchSettings, FetcherFactory};
use tracing::debug;

use crate::config::Config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the fetch command.
#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// URL to fetch.
    pub url: String,

    /// Backend: direct or render.
    #[arg(long, short, default_value = "direct")]
    pub backend: String,

    /// Form payload, e.g. "user=a&pass=b". Makes the request a POST.
    #[arg(long)]
    pub form: Option<String>,

    /// HTTP method (GET or POST).
    #[arg(long, short = 'X')]
    pub method: Option<HttpMethod>,

    /// Rendering service address, overriding the config file.
    #[arg(long)]
    pub render_endpoint: Option<String>,

    /// Request timeout in seconds, overriding the config file.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Opaque caller token forwarded to the rendering service.
    #[arg(long)]
    pub user_token: Option<String>,

    /// Print only the body.
    #[arg(long)]
    pub body_only: bool,
}

impl FetchArgs {
    /// Applies command-line overrides to the configured settings.
    pub fn settings(&self, config: &Config) -> FetchSettings {
        let mut settings = config.fetch.clone();
        if let Some(endpoint) = &self.render_endpoint {
            settings = settings.with_render_endpoint(endpoint.clone());
        }
        if let Some(secs) = self.timeout {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        settings
    }

    /// Builds the request to send.
    pub fn request(&self) -> Result<FetchRequest> {
        let fetcher_type: FetcherType = self.backend.parse()?;
        let mut request = FetchRequest::new(&self.url).with_fetcher_type(fetcher_type);
        if let Some(method) = self.method {
            request = request.with_method(method);
        }
        if let Some(form) = &self.form {
            request = request.with_form_data(form.as_str());
        }
        if let Some(token) = &self.user_token {
            request = request.with_user_token(token.clone());
        }
        Ok(request)
    }
}

/// Runs the fetch command.
pub async fn run(args: &FetchArgs, cli: &Cli, config: &Config) -> Result<()> {
    let request = args.request()?;
    let factory = FetcherFactory::new(args.settings(config));
    let fetcher = factory.create_by_name(&args.backend)?;

    debug!(url = %request.url, backend = %fetcher.kind(), "Fetching");
    fetcher.prepare().await?;
    let result = fetcher.response(&request).await;
    fetcher.close().await;
    let response = result?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_response(&response, args.body_only));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_response(&response)?);
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
