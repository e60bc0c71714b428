use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use formpost::{
    FormRecord, FormSubmissionService, FormValidator, HealthProbe, HttpClient, HttpClientAdapter,
    ProgressEvent, ProgressStatus, SubmissionError, SubmitOptions,
    config::{
        ClientConfig, ClientConfigValidator,
        loader::{DEFAULT_CONFIG_TEMPLATE, load_config_or_default, load_config_unchecked},
    },
    tracing_setup,
};
use serde_json::json;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML, JSON or INI); built-in defaults when omitted
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// Log output format (logs go to stderr)
    #[clap(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(clap::Args, Debug)]
struct FormArgs {
    /// Read the form from a JSON file instead of the individual flags
    #[clap(long, conflicts_with_all = ["name", "email", "company", "service", "message"])]
    input: Option<PathBuf>,

    #[clap(long, default_value = "")]
    name: String,

    #[clap(long, default_value = "")]
    email: String,

    #[clap(long, default_value = "")]
    company: String,

    /// One of: architecture, devops, ai, cloud, security, transformation, consulting
    #[clap(long, default_value = "")]
    service: String,

    #[clap(long)]
    message: Option<String>,
}

impl FormArgs {
    async fn into_record(self) -> Result<FormRecord> {
        match self.input {
            Some(path) => {
                let raw = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read form from {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse form in {}", path.display()))
            }
            None => Ok(FormRecord {
                name: self.name,
                email: self.email,
                company: self.company,
                service: self.service,
                message: self.message,
            }),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a form, then submit it to the contact endpoint
    Submit {
        #[clap(flatten)]
        form: FormArgs,

        /// Retries after the first attempt (defaults to the configured value)
        #[clap(long)]
        retries: Option<u32>,

        /// Submit even when local validation fails
        #[clap(long)]
        skip_validation: bool,
    },
    /// Validate a form locally without submitting it
    Validate {
        #[clap(flatten)]
        form: FormArgs,
    },
    /// Probe the contact backend's health endpoint
    Health,
    /// Validate a configuration file
    CheckConfig,
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "formpost.toml")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.log_format {
        LogFormat::Json => tracing_setup::init_tracing(),
        LogFormat::Pretty => tracing_setup::init_console_tracing(),
    }
    .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    match args.command {
        Commands::Init { output } => init_config_command(&output).await,
        Commands::CheckConfig => {
            let path = args
                .config
                .ok_or_else(|| eyre!("check-config needs --config <path>"))?;
            check_config_command(&path)
        }
        Commands::Validate { form } => {
            let record = form.into_record().await?;
            validate_command(&record)
        }
        Commands::Health => {
            let config = Arc::new(load_config_or_default(args.config.as_deref())?);
            let http_client = create_http_client(&config)?;
            let report = HealthProbe::new(config, http_client)
                .check_api_health()
                .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.healthy {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Submit {
            form,
            retries,
            skip_validation,
        } => {
            let config = Arc::new(load_config_or_default(args.config.as_deref())?);
            let record = form.into_record().await?;
            submit_command(config, &record, retries, skip_validation).await
        }
    }
}

fn create_http_client(config: &ClientConfig) -> Result<Arc<dyn HttpClient>> {
    let client =
        HttpClientAdapter::new(&config.user_agent).context("Failed to create HTTP client adapter")?;
    Ok(Arc::new(client))
}

fn log_progress(event: &ProgressEvent) {
    match &event.status {
        ProgressStatus::Error { .. } | ProgressStatus::Failed { .. } => {
            tracing::warn!("{event}")
        }
        _ => tracing::info!("{event}"),
    }
}

fn error_json(error: &SubmissionError) -> serde_json::Value {
    json!({
        "success": false,
        "message": error.message(),
        "status": error.status(),
        "details": error.details(),
    })
}

async fn submit_command(
    config: Arc<ClientConfig>,
    record: &FormRecord,
    retries: Option<u32>,
    skip_validation: bool,
) -> Result<()> {
    let validation = FormValidator::validate_form_data(record);
    if !validation.is_valid() {
        if skip_validation {
            tracing::warn!(
                "Submitting despite {} validation error(s)",
                validation.errors.len()
            );
        } else {
            eprintln!("Form is invalid, not submitting");
            println!("{}", serde_json::to_string_pretty(&validation)?);
            std::process::exit(1);
        }
    }

    let http_client = create_http_client(&config)?;
    let service = FormSubmissionService::new(config, http_client);

    let mut options = SubmitOptions::default().on_progress(log_progress);
    if let Some(retries) = retries {
        options = options.with_retries(retries);
    }

    match service.submit(record, options).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(error) => {
            eprintln!("Submission failed: {error}");
            println!("{}", serde_json::to_string_pretty(&error_json(&error))?);
            std::process::exit(1);
        }
    }
}

fn validate_command(record: &FormRecord) -> Result<()> {
    let validation = FormValidator::validate_form_data(record);
    println!("{}", serde_json::to_string_pretty(&validation)?);
    if !validation.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn check_config_command(config_path: &str) -> Result<()> {
    println!("Validating configuration file: {config_path}");

    if !std::path::Path::new(config_path).exists() {
        eprintln!("Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config_unchecked(config_path) {
        Ok(config) => {
            println!("Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("Configuration parsing failed:");
            eprintln!("   {e:#}");
            std::process::exit(1);
        }
    };

    match ClientConfigValidator::validate(&config) {
        Ok(()) => {
            println!("Configuration validation: OK");
            println!();
            println!("Configuration Summary:");
            println!("   Endpoint: {}", config.endpoint);
            println!("   Health endpoint: {}", config.health_endpoint());
            println!("   Timeout: {}s", config.timeout_secs);
            println!(
                "   Retries: {} (backoff {}ms..{}ms)",
                config.retries, config.backoff.initial_delay_ms, config.backoff.max_delay_ms
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration validation failed:");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn init_config_command(output: &str) -> Result<()> {
    let path = std::path::Path::new(output);
    if path.exists() {
        eprintln!("Error: Configuration file '{output}' already exists");
        std::process::exit(1);
    }

    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .await
        .context("Failed to write config file")?;
    println!("Created default configuration at: {output}");
    println!("   Run 'formpost --config {output} health' to probe the endpoint");
    Ok(())
}
