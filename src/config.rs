use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Bucket all orchestrated uploads land in.
    pub upload_bucket: String,
    /// S3-compatible endpoint the service talks to.
    pub store_endpoint: String,
    /// Endpoint baked into signed links; falls back to `store_endpoint`
    /// when the store is reachable under one address only.
    pub store_public_endpoint: Option<String>,
    pub store_region: String,
    pub store_access_key: String,
    pub store_secret_key: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Chunked upload API for case documents")]
pub struct Args {
    /// Host to bind to (overrides CASEFILE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CASEFILE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides CASEFILE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Upload bucket (overrides CASEFILE_UPLOAD_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Object store endpoint (overrides CASEFILE_STORE_ENDPOINT)
    #[arg(long)]
    pub store_endpoint: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("CASEFILE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("CASEFILE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CASEFILE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading CASEFILE_PORT"),
        };
        let env_db = env::var("CASEFILE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/casefile.db".into());
        let env_bucket = env::var("CASEFILE_UPLOAD_BUCKET").unwrap_or_else(|_| "resumable".into());
        let env_endpoint = env::var("CASEFILE_STORE_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:9000".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            upload_bucket: args.bucket.unwrap_or(env_bucket),
            store_endpoint: args.store_endpoint.unwrap_or(env_endpoint),
            store_public_endpoint: env::var("CASEFILE_STORE_PUBLIC_ENDPOINT").ok(),
            store_region: env::var("CASEFILE_STORE_REGION")
                .unwrap_or_else(|_| "us-east-1".into()),
            store_access_key: env::var("CASEFILE_STORE_ACCESS_KEY")
                .unwrap_or_else(|_| "minioadmin".into()),
            store_secret_key: env::var("CASEFILE_STORE_SECRET_KEY")
                .unwrap_or_else(|_| "minioadmin".into()),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
