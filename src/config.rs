use crate::models::credentials::Credentials;
use anyhow::{Result, bail};
use clap::Parser;
use std::{fmt, path::PathBuf};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub addr: String,
    pub bucket: String,
    pub cred: Option<String>,
    pub username: String,
    pub password: String,
    pub debug: bool,
    pub local_root: Option<PathBuf>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Serve a cloud storage bucket over HTTP behind Basic auth"
)]
pub struct Args {
    /// Address to serve
    #[arg(long, env = "BUCKET_GATEWAY_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Bucket to serve
    #[arg(long, env = "BUCKET_GATEWAY_BUCKET")]
    pub bucket: Option<String>,

    /// Path to a service-account credential file
    #[arg(long, env = "BUCKET_GATEWAY_CRED")]
    pub cred: Option<String>,

    /// Username for basic HTTP auth
    #[arg(long, env = "BUCKET_GATEWAY_USERNAME")]
    pub username: Option<String>,

    /// Password for basic HTTP auth
    #[arg(long, env = "BUCKET_GATEWAY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Show debug logs
    #[arg(long, env = "BUCKET_GATEWAY_DEBUG")]
    pub debug: bool,

    /// Serve `<local-root>/<bucket>/` from disk instead of the remote bucket
    #[arg(long, env = "BUCKET_GATEWAY_LOCAL_ROOT")]
    pub local_root: Option<PathBuf>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into a validated AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Validate parsed arguments. Bucket, username and password are required.
    pub fn from_args(args: Args) -> Result<Self> {
        let bucket = required(args.bucket, "--bucket")?;
        let username = required(args.username, "--username")?;
        let password = required(args.password, "--password")?;

        Ok(Self {
            addr: args.addr,
            bucket,
            cred: args.cred.filter(|c| !c.is_empty()),
            username,
            password,
            debug: args.debug,
            local_root: args.local_root,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("{} required", flag),
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("addr", &self.addr)
            .field("bucket", &self.bucket)
            .field("cred", &self.cred)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("debug", &self.debug)
            .field("local_root", &self.local_root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppConfig> {
        let mut argv = vec!["bucket-gateway"];
        argv.extend_from_slice(args);
        AppConfig::from_args(Args::try_parse_from(argv)?)
    }

    #[test]
    fn parses_full_configuration() {
        let cfg = parse(&[
            "--bucket", "site", "--username", "alice", "--password", "s3cret", "--debug",
        ])
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8080");
        assert_eq!(cfg.bucket, "site");
        assert_eq!(cfg.credentials().username, "alice");
        assert_eq!(cfg.log_level(), "debug");
        assert!(cfg.cred.is_none());
    }

    #[test]
    fn required_fields_are_checked_in_order() {
        let err = parse(&["--username", "u", "--password", "p"]).unwrap_err();
        assert_eq!(err.to_string(), "--bucket required");

        let err = parse(&["--bucket", "b", "--password", "p"]).unwrap_err();
        assert_eq!(err.to_string(), "--username required");

        let err = parse(&["--bucket", "b", "--username", "u", "--password", ""]).unwrap_err();
        assert_eq!(err.to_string(), "--password required");
    }

    #[test]
    fn debug_output_hides_password() {
        let cfg = parse(&["--bucket", "b", "--username", "u", "--password", "hunter2"]).unwrap();
        assert!(!format!("{:?}", cfg).contains("hunter2"));
    }
}
