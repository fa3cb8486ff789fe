use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

use tollgate_core::audit::{self, IssuanceRecord};
use tollgate_core::config::{load_params, TokenFileParams};
use tollgate_core::validity::{parse_start_time, parse_window_seconds, unix_now};
use tollgate_core::{Algorithm, TokenConfig, TokenSigner};

#[derive(Parser, Debug)]
#[command(name = "tollgate", about = "Generate HMAC edge-auth tokens for URLs and ACLs")]
struct Cli {
    /// Single URL path to authorize
    #[arg(long, conflicts_with = "acl")]
    url: Option<String>,

    /// ACL entry; repeat to join several with the ACL delimiter
    #[arg(long)]
    acl: Vec<String>,

    /// Hex-encoded shared secret
    #[arg(long, env = "TOLLGATE_SECRET", hide_env_values = true)]
    key: Option<String>,

    /// Digest algorithm: md5, sha1 or sha256
    #[arg(long)]
    algorithm: Option<String>,

    /// Parameter name prepended to the output with --named
    #[arg(long)]
    token_name: Option<String>,

    /// Signed but never emitted in the token body
    #[arg(long)]
    salt: Option<String>,

    /// Client IP the token is bound to
    #[arg(long)]
    ip: Option<String>,

    /// Opaque payload data
    #[arg(long)]
    payload: Option<String>,

    /// Session identifier
    #[arg(long)]
    session_id: Option<String>,

    /// Window start: "now" or absolute unix seconds
    #[arg(long)]
    start_time: Option<String>,

    /// Absolute expiry in unix seconds; overrides --window
    #[arg(long)]
    end_time: Option<u64>,

    /// Validity window: seconds or a suffixed duration such as 5m or 4h
    #[arg(long)]
    window: Option<String>,

    /// Character separating token body fields
    #[arg(long)]
    field_delimiter: Option<char>,

    /// Character joining ACL entries
    #[arg(long)]
    acl_delimiter: Option<char>,

    /// Percent-encode ip, session id, payload and the resource before signing
    #[arg(long)]
    escape_early: bool,

    /// Print the token as <token_name>=<token>
    #[arg(long)]
    named: bool,

    /// TOML or YAML parameter file; flags override file values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log the generation parameters
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose { "debug" } else { "info" })
        .with_writer(std::io::stderr)
        .init();

    let params = match &cli.config {
        Some(path) => load_params(path)?,
        None => TokenFileParams::default(),
    };

    let config = build_config(&cli, params)?;
    let token_name = config.token_name().to_string();
    let signer = TokenSigner::new(config);

    let (token, resource, kind) = if let Some(url) = &cli.url {
        (signer.sign_url(url)?, url.clone(), "url")
    } else if !cli.acl.is_empty() {
        let delimiter = signer.config().acl_delimiter().to_string();
        (
            signer.sign_acl_entries(&cli.acl)?,
            cli.acl.join(&delimiter),
            "acl",
        )
    } else {
        return Err(anyhow!("provide --url or at least one --acl entry"));
    };

    audit::emit(&IssuanceRecord {
        timestamp: unix_now(),
        token_id: &audit::token_id(&token),
        resource: &resource,
        kind,
    });

    if cli.named {
        println!("{token_name}={token}");
    } else {
        println!("{token}");
    }
    Ok(())
}

fn build_config(cli: &Cli, params: TokenFileParams) -> Result<TokenConfig> {
    let mut builder = TokenConfig::builder().verbose(cli.verbose);

    if let Some(key) = cli.key.clone().or(params.key) {
        builder = builder.key(key);
    }
    if let Some(name) = cli.token_name.clone().or(params.token_name) {
        builder = builder.token_name(name);
    }
    if let Some(algorithm) = cli.algorithm.clone().or(params.algorithm) {
        builder = builder.algorithm(algorithm.parse::<Algorithm>()?);
    }
    if let Some(salt) = cli.salt.clone().or(params.salt) {
        builder = builder.salt(salt);
    }
    if let Some(ip) = cli.ip.clone().or(params.ip) {
        builder = builder.ip(ip);
    }
    if let Some(payload) = cli.payload.clone().or(params.payload) {
        builder = builder.payload(payload);
    }
    if let Some(session_id) = cli.session_id.clone().or(params.session_id) {
        builder = builder.session_id(session_id);
    }
    if let Some(start_time) = cli.start_time.clone().or(params.start_time) {
        builder = builder.start_time(parse_start_time(&start_time)?);
    }
    if let Some(end_time) = cli.end_time.or(params.end_time) {
        builder = builder.end_time(end_time);
    }
    if let Some(window) = cli.window.clone().or(params.window) {
        builder = builder.window_seconds(parse_window_seconds(&window)?);
    }
    if let Some(delimiter) = cli.field_delimiter.or(params.field_delimiter) {
        builder = builder.field_delimiter(delimiter);
    }
    if let Some(delimiter) = cli.acl_delimiter.or(params.acl_delimiter) {
        builder = builder.acl_delimiter(delimiter);
    }
    if cli.escape_early || params.escape_early.unwrap_or(false) {
        builder = builder.escape_early(true);
    }

    Ok(builder.build()?)
}
