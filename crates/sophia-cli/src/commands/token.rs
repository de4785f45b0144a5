//! Token management commands.
//!
//! `sophia token issue` - Issue a capability token.
//! `sophia token service` - Issue a service-to-service token.
//! `sophia token verify` - Validate a token and check requirements.
//! `sophia token inspect` - Inspect a token's contents without verifying.

use anyhow::{Context, bail};
use serde_json::Value;
use sophia_captoken::{
    Algorithm, CapabilityTokenService, IssueRequest, KeyPair, PiiLevel, Requirements,
    TokenVerifier, inspect_token_unverified, parse_algorithm,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Options shared by the issuing commands.
#[derive(Debug, Clone)]
pub struct SigningOptions {
    /// Private key path or PEM.
    pub private_key: Option<String>,
    /// Public key path or PEM; derived from the private key for EdDSA.
    pub public_key: Option<String>,
    pub issuer: String,
    pub algorithm: String,
}

/// Arguments of `sophia token issue`.
#[derive(Debug, Clone, Default)]
pub struct IssueArgs {
    pub subject: String,
    pub tenant: String,
    pub swarm: Option<String>,
    pub pii_level: Option<String>,
    pub tools: Vec<String>,
    pub collections: Vec<String>,
    pub ttl_minutes: Option<i64>,
    /// `name=value`; values that parse as JSON are kept as JSON.
    pub claims: Vec<String>,
}

/// Requirements given to `sophia token verify`.
#[derive(Debug, Clone, Default)]
pub struct RequireArgs {
    pub tenant: Option<String>,
    pub swarm: Option<String>,
    pub pii_level: Option<String>,
    pub tools: Vec<String>,
    pub collections: Vec<String>,
}

/// Read a key given either as a file path or inline PEM.
pub(crate) fn read_key_arg(key: Option<String>, missing: &'static str) -> anyhow::Result<String> {
    let key_str = key.context(missing)?;

    // If it looks like a file path and the file exists, load from file
    let path = Path::new(&key_str);
    if path.exists() {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read key from file: {}", path.display()));
    }

    // Otherwise, treat it as PEM
    Ok(key_str)
}

/// Read a token given either as a file path or the token itself.
fn read_token_arg(token: String) -> anyhow::Result<String> {
    if Path::new(&token).exists() {
        Ok(fs::read_to_string(&token)?.trim().to_string())
    } else {
        Ok(token.trim().to_string())
    }
}

fn build_service(opts: &SigningOptions) -> anyhow::Result<CapabilityTokenService> {
    let algorithm = parse_algorithm(&opts.algorithm)?;
    let private_pem = read_key_arg(
        opts.private_key.clone(),
        "Private key not provided. Either pass --key <path> or set SOPHIA_PRIVATE_KEY env var",
    )?;

    let keypair = match &opts.public_key {
        Some(public) => {
            let public_pem = read_key_arg(Some(public.clone()), "Public key not provided")?;
            KeyPair::from_pem(private_pem.as_bytes(), public_pem.as_bytes(), algorithm)?
        }
        None if algorithm == Algorithm::EdDSA => KeyPair::from_ed25519_private_pem(&private_pem)
            .context("Failed to parse private key. Expected PKCS#8 PEM Ed25519 private key")?,
        None => bail!("--public-key is required for {}", opts.algorithm),
    };

    Ok(CapabilityTokenService::new(keypair, opts.issuer.clone()))
}

fn parse_claim(raw: &str) -> anyhow::Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid claim '{raw}'. Expected name=value"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.trim().to_string(), value))
}

fn write_token(token: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(output_path) = output {
        fs::write(&output_path, token)?;
        println!("✔ Token written to: {}", output_path.display());
    } else {
        println!("{token}");
    }
    Ok(())
}

/// Issue a capability token.
pub fn issue(opts: SigningOptions, args: IssueArgs, output: Option<PathBuf>) -> anyhow::Result<()> {
    let service = build_service(&opts)?;

    let mut request = IssueRequest::new(args.subject, args.tenant);
    request.swarm = args.swarm;
    request.pii_level = args.pii_level;
    if !args.tools.is_empty() {
        request = request.tools(args.tools);
    }
    if !args.collections.is_empty() {
        request = request.collections(args.collections);
    }
    request.ttl_minutes = args.ttl_minutes;
    for raw in &args.claims {
        let (name, value) = parse_claim(raw)?;
        request = request.claim(name, value);
    }

    let token = service.issue(request)?;
    write_token(&token, output)
}

/// Issue a token for a known internal service.
pub fn service(
    opts: SigningOptions,
    name: String,
    tenant: String,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let service = build_service(&opts)?;
    let token = service.issue_service_token(&name, &tenant)?;
    write_token(&token, output)
}

/// Validate a token and check it against requirements.
pub fn verify(
    public_key: Option<String>,
    issuer: String,
    algorithm: String,
    token: String,
    require: RequireArgs,
) -> anyhow::Result<()> {
    let public_pem = read_key_arg(
        public_key,
        "Public key not provided. Either pass --key <path> or set SOPHIA_PUBLIC_KEY env var",
    )?;
    let verifier =
        TokenVerifier::from_public_pem(public_pem.as_bytes(), &issuer, parse_algorithm(&algorithm)?)?;

    let mut requirements = Requirements::new()
        .tools(require.tools)
        .collections(require.collections);
    requirements.tenant = require.tenant;
    requirements.swarm = require.swarm;
    if let Some(level) = require.pii_level {
        requirements = requirements.pii_level(level.parse::<PiiLevel>()?);
    }

    let token_str = read_token_arg(token)?;
    let claims = verifier
        .validate(&token_str)
        .context("Token verification failed")?;
    claims
        .authorize(&requirements)
        .context("Token does not satisfy requirements")?;

    println!("✔ Token is valid");
    if !requirements.is_empty() {
        println!("✔ Requirements satisfied");
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&claims.to_map())?);

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token_str = read_token_arg(token)?;
    let info = inspect_token_unverified(&token_str)?;

    println!("Token Information (signature NOT verified):");
    println!();
    println!("Header:");
    println!("{}", serde_json::to_string_pretty(&info.header)?);
    println!();
    println!("Claims:");
    println!("{}", serde_json::to_string_pretty(&info.claims)?);

    Ok(())
}
