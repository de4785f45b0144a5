use clap::{Args, Parser, Subcommand};
use sophia_core::DEFAULT_SERVICE_TENANT;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::token::{IssueArgs, RequireArgs, SigningOptions};

#[derive(Parser, Debug)]
#[command(name = "sophia", version, about = "Sophia capability token CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Key management (generate/public)
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Token management (issue/service/verify/inspect)
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Run the capability-guarded demo API.
    Serve {
        /// Path to sophia.yaml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Generate process-local keys when none are configured (dev only)
        #[arg(long, default_value_t = false)]
        ephemeral: bool,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new Ed25519 keypair
    Generate {
        /// Directory to write private.pem and public.pem into
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the public key for a private key
    Public {
        /// Private key file or PEM
        #[arg(long, env = "SOPHIA_PRIVATE_KEY")]
        key: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct SigningArgs {
    /// Private key file or PEM
    #[arg(long, env = "SOPHIA_PRIVATE_KEY")]
    key: Option<String>,

    /// Public key file or PEM (derived from the private key for EdDSA)
    #[arg(long, env = "SOPHIA_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Issuer written into the token
    #[arg(long, default_value = "sophia-ai")]
    issuer: String,

    /// Signing algorithm
    #[arg(long, default_value = "EdDSA")]
    algorithm: String,
}

impl From<SigningArgs> for SigningOptions {
    fn from(args: SigningArgs) -> Self {
        Self {
            private_key: args.key,
            public_key: args.public_key,
            issuer: args.issuer,
            algorithm: args.algorithm,
        }
    }
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a capability token
    Issue {
        #[command(flatten)]
        signing: SigningArgs,

        /// Caller identity, e.g. "user:alice"
        #[arg(long)]
        subject: String,

        #[arg(long)]
        tenant: String,

        #[arg(long)]
        swarm: Option<String>,

        /// none | low | medium | high
        #[arg(long)]
        pii_level: Option<String>,

        /// Granted tool (repeatable)
        #[arg(long = "tool")]
        tools: Vec<String>,

        /// Granted collection (repeatable)
        #[arg(long = "collection")]
        collections: Vec<String>,

        #[arg(long)]
        ttl_minutes: Option<i64>,

        /// Extra claim as name=value (repeatable)
        #[arg(long = "claim")]
        claims: Vec<String>,

        /// Write the token to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Issue a service-to-service token (research, business, context, github)
    Service {
        #[command(flatten)]
        signing: SigningArgs,

        name: String,

        #[arg(long, default_value = DEFAULT_SERVICE_TENANT)]
        tenant: String,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a token and optionally check requirements
    Verify {
        /// Token or path to a file containing it
        token: String,

        /// Public key file or PEM
        #[arg(long, env = "SOPHIA_PUBLIC_KEY")]
        key: Option<String>,

        #[arg(long, default_value = "sophia-ai")]
        issuer: String,

        #[arg(long, default_value = "EdDSA")]
        algorithm: String,

        #[arg(long)]
        require_tenant: Option<String>,

        #[arg(long)]
        require_swarm: Option<String>,

        #[arg(long)]
        require_pii_level: Option<String>,

        #[arg(long = "require-tool")]
        require_tools: Vec<String>,

        #[arg(long = "require-collection")]
        require_collections: Vec<String>,
    },

    /// Decode a token without verifying it
    Inspect {
        /// Token or path to a file containing it
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
            KeysCommand::Public { key } => commands::keys::public(key)?,
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                signing,
                subject,
                tenant,
                swarm,
                pii_level,
                tools,
                collections,
                ttl_minutes,
                claims,
                output,
            } => commands::token::issue(
                signing.into(),
                IssueArgs {
                    subject,
                    tenant,
                    swarm,
                    pii_level,
                    tools,
                    collections,
                    ttl_minutes,
                    claims,
                },
                output,
            )?,
            TokenCommand::Service {
                signing,
                name,
                tenant,
                output,
            } => commands::token::service(signing.into(), name, tenant, output)?,
            TokenCommand::Verify {
                token,
                key,
                issuer,
                algorithm,
                require_tenant,
                require_swarm,
                require_pii_level,
                require_tools,
                require_collections,
            } => commands::token::verify(
                key,
                issuer,
                algorithm,
                token,
                RequireArgs {
                    tenant: require_tenant,
                    swarm: require_swarm,
                    pii_level: require_pii_level,
                    tools: require_tools,
                    collections: require_collections,
                },
            )?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
        },

        Command::Serve {
            config,
            port,
            ephemeral,
        } => {
            let config = commands::serve::load_config(config, ephemeral)?;
            commands::serve::run(config, port).await?
        }
    }

    Ok(())
}
