//! Key management commands.
//!
//! `sophia keys generate` - Generate a new Ed25519 keypair.
//! `sophia keys public` - Print the public key for a private key.

use anyhow::Context;
use sophia_captoken::KeyPair;
use std::fs;
use std::path::PathBuf;

use super::token::read_key_arg;

/// Generate a new keypair.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;

    if let Some(output_dir) = output {
        // Create output directory if it doesn't exist
        fs::create_dir_all(&output_dir)?;

        let private_path = output_dir.join("private.pem");
        let public_path = output_dir.join("public.pem");

        keypair.save_to_files(&private_path, &public_path)?;

        println!("✔ Generated Ed25519 keypair:");
        println!("  Private key: {}", private_path.display());
        println!("  Public key:  {}", public_path.display());
        println!();
        println!("⚠️  Keep your private key secure! Never commit it to version control.");
        println!();
        println!("Reference them from sophia.yaml:");
        println!("  token:");
        println!("    private_key_file: {}", private_path.display());
        println!("    public_key_file: {}", public_path.display());
    } else {
        // Print to stdout
        println!("{}", keypair.private_key_pem());
        println!();
        println!("{}", keypair.public_key_pem());
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}

/// Print the public key belonging to an Ed25519 private key.
pub fn public(private_key: Option<String>) -> anyhow::Result<()> {
    let pem = read_key_arg(
        private_key,
        "Private key not provided. Either pass --key <path> or set SOPHIA_PRIVATE_KEY env var",
    )?;
    let keypair = KeyPair::from_ed25519_private_pem(&pem)
        .context("Failed to parse private key. Expected PKCS#8 PEM Ed25519 private key")?;

    println!("{}", keypair.public_key_pem());
    Ok(())
}
