//! Key command handlers
//!
//! Creates and inspects the dispatcher key file. The same file is deployed
//! to the dispatcher and every worker.

use std::path::{Path, PathBuf};

use anvil_core::keys;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

/// Key subcommands
#[derive(Subcommand)]
pub enum KeyCommands {
    /// Generate a new signing key
    Generate {
        /// Where to write the key
        #[arg(long, short, env = "ANVIL_KEY_FILE", default_value = "private.key")]
        output: PathBuf,

        /// Replace an existing key file
        #[arg(long)]
        force: bool,
    },
    /// Print the public key derived from a key file
    Show {
        /// Key file to read
        #[arg(long, short, env = "ANVIL_KEY_FILE", default_value = "private.key")]
        file: PathBuf,
    },
}

/// Handle key commands
pub fn handle_key_command(command: KeyCommands) -> Result<()> {
    match command {
        KeyCommands::Generate { output, force } => generate_key(&output, force),
        KeyCommands::Show { file } => show_key(&file),
    }
}

fn generate_key(output: &Path, force: bool) -> Result<()> {
    let key = keys::generate_signing_key();
    keys::save_signing_key(output, &key, force)
        .with_context(|| format!("Could not write key to {}", output.display()))?;

    println!(
        "{} Key written to {}",
        "✓".green(),
        output.display().to_string().bold()
    );
    println!(
        "  Public key: {}",
        keys::encode_verifying_key(&key.verifying_key()).dimmed()
    );
    Ok(())
}

fn show_key(file: &Path) -> Result<()> {
    let key = keys::load_verifying_key(file)
        .with_context(|| format!("Could not load key from {}", file.display()))?;

    println!("{}", keys::encode_verifying_key(&key));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private.key");

        generate_key(&path, false).unwrap();
        assert!(generate_key(&path, false).is_err());
        generate_key(&path, true).unwrap();
        show_key(&path).unwrap();
    }
}
