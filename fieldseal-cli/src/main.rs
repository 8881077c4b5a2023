//! `fieldseal` CLI tool for master-key management.

#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use fieldseal::manager::CryptoManager;
use fieldseal::value::FieldValue;
use fieldseal_key_file::FileKeyStore;

#[derive(Parser)]
#[command(name = "fieldseal")]
#[command(about = "Fieldseal master-key management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new master key, replacing any existing one
    Keygen {
        /// Key file path
        #[arg(short, long, default_value = "./instance/.master.key")]
        path: String,
    },
    /// Show key file metadata and verify the key is usable
    Inspect {
        /// Key file path
        #[arg(short, long, default_value = "./instance/.master.key")]
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { path } => {
            let store = FileKeyStore::new(&path);
            let key = store.generate().context("key generation failed")?;

            let encoded = key.encoded();
            println!("New master key generated at: {path}");
            println!("Key preview (first 20 characters): {}...", &encoded[..20]);
            println!("Keep this file safe and back it up!");
        }
        Commands::Inspect { path } => {
            let store = FileKeyStore::new(&path);
            let info = store.metadata().context("failed to read key file")?;

            println!("Key file: {path}");
            match info.created_at {
                Some(created_at) => println!("  created_at: {created_at}"),
                None => println!("  created_at: (not recorded)"),
            }
            println!("  key_type:   {}", info.key_type.as_deref().unwrap_or("(not recorded)"));
            println!("  version:    {}", info.version.as_deref().unwrap_or("(not recorded)"));

            // Round trip one value to prove the key is usable end to end.
            let key = store.load().context("key failed validation")?;
            let engine = CryptoManager::new(key);
            let token = engine
                .encrypt(&FieldValue::from("fieldseal self-test"))
                .context("self-test encryption failed")?;
            engine.decrypt(&token).context("self-test decryption failed")?;

            println!("  status:     OK (encrypt/decrypt self-test passed)");
        }
    }

    Ok(())
}
