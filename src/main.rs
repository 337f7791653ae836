//! Decoy Vault - Interactive terminal
//!
//! Reads one command per line and drives the vault with it.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use decoy_vault::{
    DecoyVault, EnvelopeSlot, FileImageSource, FileStore, Status, TapPoint, VaultConfig,
};

#[derive(Parser)]
#[command(name = "decoy-vault")]
#[command(version = decoy_vault::VERSION)]
#[command(about = "Decoy Vault - tap four points to reveal the real image")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store directory (overrides config and DECOY_VAULT_DIR)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const HELP: &str = "\
commands:
  real <path>          load the real image
  decoy <path>         load and display the decoy image
  setup                start recording 4 secret taps
  try                  start an unlock attempt
  tap <x> <y>          tap at normalized coordinates in [0,1]
  tapat <px> <py> <w> <h>
                       tap at a pixel position on a w x h surface
  cancel               discard taps of the running session
  lock                 encrypt the real image and save
  show [path]          print what is displayed, or write it to a file
  clear                delete stored data
  help                 this text
  quit                 exit";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match &cli.config {
        Some(path) => VaultConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VaultConfig::default(),
    }
    .with_env();
    if let Some(store) = cli.store {
        config.store_dir = store;
    }
    config.validate().context("invalid configuration")?;

    let slot = EnvelopeSlot::new(Box::new(FileStore::new(&config.store_dir)), &config.storage_key)?;
    let source = FileImageSource::new(config.max_image_bytes);
    let (mut vault, status) = DecoyVault::open(slot);

    log::info!("store directory {}", config.store_dir.display());
    println!("Decoy Vault {} (type 'help')", decoy_vault::VERSION);
    report(&status);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let args: Vec<&str> = line.split_whitespace().collect();
        let status = match args.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["help"] => {
                println!("{}", HELP);
                continue;
            }
            ["real", path] => vault.load_real_from(&source, PathBuf::from(path).as_path()),
            ["decoy", path] => vault.load_decoy_from(&source, PathBuf::from(path).as_path()),
            ["setup"] => vault.begin_setup(),
            ["try"] => vault.begin_unlock(),
            ["cancel"] => vault.cancel_capture(),
            ["lock"] => vault.lock(),
            ["clear"] => vault.clear(),
            ["tap", x, y] => match (x.parse::<f64>(), y.parse::<f64>()) {
                (Ok(x), Ok(y)) => match TapPoint::new(x, y) {
                    Ok(point) => vault.tap(point),
                    Err(e) => Status::Failed(e.user_message()),
                },
                _ => Status::Failed("Coordinates must be numbers."),
            },
            ["tapat", px, py, w, h] => {
                let parsed: Result<Vec<f64>, _> =
                    [px, py, w, h].iter().map(|v| v.parse::<f64>()).collect();
                match parsed.as_deref() {
                    Ok([px, py, w, h]) => match TapPoint::from_surface(*px, *py, *w, *h) {
                        Ok(point) => vault.tap(point),
                        Err(e) => Status::Failed(e.user_message()),
                    },
                    _ => Status::Failed("Coordinates must be numbers."),
                }
            }
            ["show"] => {
                show(&vault, None)?;
                continue;
            }
            ["show", path] => {
                show(&vault, Some(PathBuf::from(path)))?;
                continue;
            }
            _ => Status::Failed("Unknown command. Type 'help'."),
        };

        report(&status);
    }

    Ok(())
}

fn report(status: &Status) {
    let text = status.to_string();
    if !text.is_empty() {
        println!("{}", text);
    }
}

fn show(vault: &DecoyVault, output: Option<PathBuf>) -> anyhow::Result<()> {
    let Some(url) = vault.displayed() else {
        println!("(nothing displayed)");
        return Ok(());
    };
    let label = if vault.is_revealed() { "real" } else { "decoy" };

    match output {
        Some(path) => {
            let image = decoy_vault::LoadedImage::from_data_url(url)
                .context("displayed image is not a data URL")?;
            std::fs::write(&path, image.bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} image ({}) to {}", label, image.mime(), path.display());
        }
        None => {
            let preview: String = url.chars().take(64).collect();
            println!("[{}] {}… ({} chars)", label, preview, url.len());
        }
    }

    Ok(())
}
