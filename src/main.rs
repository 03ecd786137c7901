use std::{fs::read_to_string, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use customers::{lookup::HttpLookup, model::Customer, session, store::CustomerStore};

#[derive(Debug, Parser)]
struct Cli {
    /// JSON file of customers to preload into the session.
    #[arg(long)]
    seed: Option<PathBuf>,
    /// PAN verification endpoint.
    #[arg(long, default_value = "https://lab.pixel6.co/api/verify-pan.php")]
    verify_url: String,
    /// Postcode resolution endpoint.
    #[arg(long, default_value = "https://lab.pixel6.co/api/get-postcode-details.php")]
    postcode_url: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut store = CustomerStore::new();
    if let Some(path) = &cli.seed {
        let seed: Vec<Customer> = serde_json::from_str(
            &read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        )?;
        for x in seed {
            store.add(x);
        }
    }

    let lookup = HttpLookup::new(&cli.verify_url, &cli.postcode_url);
    session::run(store, &lookup)
}
