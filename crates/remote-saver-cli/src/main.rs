//! remote-saver: upload image files to a remote endpoint and print the
//! per-image results as the host UI envelope.
//!
//! Set REMOTE_SAVER_UPLOAD_URL (or pass --url). Per-image failures are
//! reported in the output; the exit status is non-zero only for invalid
//! configuration or unreadable input files.

use anyhow::Context;
use clap::Parser;
use remote_saver_cli::{init_tracing, run, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.log_json);

    let ui = run(&args).await?;

    let out = serde_json::to_string_pretty(&ui).context("Serialize upload results")?;
    println!("{}", out);
    Ok(())
}
