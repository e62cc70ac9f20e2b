//! sealmail-server: classification server with HTTP API
//!
//! Holds the classifier weight vector, registered recipient keys, and
//! per-user mailboxes; evaluates the classifier homomorphically on every
//! inbound ciphertext.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sealmail::ckks::CkksContext;
use sealmail::http::{build_router, AppState};
use sealmail::mailbox::MailboxStore;
use sealmail::params::CkksParams;
use sealmail::registry::KeyRegistry;
use sealmail::storage;

#[derive(Parser)]
#[command(name = "sealmail-server")]
#[command(about = "Encrypted spam classification server")]
#[command(version)]
struct Args {
    /// Classifier weight vector, one real per line
    #[arg(long, default_value = "weights.txt")]
    weights: PathBuf,

    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Parameter preset: "mail4096" or "toy16"
    #[arg(long, default_value = "mail4096")]
    preset: String,

    /// Also persist delivered ciphertext/result pairs to this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn preset(name: &str) -> Result<CkksParams> {
    match name {
        "mail4096" => Ok(CkksParams::mail_4096()),
        "toy16" => Ok(CkksParams::toy_16()),
        other => Err(eyre::eyre!("unknown preset: {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let params = preset(&args.preset)?;
    let ctx = CkksContext::new(params).wrap_err("invalid parameter preset")?;
    info!(
        fingerprint = %ctx.fingerprint(),
        slots = ctx.params().slots(),
        "parameters ready"
    );

    let weights = storage::load_weights(&args.weights, ctx.params().slots())
        .wrap_err_with(|| format!("failed to load weights from {}", args.weights.display()))?;
    info!(path = %args.weights.display(), "weight vector loaded");

    if let Some(dir) = &args.data_dir {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("cannot create data dir {}", dir.display()))?;
    }

    let state = Arc::new(AppState {
        registry: Arc::new(KeyRegistry::new(ctx.fingerprint())),
        mailbox: Arc::new(MailboxStore::new()),
        weights: Arc::new(weights),
        ctx: Arc::new(ctx),
        data_dir: args.data_dir,
    });

    let app = build_router(state);

    info!("Starting server on {}", args.bind);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;

    println!();
    println!("=== sealmail classification server ===");
    println!("Listening on: http://{}", args.bind);
    println!();
    println!("Endpoints:");
    println!("  GET  /ping             - Health check");
    println!("  GET  /params           - Parameter fingerprint");
    println!("  POST /:id/pk|rok|rek   - Upload recipient keys (enrolls)");
    println!("  GET  /:id/pk           - Fetch recipient public key");
    println!("  POST /:id/send         - Submit ciphertext for classification");
    println!("  GET  /:id/inbox/len    - Mailbox length");
    println!("  GET  /:id/inbox/:index - Fetch delivered result");
    println!("  POST /flush            - Drop all keys and mailboxes");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
