//! sealmail-read: fetch delivered results, decrypt, and print the label.
//!
//! With --index, reads one message; without, walks the whole inbox.

use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use sealmail::ckks::CkksContext;
use sealmail::codec::DEFAULT_THRESHOLD;
use sealmail::mailbox::MessageRecord;
use sealmail::params::CkksParams;
use sealmail::roles;
use sealmail::storage;

#[derive(Parser)]
#[command(name = "sealmail-read")]
#[command(about = "Decrypt and label classification results")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    /// User id whose inbox to read
    #[arg(long)]
    user: String,

    /// Directory holding the user's secret key
    #[arg(long, default_value = "keys")]
    key_dir: PathBuf,

    /// Read only this message index
    #[arg(long)]
    index: Option<usize>,

    /// Spam probability threshold
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Parameter preset: "mail4096" or "toy16"
    #[arg(long, default_value = "mail4096")]
    preset: String,
}

fn preset(name: &str) -> Result<CkksParams> {
    match name {
        "mail4096" => Ok(CkksParams::mail_4096()),
        "toy16" => Ok(CkksParams::toy_16()),
        other => Err(eyre::eyre!("unknown preset: {}", other)),
    }
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let ctx = CkksContext::new(preset(&args.preset)?)?;
    let client = reqwest::blocking::Client::new();

    let sk = storage::load_secret_key(&args.key_dir, &args.user)
        .wrap_err_with(|| format!("no secret key for {} in {}", args.user, args.key_dir.display()))?;

    let indices: Vec<usize> = match args.index {
        Some(i) => vec![i],
        None => {
            let len: usize = client
                .get(format!("{}/{}/inbox/len", args.server, args.user))
                .send()?
                .error_for_status()
                .wrap_err("inbox lookup failed")?
                .json()?;
            (0..len).collect()
        }
    };

    for i in indices {
        let record: MessageRecord = client
            .get(format!("{}/{}/inbox/{}", args.server, args.user, i))
            .send()?
            .error_for_status()
            .wrap_err_with(|| format!("failed to fetch message {}", i))?
            .json()?;

        let (score, label) = roles::read_result(&ctx, &record.result, &sk, args.threshold)?;
        println!(
            "[{}] {:?} score={:.4} -> {}",
            record.message_id, record.subject, score, label
        );
    }

    Ok(())
}
