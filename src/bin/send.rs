//! sealmail-send: encrypt a token set under a recipient's public key and
//! submit it for classification.

use clap::Parser;
use eyre::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sealmail::ckks::{CkksContext, PublicKey};
use sealmail::http::{ParamsResponse, SendRequest, SendResponse};
use sealmail::math::GaussianSampler;
use sealmail::params::CkksParams;
use sealmail::roles;

#[derive(Parser)]
#[command(name = "sealmail-send")]
#[command(about = "Send an encrypted token embedding for classification")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    /// Recipient user id
    #[arg(long)]
    to: String,

    /// Message subject (stored alongside the result)
    #[arg(long, default_value = "")]
    subject: String,

    /// Token indices present in the email, comma separated
    #[arg(long, value_delimiter = ',')]
    tokens: Vec<usize>,

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

    // Catch a parameter mismatch before doing any work
    let server_params: ParamsResponse = client
        .get(format!("{}/params", args.server))
        .send()
        .wrap_err("server unreachable")?
        .json()?;
    if server_params.fingerprint != ctx.fingerprint() {
        return Err(eyre::eyre!(
            "parameter mismatch: server runs {}, local preset is {}",
            server_params.fingerprint,
            ctx.fingerprint()
        ));
    }

    let pk: PublicKey = client
        .get(format!("{}/{}/pk", args.server, args.to))
        .send()?
        .error_for_status()
        .wrap_err_with(|| format!("no public key for {}", args.to))?
        .json()?;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut sampler = GaussianSampler::new(ctx.params().sigma);
    let ciphertext = roles::prepare_message(&ctx, &args.tokens, &pk, &mut rng, &mut sampler)?;
    info!(tokens = args.tokens.len(), "embedding encrypted");

    let resp: SendResponse = client
        .post(format!("{}/{}/send", args.server, args.to))
        .json(&SendRequest {
            subject: args.subject,
            ciphertext,
        })
        .send()?
        .error_for_status()
        .wrap_err("classification failed")?
        .json()?;

    info!(to = %args.to, message_id = resp.message_id, "delivered");
    println!("delivered as message {}", resp.message_id);

    Ok(())
}
