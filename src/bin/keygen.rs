//! sealmail-keygen: generate a recipient key set and optionally upload
//! the server-side keys.
//!
//! The secret key only ever touches the local key directory; the public,
//! rotation, and relinearization keys can be pushed to the server in the
//! same run.

use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sealmail::ckks::CkksContext;
use sealmail::http::KeyUpload;
use sealmail::math::GaussianSampler;
use sealmail::params::CkksParams;
use sealmail::storage;

#[derive(Parser)]
#[command(name = "sealmail-keygen")]
#[command(about = "Generate recipient keys for encrypted classification")]
#[command(version)]
struct Args {
    /// User id the keys belong to
    #[arg(long)]
    user: String,

    /// Directory for the key files
    #[arg(long, default_value = "keys")]
    key_dir: PathBuf,

    /// Parameter preset: "mail4096" or "toy16"
    #[arg(long, default_value = "mail4096")]
    preset: String,

    /// Server base URL; when set, uploads pk/rok/rek after generation
    #[arg(long)]
    upload: Option<String>,
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
    info!(fingerprint = %ctx.fingerprint(), "generating keys");

    let mut rng = ChaCha20Rng::from_entropy();
    let mut sampler = GaussianSampler::new(ctx.params().sigma);
    let keys = ctx.generate_keys(&mut rng, &mut sampler);

    std::fs::create_dir_all(&args.key_dir)?;
    storage::save_secret_key(&args.key_dir, &args.user, &keys.secret)?;
    storage::save_public_key(&args.key_dir, &args.user, &keys.public)?;
    storage::save_rotation_keys(&args.key_dir, &args.user, &keys.rotation)?;
    storage::save_relin_key(&args.key_dir, &args.user, &keys.relin)?;
    info!(dir = %args.key_dir.display(), user = %args.user, "key files written");

    if let Some(server) = args.upload {
        let client = reqwest::blocking::Client::new();
        let fingerprint = ctx.fingerprint();

        client
            .post(format!("{}/{}/pk", server, args.user))
            .json(&KeyUpload {
                fingerprint: fingerprint.clone(),
                key: keys.public,
            })
            .send()
            .wrap_err("public key upload failed")?
            .error_for_status()?;

        client
            .post(format!("{}/{}/rok", server, args.user))
            .json(&KeyUpload {
                fingerprint: fingerprint.clone(),
                key: keys.rotation,
            })
            .send()
            .wrap_err("rotation key upload failed")?
            .error_for_status()?;

        client
            .post(format!("{}/{}/rek", server, args.user))
            .json(&KeyUpload {
                fingerprint,
                key: keys.relin,
            })
            .send()
            .wrap_err("relinearization key upload failed")?
            .error_for_status()?;

        info!(server = %server, "keys uploaded, user enrolled");
    }

    Ok(())
}
