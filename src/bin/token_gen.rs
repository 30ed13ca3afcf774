//! Issue an access token from the command line (local development / manual testing).
//!
//! ```text
//! SECRET_KEY=... token-gen --user-id 7f1c... --scope trade --scope admin
//! ```
use anyhow::{Context, Result, bail};
use clap::Parser;

use trade_auth::config::AuthSettings;
use trade_auth::services::auth::{Claims, TokenIssuer, scopes};

#[derive(Parser, Debug)]
#[command(name = "token-gen", about = "Issue a signed bearer token")]
struct Args {
    /// Value of the `user_id` claim
    #[arg(long)]
    user_id: String,

    /// Granted scope (repeatable)
    #[arg(long = "scope")]
    scopes: Vec<String>,

    /// Allow scopes that are not in the catalog
    #[arg(long)]
    allow_unknown_scope: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    check_scopes(&args.scopes, args.allow_unknown_scope)?;

    let settings = AuthSettings::from_env().context("failed to read token settings")?;
    let issuer = TokenIssuer::new(&settings).context("invalid token signing configuration")?;

    let claims = Claims::for_user(args.user_id).with_scopes(args.scopes);
    let token = issuer.issue(&claims)?;

    println!("{token}");
    eprintln!("expires in {} minutes", issuer.ttl().num_minutes());
    Ok(())
}

fn check_scopes(requested: &[String], allow_unknown: bool) -> Result<()> {
    if allow_unknown {
        return Ok(());
    }
    if let Some(unknown) = scopes::first_unknown(requested) {
        let known: Vec<&str> = scopes::catalog().iter().map(|s| s.name).collect();
        bail!(
            "unknown scope '{unknown}' (known: {}); pass --allow-unknown-scope to force",
            known.join(", ")
        );
    }
    Ok(())
}
