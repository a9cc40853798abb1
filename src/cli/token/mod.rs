//! Token command - issues a token for operators and integration tests

use clap::Args;

use crate::config::AppConfig;
use crate::domain::{Identity, IssuedToken, RoleSet, TokenIssuer};

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Subject of the token
    #[arg(long)]
    pub user_id: String,

    #[arg(long)]
    pub email: String,

    /// Role label; repeat for several roles
    #[arg(long, required = true)]
    pub role: Vec<String>,

    /// Overrides `auth.token_ttl_minutes`
    #[arg(long)]
    pub ttl_minutes: Option<i64>,
}

/// Issue the token and print it to stdout
pub fn run(config: AppConfig, args: TokenArgs) -> anyhow::Result<()> {
    let issued = issue(&config, &args)?;

    eprintln!("expires_at: {}", issued.expires_at().to_rfc3339());
    println!("{}", issued.token);

    Ok(())
}

fn issue(config: &AppConfig, args: &TokenArgs) -> anyhow::Result<IssuedToken> {
    let roles = RoleSet::parse(&args.role)?;
    let identity = Identity::new(args.user_id.as_str(), args.email.as_str(), roles);

    let jwt = crate::build_jwt_service(&config.auth)?;
    let jwt = match args.ttl_minutes {
        Some(minutes) => jwt.with_ttl(crate::token_ttl(minutes)?),
        None => jwt,
    };

    Ok(jwt.issue(&identity)?)
}
