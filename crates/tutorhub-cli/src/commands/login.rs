use anyhow::{Result, bail};
use tutorhub_core::identity::{AuthTokens, Identity};

use super::Context;

pub struct LoginArgs {
    pub id: String,
    pub teacher: bool,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub token: String,
    pub refresh_token: Option<String>,
}

pub fn run(context: &Context, args: LoginArgs) -> Result<()> {
    if args.id.trim().is_empty() {
        bail!("--id must not be empty");
    }
    if args.token.trim().is_empty() {
        bail!("--token must not be empty");
    }

    let mut identity = Identity::new(args.id, args.teacher);
    if let Some(username) = args.username {
        identity = identity.with_username(username);
    }
    if let Some(nickname) = args.nickname {
        identity = identity.with_nickname(nickname);
    }

    let mut tokens = AuthTokens::new(args.token);
    if let Some(refresh_token) = args.refresh_token {
        tokens = tokens.with_refresh_token(refresh_token);
    }

    let name = identity.display_name().to_string();
    context.store.record_login(identity, tokens);
    println!("Logged in as {}", name);

    Ok(())
}
