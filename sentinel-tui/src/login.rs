use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

use crate::api::AuthClient;
use crate::config::SentinelConfig;
use crate::session_store;
use crate::types::Session;

/// Cheap shape check before we ask the provider to send mail.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Run the interactive login flow:
/// 1. Ask for an email address
/// 2. Have the identity provider email a one-time code
/// 3. Read the code without echo and exchange it for a session
/// 4. Save the session next to the config file
pub async fn run_login(config: &SentinelConfig) -> Result<Session> {
    if config.anon_key.trim().is_empty() {
        bail!(
            "No anon_key configured. Set it in {} or SENTINEL_ANON_KEY.",
            SentinelConfig::config_path()?.display()
        );
    }

    let email = prompt_line("Email: ")?;
    if !is_plausible_email(&email) {
        bail!("'{}' does not look like an email address", email);
    }

    let auth = AuthClient::new(&config.api_url, &config.anon_key)?;
    auth.send_otp(&email).await?;
    println!("A login code was sent to {}.", email);

    let code = rpassword::prompt_password("Code: ").context("Failed to read login code")?;
    let session = auth.verify_otp(&email, code.trim()).await?;

    session_store::save_session(&session)?;
    tracing::info!(user_id = %session.user.id, "logged in");
    println!("Login successful. Session saved.");

    Ok(session)
}

/// Revoke the session remotely if we can, then forget it locally regardless.
pub async fn run_logout(config: &SentinelConfig) -> Result<()> {
    if let Some(session) = session_store::load_session()? {
        let auth = AuthClient::new(&config.api_url, &config.anon_key)?;
        if let Err(e) = auth.logout(&session).await {
            tracing::warn!("remote logout failed: {:#}", e);
        }
    }
    session_store::clear_session()?;
    println!("Logged out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_plausible_email("me@example.com"));
        assert!(is_plausible_email("first.last+tag@mail.example.org"));
    }

    #[test]
    fn rejects_obvious_typos() {
        for email in ["", "me", "@example.com", "me@", "me@example", "me@.com", "me @example.com"] {
            assert!(!is_plausible_email(email), "{email:?} should be rejected");
        }
    }
}
