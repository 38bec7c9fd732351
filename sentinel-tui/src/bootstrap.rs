use anyhow::{Context, Result};

use crate::api::IdentityService;
use crate::types::Identity;

/// Where startup goes once the identity provider has answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Proceed(Identity),
    RedirectToLogin,
}

/// Resolve who is signed in. Nobody signed in is a redirect, not an error;
/// a provider failure is terminal for this launch. An expired access token
/// gets one refresh before giving up on the saved session.
pub async fn resolve_identity(identity: &dyn IdentityService) -> Result<Gate> {
    if identity.session().is_none() {
        tracing::info!("no saved session");
        return Ok(Gate::RedirectToLogin);
    }

    let mut user = identity
        .current_user()
        .await
        .context("Failed to resolve the signed-in user")?;

    if user.is_none() {
        let refreshed = identity
            .refresh_session()
            .await
            .context("Failed to refresh the saved session")?;
        if refreshed.is_some() {
            user = identity
                .current_user()
                .await
                .context("Failed to resolve the signed-in user")?;
        }
    }

    match user {
        Some(user) => {
            tracing::info!(user_id = %user.id, "session resolved");
            Ok(Gate::Proceed(user))
        }
        None => {
            tracing::info!("session no longer valid");
            Ok(Gate::RedirectToLogin)
        }
    }
}
