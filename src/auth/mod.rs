//! Google OAuth 2.0 authentication with a cached token file.

pub mod credentials;
pub mod flow;
pub mod token;

pub use credentials::ClientSecrets;
pub use flow::InstalledAppFlow;
pub use token::{AuthorizedUser, TokenResponse};

use crate::error::Result;
use chrono::Utc;
use reqwest::Client;
use std::path::Path;
use tracing::{debug, info, warn};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const SCOPES: &[&str] = &[SPREADSHEETS_SCOPE, DRIVE_SCOPE];

/// Return usable credentials, reusing the token cache when possible.
///
/// A cached token is used as-is while valid, refreshed when it has expired
/// and carries a refresh token, and otherwise replaced through the
/// interactive browser flow. New or refreshed tokens are written back to
/// `token_path`. A token cache that exists but cannot be parsed is an error.
pub async fn authenticate(
    client: &Client,
    credentials_path: &Path,
    token_path: &Path,
) -> Result<AuthorizedUser> {
    let cached = if token_path.exists() {
        Some(AuthorizedUser::load(token_path)?)
    } else {
        None
    };

    // An empty scope list means the cache predates scope tracking.
    let cached = cached.filter(|user| {
        let sufficient = user.scopes.is_empty() || user.has_scopes(SCOPES);
        if !sufficient {
            warn!("Cached token lacks required scopes, re-authorizing");
        }
        sufficient
    });

    if let Some(user) = &cached {
        if user.is_valid(Utc::now()) {
            debug!("Using cached token from {}", token_path.display());
            return Ok(user.clone());
        }
    }

    let user = match cached {
        Some(mut user) if user.is_expired(Utc::now()) && user.can_refresh() => {
            info!("Refreshing expired access token");
            refresh(client, &mut user).await?;
            user
        }
        _ => {
            let secrets = ClientSecrets::from_file(credentials_path)?;
            InstalledAppFlow::new(&secrets, SCOPES)
                .run_local_server(client)
                .await?
        }
    };

    user.save(token_path)?;
    Ok(user)
}

/// Exchange the refresh token for a new access token in place.
pub async fn refresh(client: &Client, user: &mut AuthorizedUser) -> Result<()> {
    let Some(refresh_token) = user.refresh_token.clone() else {
        return Err(crate::error::Error::Auth(
            "Token has no refresh token".to_string(),
        ));
    };
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token.as_str()),
        ("client_id", user.client_id.as_str()),
        ("client_secret", user.client_secret.as_str()),
    ];
    let response = flow::post_token_request(client, &user.token_uri, &params).await?;
    user.apply_response(response, Utc::now());
    Ok(())
}
