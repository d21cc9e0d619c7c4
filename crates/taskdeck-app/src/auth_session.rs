use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use taskdeck_core::Credentials;
use taskdeck_store::KeyValueStore;
use tracing::{info, warn};

use crate::api::RemoteApi;
use crate::error::{AppError, Result};

/// Session key of the authentication flag.
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";
/// Session key of the serialized credential pair.
pub const USER_KEY: &str = "user";

/// Boolean sign-in state mirrored to session storage.
///
/// Login is strict: any failure leaves both memory and storage untouched.
/// Logout is lenient: the local session is cleared even when the remote call
/// fails.
pub struct AuthSession<A, S> {
    api: A,
    store: S,
    authenticated: AtomicBool,
}

impl<A, S> AuthSession<A, S>
where
    A: RemoteApi,
    S: KeyValueStore,
{
    /// Build a session seeded from `store`. Only the exact string `"true"`
    /// counts as signed in.
    ///
    /// # Errors
    /// Returns an error if the session store cannot be read.
    pub fn hydrate(api: A, store: S) -> Result<Self> {
        let authenticated = store.get(AUTH_FLAG_KEY)?.as_deref() == Some("true");
        Ok(Self {
            api,
            store,
            authenticated: AtomicBool::new(authenticated),
        })
    }

    /// Whether the user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Sign in with any non-empty credential pair.
    ///
    /// Empty input is refused before the remote API is consulted, so it never
    /// consumes a rate-limit slot.
    ///
    /// # Errors
    /// Returns [`AppError::InvalidCredentials`] for empty input, the remote
    /// error when the call fails, or a storage error when persisting fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let credentials = Credentials::new(email, password);
        if !credentials.is_complete() {
            return Err(AppError::InvalidCredentials);
        }

        let payload = serde_json::to_value(&credentials).map_err(AppError::encode("credentials"))?;
        self.api.call("login", Some(payload)).await?;

        let user = serde_json::to_string(&credentials).map_err(AppError::encode("user record"))?;
        self.store
            .set_many(&[(AUTH_FLAG_KEY, "true"), (USER_KEY, user.as_str())])?;
        self.authenticated.store(true, Ordering::SeqCst);
        info!(email = %credentials.email, "signed in");
        Ok(())
    }

    /// Sign out. The remote result is only logged.
    ///
    /// # Errors
    /// Returns an error only when clearing the session store fails; the
    /// in-memory flag is cleared regardless.
    pub async fn logout(&self) -> Result<()> {
        if let Err(err) = self.api.call("logout", Some(json!({}))).await {
            warn!(error = %err, "logout call failed; clearing local session anyway");
        }
        self.authenticated.store(false, Ordering::SeqCst);
        self.store.remove_many(&[AUTH_FLAG_KEY, USER_KEY])?;
        info!("signed out");
        Ok(())
    }
}
