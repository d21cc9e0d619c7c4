use taskdeck_store::KeyValueStore;

use crate::api::RemoteApi;
use crate::auth_session::AuthSession;
use crate::error::{AppError, Result};
use crate::router::{self, Navigation, View};
use crate::task_store::TaskStore;

/// Containers built at start-up and handed to whatever needs them.
///
/// A context may be built without one of them; asking for the missing one
/// yields [`AppError::NoActiveSession`].
pub struct AppContext<A, S, P> {
    auth: Option<AuthSession<A, S>>,
    tasks: Option<TaskStore<A, P>>,
}

impl<A, S, P> Default for AppContext<A, S, P> {
    fn default() -> Self {
        Self {
            auth: None,
            tasks: None,
        }
    }
}

impl<A, S, P> AppContext<A, S, P>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
{
    /// Hydrate both containers, sharing one API handle.
    ///
    /// # Errors
    /// Returns an error if either store cannot be read.
    pub fn open(api: A, session: S, persistent: P) -> Result<Self> {
        let auth = AuthSession::hydrate(api.clone(), session)?;
        let tasks = TaskStore::hydrate(api, persistent)?;
        Ok(Self::default().with_auth(auth).with_tasks(tasks))
    }

    /// Attach a session container.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthSession<A, S>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Attach a task container.
    #[must_use]
    pub fn with_tasks(mut self, tasks: TaskStore<A, P>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// The session container.
    ///
    /// # Errors
    /// Returns [`AppError::NoActiveSession`] when none was attached.
    pub fn auth(&self) -> Result<&AuthSession<A, S>> {
        self.auth
            .as_ref()
            .ok_or(AppError::NoActiveSession("auth session"))
    }

    /// The task container.
    ///
    /// # Errors
    /// Returns [`AppError::NoActiveSession`] when none was attached.
    pub fn tasks(&self) -> Result<&TaskStore<A, P>> {
        self.tasks
            .as_ref()
            .ok_or(AppError::NoActiveSession("task store"))
    }

    /// Resolve `requested` against the current sign-in state.
    ///
    /// # Errors
    /// Returns [`AppError::NoActiveSession`] when no session container was attached.
    pub fn navigate(&self, requested: View) -> Result<Navigation> {
        Ok(router::resolve(requested, self.auth()?.is_authenticated()))
    }
}
