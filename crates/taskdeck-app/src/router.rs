use std::fmt;

/// Screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Landing view with the login form.
    Home,
    /// Task list; requires a signed-in session.
    Tasks,
}

impl View {
    /// Route path of the view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Tasks => "/tasks",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of resolving a requested view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested view.
    Render(View),
    /// Replace the request with another view.
    Redirect(View),
}

impl Navigation {
    /// View that ends up on screen.
    #[must_use]
    pub const fn view(self) -> View {
        match self {
            Self::Render(view) | Self::Redirect(view) => view,
        }
    }
}

/// Decide what to show for `requested`.
///
/// Signed-out users asking for the task list land on `Home`; signed-in users
/// asking for `Home` are sent to the task list.
#[must_use]
pub const fn resolve(requested: View, authenticated: bool) -> Navigation {
    match (requested, authenticated) {
        (View::Tasks, false) => Navigation::Redirect(View::Home),
        (View::Home, true) => Navigation::Redirect(View::Tasks),
        (view, _) => Navigation::Render(view),
    }
}
