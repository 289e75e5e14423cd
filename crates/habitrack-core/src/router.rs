//! Routes and the navigation stack.

/// Every screen of the app.
///
/// `Entry` is the root screen shown at startup. `Home`, `Habits` and
/// `Profile` are the tabs of the protected area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Route {
    Entry,
    Login,
    Register,
    Home,
    Habits,
    Profile,
}

impl Route {
    pub const TABS: [Route; 3] = [Route::Home, Route::Habits, Route::Profile];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Entry => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Home => "/(tabs)",
            Route::Habits => "/(tabs)/habits",
            Route::Profile => "/(tabs)/profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Entry => "",
            Route::Login => "Login",
            Route::Register => "Create Account",
            Route::Home => "Home",
            Route::Habits => "Habits",
            Route::Profile => "Profile",
        }
    }

    /// Screens inside the signed-in tab group.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home | Route::Habits | Route::Profile)
    }

    /// Screens only meant for signed-out users.
    pub fn is_anonymous_only(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    /// Get the next tab (wrapping around). Non-tab routes are returned as is.
    pub fn next_tab(&self) -> Self {
        match self {
            Route::Home => Route::Habits,
            Route::Habits => Route::Profile,
            Route::Profile => Route::Home,
            other => *other,
        }
    }

    /// Get the previous tab (wrapping around). Non-tab routes are returned as is.
    pub fn prev_tab(&self) -> Self {
        match self {
            Route::Home => Route::Profile,
            Route::Habits => Route::Home,
            Route::Profile => Route::Habits,
            other => *other,
        }
    }
}

/// A navigation instruction issued by the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// Make the route the only entry in history.
    Replace(Route),
}

/// Stack-based navigation history. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            stack: vec![Route::Entry],
        }
    }

    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(Route::Entry)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, route: Route) {
        if self.current() != route {
            self.stack.push(route);
        }
    }

    /// Replace the whole history with `route`, so back-navigation cannot
    /// return to the screens before it.
    pub fn replace(&mut self, route: Route) {
        self.stack.clear();
        self.stack.push(route);
    }

    /// Switch tabs in place. Ignored outside the tab group.
    pub fn select_tab(&mut self, tab: Route) {
        if !tab.is_protected() || !self.current().is_protected() {
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            *top = tab;
        }
    }

    /// Pop the current screen. Returns false at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn apply(&mut self, command: NavCommand) {
        match command {
            NavCommand::Replace(route) => self.replace(route),
        }
    }
}
