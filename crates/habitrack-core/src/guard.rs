//! Route guard: keeps the visible screen consistent with the session.
//!
//! The guard subscribes to the session store. Each transition the store
//! publishes becomes one `NavCommand::Replace` (signed in → Home, signed
//! out → Login). Independently of transitions, every screen is checked
//! before it renders, so a protected screen is never drawn without a
//! session and nothing but a loading indicator is drawn while the startup
//! check is pending.

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::auth::{SessionEvent, SessionState, SessionStatus, SessionStore};
use crate::router::{NavCommand, Navigator, Route};

/// What the UI should do with the screen it is about to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not resolved yet: draw only a loading indicator.
    Loading,
    /// The screen may be drawn.
    Render,
    /// The screen must not be drawn; go here instead.
    Redirect(Route),
}

/// Where the app belongs for a given status, if it has settled.
pub fn destination(status: SessionStatus) -> Option<Route> {
    match status {
        SessionStatus::Resolving => None,
        SessionStatus::Authenticated => Some(Route::Home),
        SessionStatus::Anonymous => Some(Route::Login),
    }
}

/// Decide whether `route` may render under `status`.
pub fn evaluate(status: SessionStatus, route: Route) -> GuardDecision {
    match status {
        SessionStatus::Resolving => GuardDecision::Loading,
        SessionStatus::Authenticated if route.is_protected() => GuardDecision::Render,
        SessionStatus::Authenticated => GuardDecision::Redirect(Route::Home),
        SessionStatus::Anonymous if route.is_anonymous_only() => GuardDecision::Render,
        SessionStatus::Anonymous => GuardDecision::Redirect(Route::Login),
    }
}

pub struct RouteGuard {
    state_rx: watch::Receiver<SessionState>,
    events_rx: broadcast::Receiver<SessionEvent>,
}

impl RouteGuard {
    /// Subscribe to `store`. Create the guard before the startup check runs
    /// so the first transition is observed as an event.
    pub fn new(store: &SessionStore) -> Self {
        Self {
            state_rx: store.subscribe(),
            events_rx: store.subscribe_events(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state_rx.borrow().status()
    }

    pub fn decide(&self, route: Route) -> GuardDecision {
        evaluate(self.status(), route)
    }

    /// Commands for every transition published since the last call.
    pub fn poll(&mut self) -> Vec<NavCommand> {
        let mut commands = Vec::new();
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    debug!(trigger = ?event.trigger, status = ?event.status, "Session transition observed");
                    if let Some(route) = destination(event.status) {
                        commands.push(NavCommand::Replace(route));
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Route guard fell behind session transitions");
                    if let Some(route) = destination(self.status()) {
                        commands.push(NavCommand::Replace(route));
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        commands
    }

    /// Wait for the next transition and return its command.
    /// Returns `None` once the store is gone.
    pub async fn next_command(&mut self) -> Option<NavCommand> {
        loop {
            match self.events_rx.recv().await {
                Ok(event) => {
                    if let Some(route) = destination(event.status) {
                        return Some(NavCommand::Replace(route));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Route guard fell behind session transitions");
                    if let Some(route) = destination(self.status()) {
                        return Some(NavCommand::Replace(route));
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Apply pending transitions to `navigator`, then check the screen about
    /// to render and redirect if it is not allowed. Returns `Loading` or
    /// `Render` for the resulting current route.
    pub fn sync(&mut self, navigator: &mut Navigator) -> GuardDecision {
        for command in self.poll() {
            navigator.apply(command);
        }

        match self.decide(navigator.current()) {
            GuardDecision::Redirect(route) => {
                debug!(from = navigator.current().path(), to = route.path(), "Guard redirect");
                navigator.replace(route);
                self.decide(route)
            }
            decision => decision,
        }
    }
}
