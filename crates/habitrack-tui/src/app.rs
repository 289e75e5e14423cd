//! Application state management for the habitrack terminal shell.
//!
//! This module contains the `App` struct that holds UI state, the navigation
//! stack, the form contents, and the plumbing that runs session operations
//! in the background so the UI stays responsive while a request is pending.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use habitrack_core::auth::AuthError;
use habitrack_core::forms::{FormField, LoginForm, RegisterForm, SubmitError};
use habitrack_core::{Config, GuardDecision, Identity, Navigator, Route, RouteGuard, SessionStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background operation result channel.
/// Only one operation runs at a time, so a small buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 8;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingNotice,
    ConfirmingLogout,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
    RegisterLink,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::RegisterLink,
            LoginFocus::RegisterLink => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::RegisterLink,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::RegisterLink => LoginFocus::Button,
        }
    }

    pub fn field(&self) -> Option<FormField> {
        match self {
            LoginFocus::Email => Some(FormField::Email),
            LoginFocus::Password => Some(FormField::Password),
            LoginFocus::Button | LoginFocus::RegisterLink => None,
        }
    }
}

/// Register form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Button,
}

impl RegisterFocus {
    pub fn next(&self) -> Self {
        match self {
            RegisterFocus::Name => RegisterFocus::Email,
            RegisterFocus::Email => RegisterFocus::Password,
            RegisterFocus::Password => RegisterFocus::ConfirmPassword,
            RegisterFocus::ConfirmPassword => RegisterFocus::Button,
            RegisterFocus::Button => RegisterFocus::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RegisterFocus::Name => RegisterFocus::Button,
            RegisterFocus::Email => RegisterFocus::Name,
            RegisterFocus::Password => RegisterFocus::Email,
            RegisterFocus::ConfirmPassword => RegisterFocus::Password,
            RegisterFocus::Button => RegisterFocus::ConfirmPassword,
        }
    }

    pub fn field(&self) -> Option<FormField> {
        match self {
            RegisterFocus::Name => Some(FormField::Name),
            RegisterFocus::Email => Some(FormField::Email),
            RegisterFocus::Password => Some(FormField::Password),
            RegisterFocus::ConfirmPassword => Some(FormField::ConfirmPassword),
            RegisterFocus::Button => None,
        }
    }
}

/// Modal message, dismissed with Enter or Esc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

/// Session operation currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Login,
    Register,
    Logout,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned session operations.
enum OpResult {
    SessionChecked,
    Login(Result<Identity, SubmitError>),
    Register(Result<Identity, SubmitError>),
    Logout(Result<(), AuthError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    config_path: Option<PathBuf>,
    pub store: Arc<SessionStore>,
    guard: RouteGuard,

    // Navigation
    pub navigator: Navigator,
    pub decision: GuardDecision,

    // UI State
    pub state: AppState,
    pub notice: Option<Notice>,
    pub pending: Option<PendingOp>,
    pub spinner_tick: usize,

    // Login form state
    pub login_form: LoginForm,
    pub login_focus: LoginFocus,

    // Register form state
    pub register_form: RegisterForm,
    pub register_focus: RegisterFocus,

    // Background task channel
    op_rx: mpsc::Receiver<OpResult>,
    op_tx: mpsc::Sender<OpResult>,
}

impl App {
    /// Create a new application instance around an existing session store.
    /// The guard subscribes here, before any session operation runs.
    /// Config changes are written to `config_path` when one is given.
    pub fn new(config: Config, config_path: Option<PathBuf>, store: Arc<SessionStore>) -> Self {
        let guard = RouteGuard::new(&store);
        let (op_tx, op_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_form = config
            .last_email
            .clone()
            .map(LoginForm::with_email)
            .unwrap_or_default();
        let login_focus = if login_form.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };

        Self {
            config,
            config_path,
            store,
            guard,

            navigator: Navigator::new(),
            decision: GuardDecision::Loading,

            state: AppState::Normal,
            notice: None,
            pending: None,
            spinner_tick: 0,

            login_form,
            login_focus,

            register_form: RegisterForm::default(),
            register_focus: RegisterFocus::Name,

            op_rx,
            op_tx,
        }
    }

    pub fn current_route(&self) -> Route {
        self.navigator.current()
    }

    /// Whether a session operation is in flight; forms are disabled meanwhile.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store.identity()
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Run the startup session check in the background
    pub fn start_session_check(&self) {
        let store = self.store.clone();
        let tx = self.op_tx.clone();
        tokio::spawn(async move {
            store.check_session().await;
            Self::send_result(&tx, OpResult::SessionChecked).await;
        });
    }

    /// Submit the login form
    pub fn submit_login(&mut self) {
        if self.is_busy() {
            return;
        }
        self.pending = Some(PendingOp::Login);

        let form = self.login_form.clone();
        let store = self.store.clone();
        let tx = self.op_tx.clone();
        tokio::spawn(async move {
            let result = form.submit(&store).await;
            Self::send_result(&tx, OpResult::Login(result)).await;
        });
    }

    /// Submit the register form
    pub fn submit_register(&mut self) {
        if self.is_busy() {
            return;
        }
        self.pending = Some(PendingOp::Register);

        let form = self.register_form.clone();
        let store = self.store.clone();
        let tx = self.op_tx.clone();
        tokio::spawn(async move {
            let result = form.submit(&store).await;
            Self::send_result(&tx, OpResult::Register(result)).await;
        });
    }

    /// Ask for confirmation before logging out
    pub fn request_logout(&mut self) {
        if !self.is_busy() {
            self.state = AppState::ConfirmingLogout;
        }
    }

    pub fn confirm_logout(&mut self) {
        self.state = AppState::Normal;
        if self.is_busy() {
            return;
        }
        self.pending = Some(PendingOp::Logout);

        let store = self.store.clone();
        let tx = self.op_tx.clone();
        tokio::spawn(async move {
            let result = store.logout().await;
            Self::send_result(&tx, OpResult::Logout(result)).await;
        });
    }

    async fn send_result(tx: &mpsc::Sender<OpResult>, result: OpResult) {
        if tx.send(result).await.is_err() {
            debug!("App closed before operation finished");
        }
    }

    // =========================================================================
    // Event loop hooks
    // =========================================================================

    /// Called once per frame: collect finished operations, then let the
    /// guard bring navigation in line with the session.
    pub fn tick(&mut self) {
        self.spinner_tick = self.spinner_tick.wrapping_add(1);
        self.check_background_tasks();
        self.sync_navigation();
    }

    fn sync_navigation(&mut self) {
        let before = self.navigator.current();
        self.decision = self.guard.sync(&mut self.navigator);
        let after = self.navigator.current();

        if before != after {
            debug!(from = before.path(), to = after.path(), "Navigated");
            if after == Route::Login {
                self.reset_login_focus();
            }
        }
    }

    /// Check for completed background operations and process results
    fn check_background_tasks(&mut self) {
        while let Ok(result) = self.op_rx.try_recv() {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: OpResult) {
        match result {
            OpResult::SessionChecked => {}
            OpResult::Login(result) => {
                self.pending = None;
                match result {
                    Ok(identity) => {
                        self.login_form.password.clear();
                        self.remember_email(identity.email.as_deref());
                    }
                    Err(e) => self.show_submit_error("Login Failed", e),
                }
            }
            OpResult::Register(result) => {
                self.pending = None;
                match result {
                    Ok(identity) => {
                        self.register_form = RegisterForm::default();
                        self.register_focus = RegisterFocus::Name;
                        self.remember_email(identity.email.as_deref());
                        self.show_notice("Success", "Account created successfully!", false);
                    }
                    Err(e) => self.show_submit_error("Registration Failed", e),
                }
            }
            OpResult::Logout(result) => {
                self.pending = None;
                if let Err(e) = result {
                    self.show_notice("Error", &e.to_string(), true);
                }
            }
        }
    }

    fn show_submit_error(&mut self, title: &str, err: SubmitError) {
        match err {
            // Validation never reached the service; it is an input mistake.
            SubmitError::Invalid(e) => self.show_notice("Error", &e.to_string(), true),
            SubmitError::Auth(e) => self.show_notice(title, &e.to_string(), true),
        }
    }

    pub fn show_notice(&mut self, title: &str, message: &str, is_error: bool) {
        self.notice = Some(Notice {
            title: title.to_string(),
            message: message.to_string(),
            is_error,
        });
        self.state = AppState::ShowingNotice;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.state = AppState::Normal;
    }

    fn remember_email(&mut self, email: Option<&str>) {
        let Some(email) = email else { return };
        self.login_form.email = email.to_string();
        if self.config.last_email.as_deref() == Some(email) {
            return;
        }
        self.config.last_email = Some(email.to_string());
        let Some(path) = &self.config_path else { return };
        match Config::save_last_email(path, email) {
            Ok(()) => info!("Saved last email to config"),
            Err(e) => warn!(error = %e, "Failed to save config"),
        }
    }

    fn reset_login_focus(&mut self) {
        self.login_focus = if self.login_form.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn open_register(&mut self) {
        if self.current_route() == Route::Login {
            self.register_focus = RegisterFocus::Name;
            self.navigator.push(Route::Register);
        }
    }

    pub fn go_back(&mut self) -> bool {
        self.navigator.back()
    }

    pub fn select_tab(&mut self, tab: Route) {
        self.navigator.select_tab(tab);
    }

    pub fn next_tab(&mut self) {
        let next = self.current_route().next_tab();
        self.navigator.select_tab(next);
    }

    pub fn prev_tab(&mut self) {
        let prev = self.current_route().prev_tab();
        self.navigator.select_tab(prev);
    }
}

// ============================================================================
// Tests
// ============================================================================
