//! Application state management for billdesk.
//!
//! `App` owns the session store and is the only code that feeds it results.
//! Verifier round trips and data fetches run on spawned tasks and report back
//! through an mpsc channel. Every message carries the generation it was
//! started under, so anything that outlived its session is dropped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use billdesk_core::api::{ApiClient, ApiError};
use billdesk_core::auth::flow::{self, BootPlan};
use billdesk_core::auth::{
    Completion, Credentials, Generation, HttpVerifier, LoginAttempt, LoginCompletion,
    SessionStatus, SessionStore, SessionVerifier, Verification,
};
use billdesk_core::cache::{CacheAges, CacheManager};
use billdesk_core::config::{Config, ENV_PASSWORD};
use billdesk_core::gate::{AccessGate, Landing, Route};
use billdesk_core::models::{CompanyBills, Template, TemplateDraft, UnpaidBills};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NAME_LENGTH: usize = 100;
const MAX_SUBJECT_LENGTH: usize = 200;
const MAX_BODY_LENGTH: usize = 5000;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Which half of the dashboard has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardPanel {
    Templates,
    Bills,
}

/// Template editor focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Name,
    Mail,
    Subject,
    Body,
    Companies,
    Save,
}

impl EditorField {
    pub const TEXT_FIELDS: [EditorField; 4] = [
        EditorField::Name,
        EditorField::Mail,
        EditorField::Subject,
        EditorField::Body,
    ];

    pub fn next(self) -> Self {
        match self {
            EditorField::Name => EditorField::Mail,
            EditorField::Mail => EditorField::Subject,
            EditorField::Subject => EditorField::Body,
            EditorField::Body => EditorField::Companies,
            EditorField::Companies => EditorField::Save,
            EditorField::Save => EditorField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EditorField::Name => EditorField::Save,
            EditorField::Mail => EditorField::Name,
            EditorField::Subject => EditorField::Mail,
            EditorField::Body => EditorField::Subject,
            EditorField::Companies => EditorField::Body,
            EditorField::Save => EditorField::Companies,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditorField::Name => "Name",
            EditorField::Mail => "Mail",
            EditorField::Subject => "Subject",
            EditorField::Body => "Body",
            EditorField::Companies => "Companies",
            EditorField::Save => "Save",
        }
    }

    fn max_len(self) -> usize {
        match self {
            EditorField::Name => MAX_NAME_LENGTH,
            EditorField::Mail => MAX_EMAIL_LENGTH,
            EditorField::Subject => MAX_SUBJECT_LENGTH,
            EditorField::Body => MAX_BODY_LENGTH,
            EditorField::Companies | EditorField::Save => 0,
        }
    }
}

/// Form state for creating or editing a template
#[derive(Debug, Clone)]
pub struct EditorState {
    /// `None` when creating a new template.
    pub template_id: Option<i64>,
    pub draft: TemplateDraft,
    pub focus: EditorField,
    pub company_selection: usize,
    /// Waiting for the existing template to arrive.
    pub loading: bool,
    /// Ticket of the save request in flight.
    pub pending_save: Option<u64>,
    pub error: Option<String>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            template_id: None,
            draft: TemplateDraft::default(),
            focus: EditorField::Name,
            company_selection: 0,
            loading: false,
            pending_save: None,
            error: None,
        }
    }
}

impl EditorState {
    fn for_template(id: i64) -> Self {
        Self {
            template_id: Some(id),
            loading: true,
            ..Default::default()
        }
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn field(&self, field: EditorField) -> Option<&str> {
        match field {
            EditorField::Name => Some(&self.draft.name),
            EditorField::Mail => Some(&self.draft.mail),
            EditorField::Subject => Some(&self.draft.subject),
            EditorField::Body => Some(&self.draft.body),
            EditorField::Companies | EditorField::Save => None,
        }
    }

    pub fn field_mut(&mut self, field: EditorField) -> Option<&mut String> {
        match field {
            EditorField::Name => Some(&mut self.draft.name),
            EditorField::Mail => Some(&mut self.draft.mail),
            EditorField::Subject => Some(&mut self.draft.subject),
            EditorField::Body => Some(&mut self.draft.body),
            EditorField::Companies | EditorField::Save => None,
        }
    }

    pub fn is_company_selected(&self, id: i64) -> bool {
        self.draft.company_ids.contains(&id)
    }

    pub fn toggle_company(&mut self, id: i64) {
        if let Some(pos) = self.draft.company_ids.iter().position(|&c| c == id) {
            self.draft.company_ids.remove(pos);
        } else {
            self.draft.company_ids.push(id);
        }
    }

    /// Select every company, or clear the selection if all are selected.
    pub fn toggle_all_companies(&mut self, all: &[i64]) {
        if all.iter().all(|id| self.draft.company_ids.contains(id)) {
            self.draft.company_ids.clear();
        } else {
            self.draft.company_ids = all.to_vec();
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages from spawned tasks back to the app.
///
/// Data results carry the session generation that was current when the
/// request was made.
enum TaskResult {
    Verified(Verification),
    LoggedIn(LoginAttempt),
    Templates(Generation, Vec<Template>),
    UnpaidBills(Generation, UnpaidBills),
    RefreshComplete(Generation),
    TemplateLoaded(Generation, Template),
    TemplateSaved(Generation, u64),
    /// The backend answered 401 to a data call.
    Unauthorized(Generation),
    RefreshFailed(Generation, String),
    TemplateLoadFailed(Generation, i64, String),
    SaveFailed(Generation, u64, String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    verifier: Arc<dyn SessionVerifier>,
    pub api: ApiClient,
    pub cache: CacheManager,

    // Navigation
    pub state: AppState,
    pub route: Route,
    pub signing_in: bool,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Dashboard
    pub templates: Vec<Template>,
    pub unpaid: UnpaidBills,
    pub dashboard_panel: DashboardPanel,
    pub template_selection: usize,
    pub company_selection: usize,
    pub expanded_companies: HashSet<i64>,
    pub refreshing: bool,

    pub editor: EditorState,

    pub status_message: Option<String>,
    pub cache_ages: CacheAges,

    last_verified: Option<Instant>,
    persist_config: bool,
    next_save: u64,

    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create the application from the user's config, starting at `route`.
    pub fn new(config: Config, route: Route) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url(), config.timeout())?;
        debug!(base_url = api.base_url(), "API client configured");

        let verifier: Arc<dyn SessionVerifier> = Arc::new(HttpVerifier::new(api.clone()));
        let session = SessionStore::new(config.credential_cache()?);
        let cache = CacheManager::new(config.data_dir()?)?;

        let mut app = Self::with_parts(config, session, verifier, api, cache, route);
        app.login_password = std::env::var(ENV_PASSWORD).unwrap_or_default();
        app.persist_config = true;
        Ok(app)
    }

    fn with_parts(
        config: Config,
        session: SessionStore,
        verifier: Arc<dyn SessionVerifier>,
        api: ApiClient,
        cache: CacheManager,
        route: Route,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login_email = config.login_email().unwrap_or_default();

        let mut app = Self {
            config,
            session,
            verifier,
            api,
            cache,

            state: AppState::Normal,
            route,
            signing_in: false,

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_error: None,

            templates: Vec::new(),
            unpaid: UnpaidBills::default(),
            dashboard_panel: DashboardPanel::Templates,
            template_selection: 0,
            company_selection: 0,
            expanded_companies: HashSet::new(),
            refreshing: false,

            editor: EditorState::default(),

            status_message: None,
            cache_ages: CacheAges::default(),

            last_verified: None,
            persist_config: false,
            next_save: 0,

            task_rx: rx,
            task_tx: tx,
        };
        // Prepare the start route's view state; data waits for the session
        app.navigate(route);
        app
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// What should be on screen right now.
    pub fn view(&self) -> Landing {
        AccessGate::land(self.session.status(), self.route)
    }

    /// Replace the current route with the gate's redirect target, if any.
    pub fn sync_route(&mut self) {
        if let Landing::Show(target) = self.view() {
            if target != self.route {
                debug!(from = %self.route, to = %target, "Redirecting");
                self.navigate(target);
            }
        }
    }

    pub fn navigate(&mut self, route: Route) {
        self.route = route;
        match route {
            Route::Login => {
                self.login_focus = if self.login_email.is_empty() {
                    LoginFocus::Email
                } else {
                    LoginFocus::Password
                };
            }
            Route::Dashboard => {}
            Route::NewTemplate => self.editor = EditorState::default(),
            Route::EditTemplate(id) => self.editor = EditorState::for_template(id),
        }
        self.load_route_data();
    }

    /// Fetch whatever the current route still needs. Only runs once signed in.
    fn load_route_data(&mut self) {
        if let Route::EditTemplate(id) = self.route {
            if self.editor.loading && self.editor.template_id == Some(id) {
                self.load_template(id);
            }
        }
    }

    pub fn request_quit(&mut self) {
        self.state = AppState::ConfirmingQuit;
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Start the boot check. Without a credential hint this settles at once.
    pub fn start_boot(&mut self) {
        match flow::begin_boot(&mut self.session) {
            BootPlan::Verify { generation, hint } => self.spawn_verify(generation, Some(hint)),
            BootPlan::Settled(_) => self.on_session_settled(),
        }
    }

    /// Re-check an authenticated session once the revalidation interval passed.
    pub fn maybe_revalidate(&mut self) {
        if self.session.status() != SessionStatus::Authenticated {
            return;
        }
        let due = self
            .last_verified
            .map(|at| at.elapsed() >= self.config.revalidate_interval())
            .unwrap_or(true);
        if due {
            self.revalidate();
        }
    }

    pub fn revalidate(&mut self) {
        if let Some(generation) = self.session.begin_verification() {
            info!(generation = %generation, "Revalidating session");
            let hint = self.session.credential_hint().map(str::to_string);
            self.spawn_verify(generation, hint);
        }
    }

    /// Submit the login form
    pub fn attempt_login(&mut self) {
        let email = self.login_email.trim().to_string();
        if email.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return;
        }

        let Some(generation) = self.session.begin_login() else {
            debug!(status = %self.session.status(), "Login not available right now");
            return;
        };

        self.login_error = None;
        self.signing_in = true;

        let credentials = Credentials::new(email, self.login_password.clone());
        let verifier = Arc::clone(&self.verifier);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let attempt = verifier.login(generation, &credentials).await;
            Self::send_result(&tx, TaskResult::LoggedIn(attempt)).await;
        });
    }

    /// Explicit logout: local state is cleared before the remote sign-out.
    pub fn logout(&mut self) {
        let hint = self.session.credential_hint().map(str::to_string);
        self.session.logout();
        self.on_session_ended();
        self.status_message = Some("Signed out".to_string());

        let verifier = Arc::clone(&self.verifier);
        tokio::spawn(async move {
            verifier.sign_out(hint.as_deref()).await;
        });
    }

    /// A data call from `generation` was answered with 401.
    fn force_invalidation(&mut self, generation: Generation) {
        if !self.session.is_current(generation) {
            debug!(generation = %generation, "Ignoring 401 from a superseded session");
            return;
        }
        warn!(generation = %generation, "Backend rejected the session, signing out");
        self.session.invalidate();
        self.on_session_ended();
        self.login_error = Some("Your session has expired. Please sign in again.".to_string());
    }

    fn spawn_verify(&self, generation: Generation, hint: Option<String>) {
        let verifier = Arc::clone(&self.verifier);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let verification = verifier.verify(generation, hint.as_deref()).await;
            Self::send_result(&tx, TaskResult::Verified(verification)).await;
        });
    }

    fn on_session_settled(&mut self) {
        self.signing_in = false;
        match self.session.status() {
            SessionStatus::Authenticated => {
                match self.session.credential_hint() {
                    Some(hint) => self.api.set_token(hint.to_string()),
                    None => self.api.clear_token(),
                }
                self.last_verified = Some(Instant::now());
                if let Some(ticket) = self.editor.pending_save.take() {
                    // The save belonged to the previous generation; its answer is dropped
                    warn!(ticket, "Save outcome lost to a session check");
                    self.editor.error =
                        Some("Save may not have completed; refresh to check".to_string());
                }
                if self.templates.is_empty() && self.unpaid.companies.is_empty() {
                    self.load_from_cache();
                }
                self.refresh_dashboard();
                self.load_route_data();
            }
            SessionStatus::Unauthenticated => self.on_session_ended(),
            SessionStatus::Unknown | SessionStatus::Verifying => {}
        }
    }

    /// Drop everything that belonged to the signed-in user.
    fn on_session_ended(&mut self) {
        self.signing_in = false;
        self.refreshing = false;
        self.last_verified = None;
        self.api.clear_token();

        self.templates.clear();
        self.unpaid = UnpaidBills::default();
        self.expanded_companies.clear();
        self.template_selection = 0;
        self.company_selection = 0;
        self.editor = EditorState::default();

        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear data cache");
        }
        self.cache_ages = CacheAges::default();
    }

    fn remember_email(&mut self) {
        let email = self.login_email.trim().to_string();
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if self.persist_config {
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Show the last cached dashboard data while a refresh runs.
    pub fn load_from_cache(&mut self) {
        match self.cache.load_templates() {
            Ok(Some(cached)) => self.templates = cached.data,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load cached templates"),
        }
        match self.cache.load_unpaid_bills() {
            Ok(Some(cached)) => self.unpaid = cached.data,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load cached bills"),
        }
        self.cache_ages = self.cache.get_cache_ages();
    }

    pub fn refresh_dashboard(&mut self) {
        if self.session.status() != SessionStatus::Authenticated {
            return;
        }
        let generation = self.session.generation();
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        self.refreshing = true;
        self.status_message = None;

        tokio::spawn(async move {
            let (templates, unpaid) =
                futures::join!(api.fetch_templates(), api.fetch_unpaid_grouped());
            Self::send_data_result(
                &tx,
                generation,
                templates,
                |templates| TaskResult::Templates(generation, templates),
                |message| TaskResult::RefreshFailed(generation, message),
            )
            .await;
            Self::send_data_result(
                &tx,
                generation,
                unpaid,
                |unpaid| TaskResult::UnpaidBills(generation, unpaid),
                |message| TaskResult::RefreshFailed(generation, message),
            )
            .await;
            Self::send_result(&tx, TaskResult::RefreshComplete(generation)).await;
        });
    }

    fn load_template(&mut self, id: i64) {
        if self.session.status() != SessionStatus::Authenticated {
            return;
        }
        let generation = self.session.generation();
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_template(id).await;
            Self::send_data_result(
                &tx,
                generation,
                result,
                |template| TaskResult::TemplateLoaded(generation, template),
                |message| TaskResult::TemplateLoadFailed(generation, id, message),
            )
            .await;
        });
    }

    /// Submit the editor. Blank required fields are reported, not sent.
    pub fn save_template(&mut self) {
        let missing = self.editor.draft.missing_fields();
        if !missing.is_empty() {
            self.editor.error = Some(format!("Required: {}", missing.join(", ")));
            return;
        }
        if self.session.status() != SessionStatus::Authenticated
            || self.editor.is_saving()
            || self.editor.loading
        {
            return;
        }

        self.next_save += 1;
        let ticket = self.next_save;
        self.editor.error = None;
        self.editor.pending_save = Some(ticket);

        let generation = self.session.generation();
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let draft = self.editor.draft.clone();
        let template_id = self.editor.template_id;
        tokio::spawn(async move {
            let result = match template_id {
                Some(id) => api.update_template(id, &draft).await,
                None => api.create_template(&draft).await,
            };
            Self::send_data_result(
                &tx,
                generation,
                result,
                |()| TaskResult::TemplateSaved(generation, ticket),
                |message| TaskResult::SaveFailed(generation, ticket, message),
            )
            .await;
        });
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            error!("Failed to send task result - channel closed");
        }
    }

    /// Route a data call's outcome: 401 ends the session, anything else goes
    /// back to the request's owner through `ok` or `failed`.
    async fn send_data_result<T>(
        tx: &mpsc::Sender<TaskResult>,
        generation: Generation,
        result: Result<T, ApiError>,
        ok: impl FnOnce(T) -> TaskResult,
        failed: impl FnOnce(String) -> TaskResult,
    ) {
        let message = match result {
            Ok(data) => ok(data),
            Err(e) if e.is_unauthorized() => TaskResult::Unauthorized(generation),
            Err(e) => {
                if e.is_transport() {
                    warn!(error = %e, "Backend unreachable");
                } else {
                    error!(error = %e, "Request failed");
                }
                failed(failure_message(&e))
            }
        };
        Self::send_result(tx, message).await;
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            self.process_task_result(result);
        }
    }

    /// Data results only count if their session is still the current one.
    fn accepts_data(&self, generation: Generation) -> bool {
        let current = self.session.status() == SessionStatus::Authenticated
            && self.session.is_current(generation);
        if !current {
            debug!(generation = %generation, "Discarding data from a superseded session");
        }
        current
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Verified(verification) => {
                if let Completion::Applied(_) = flow::apply_verification(&mut self.session, verification) {
                    self.on_session_settled();
                }
            }
            TaskResult::LoggedIn(attempt) => match flow::apply_login(&mut self.session, attempt) {
                LoginCompletion::SignedIn => {
                    self.remember_email();
                    self.login_password.clear();
                    self.login_error = None;
                    self.on_session_settled();
                }
                LoginCompletion::Failed(failure) => {
                    self.on_session_settled();
                    // A transport fault keeps the password so the user can just retry
                    if !failure.is_transport() {
                        self.login_password.clear();
                        self.login_focus = LoginFocus::Password;
                    }
                    self.login_error = Some(failure.to_string());
                }
                LoginCompletion::Discarded => {}
            },
            TaskResult::Templates(generation, templates) => {
                if self.accepts_data(generation) {
                    if let Err(e) = self.cache.save_templates(&templates) {
                        warn!(error = %e, "Failed to cache templates");
                    }
                    self.templates = templates;
                    self.template_selection = self
                        .template_selection
                        .min(self.templates.len().saturating_sub(1));
                    self.cache_ages = self.cache.get_cache_ages();
                }
            }
            TaskResult::UnpaidBills(generation, unpaid) => {
                if self.accepts_data(generation) {
                    if let Err(e) = self.cache.save_unpaid_bills(&unpaid) {
                        warn!(error = %e, "Failed to cache unpaid bills");
                    }
                    self.unpaid = unpaid;
                    self.company_selection = self
                        .company_selection
                        .min(self.unpaid.companies.len().saturating_sub(1));
                    self.cache_ages = self.cache.get_cache_ages();
                }
            }
            TaskResult::RefreshComplete(generation) => {
                if self.session.is_current(generation) {
                    self.refreshing = false;
                }
            }
            TaskResult::TemplateLoaded(generation, template) => {
                if self.accepts_data(generation) && self.editor.template_id == Some(template.id) {
                    self.editor.draft = TemplateDraft::from(&template);
                    self.editor.loading = false;
                }
            }
            TaskResult::TemplateSaved(generation, ticket) => {
                if self.accepts_data(generation) {
                    info!(ticket, "Template saved");
                    self.status_message = Some("Template saved".to_string());
                    // Leave the editor only if it is still the form that was saved
                    if self.editor.pending_save == Some(ticket) {
                        self.editor.pending_save = None;
                        self.navigate(Route::Dashboard);
                    }
                    self.refresh_dashboard();
                }
            }
            TaskResult::Unauthorized(generation) => self.force_invalidation(generation),
            TaskResult::RefreshFailed(generation, message) => {
                if self.accepts_data(generation) {
                    self.refreshing = false;
                    self.status_message = Some(message);
                }
            }
            TaskResult::TemplateLoadFailed(generation, id, message) => {
                if self.accepts_data(generation)
                    && self.editor.loading
                    && self.editor.template_id == Some(id)
                {
                    self.editor.loading = false;
                    self.editor.error = Some(message);
                }
            }
            TaskResult::SaveFailed(generation, ticket, message) => {
                if self.accepts_data(generation) && self.editor.pending_save == Some(ticket) {
                    self.editor.pending_save = None;
                    self.editor.error = Some(message);
                }
            }
        }
    }

    // =========================================================================
    // Dashboard helpers
    // =========================================================================

    pub fn selected_template(&self) -> Option<&Template> {
        self.templates.get(self.template_selection)
    }

    pub fn selected_company(&self) -> Option<&CompanyBills> {
        self.unpaid.companies.get(self.company_selection)
    }

    pub fn edit_selected_template(&mut self) {
        if let Some(id) = self.selected_template().map(|t| t.id) {
            self.navigate(Route::EditTemplate(id));
        }
    }

    pub fn toggle_selected_company(&mut self) {
        if let Some(id) = self.selected_company().map(|c| c.id) {
            if !self.expanded_companies.remove(&id) {
                self.expanded_companies.insert(id);
            }
        }
    }

    /// Companies the editor can attach a template to.
    pub fn editor_companies(&self) -> &[CompanyBills] {
        &self.unpaid.companies
    }
}

/// Text shown for a failed data call. Transport trouble is worth a retry.
fn failure_message(e: &ApiError) -> String {
    if e.is_transport() {
        format!("Server unreachable, try again ({})", e)
    } else {
        e.to_string()
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a character should be accepted into an editor text field
pub fn can_add_field_char(field: EditorField, current_len: usize, c: char) -> bool {
    current_len < field.max_len() && is_valid_input_char(c)
}

/// Line breaks are the one control character the body accepts
pub fn can_add_body_newline(current_len: usize) -> bool {
    current_len < MAX_BODY_LENGTH
}

// ============================================================================
// Tests
// ============================================================================
