use axum::{
    Extension, Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, Request, State},
    http::{StatusCode, Uri},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::auth::{AccountAuthenticator, Authenticator, DemoAuthenticator};
use crate::config::{AuthMode, PortalConfig};
use crate::confirmation::ConfirmationView;
use crate::dashboard::{FormProgress, SubmitCheck, TrackedFields, check_submission, finalize};
use crate::error::{AuthError, PortalError, StoreError};
use crate::model::{
    LinkType, LoginForm, PitchDeckRef, RegisterForm, StartupStage, SubmissionForm,
    SupportingLink, User,
};
use crate::pages::{Banner, Pages};
use crate::session::{SessionRepository, StoreRepository, SubmissionRepository};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::validation::{FieldErrors, passwords_match, validate_registration};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "session";

/// Upper bound for a dashboard upload (pitch deck plus fields)
const MAX_UPLOAD_BYTES: usize = 12 * 1024 * 1024;

/// Shared state handed to every handler
pub struct AppState {
    pub config: PortalConfig,
    pub sessions: Arc<dyn SessionRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub auth: Arc<dyn Authenticator>,
    pub pages: Pages,
    submitting: Mutex<HashSet<String>>,
}

impl AppState {
    /// Assemble state from explicit parts
    pub fn new(
        config: PortalConfig,
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn Authenticator>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let repository = Arc::new(StoreRepository::new(store));
        Ok(AppState {
            config,
            sessions: repository.clone(),
            submissions: repository,
            auth,
            pages: Pages::new()?,
            submitting: Mutex::new(HashSet::new()),
        })
    }

    /// Pick the store and account backends named by the configuration
    pub fn from_config(config: PortalConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn KeyValueStore> = match &config.store_path {
            Some(path) => {
                log::info!("Using session store file {}", path.display());
                Arc::new(JsonFileStore::open(path)?)
            }
            None => {
                log::info!("Using in-memory session store");
                Arc::new(MemoryStore::new())
            }
        };

        let auth: Arc<dyn Authenticator> = match config.auth_mode {
            AuthMode::Demo => {
                log::warn!("Demo authentication enabled: any credentials log in as the demo user");
                Arc::new(DemoAuthenticator)
            }
            AuthMode::Accounts => {
                let accounts = AccountAuthenticator::open(&config.accounts_path)?;
                log::info!(
                    "Loaded {} accounts from {}",
                    accounts.account_count(),
                    config.accounts_path.display()
                );
                Arc::new(accounts)
            }
        };

        Self::new(config, store, auth)
    }

    /// Mark a submit as in flight for `session_id`
    ///
    /// Returns `None` while another submit for the same session is running.
    pub fn begin_submit(&self, session_id: &str) -> Option<SubmitGuard<'_>> {
        let mut submitting = self.submitting.lock().ok()?;
        if !submitting.insert(session_id.to_string()) {
            return None;
        }
        Some(SubmitGuard {
            state: self,
            session_id: session_id.to_string(),
        })
    }

    pub fn is_submitting(&self, session_id: &str) -> bool {
        self.submitting
            .lock()
            .map(|submitting| submitting.contains(session_id))
            .unwrap_or(false)
    }
}

/// Clears the in-flight mark when dropped
pub struct SubmitGuard<'a> {
    state: &'a AppState,
    session_id: String,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut submitting) = self.state.submitting.lock() {
            submitting.remove(&self.session_id);
        }
    }
}

/// Session resolved by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub user: User,
}

#[derive(Deserialize)]
struct LoginQuery {
    registered: Option<bool>,
    logged_out: Option<bool>,
}

#[derive(Deserialize)]
struct ConfirmationQuery {
    submitted: Option<bool>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn run(config: PortalConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.http_addr;
    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/dashboard", get(serve_dashboard).post(handle_submit))
        .route("/confirmation", get(serve_confirmation))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health_check))
        .route("/register", get(serve_register_page).post(handle_register))
        .route("/login", get(serve_login_page).post(handle_login))
        .route("/logout", get(handle_logout).post(handle_logout))
        .route("/api/progress", post(compute_progress))
        .merge(guarded)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(serve_not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}

fn page(status: StatusCode, html: String) -> Response {
    (status, Html(html)).into_response()
}

/// Entry guard for pages that need a logged-in user
///
/// Requests without a session user are redirected to the login page.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(id) = session_id(&jar) {
        match state.sessions.load_user(&id) {
            Ok(Some(user)) => {
                request
                    .extensions_mut()
                    .insert(CurrentSession { id, user });
                return next.run(request).await;
            }
            Ok(None) => {}
            Err(e) => return PortalError::from(e).into_response(),
        }
    }

    log::debug!("no session user for {}, redirecting to login", request.uri().path());
    Redirect::to("/login").into_response()
}

async fn serve_index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Redirect, PortalError> {
    if let Some(id) = session_id(&jar) {
        if state.sessions.load_user(&id)?.is_some() {
            return Ok(Redirect::to("/dashboard"));
        }
    }
    Ok(Redirect::to("/login"))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn serve_register_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, PortalError> {
    let html = state
        .pages
        .register(&RegisterForm::default(), &FieldErrors::new(), None)?;
    Ok(Html(html))
}

/// Handle a registration form
///
/// Field errors and a password mismatch re-render the form without
/// navigating away. A successful registration redirects to the login page.
async fn handle_register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PortalError> {
    if let Err(errors) = validate_registration(&form) {
        let html = state.pages.register(&form, &errors, None)?;
        return Ok(page(StatusCode::UNPROCESSABLE_ENTITY, html));
    }

    if !passwords_match(&form) {
        let banner = Banner::error("Password Error", "Passwords do not match");
        let html = state.pages.register(&form, &FieldErrors::new(), Some(&banner))?;
        return Ok(page(StatusCode::UNPROCESSABLE_ENTITY, html));
    }

    tokio::time::sleep(state.config.auth_delay).await;

    match state.auth.register(&form) {
        Ok(account) => {
            log::info!("registered {}", account.user.roll_number);
            Ok(Redirect::to("/login?registered=true").into_response())
        }
        Err(AuthError::AlreadyRegistered(who)) => {
            let banner = Banner::error(
                "Registration Failed",
                &format!("{} is already registered", who),
            );
            let html = state.pages.register(&form, &FieldErrors::new(), Some(&banner))?;
            Ok(page(StatusCode::CONFLICT, html))
        }
        Err(e) => Err(e.into()),
    }
}

async fn serve_login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, PortalError> {
    let banner = if query.registered.unwrap_or(false) {
        Some(Banner::success(
            "Registration Successful!",
            "Your account has been created successfully.",
        ))
    } else if query.logged_out.unwrap_or(false) {
        Some(Banner::success(
            "Logged out successfully",
            "You have been logged out of your account.",
        ))
    } else {
        None
    };

    let html = state.pages.login("", &FieldErrors::new(), banner.as_ref())?;
    Ok(Html(html))
}

/// Handle a login form
///
/// On success the user is written to the session store and the browser is
/// sent to the dashboard. A browser whose cookie still names a logged-in
/// session keeps that id; otherwise a fresh one is issued.
#[axum::debug_handler]
async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PortalError> {
    let mut errors = FieldErrors::new();
    if form.email_or_roll.is_empty() {
        errors.add("emailOrRoll", "Email or roll number is required");
    }
    if form.password.is_empty() {
        errors.add("password", "Password is required");
    }
    if !errors.is_empty() {
        let html = state.pages.login(&form.email_or_roll, &errors, None)?;
        return Ok(page(StatusCode::UNPROCESSABLE_ENTITY, html));
    }

    tokio::time::sleep(state.config.auth_delay).await;

    let user = match state.auth.authenticate(&form.email_or_roll, &form.password) {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) | Err(AuthError::MissingCredentials) => {
            log::info!("rejected login for {:?}", form.email_or_roll.trim());
            let banner = Banner::error("Login Failed", "Invalid email/roll number or password");
            let html = state
                .pages
                .login(&form.email_or_roll, &FieldErrors::new(), Some(&banner))?;
            return Ok(page(StatusCode::UNAUTHORIZED, html));
        }
        Err(e) => return Err(e.into()),
    };

    let id = match session_id(&jar) {
        Some(id) if state.sessions.load_user(&id)?.is_some() => id,
        _ => Uuid::new_v4().to_string(),
    };
    state.sessions.save_user(&id, &user)?;
    log::info!("{} logged in", user.roll_number);

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to("/dashboard")).into_response())
}

/// Clear the session user and submission, then drop the cookie
async fn handle_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), PortalError> {
    if let Some(id) = session_id(&jar) {
        state.sessions.clear(&id)?;
        log::info!("session {} logged out", id);
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    Ok((jar.remove(removal), Redirect::to("/login?logged_out=true")))
}

async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Html<String>, PortalError> {
    if state.submissions.load_submission(&session.id)?.is_some() {
        return Ok(Html(state.pages.submitted(&session.user)?));
    }

    let form = SubmissionForm {
        phone_number: session.user.phone.clone(),
        ..SubmissionForm::default()
    };
    let html = state
        .pages
        .dashboard(&session.user, &form, &FieldErrors::new(), None)?;
    Ok(Html(html))
}

/// Handle the startup idea form
///
/// A session that already holds a submission is sent back to the dashboard,
/// which then shows the read-only state.
async fn handle_submit(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
    multipart: Multipart,
) -> Result<Response, PortalError> {
    if state.submissions.load_submission(&session.id)?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let _guard = state
        .begin_submit(&session.id)
        .ok_or(PortalError::SubmitInFlight)?;

    let form = read_submission_form(multipart).await?;

    if let SubmitCheck::Rejected { errors, banner } = check_submission(&form) {
        let banner = Banner::error("Submission Incomplete", &banner);
        let html = state
            .pages
            .dashboard(&session.user, &form, &errors, Some(&banner))?;
        return Ok(page(StatusCode::UNPROCESSABLE_ENTITY, html));
    }

    tokio::time::sleep(state.config.submit_delay).await;

    let submission = finalize(form, Utc::now());
    match state.submissions.create_submission(&session.id, &submission) {
        Ok(()) => {
            log::info!(
                "{} submitted {:?} at {}",
                session.user.roll_number,
                submission.form.idea_title,
                submission.submitted_at
            );
            Ok(Redirect::to("/confirmation?submitted=true").into_response())
        }
        Err(StoreError::AlreadyExists(_)) => Ok(Redirect::to("/dashboard").into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Collect the dashboard form from a multipart body
///
/// Only the name, type and size of the pitch deck are kept. Link rows pair
/// `linkType` and `linkUrl` fields in order; rows with a blank url are dropped.
async fn read_submission_form(mut multipart: Multipart) -> Result<SubmissionForm, PortalError> {
    let mut form = SubmissionForm::default();
    let mut link_types = Vec::new();
    let mut link_urls = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pitchDeck" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if !file_name.is_empty() && !data.is_empty() {
                    form.pitch_deck = Some(PitchDeckRef {
                        file_name,
                        content_type,
                        size: data.len() as u64,
                    });
                }
            }
            "ideaTitle" => form.idea_title = field.text().await?,
            "problemStatement" => form.problem_statement = field.text().await?,
            "proposedSolution" => form.proposed_solution = field.text().await?,
            "oneLinerPitch" => form.one_liner_pitch = field.text().await?,
            "detailedExplanation" => form.detailed_explanation = field.text().await?,
            "phoneNumber" => form.phone_number = field.text().await?,
            "startupStage" => form.startup_stage = StartupStage::from_strng(&field.text().await?),
            "linkType" => link_types.push(field.text().await?),
            "linkUrl" => link_urls.push(field.text().await?),
            _ => {}
        }
    }

    form.supporting_links = link_types
        .iter()
        .zip(link_urls)
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|(kind, url)| SupportingLink {
            link_type: LinkType::from_strng(kind),
            url: url.trim().to_string(),
        })
        .collect();

    Ok(form)
}

/// Live form state for the dashboard script
async fn compute_progress(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(fields): Json<TrackedFields>,
) -> Json<FormProgress> {
    let submitting = session_id(&jar).is_some_and(|id| state.is_submitting(&id));
    Json(fields.evaluate(submitting))
}

async fn serve_confirmation(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
    Query(query): Query<ConfirmationQuery>,
) -> Result<Response, PortalError> {
    let Some(submission) = state.submissions.load_submission(&session.id)? else {
        log::debug!("no submission for session {}, redirecting to dashboard", session.id);
        return Ok(Redirect::to("/dashboard").into_response());
    };

    let view = ConfirmationView::new(&session.user, &submission)?;
    let banner = query.submitted.unwrap_or(false).then(|| {
        Banner::success(
            "Submission Successful!",
            "Your startup idea has been submitted successfully.",
        )
    });

    let html = state.pages.confirmation(&view, banner.as_ref())?;
    Ok(Html(html).into_response())
}

async fn serve_not_found(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    match state.pages.not_found(uri.path()) {
        Ok(html) => page(StatusCode::NOT_FOUND, html),
        Err(e) => PortalError::from(e).into_response(),
    }
}
