//! Shared core for Reunite, a missing-person reporting client.
//!
//! The crate is a headless state machine embedded by platform shells (web,
//! mobile). Shells feed [`Event`]s in, receive effect requests out, and render
//! the [`ViewModel`]. All domain rules live here; the shells stay thin.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod capabilities;
pub mod event;
pub mod gateway;
pub mod model;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capabilities::{Capabilities, HttpError};
use crate::model::{
    guard, partition_cases, sort_history, trail_feature, AdminStats, Case, CaseDraft,
    ConfirmAction, Coordinate, Credentials, DashboardJoin, GuardOutcome, LocationHistoryEntry,
    MatchRecord, MediaKind, Model, Screen, Sighting, SightingDraft, UnixTimeMs, Verification,
};

pub use crate::capabilities::{Effect, HttpResult};
pub use crate::event::Event;
pub use crate::model::ClientConfig;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const AUTH_TIMEOUT_MS: u64 = 15_000;
pub const UPLOAD_TIMEOUT_MS: u64 = 120_000;

// --- Error taxonomy ---

/// The five failure classes surfaced to the update loop. Every gateway
/// failure is exactly one of these; nothing else leaks through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthorized,
    Validation,
    NotFound,
    ServerError,
    NetworkError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            status: None,
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ServerError,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NetworkError,
            message: message.into(),
            status: None,
        }
    }

    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let (kind, fallback) = match status {
            400 | 422 => (ErrorKind::Validation, "The submitted data was rejected"),
            401 | 403 => (ErrorKind::Unauthorized, "Not authorized"),
            404 => (ErrorKind::NotFound, "The requested record was not found"),
            s if s >= 500 => (ErrorKind::ServerError, "The server reported an error"),
            _ => (ErrorKind::ServerError, "Unexpected response from the server"),
        };
        Self {
            kind,
            message: detail.unwrap_or_else(|| fallback.to_string()),
            status: Some(status),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    /// Message suitable for direct display; validation details pass through
    /// verbatim, everything else gets a stable phrasing.
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::NotFound => "The requested record was not found.".to_string(),
            ErrorKind::ServerError => {
                "Something went wrong on the server. Please try again later.".to_string()
            }
            ErrorKind::NetworkError => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(error: HttpError) -> Self {
        let kind = match &error {
            HttpError::Network { .. } | HttpError::Timeout { .. } | HttpError::Cancelled => {
                ErrorKind::NetworkError
            }
            HttpError::Serialization { .. } => ErrorKind::ServerError,
            // Request construction failures are caller input problems.
            _ => ErrorKind::Validation,
        };
        Self {
            kind,
            message: error.to_string(),
            status: None,
        }
    }
}

// --- App ---

#[derive(Default, Debug)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Self::Event, model: &mut Self::Model, caps: &Self::Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            // --- Lifecycle ---
            Event::AppStarted { config } => {
                match config.validate() {
                    Ok(()) => model.config = config,
                    Err(e) => {
                        warn!(error = %e, "rejecting supplied config, keeping default");
                        model.set_error(e);
                    }
                }
                model.booted = true;
            }
            Event::ScreenSelected(screen) => {
                match guard(screen, model.booted, model.session.identity()) {
                    GuardOutcome::Render => {
                        model.screen = screen;
                        self.on_screen_entered(screen, model, caps);
                    }
                    GuardOutcome::RedirectToLogin => model.screen = Screen::Login,
                    GuardOutcome::RedirectHome => model.screen = Screen::Home,
                    GuardOutcome::Loading => model.screen = screen,
                }
            }
            Event::ErrorDismissed => model.active_error = None,
            Event::ToastDismissed => model.active_toast = None,

            // --- Auth ---
            Event::RegisterSubmitted {
                email,
                phone,
                password,
            } => {
                if !model.in_flight.authenticating {
                    model.in_flight.authenticating = true;
                    if let Err(e) = gateway::register(model, &caps.http, &email, &phone, &password)
                    {
                        model.in_flight.authenticating = false;
                        self.fail(model, e);
                    }
                }
            }
            Event::RegisterResponded(result) => {
                model.in_flight.authenticating = false;
                match gateway::classify(*result) {
                    Ok(_) => {
                        model.show_toast("Registration successful. Please log in to continue.");
                        model.screen = Screen::Login;
                    }
                    Err(e) => self.fail(model, e),
                }
            }
            Event::LoginSubmitted { email, password } => {
                if !model.in_flight.authenticating {
                    model.in_flight.authenticating = true;
                    let credentials = Credentials { email, password };
                    if let Err(e) = gateway::login(model, &caps.http, &credentials) {
                        model.in_flight.authenticating = false;
                        self.fail(model, e);
                    }
                }
            }
            Event::LoginResponded(result) => {
                model.in_flight.authenticating = false;
                match gateway::classify(*result)
                    .and_then(|r| gateway::parse_json::<gateway::LoginResponse>(&r))
                {
                    Ok(login) => {
                        model.session.establish(
                            login.user.into(),
                            secrecy::SecretString::new(login.token),
                        );
                        model.screen = Screen::Home;
                    }
                    Err(e) => self.fail(model, e),
                }
            }
            Event::ProfileRequested => {
                if let Err(e) = gateway::fetch_profile(model, &caps.http) {
                    self.fail(model, e);
                }
            }
            Event::ProfileResponded(result) => {
                match gateway::classify(*result)
                    .and_then(|r| gateway::parse_json::<gateway::UserDto>(&r))
                {
                    Ok(user) => model.session.refresh_identity(user.into()),
                    Err(e) => self.fail(model, e),
                }
            }
            Event::LogoutRequested => {
                self.teardown_session(model);
                model.screen = Screen::Home;
            }

            // --- Cases ---
            Event::CaseDraftUpdated(draft) => model.case_draft = *draft,
            Event::CaseSubmitted => {
                if !model.in_flight.creating_case {
                    match model.case_draft.validate() {
                        Ok(()) => {
                            model.in_flight.creating_case = true;
                            let draft = model.case_draft.clone();
                            if let Err(e) = gateway::create_case(model, &caps.http, &draft) {
                                model.in_flight.creating_case = false;
                                self.fail(model, e);
                            }
                        }
                        Err(e) => self.fail(model, ApiError::validation(e.to_string())),
                    }
                }
            }
            Event::CaseCreateResponded(result) => {
                model.in_flight.creating_case = false;
                match gateway::classify(*result).and_then(|r| gateway::parse_json::<Case>(&r)) {
                    Ok(case) => {
                        model.my_cases.insert(0, case);
                        model.case_draft = CaseDraft::default();
                        model.show_toast("Case reported.");
                        model.screen = Screen::MyCases;
                    }
                    Err(e) => self.fail(model, e),
                }
            }
            Event::MyCasesRequested => self.request_my_cases(model, caps),
            Event::CaseDetailRequested { case_id } => {
                if !model.in_flight.loading_case_detail {
                    model.in_flight.loading_case_detail = true;
                    if let Err(e) = gateway::get_case(model, &caps.http, &case_id) {
                        model.in_flight.loading_case_detail = false;
                        self.fail(model, e);
                    }
                }
            }
            Event::CaseDetailResponded { case_id, result } => {
                model.in_flight.loading_case_detail = false;
                match gateway::classify(*result).and_then(|r| gateway::parse_json::<Case>(&r)) {
                    Ok(case) => {
                        debug_assert_eq!(case.id, case_id);
                        model.case_detail = Some(case);
                    }
                    Err(e) => self.fail(model, e),
                }
            }
            Event::MyCasesResponded(result) => {
                model.in_flight.loading_cases = false;
                match gateway::classify(*result).and_then(|r| gateway::parse_json::<Vec<Case>>(&r))
                {
                    Ok(cases) => model.my_cases = cases,
                    Err(e) => self.fail(model, e),
                }
            }
            Event::CaseDeleteRequested { case_id } => {
                model.pending_confirmation = Some(ConfirmAction::DeleteCase(case_id));
            }
            Event::AdminCaseDeleteRequested { case_id } => {
                model.pending_confirmation = Some(ConfirmAction::AdminDeleteCase(case_id));
            }
            Event::MarkFoundRequested { case_id } => {
                // Already-found cases are terminal; re-marking is a no-op.
                let already_found = model.case(&case_id).is_some_and(|c| c.is_found);
                if !already_found {
                    model.pending_confirmation = Some(ConfirmAction::MarkFound(case_id));
                }
            }
            Event::ConfirmationDismissed => model.pending_confirmation = None,
            Event::ConfirmationAccepted => {
                if !model.in_flight.confirming {
                    if let Some(action) = model.pending_confirmation.take() {
                        model.in_flight.confirming = true;
                        let issued = match &action {
                            ConfirmAction::DeleteCase(id) => {
                                gateway::delete_case(model, &caps.http, id)
                            }
                            ConfirmAction::AdminDeleteCase(id) => {
                                gateway::admin_delete_case(model, &caps.http, id)
                            }
                            ConfirmAction::MarkFound(id) => {
                                gateway::mark_found(model, &caps.http, id)
                            }
                        };
                        if let Err(e) = issued {
                            model.in_flight.confirming = false;
                            self.fail(model, e);
                        }
                    }
                }
            }
            Event::CaseDeleteResponded { case_id, result } => {
                model.in_flight.confirming = false;
                match gateway::classify(*result) {
                    Ok(_) => {
                        model.remove_case(&case_id);
                        model.show_toast("Case deleted.");
                        if model.screen == Screen::AdminDashboard {
                            self.issue_dashboard(model, caps);
                        }
                    }
                    Err(e) => self.fail(model, e),
                }
            }
            Event::MarkFoundResponded { case_id, result } => {
                model.in_flight.confirming = false;
                match gateway::classify(*result) {
                    Ok(_) => {
                        let updated = model.case(&case_id).map(|c| {
                            let mut c = c.clone();
                            c.is_found = true;
                            c
                        });
                        if let Some(case) = updated {
                            model.upsert_case(&case);
                        }
                        model.show_toast("Marked as found.");
                        // The server may have cascaded; re-read the whole board.
                        if model.screen == Screen::AdminDashboard {
                            self.issue_dashboard(model, caps);
                        }
                    }
                    Err(e) => self.fail(model, e),
                }
            }

            // --- Sightings ---
            Event::SightingMediaAttached(media) => {
                if media.kind().is_some() {
                    model.sighting_draft.media = Some(*media);
                } else {
                    self.fail(
                        model,
                        ApiError::validation(format!(
                            "Unsupported file type '{}'. Attach a photo or video.",
                            media.mime_type
                        )),
                    );
                }
            }
            Event::SightingDetailsEntered {
                latitude,
                longitude,
                location_name,
            } => {
                model.sighting_draft.latitude = latitude;
                model.sighting_draft.longitude = longitude;
                model.sighting_draft.location_name = location_name;
            }
            Event::CurrentLocationRequested => {
                if !model.in_flight.locating {
                    model.in_flight.locating = true;
                    caps.geolocation
                        .get_position(|r| Event::CurrentLocationResponded(Box::new(r)));
                }
            }
            Event::CurrentLocationResponded(result) => {
                model.in_flight.locating = false;
                match *result {
                    Ok(position) => {
                        // Best-effort only; an out-of-range fix is dropped.
                        if Coordinate::new(position.latitude, position.longitude).is_ok() {
                            model.sighting_draft.latitude = Some(position.latitude);
                            model.sighting_draft.longitude = Some(position.longitude);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "geolocation unavailable");
                        model.show_toast(
                            "Couldn't get your location. You can enter it manually.",
                        );
                    }
                }
            }
            Event::SightingSubmitted => {
                if !model.in_flight.submitting_sighting {
                    match model.sighting_draft.validate() {
                        Ok(()) => {
                            model.in_flight.submitting_sighting = true;
                            let draft = model.sighting_draft.clone();
                            if let Err(e) = gateway::upload_sighting(model, &caps.http, &draft) {
                                model.in_flight.submitting_sighting = false;
                                self.fail(model, e);
                            }
                        }
                        Err(e) => self.fail(model, ApiError::validation(e.to_string())),
                    }
                }
            }
            Event::SightingUploadResponded(result) => {
                model.in_flight.submitting_sighting = false;
                match gateway::classify(*result).and_then(|r| gateway::parse_json::<Sighting>(&r))
                {
                    Ok(sighting) => {
                        model.last_sighting = Some(sighting);
                        model.sighting_draft = SightingDraft::default();
                        model.show_toast("Sighting submitted. Thank you for helping.");
                    }
                    Err(e) => self.fail(model, e),
                }
            }
            Event::ReprocessRequested { sighting_id } => {
                if model.in_flight.reprocessing.is_none() {
                    model.in_flight.reprocessing = Some(sighting_id.clone());
                    if let Err(e) = gateway::reprocess_sighting(model, &caps.http, &sighting_id) {
                        model.in_flight.reprocessing = None;
                        self.fail(model, e);
                    }
                }
            }
            Event::ReprocessResponded {
                sighting_id,
                result,
            } => {
                if model.in_flight.reprocessing.as_ref() == Some(&sighting_id) {
                    model.in_flight.reprocessing = None;
                }
                match gateway::classify(*result).and_then(|r| gateway::parse_json::<Sighting>(&r))
                {
                    Ok(sighting) => {
                        model.last_sighting = Some(sighting);
                        model.show_toast("Reprocessing requested.");
                    }
                    Err(e) => self.fail(model, e),
                }
            }

            // --- Admin dashboard ---
            Event::DashboardRequested => self.issue_dashboard(model, caps),
            Event::StatsResponded(result) => {
                let parsed =
                    gateway::classify(*result).and_then(|r| gateway::parse_json::<AdminStats>(&r));
                if let Some(join) = &mut model.dashboard_join {
                    join.stats_arrived(parsed);
                }
                self.settle_dashboard(model);
            }
            Event::AdminCasesResponded(result) => {
                let parsed =
                    gateway::classify(*result).and_then(|r| gateway::parse_json::<Vec<Case>>(&r));
                if let Some(join) = &mut model.dashboard_join {
                    join.cases_arrived(parsed);
                }
                self.settle_dashboard(model);
            }
            Event::MatchesResponded(result) => {
                let parsed = gateway::classify(*result)
                    .and_then(|r| gateway::parse_json::<Vec<MatchRecord>>(&r));
                if model.dashboard_join.is_some() {
                    if let Some(join) = &mut model.dashboard_join {
                        join.matches_arrived(parsed);
                    }
                    self.settle_dashboard(model);
                } else {
                    // Standalone re-list after a filter change.
                    model.in_flight.loading_matches = false;
                    match parsed {
                        Ok(matches) => {
                            if let Some(dashboard) = &mut model.dashboard {
                                dashboard.matches = matches;
                            }
                        }
                        Err(e) => self.fail(model, e),
                    }
                }
            }
            Event::MatchFilterChanged { filter } => {
                model.match_filter = filter;
                if !model.in_flight.loading_matches && model.dashboard_join.is_none() {
                    model.in_flight.loading_matches = true;
                    if let Err(e) = gateway::admin_matches(model, &caps.http, filter) {
                        model.in_flight.loading_matches = false;
                        self.fail(model, e);
                    }
                }
            }
            Event::MatchDecided {
                match_id,
                confirmed,
            } => {
                if model.in_flight.deciding.is_none() {
                    model.in_flight.deciding = Some(match_id.clone());
                    if let Err(e) = gateway::decide_match(model, &caps.http, &match_id, confirmed)
                    {
                        model.in_flight.deciding = None;
                        self.fail(model, e);
                    }
                }
            }
            Event::MatchDecisionResponded { match_id, result } => {
                if model.in_flight.deciding.as_ref() == Some(&match_id) {
                    model.in_flight.deciding = None;
                }
                match gateway::classify(*result) {
                    // Never patch optimistically; the decision may cascade
                    // (e.g. the case getting marked found), so re-read
                    // everything.
                    Ok(_) => self.issue_dashboard(model, caps),
                    Err(e) => self.fail(model, e),
                }
            }

            // --- Location history ---
            Event::LocationHistoryRequested { case_id } => {
                if !model.in_flight.loading_history {
                    model.selected_case = Some(case_id.clone());
                    model.location_history.clear();
                    model.in_flight.loading_history = true;
                    if let Err(e) = gateway::location_history(model, &caps.http, &case_id) {
                        model.in_flight.loading_history = false;
                        self.fail(model, e);
                    }
                }
            }
            Event::LocationHistoryResponded { case_id, result } => {
                // The flag belongs to the request, not to the selection, so it
                // is cleared even when the payload is thrown away.
                model.in_flight.loading_history = false;
                // A response for a case that is no longer selected is stale.
                if model.selected_case.as_ref() != Some(&case_id) {
                    debug!(case_id = %case_id, "discarding stale location history");
                } else {
                    match gateway::classify(*result)
                        .and_then(|r| gateway::parse_json::<Vec<LocationHistoryEntry>>(&r))
                    {
                        Ok(mut entries) => {
                            sort_history(&mut entries);
                            model.location_history = entries;
                        }
                        Err(e) => self.fail(model, e),
                    }
                }
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        let (active, found) = partition_cases(&model.my_cases);

        ViewModel {
            screen: model.screen,
            guard: guard(model.screen, model.booted, model.session.identity()),
            session: SessionView {
                authenticated: model.session.is_authenticated(),
                is_admin: model.session.is_admin(),
                email: model
                    .session
                    .identity()
                    .user()
                    .map(|u| u.email.clone()),
            },
            busy: BusyView {
                authenticating: model.in_flight.authenticating,
                creating_case: model.in_flight.creating_case,
                loading_cases: model.in_flight.loading_cases,
                loading_case_detail: model.in_flight.loading_case_detail,
                submitting_sighting: model.in_flight.submitting_sighting,
                locating: model.in_flight.locating,
                confirming: model.in_flight.confirming,
                deciding: model.in_flight.deciding.is_some(),
                loading_matches: model.in_flight.loading_matches,
                loading_history: model.in_flight.loading_history,
                loading_dashboard: model.dashboard_join.is_some(),
            },
            error: model.active_error.as_ref().map(|e| ErrorView {
                kind: e.kind,
                message: e.user_facing_message(),
            }),
            toast: model.active_toast.clone(),
            confirmation: model
                .pending_confirmation
                .as_ref()
                .map(|a| ConfirmationView { prompt: a.prompt() }),
            my_cases: CaseListView {
                active: active.into_iter().map(CaseCard::from).collect(),
                found: found.into_iter().map(CaseCard::from).collect(),
            },
            case_detail: model.case_detail.as_ref().map(CaseCard::from),
            case_draft_valid: model.case_draft.validate().is_ok(),
            sighting: SightingFormView {
                has_media: model.sighting_draft.media.is_some(),
                media_kind: model
                    .sighting_draft
                    .media
                    .as_ref()
                    .and_then(|m| m.kind()),
                latitude: model.sighting_draft.latitude,
                longitude: model.sighting_draft.longitude,
                location_name: model.sighting_draft.location_name.clone(),
                last_submitted: model.last_sighting.as_ref().map(|s| SightingCard {
                    id: s.id.to_string(),
                    processed: s.processed,
                    uploaded_at: s.uploaded_at,
                }),
            },
            dashboard: model.dashboard.as_ref().map(|d| {
                let (active, found) = partition_cases(&d.cases);
                DashboardView {
                    stats: d.stats,
                    active_cases: active.into_iter().map(CaseCard::from).collect(),
                    found_cases: found.into_iter().map(CaseCard::from).collect(),
                    matches: d.matches.iter().map(MatchRowView::from).collect(),
                    filter: model.match_filter,
                }
            }),
            location_trail: self.build_trail(model),
        }
    }
}

impl App {
    fn fail(&self, model: &mut Model, error: ApiError) {
        warn!(kind = ?error.kind, status = ?error.status, "operation failed");
        if error.is_unauthorized() {
            self.teardown_session(model);
        }
        model.set_error(error);
    }

    /// Implicit logout. Idempotent: a second authorization failure against an
    /// already-empty session changes nothing.
    fn teardown_session(&self, model: &mut Model) {
        if model.session.clear() {
            warn!("session torn down");
            model.my_cases.clear();
            model.case_detail = None;
            model.dashboard = None;
            model.dashboard_join = None;
            model.location_history.clear();
            model.selected_case = None;
            model.pending_confirmation = None;
            model.screen = Screen::Login;
        }
    }

    fn on_screen_entered(&self, screen: Screen, model: &mut Model, caps: &Capabilities) {
        match screen {
            Screen::MyCases => self.request_my_cases(model, caps),
            Screen::AdminDashboard => self.issue_dashboard(model, caps),
            _ => {}
        }
    }

    fn request_my_cases(&self, model: &mut Model, caps: &Capabilities) {
        if !model.in_flight.loading_cases {
            model.in_flight.loading_cases = true;
            if let Err(e) = gateway::list_my_cases(model, &caps.http) {
                model.in_flight.loading_cases = false;
                self.fail(model, e);
            }
        }
    }

    /// Kicks off the three dashboard reads concurrently. The join is
    /// all-or-nothing; the previous dashboard stays rendered until a complete
    /// replacement has arrived.
    fn issue_dashboard(&self, model: &mut Model, caps: &Capabilities) {
        if model.dashboard_join.is_some() {
            return;
        }
        model.dashboard_join = Some(DashboardJoin::begin());
        let issued = gateway::admin_stats(model, &caps.http)
            .and_then(|_| gateway::admin_cases(model, &caps.http))
            .and_then(|_| gateway::admin_matches(model, &caps.http, model.match_filter));
        if let Err(e) = issued {
            model.dashboard_join = None;
            self.fail(model, e);
        }
    }

    fn settle_dashboard(&self, model: &mut Model) {
        let complete = model
            .dashboard_join
            .as_ref()
            .is_some_and(DashboardJoin::is_complete);
        if !complete {
            return;
        }
        if let Some(join) = model.dashboard_join.take() {
            match join.finish() {
                Ok(dashboard) => model.dashboard = Some(dashboard),
                Err(e) => self.fail(model, e),
            }
        }
    }

    fn build_trail(&self, model: &Model) -> Option<TrailView> {
        let case_id = model.selected_case.as_ref()?;
        let name = model
            .case(case_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let feature = trail_feature(&name, &model.location_history)?;
        let geojson = serde_json::to_string(&feature).ok()?;
        Some(TrailView {
            case_id: case_id.to_string(),
            entries: model.location_history.len(),
            geojson,
        })
    }
}

// --- ViewModel ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub screen: Screen,
    pub guard: GuardOutcome,
    pub session: SessionView,
    pub busy: BusyView,
    pub error: Option<ErrorView>,
    pub toast: Option<String>,
    pub confirmation: Option<ConfirmationView>,
    pub my_cases: CaseListView,
    pub case_detail: Option<CaseCard>,
    pub case_draft_valid: bool,
    pub sighting: SightingFormView,
    pub dashboard: Option<DashboardView>,
    pub location_trail: Option<TrailView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub is_admin: bool,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyView {
    pub authenticating: bool,
    pub creating_case: bool,
    pub loading_cases: bool,
    pub loading_case_detail: bool,
    pub submitting_sighting: bool,
    pub locating: bool,
    pub confirming: bool,
    pub deciding: bool,
    pub loading_matches: bool,
    pub loading_history: bool,
    pub loading_dashboard: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationView {
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseListView {
    pub active: Vec<CaseCard>,
    pub found: Vec<CaseCard>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseCard {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub is_found: bool,
    pub created_at: UnixTimeMs,
}

impl From<&Case> for CaseCard {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id.to_string(),
            name: case.name.clone(),
            photo_url: case.photo_url.clone(),
            is_found: case.is_found,
            created_at: case.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SightingFormView {
    pub has_media: bool,
    pub media_kind: Option<MediaKind>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub last_submitted: Option<SightingCard>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SightingCard {
    pub id: String,
    pub processed: bool,
    pub uploaded_at: UnixTimeMs,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub stats: AdminStats,
    pub active_cases: Vec<CaseCard>,
    pub found_cases: Vec<CaseCard>,
    pub matches: Vec<MatchRowView>,
    pub filter: Option<Verification>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRowView {
    pub id: String,
    pub case_name: String,
    pub case_is_found: bool,
    pub confidence: String,
    pub status: String,
    pub pending: bool,
    pub location: String,
    pub sighted_at: UnixTimeMs,
}

impl From<&MatchRecord> for MatchRowView {
    fn from(record: &MatchRecord) -> Self {
        Self {
            id: record.id.to_string(),
            case_name: record.case.name.clone(),
            case_is_found: record.case.is_found,
            confidence: record.confidence_score.percent_label(),
            status: record.verified.label().to_string(),
            pending: record.verified.is_pending(),
            location: record.sighting.location_label(),
            sighted_at: record.sighting.uploaded_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailView {
    pub case_id: String,
    pub entries: usize,
    pub geojson: String,
}
