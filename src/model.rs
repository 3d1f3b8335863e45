use serde::{Deserialize, Serialize};
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::{ApiError, DEFAULT_API_BASE_URL};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(UserId);
typed_id!(CaseId);
typed_id!(SightingId);
typed_id!(MatchId);

/// Explicit timestamp unit: milliseconds since the Unix epoch, UTC.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnixTimeMs(pub u64);

// --- Validated values ---

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate value is not finite")]
    NonFinite,
}

/// Validated lat/lng pair. Wire DTOs keep raw optional floats because the
/// pairing invariant is the server's to enforce; the core only materializes
/// a `Coordinate` when both halves are present and in range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Coordinate {}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.lat, c.lng)
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("confidence {0} is out of valid range [0, 1]")]
pub struct ConfidenceError(pub f64);

/// Match confidence score in [0, 1].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, ConfidenceError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfidenceError(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.0 * 100.0)
    }
}

impl PartialEq for Confidence {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Confidence {}

impl TryFrom<f64> for Confidence {
    type Error = ConfidenceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

// --- Verification state ---

/// Admin decision on a match. The wire encodes this as `verified:
/// boolean|null` with null meaning "not yet decided"; in the core it is an
/// explicit tri-state so that "pending" and "rejected" can never be confused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Verification {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

impl Verification {
    pub fn is_pending(&self) -> bool {
        matches!(self, Verification::Pending)
    }

    pub fn is_decided(&self) -> bool {
        !self.is_pending()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verification::Pending => "Pending",
            Verification::Confirmed => "Verified",
            Verification::Rejected => "Rejected",
        }
    }

    /// Value for the `?verified=` query parameter when filtering match lists.
    pub fn query_value(&self) -> &'static str {
        match self {
            Verification::Pending => "null",
            Verification::Confirmed => "true",
            Verification::Rejected => "false",
        }
    }
}

impl From<Option<bool>> for Verification {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Verification::Pending,
            Some(true) => Verification::Confirmed,
            Some(false) => Verification::Rejected,
        }
    }
}

impl From<Verification> for Option<bool> {
    fn from(value: Verification) -> Self {
        match value {
            Verification::Pending => None,
            Verification::Confirmed => Some(true),
            Verification::Rejected => Some(false),
        }
    }
}

// --- Identity & session ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    #[default]
    Anonymous,
    Known(UserSummary),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Known(_))
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Identity::Known(UserSummary {
                role: Role::Admin,
                ..
            })
        )
    }

    pub fn user(&self) -> Option<&UserSummary> {
        match self {
            Identity::Anonymous => None,
            Identity::Known(user) => Some(user),
        }
    }
}

/// Authentication state for the running client.
///
/// The bearer token lives only in memory and only here. Writers are limited
/// to login success, logout, and the implicit logout on an authorization
/// failure; everything else reads through [`Session::bearer`].
#[derive(Default)]
pub struct Session {
    identity: Identity,
    token: Option<SecretString>,
}

impl Session {
    pub fn establish(&mut self, user: UserSummary, token: SecretString) {
        self.identity = Identity::Known(user);
        self.token = Some(token);
    }

    /// Tears the session down. Returns false when there was nothing to clear,
    /// which makes repeated authorization failures a no-op.
    pub fn clear(&mut self) -> bool {
        if matches!(self.identity, Identity::Anonymous) && self.token.is_none() {
            return false;
        }
        self.identity = Identity::Anonymous;
        self.token = None;
        true
    }

    /// Refreshes the profile behind an existing token. Does nothing when no
    /// session is live; a profile response must never resurrect one.
    pub fn refresh_identity(&mut self, user: UserSummary) {
        if self.token.is_some() {
            self.identity = Identity::Known(user);
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret().as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_admin()
    }
}

// Redact the token; identity alone is safe to log.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// --- Media ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// A file staged for upload. Bytes cross the FFI boundary once, at submit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl MediaAttachment {
    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime_type)
    }
}

// Redact bytes; media can contain faces of real people.
impl fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

// --- Server entities (client-side projection; the service is the source of truth) ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub is_found: bool,
    pub created_by: Option<UserId>,
    pub created_at: UnixTimeMs,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    pub id: SightingId,
    pub file_url: Option<String>,
    pub media_kind: MediaKind,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub processed: bool,
    pub submitted_by: Option<UserId>,
    pub uploaded_at: UnixTimeMs,
}

impl Sighting {
    /// The location is only meaningful when both halves are present and in
    /// range; a lone latitude or longitude is treated as absent.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: CaseId,
    pub name: String,
    pub is_found: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SightingSummary {
    pub id: SightingId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub uploaded_at: UnixTimeMs,
}

impl SightingSummary {
    pub fn location_label(&self) -> String {
        if let Some(name) = &self.location_name {
            return name.clone();
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => format!("{lat:.4}, {lng:.4}"),
            _ => "Unknown".to_string(),
        }
    }
}

/// A matcher-computed candidate link between one sighting and one case,
/// listed joined with both summaries. Created only upstream; the client's
/// sole mutation path is the admin decide call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub case: CaseSummary,
    pub sighting: SightingSummary,
    pub confidence_score: Confidence,
    #[serde(default)]
    pub verified: Verification,
    pub created_at: UnixTimeMs,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationHistoryEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub confidence_score: Option<Confidence>,
    pub timestamp: UnixTimeMs,
}

impl LocationHistoryEntry {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude).ok()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_cases: u64,
    pub active_cases: u64,
    pub found_cases: u64,
    pub total_sightings: u64,
    pub total_matches: u64,
    pub pending_matches: u64,
}

// --- Drafts (local form state) ---

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("The missing person's name is required")]
    MissingName,
    #[error("A reference photo is required")]
    MissingPhoto,
    #[error("A photo or video of the sighting is required")]
    MissingMedia,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseDraft {
    pub name: String,
    pub address: Option<String>,
    pub aadhaar_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<MediaAttachment>,
}

impl CaseDraft {
    /// Local gate: a case needs a subject name and a reference photo before
    /// any network call is made. Everything else is optional.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        if self.photo.is_none() {
            return Err(DraftError::MissingPhoto);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SightingDraft {
    pub media: Option<MediaAttachment>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
}

impl SightingDraft {
    /// Media is the only local requirement. A lone latitude or longitude is
    /// deliberately allowed through; the pairing rule is enforced upstream.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.media.is_none() {
            return Err(DraftError::MissingMedia);
        }
        Ok(())
    }
}

// --- Screens & route guarding ---

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Home,
    Login,
    Register,
    MyCases,
    CreateCase,
    ReportSighting,
    AdminDashboard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Screen {
    pub fn access(&self) -> Access {
        match self {
            // Sightings may be reported anonymously.
            Screen::Home | Screen::Login | Screen::Register | Screen::ReportSighting => {
                Access::Public
            }
            Screen::MyCases | Screen::CreateCase => Access::Authenticated,
            Screen::AdminDashboard => Access::Admin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardOutcome {
    Loading,
    RedirectToLogin,
    RedirectHome,
    Render,
}

/// Evaluated strictly in priority order: loading, then redirect-to-login,
/// then redirect-home-if-not-admin, then render.
pub fn guard(screen: Screen, booted: bool, identity: &Identity) -> GuardOutcome {
    if !booted {
        return GuardOutcome::Loading;
    }
    match screen.access() {
        Access::Public => GuardOutcome::Render,
        Access::Authenticated => {
            if identity.is_authenticated() {
                GuardOutcome::Render
            } else {
                GuardOutcome::RedirectToLogin
            }
        }
        Access::Admin => {
            if !identity.is_authenticated() {
                GuardOutcome::RedirectToLogin
            } else if !identity.is_admin() {
                GuardOutcome::RedirectHome
            } else {
                GuardOutcome::Render
            }
        }
    }
}

// --- Confirmation gating for irreversible actions ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmAction {
    DeleteCase(CaseId),
    AdminDeleteCase(CaseId),
    MarkFound(CaseId),
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::DeleteCase(_) | ConfirmAction::AdminDeleteCase(_) => {
                "Delete this case? This cannot be undone.".to_string()
            }
            ConfirmAction::MarkFound(_) => {
                "Are you sure you want to mark this person as found?".to_string()
            }
        }
    }
}

// --- Configuration ---

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        crate::capabilities::ValidatedUrl::new(self.api_base_url.clone())
            .map(|_| ())
            .map_err(|e| ApiError::network(format!("invalid API base URL: {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

// --- Admin dashboard ---

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dashboard {
    pub stats: AdminStats,
    pub cases: Vec<Case>,
    pub matches: Vec<MatchRecord>,
}

/// Tracks the three concurrent dashboard reads. The join is all-or-nothing:
/// one failure fails the whole refresh and no partial data is committed.
#[derive(Debug, Default)]
pub struct DashboardJoin {
    outstanding: u8,
    stats: Option<AdminStats>,
    cases: Option<Vec<Case>>,
    matches: Option<Vec<MatchRecord>>,
    error: Option<ApiError>,
}

impl DashboardJoin {
    pub fn begin() -> Self {
        Self {
            outstanding: 3,
            ..Self::default()
        }
    }

    pub fn stats_arrived(&mut self, result: Result<AdminStats, ApiError>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        match result {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => self.record_error(e),
        }
    }

    pub fn cases_arrived(&mut self, result: Result<Vec<Case>, ApiError>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        match result {
            Ok(cases) => self.cases = Some(cases),
            Err(e) => self.record_error(e),
        }
    }

    pub fn matches_arrived(&mut self, result: Result<Vec<MatchRecord>, ApiError>) {
        self.outstanding = self.outstanding.saturating_sub(1);
        match result {
            Ok(matches) => self.matches = Some(matches),
            Err(e) => self.record_error(e),
        }
    }

    fn record_error(&mut self, error: ApiError) {
        // Keep the first failure; it is the one surfaced.
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outstanding == 0
    }

    pub fn finish(self) -> Result<Dashboard, ApiError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match (self.stats, self.cases, self.matches) {
            (Some(stats), Some(cases), Some(matches)) => Ok(Dashboard {
                stats,
                cases,
                matches,
            }),
            _ => Err(ApiError::server("dashboard refresh was incomplete")),
        }
    }
}

// --- In-flight guards ---

/// One flag per user-initiated round trip. Set before the capability call,
/// cleared on both success and failure; a second identical submission while
/// one is outstanding is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InFlight {
    pub authenticating: bool,
    pub creating_case: bool,
    pub loading_cases: bool,
    pub loading_case_detail: bool,
    pub submitting_sighting: bool,
    pub locating: bool,
    pub reprocessing: Option<SightingId>,
    pub confirming: bool,
    pub deciding: Option<MatchId>,
    pub loading_matches: bool,
    pub loading_history: bool,
}

// --- Model ---

#[derive(Debug, Default)]
pub struct Model {
    pub booted: bool,
    pub config: ClientConfig,
    pub session: Session,
    pub screen: Screen,

    pub my_cases: Vec<Case>,
    pub case_detail: Option<Case>,
    pub case_draft: CaseDraft,

    pub sighting_draft: SightingDraft,
    pub last_sighting: Option<Sighting>,

    pub dashboard: Option<Dashboard>,
    pub dashboard_join: Option<DashboardJoin>,
    pub match_filter: Option<Verification>,

    pub selected_case: Option<CaseId>,
    pub location_history: Vec<LocationHistoryEntry>,

    pub pending_confirmation: Option<ConfirmAction>,
    pub in_flight: InFlight,

    pub active_error: Option<ApiError>,
    pub active_toast: Option<String>,
}

impl Model {
    pub fn set_error(&mut self, error: ApiError) {
        self.active_error = Some(error);
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.active_toast = Some(message.into());
    }

    pub fn case(&self, id: &CaseId) -> Option<&Case> {
        self.my_cases
            .iter()
            .find(|c| &c.id == id)
            .or_else(|| self.case_detail.as_ref().filter(|c| &c.id == id))
            .or_else(|| {
                self.dashboard
                    .as_ref()
                    .and_then(|d| d.cases.iter().find(|c| &c.id == id))
            })
    }

    /// Replaces a case in every local projection holding it.
    pub fn upsert_case(&mut self, case: &Case) {
        if let Some(existing) = self.my_cases.iter_mut().find(|c| c.id == case.id) {
            *existing = case.clone();
        }
        if let Some(dashboard) = &mut self.dashboard {
            if let Some(existing) = dashboard.cases.iter_mut().find(|c| c.id == case.id) {
                *existing = case.clone();
            }
        }
    }

    /// Drops a case from every local projection, for use only after the
    /// server has confirmed the delete.
    pub fn remove_case(&mut self, id: &CaseId) {
        self.my_cases.retain(|c| &c.id != id);
        if self.case_detail.as_ref().map(|c| &c.id) == Some(id) {
            self.case_detail = None;
        }
        if let Some(dashboard) = &mut self.dashboard {
            dashboard.cases.retain(|c| &c.id != id);
            dashboard.matches.retain(|m| &m.case.id != id);
        }
        if self.selected_case.as_ref() == Some(id) {
            self.selected_case = None;
            self.location_history.clear();
        }
    }
}

// --- Projections ---

/// Splits cases into (active, found). A found case never appears in the
/// active group.
pub fn partition_cases(cases: &[Case]) -> (Vec<&Case>, Vec<&Case>) {
    cases.iter().partition(|c| !c.is_found)
}

/// Trajectory order: earliest sighting first. The server historically
/// returned newest-first, so the projection re-sorts unconditionally.
pub fn sort_history(entries: &mut [LocationHistoryEntry]) {
    entries.sort_by_key(|e| e.timestamp);
}

/// GeoJSON export for map shells: a LineString through every valid point of
/// the trail (a single Point when only one qualifies), or None when the
/// history holds no valid coordinates.
pub fn trail_feature(case_name: &str, entries: &[LocationHistoryEntry]) -> Option<geojson::Feature> {
    let points: Vec<Vec<f64>> = entries
        .iter()
        .filter_map(|e| e.coordinate())
        .map(|c| vec![c.lng(), c.lat()])
        .collect();

    let geometry = match points.len() {
        0 => return None,
        1 => geojson::Geometry::new(geojson::Value::Point(points.into_iter().next()?)),
        _ => geojson::Geometry::new(geojson::Value::LineString(points)),
    };

    let mut properties = geojson::JsonObject::new();
    properties.insert("name".to_string(), case_name.into());
    properties.insert("sightings".to_string(), entries.len().into());

    Some(geojson::Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn case(id: &str, is_found: bool) -> Case {
        Case {
            id: CaseId::new(id),
            name: format!("Person {id}"),
            address: None,
            email: None,
            phone: None,
            photo_url: None,
            is_found,
            created_by: None,
            created_at: UnixTimeMs(1_700_000_000_000),
        }
    }

    fn entry(ts: u64, lat: f64, lng: f64) -> LocationHistoryEntry {
        LocationHistoryEntry {
            latitude: lat,
            longitude: lng,
            location_name: None,
            confidence_score: None,
            timestamp: UnixTimeMs(ts),
        }
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_non_finite() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 181.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn confidence_rejects_out_of_range() {
        assert!(Confidence::new(-0.01).is_err());
        assert!(Confidence::new(1.01).is_err());
        assert!(Confidence::new(f64::NAN).is_err());
        assert_eq!(Confidence::new(0.87).unwrap().percent_label(), "87.0%");
    }

    #[test]
    fn verification_wire_mapping_is_tri_state() {
        let pending: Verification = serde_json::from_str("null").unwrap();
        let confirmed: Verification = serde_json::from_str("true").unwrap();
        let rejected: Verification = serde_json::from_str("false").unwrap();

        assert_eq!(pending, Verification::Pending);
        assert_eq!(confirmed, Verification::Confirmed);
        assert_eq!(rejected, Verification::Rejected);

        assert_eq!(serde_json::to_string(&Verification::Pending).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&Verification::Rejected).unwrap(),
            "false"
        );
        assert!(Verification::Rejected.is_decided());
        assert!(!Verification::Pending.is_decided());
    }

    #[test]
    fn match_record_with_null_verified_parses_as_pending() {
        let json = serde_json::json!({
            "id": "m1",
            "case": {"id": "c1", "name": "Jane Doe", "is_found": false},
            "sighting": {
                "id": "s1",
                "latitude": 28.6139,
                "longitude": 77.2090,
                "location_name": null,
                "uploaded_at": 1_700_000_000_000u64,
            },
            "confidence_score": 0.92,
            "verified": null,
            "created_at": 1_700_000_001_000u64,
        });
        let record: MatchRecord = serde_json::from_value(json).unwrap();
        assert!(record.verified.is_pending());
        assert_eq!(record.confidence_score.value(), 0.92);
    }

    #[test]
    fn session_clear_is_idempotent() {
        let mut session = Session::default();
        assert!(!session.clear());

        session.establish(
            UserSummary {
                id: UserId::new("u1"),
                email: "a@x.com".to_string(),
                role: Role::Member,
            },
            SecretString::new("token".to_string()),
        );
        assert!(session.is_authenticated());
        assert_eq!(session.bearer(), Some("token"));

        assert!(session.clear());
        assert!(!session.clear());
        assert_eq!(session.bearer(), None);
    }

    #[test]
    fn session_debug_redacts_token() {
        let mut session = Session::default();
        session.establish(
            UserSummary {
                id: UserId::new("u1"),
                email: "a@x.com".to_string(),
                role: Role::Admin,
            },
            SecretString::new("super-secret".to_string()),
        );
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn guard_priority_order() {
        let admin = Identity::Known(UserSummary {
            id: UserId::new("u1"),
            email: "a@x.com".to_string(),
            role: Role::Admin,
        });
        let member = Identity::Known(UserSummary {
            id: UserId::new("u2"),
            email: "b@x.com".to_string(),
            role: Role::Member,
        });

        // Loading wins over everything, even for public screens.
        assert_eq!(
            guard(Screen::Home, false, &admin),
            GuardOutcome::Loading
        );
        assert_eq!(
            guard(Screen::AdminDashboard, false, &Identity::Anonymous),
            GuardOutcome::Loading
        );

        assert_eq!(
            guard(Screen::MyCases, true, &Identity::Anonymous),
            GuardOutcome::RedirectToLogin
        );
        assert_eq!(
            guard(Screen::AdminDashboard, true, &Identity::Anonymous),
            GuardOutcome::RedirectToLogin
        );
        assert_eq!(
            guard(Screen::AdminDashboard, true, &member),
            GuardOutcome::RedirectHome
        );
        assert_eq!(
            guard(Screen::AdminDashboard, true, &admin),
            GuardOutcome::Render
        );
        assert_eq!(
            guard(Screen::ReportSighting, true, &Identity::Anonymous),
            GuardOutcome::Render
        );
    }

    #[test]
    fn partition_never_places_found_cases_in_active_group() {
        let cases = vec![case("1", false), case("2", true), case("3", false)];
        let (active, found) = partition_cases(&cases);
        assert_eq!(active.len(), 2);
        assert_eq!(found.len(), 1);
        assert!(active.iter().all(|c| !c.is_found));
        assert!(found.iter().all(|c| c.is_found));
    }

    #[test]
    fn history_sorts_ascending_by_timestamp() {
        let mut entries = vec![
            entry(3_000, 28.61, 77.21),
            entry(1_000, 28.60, 77.20),
            entry(2_000, 28.62, 77.22),
        ];
        sort_history(&mut entries);
        let stamps: Vec<u64> = entries.iter().map(|e| e.timestamp.0).collect();
        assert_eq!(stamps, vec![1_000, 2_000, 3_000]);
    }

    #[test]
    fn trail_feature_shapes() {
        assert!(trail_feature("Jane", &[]).is_none());

        // Invalid coordinates are dropped entirely.
        assert!(trail_feature("Jane", &[entry(1, 95.0, 0.0)]).is_none());

        let single = trail_feature("Jane", &[entry(1, 28.61, 77.21)]).unwrap();
        assert!(matches!(
            single.geometry.unwrap().value,
            geojson::Value::Point(_)
        ));

        let multi = trail_feature(
            "Jane",
            &[entry(1, 28.61, 77.21), entry(2, 28.62, 77.22)],
        )
        .unwrap();
        match multi.geometry.unwrap().value {
            // GeoJSON positions are [lng, lat].
            geojson::Value::LineString(points) => {
                assert_eq!(points[0], vec![77.21, 28.61]);
            }
            other => panic!("expected LineString, got {other:?}"),
        }
    }

    #[test]
    fn sighting_coordinate_requires_both_halves() {
        let mut sighting = Sighting {
            id: SightingId::new("s1"),
            file_url: None,
            media_kind: MediaKind::Image,
            latitude: Some(28.6139),
            longitude: None,
            location_name: None,
            processed: false,
            submitted_by: None,
            uploaded_at: UnixTimeMs(0),
        };
        assert!(sighting.coordinate().is_none());
        sighting.longitude = Some(77.2090);
        assert!(sighting.coordinate().is_some());
    }

    #[test]
    fn drafts_enforce_local_requirements() {
        let mut draft = CaseDraft::default();
        assert_eq!(draft.validate(), Err(DraftError::MissingName));
        draft.name = "Jane Doe".to_string();
        assert_eq!(draft.validate(), Err(DraftError::MissingPhoto));
        draft.photo = Some(MediaAttachment {
            file_name: "jane.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8],
        });
        assert!(draft.validate().is_ok());

        let mut sighting = SightingDraft::default();
        assert_eq!(sighting.validate(), Err(DraftError::MissingMedia));
        // A lone latitude does not block submission.
        sighting.latitude = Some(28.6139);
        sighting.media = Some(MediaAttachment {
            file_name: "clip.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            data: vec![0x00],
        });
        assert!(sighting.validate().is_ok());
    }

    #[test]
    fn dashboard_join_is_all_or_nothing() {
        let mut join = DashboardJoin::begin();
        join.stats_arrived(Ok(AdminStats::default()));
        join.cases_arrived(Err(ApiError::server("boom")));
        join.matches_arrived(Ok(vec![]));
        assert!(join.is_complete());
        assert!(join.finish().is_err());

        let mut join = DashboardJoin::begin();
        join.stats_arrived(Ok(AdminStats::default()));
        join.cases_arrived(Ok(vec![case("1", false)]));
        assert!(!join.is_complete());
        join.matches_arrived(Ok(vec![]));
        assert!(join.is_complete());
        let dashboard = join.finish().unwrap();
        assert_eq!(dashboard.cases.len(), 1);
    }

    #[test]
    fn media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("VIDEO/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime("application/pdf"), None);
    }

    proptest! {
        #[test]
        fn valid_coordinates_round_trip(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let coord = Coordinate::new(lat, lng).unwrap();
            let json = serde_json::to_string(&coord).unwrap();
            let back: Coordinate = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(coord, back);
        }

        #[test]
        fn confidence_accepts_exactly_unit_interval(value in -10.0f64..10.0) {
            let result = Confidence::new(value);
            prop_assert_eq!(result.is_ok(), (0.0..=1.0).contains(&value));
        }

        #[test]
        fn verification_round_trips_through_wire(flag in proptest::option::of(proptest::bool::ANY)) {
            let verification: Verification = flag.into();
            let wire: Option<bool> = verification.into();
            prop_assert_eq!(wire, flag);
        }
    }
}
