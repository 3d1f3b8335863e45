//! Resource gateway: the only place that knows endpoint paths, wire payload
//! shapes, and how HTTP outcomes map onto the error taxonomy.
//!
//! Every function here describes exactly one (resource, verb) pair as a typed
//! request and hands it to the HTTP capability. The gateway attaches the
//! bearer token when a session holds one and classifies failures; it never
//! mutates the model and never touches navigation. Nothing here retries.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::capabilities::{
    AppHttp, HttpRequest, HttpResponse, HttpResult, ValidatedUrl,
};
use crate::event::Event;
use crate::model::{
    CaseDraft, CaseId, Credentials, MatchId, Model, Role, Session, SightingDraft, SightingId,
    UserId, UserSummary, Verification,
};
use crate::{ApiError, AUTH_TIMEOUT_MS, UPLOAD_TIMEOUT_MS};

// --- Wire payloads ---

#[derive(Serialize)]
struct RegisterPayload<'a> {
    email: &'a str,
    phone: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Deserialize)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<UserDto> for UserSummary {
    fn from(dto: UserDto) -> Self {
        UserSummary {
            id: UserId::new(dto.id),
            email: dto.email,
            role: if dto.is_admin {
                Role::Admin
            } else {
                Role::Member
            },
        }
    }
}

#[derive(Serialize)]
struct DecidePayload {
    verified: bool,
}

// --- URL construction ---

fn endpoint_url(model: &Model, path: &str) -> Result<Url, ApiError> {
    let mut base = model.config.api_base_url.clone();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base)
        .map_err(|e| ApiError::network(format!("invalid API base URL: {e}")))?;
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ApiError::network(format!("invalid endpoint path '{path}': {e}")))
}

fn endpoint(model: &Model, path: &str) -> Result<ValidatedUrl, ApiError> {
    Ok(ValidatedUrl::new(endpoint_url(model, path)?.as_str())?)
}

/// Attaches `Authorization: Bearer <token>` when a session exists. Anonymous
/// requests go out without the header; the server decides what they may do.
fn authorize(request: HttpRequest, session: &Session) -> Result<HttpRequest, ApiError> {
    match session.bearer() {
        Some(token) => Ok(request.with_header("Authorization", format!("Bearer {token}"))?),
        None => Ok(request),
    }
}

// --- Response classification ---

/// Maps an HTTP outcome onto the failure taxonomy. 2xx passes through; the
/// caller parses the body it expects.
pub fn classify(result: HttpResult) -> Result<HttpResponse, ApiError> {
    let response = result.map_err(ApiError::from)?;
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::from_status(
        response.status(),
        extract_detail(response.body()),
    ))
}

/// Pulls the human-readable `detail` out of an error body, tolerating both
/// the plain-string and the field-error-list shapes.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg")?.as_str())
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

pub fn parse_json<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    response
        .json()
        .map_err(|e| ApiError::server(format!("malformed response body: {e}")))
}

// --- Multipart encoding ---

/// Minimal multipart/form-data encoder for the two upload endpoints. The
/// boundary is random per form; parts are framed with CRLF per RFC 7578.
pub struct MultipartForm {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("reunite-{}", uuid::Uuid::new_v4().simple()),
            buf: Vec::new(),
        }
    }

    pub fn text(&mut self, name: &str, value: &str) {
        self.buf
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buf.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }

    pub fn file(&mut self, name: &str, file_name: &str, mime_type: &str, data: &[u8]) {
        self.buf
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buf.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        self.buf
            .extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buf
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

// --- Request builders (pure, tested directly) ---

fn register_request(model: &Model, email: &str, phone: &str, password: &str) -> Result<HttpRequest, ApiError> {
    let request = HttpRequest::post(endpoint(model, "auth/register")?)
        .with_json(&RegisterPayload {
            email,
            phone,
            password,
        })?
        .with_timeout(std::time::Duration::from_millis(AUTH_TIMEOUT_MS))?;
    Ok(request)
}

fn login_request(model: &Model, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
    let request = HttpRequest::post(endpoint(model, "auth/login")?)
        .with_json(credentials)?
        .with_timeout(std::time::Duration::from_millis(AUTH_TIMEOUT_MS))?;
    Ok(request)
}

fn profile_request(model: &Model) -> Result<HttpRequest, ApiError> {
    authorize(HttpRequest::get(endpoint(model, "auth/me")?), &model.session)
}

fn create_case_request(model: &Model, draft: &CaseDraft) -> Result<HttpRequest, ApiError> {
    let mut form = MultipartForm::new();
    form.text("name", draft.name.trim());
    if let Some(address) = &draft.address {
        form.text("address", address);
    }
    if let Some(aadhaar) = &draft.aadhaar_number {
        form.text("aadhaar_number", aadhaar);
    }
    if let Some(email) = &draft.email {
        form.text("email", email);
    }
    if let Some(phone) = &draft.phone {
        form.text("phone", phone);
    }
    if let Some(photo) = &draft.photo {
        form.file("photo", &photo.file_name, &photo.mime_type, &photo.data);
    }

    let content_type = form.content_type();
    let request = HttpRequest::post(endpoint(model, "cases/")?)
        .with_body(content_type, form.finish())?
        .with_timeout(std::time::Duration::from_millis(UPLOAD_TIMEOUT_MS))?;
    authorize(request, &model.session)
}

fn list_my_cases_request(model: &Model) -> Result<HttpRequest, ApiError> {
    authorize(HttpRequest::get(endpoint(model, "cases/")?), &model.session)
}

fn get_case_request(model: &Model, case_id: &CaseId) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::get(endpoint(model, &format!("cases/{case_id}"))?),
        &model.session,
    )
}

fn delete_case_request(model: &Model, case_id: &CaseId) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::delete(endpoint(model, &format!("cases/{case_id}"))?),
        &model.session,
    )
}

fn upload_sighting_request(model: &Model, draft: &SightingDraft) -> Result<HttpRequest, ApiError> {
    let mut form = MultipartForm::new();
    if let Some(media) = &draft.media {
        form.file("file", &media.file_name, &media.mime_type, &media.data);
    }
    // A lone latitude or longitude is still sent; pairing is enforced upstream.
    if let Some(lat) = draft.latitude {
        form.text("latitude", &lat.to_string());
    }
    if let Some(lng) = draft.longitude {
        form.text("longitude", &lng.to_string());
    }
    if let Some(name) = &draft.location_name {
        form.text("location_name", name);
    }

    let content_type = form.content_type();
    let request = HttpRequest::post(endpoint(model, "sightings/")?)
        .with_body(content_type, form.finish())?
        .with_timeout(std::time::Duration::from_millis(UPLOAD_TIMEOUT_MS))?;
    authorize(request, &model.session)
}

fn reprocess_request(model: &Model, sighting_id: &SightingId) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::post(endpoint(model, &format!("sightings/{sighting_id}/reprocess"))?),
        &model.session,
    )
}

fn admin_stats_request(model: &Model) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::get(endpoint(model, "admin/stats")?),
        &model.session,
    )
}

fn admin_cases_request(model: &Model) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::get(endpoint(model, "admin/cases")?),
        &model.session,
    )
}

fn admin_matches_request(
    model: &Model,
    filter: Option<Verification>,
) -> Result<HttpRequest, ApiError> {
    let mut url = endpoint_url(model, "admin/matches")?;
    if let Some(verification) = filter {
        url.query_pairs_mut()
            .append_pair("verified", verification.query_value());
    }
    authorize(
        HttpRequest::get(ValidatedUrl::new(url.as_str())?),
        &model.session,
    )
}

fn mark_found_request(model: &Model, case_id: &CaseId) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::put(endpoint(model, &format!("admin/cases/{case_id}/found"))?),
        &model.session,
    )
}

fn decide_match_request(
    model: &Model,
    match_id: &MatchId,
    confirmed: bool,
) -> Result<HttpRequest, ApiError> {
    let request = HttpRequest::put(endpoint(model, &format!("admin/matches/{match_id}"))?)
        .with_json(&DecidePayload { verified: confirmed })?;
    authorize(request, &model.session)
}

fn location_history_request(model: &Model, case_id: &CaseId) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::get(endpoint(
            model,
            &format!("admin/cases/{case_id}/location-history"),
        )?),
        &model.session,
    )
}

fn admin_delete_case_request(model: &Model, case_id: &CaseId) -> Result<HttpRequest, ApiError> {
    authorize(
        HttpRequest::delete(endpoint(model, &format!("admin/cases/{case_id}"))?),
        &model.session,
    )
}

// --- Senders (one per operation) ---

pub fn register(
    model: &Model,
    http: &AppHttp,
    email: &str,
    phone: &str,
    password: &str,
) -> Result<(), ApiError> {
    let request = register_request(model, email, phone, password)?;
    http.send(request, |r| Event::RegisterResponded(Box::new(r)));
    Ok(())
}

pub fn login(model: &Model, http: &AppHttp, credentials: &Credentials) -> Result<(), ApiError> {
    let request = login_request(model, credentials)?;
    http.send(request, |r| Event::LoginResponded(Box::new(r)));
    Ok(())
}

pub fn fetch_profile(model: &Model, http: &AppHttp) -> Result<(), ApiError> {
    let request = profile_request(model)?;
    http.send(request, |r| Event::ProfileResponded(Box::new(r)));
    Ok(())
}

pub fn create_case(model: &Model, http: &AppHttp, draft: &CaseDraft) -> Result<(), ApiError> {
    let request = create_case_request(model, draft)?;
    http.send(request, |r| Event::CaseCreateResponded(Box::new(r)));
    Ok(())
}

pub fn list_my_cases(model: &Model, http: &AppHttp) -> Result<(), ApiError> {
    let request = list_my_cases_request(model)?;
    http.send(request, |r| Event::MyCasesResponded(Box::new(r)));
    Ok(())
}

pub fn get_case(model: &Model, http: &AppHttp, case_id: &CaseId) -> Result<(), ApiError> {
    let request = get_case_request(model, case_id)?;
    let case_id = case_id.clone();
    http.send(request, move |r| Event::CaseDetailResponded {
        case_id,
        result: Box::new(r),
    });
    Ok(())
}

pub fn delete_case(model: &Model, http: &AppHttp, case_id: &CaseId) -> Result<(), ApiError> {
    let request = delete_case_request(model, case_id)?;
    let case_id = case_id.clone();
    http.send(request, move |r| Event::CaseDeleteResponded {
        case_id,
        result: Box::new(r),
    });
    Ok(())
}

pub fn admin_delete_case(model: &Model, http: &AppHttp, case_id: &CaseId) -> Result<(), ApiError> {
    let request = admin_delete_case_request(model, case_id)?;
    let case_id = case_id.clone();
    http.send(request, move |r| Event::CaseDeleteResponded {
        case_id,
        result: Box::new(r),
    });
    Ok(())
}

pub fn upload_sighting(
    model: &Model,
    http: &AppHttp,
    draft: &SightingDraft,
) -> Result<(), ApiError> {
    let request = upload_sighting_request(model, draft)?;
    http.send(request, |r| Event::SightingUploadResponded(Box::new(r)));
    Ok(())
}

pub fn reprocess_sighting(
    model: &Model,
    http: &AppHttp,
    sighting_id: &SightingId,
) -> Result<(), ApiError> {
    let request = reprocess_request(model, sighting_id)?;
    let sighting_id = sighting_id.clone();
    http.send(request, move |r| Event::ReprocessResponded {
        sighting_id,
        result: Box::new(r),
    });
    Ok(())
}

pub fn admin_stats(model: &Model, http: &AppHttp) -> Result<(), ApiError> {
    let request = admin_stats_request(model)?;
    http.send(request, |r| Event::StatsResponded(Box::new(r)));
    Ok(())
}

pub fn admin_cases(model: &Model, http: &AppHttp) -> Result<(), ApiError> {
    let request = admin_cases_request(model)?;
    http.send(request, |r| Event::AdminCasesResponded(Box::new(r)));
    Ok(())
}

pub fn admin_matches(
    model: &Model,
    http: &AppHttp,
    filter: Option<Verification>,
) -> Result<(), ApiError> {
    let request = admin_matches_request(model, filter)?;
    http.send(request, |r| Event::MatchesResponded(Box::new(r)));
    Ok(())
}

pub fn mark_found(model: &Model, http: &AppHttp, case_id: &CaseId) -> Result<(), ApiError> {
    let request = mark_found_request(model, case_id)?;
    let case_id = case_id.clone();
    http.send(request, move |r| Event::MarkFoundResponded {
        case_id,
        result: Box::new(r),
    });
    Ok(())
}

pub fn decide_match(
    model: &Model,
    http: &AppHttp,
    match_id: &MatchId,
    confirmed: bool,
) -> Result<(), ApiError> {
    let request = decide_match_request(model, match_id, confirmed)?;
    let match_id = match_id.clone();
    http.send(request, move |r| Event::MatchDecisionResponded {
        match_id,
        result: Box::new(r),
    });
    Ok(())
}

pub fn location_history(model: &Model, http: &AppHttp, case_id: &CaseId) -> Result<(), ApiError> {
    let request = location_history_request(model, case_id)?;
    let case_id = case_id.clone();
    http.send(request, move |r| Event::LocationHistoryResponded {
        case_id,
        result: Box::new(r),
    });
    Ok(())
}
