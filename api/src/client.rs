use crate::wire::{
    self, CreateMatchRequest, EditMatchRequest, LoginRequest, MatchWire, NotificationTokenRequest,
    ProfileUpdateRequest, RegisterRequest, TeamResultRequest, UserWire,
};
use crate::{
    Credentials, Match, MatchDraft, MatchEdit, ProfileUpdate, RecommendAlgorithm, Registration,
    TeamResult, User,
};
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Client for the remote match/user coordination service.
#[derive(Debug, Clone)]
pub struct MatchServiceApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for MatchServiceApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("pmtui/0.1 (terminal pick-up match client)")
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Transport never produced a response.
    Network(reqwest::Error, String),
    /// Non-2xx response; carries the body text when the server sent one.
    Rejected(String),
    /// 404 on a lookup, rendered as a dedicated view state rather than a toast.
    NotFound(String),
    Parsing(reqwest::Error, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Rejected(msg) => write!(f, "{msg}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl MatchServiceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }

    // -- matches ------------------------------------------------------------

    pub async fn list_matches(&self) -> ApiResult<Vec<Match>> {
        let url = format!("{}/matches", self.base_url);
        let raw: Vec<MatchWire> = self.execute(self.client.get(&url), &url).await?;
        Ok(raw.into_iter().map(wire::map_match).collect())
    }

    pub async fn get_match(&self, match_id: &str) -> ApiResult<Match> {
        let url = format!("{}/matches/{match_id}", self.base_url);
        let raw: MatchWire = self.execute(self.client.get(&url), &url).await?;
        Ok(wire::map_match(raw))
    }

    pub async fn create_match(&self, draft: &MatchDraft) -> ApiResult<Match> {
        let url = format!("{}/matches", self.base_url);
        let body = CreateMatchRequest::from(draft);
        let raw: MatchWire = self.execute(self.client.post(&url).json(&body), &url).await?;
        Ok(wire::map_match(raw))
    }

    pub async fn join(&self, match_id: &str, user_id: &str) -> ApiResult<Match> {
        self.transition(&format!("matches/{match_id}/join/{user_id}")).await
    }

    pub async fn leave(&self, match_id: &str, user_id: &str) -> ApiResult<Match> {
        self.transition(&format!("matches/{match_id}/leave/{user_id}")).await
    }

    pub async fn confirm(&self, match_id: &str) -> ApiResult<Match> {
        self.transition(&format!("matches/{match_id}/confirm")).await
    }

    pub async fn start(&self, match_id: &str) -> ApiResult<Match> {
        self.transition(&format!("matches/{match_id}/start")).await
    }

    pub async fn cancel(&self, match_id: &str) -> ApiResult<Match> {
        self.transition(&format!("matches/{match_id}/cancel")).await
    }

    pub async fn edit(&self, match_id: &str, edit: &MatchEdit) -> ApiResult<Match> {
        let url = format!("{}/matches/{match_id}", self.base_url);
        let body = EditMatchRequest::from(edit);
        let raw: MatchWire = self.execute(self.client.put(&url).json(&body), &url).await?;
        Ok(wire::map_match(raw))
    }

    /// Finish without recording scores. The interactive flows always go
    /// through `finish_duel` or `finish_with_result` instead.
    pub async fn finish(&self, match_id: &str) -> ApiResult<Match> {
        self.transition(&format!("matches/{match_id}/finish")).await
    }

    /// Finalize a two-participant match with one score string per
    /// participant id. Scores travel as strings; the server parses them.
    pub async fn finish_duel(
        &self,
        match_id: &str,
        scores: &BTreeMap<String, String>,
    ) -> ApiResult<Match> {
        let url = format!("{}/matches/{match_id}/finish-duel", self.base_url);
        let raw: MatchWire = self.execute(self.client.post(&url).json(scores), &url).await?;
        Ok(wire::map_match(raw))
    }

    /// Finalize a team match with two named sides and integer scores.
    pub async fn finish_with_result(
        &self,
        match_id: &str,
        result: &TeamResult,
    ) -> ApiResult<Match> {
        let url = format!("{}/matches/{match_id}/finish-with-result", self.base_url);
        let body = TeamResultRequest::from(result);
        let raw: MatchWire = self.execute(self.client.post(&url).json(&body), &url).await?;
        Ok(wire::map_match(raw))
    }

    pub async fn recommend_matches(
        &self,
        user_id: &str,
        algorithm: RecommendAlgorithm,
    ) -> ApiResult<Vec<Match>> {
        let url = format!(
            "{}/users/{user_id}/search-matches?algorithm={}",
            self.base_url,
            algorithm.as_param()
        );
        let raw: Vec<MatchWire> = self.execute(self.client.get(&url), &url).await?;
        Ok(raw.into_iter().map(wire::map_match).collect())
    }

    // -- users --------------------------------------------------------------

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<User> {
        let url = format!("{}/users/login", self.base_url);
        let body = LoginRequest {
            correo: &credentials.email,
            contrasenia: &credentials.password,
        };
        let raw: UserWire = self.execute(self.client.post(&url).json(&body), &url).await?;
        Ok(wire::map_user(raw))
    }

    pub async fn register(&self, registration: &Registration) -> ApiResult<User> {
        let url = format!("{}/users/register", self.base_url);
        let body = RegisterRequest::from(registration);
        let raw: UserWire = self.execute(self.client.post(&url).json(&body), &url).await?;
        Ok(wire::map_user(raw))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<User> {
        let url = format!("{}/users/{user_id}/profile", self.base_url);
        let body = ProfileUpdateRequest::from(update);
        let raw: UserWire = self.execute(self.client.put(&url).json(&body), &url).await?;
        Ok(wire::map_user(raw))
    }

    /// Best-effort device token registration; callers are expected to
    /// swallow failures.
    pub async fn register_notification_token(
        &self,
        user_id: &str,
        token: &str,
    ) -> ApiResult<User> {
        let url = format!("{}/users/{user_id}/notification-token", self.base_url);
        let body = NotificationTokenRequest { token };
        let raw: UserWire = self.execute(self.client.put(&url).json(&body), &url).await?;
        Ok(wire::map_user(raw))
    }

    // -- plumbing -----------------------------------------------------------

    /// Bare POST transition endpoints all return the updated match.
    async fn transition(&self, path: &str) -> ApiResult<Match> {
        let url = format!("{}/{path}", self.base_url);
        let raw: MatchWire = self.execute(self.client.post(&url), &url).await?;
        Ok(wire::map_match(raw))
    }

    /// Every non-2xx collapses into a uniform failure carrying the body
    /// text when present; 404 stays distinct for the not-found view state.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> ApiResult<T> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::NotFound(if body.trim().is_empty() {
                url.to_owned()
            } else {
                body
            }));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Rejected(if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body
            }));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}
