use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::orchestrator::TransitionCall;
use log::{debug, error};
use pickup_api::client::{ApiError, MatchServiceApi};
use pickup_api::{Credentials, MatchDraft, ProfileUpdate, RecommendAlgorithm, Registration};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: MatchServiceApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        base_url: Option<String>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        let client = match base_url {
            Some(url) => MatchServiceApi::with_base_url(url),
            None => MatchServiceApi::new(),
        };
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            // Token registration is best-effort and invisible: no spinner,
            // no response, failures only logged.
            if let NetworkRequest::PushNotificationToken { user_id, token } = &request {
                if let Err(e) = self.client.register_notification_token(user_id, token).await {
                    debug!("notification token registration failed: {e}");
                }
                continue;
            }

            self.start_loading_animation().await;

            // Err carries an already-shaped response so failure context
            // (which match, which action) survives the trip back.
            let result: Result<NetworkResponse, NetworkResponse> = match request {
                NetworkRequest::LoadMatches => self
                    .handle_load_matches()
                    .await
                    .map_err(|e| NetworkResponse::Error { message: e.to_string() }),
                NetworkRequest::LoadMatch { match_id } => {
                    self.handle_load_match(&match_id).await.map_err(|e| match e {
                        ApiError::NotFound(_) => NetworkResponse::MatchNotFound { match_id },
                        other => NetworkResponse::MatchLoadFailed {
                            match_id,
                            message: other.to_string(),
                        },
                    })
                }
                NetworkRequest::SearchMatches { user_id, algorithm } => self
                    .handle_search(&user_id, algorithm)
                    .await
                    .map_err(|e| NetworkResponse::Error { message: e.to_string() }),
                NetworkRequest::CreateMatch { draft } => self
                    .handle_create(&draft)
                    .await
                    .map_err(|e| NetworkResponse::Error { message: e.to_string() }),
                NetworkRequest::Transition { match_id, call } => {
                    let action = call.action();
                    self.handle_transition(&match_id, call).await.map_err(|e| {
                        NetworkResponse::TransitionFailed {
                            match_id,
                            action,
                            message: e.to_string(),
                        }
                    })
                }
                NetworkRequest::Login { credentials } => self
                    .handle_login(&credentials)
                    .await
                    .map_err(|e| NetworkResponse::Error { message: e.to_string() }),
                NetworkRequest::Register { registration } => self
                    .handle_register(&registration)
                    .await
                    .map_err(|e| NetworkResponse::Error { message: e.to_string() }),
                NetworkRequest::UpdateProfile { user_id, update } => self
                    .handle_update_profile(&user_id, &update)
                    .await
                    .map_err(|e| NetworkResponse::Error { message: e.to_string() }),
                NetworkRequest::PushNotificationToken { .. } => unreachable!("handled above"),
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|failure| failure);
            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_matches(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading match list");
        let matches = self.client.list_matches().await?;
        Ok(NetworkResponse::MatchesLoaded { matches })
    }

    async fn handle_load_match(&self, match_id: &str) -> Result<NetworkResponse, ApiError> {
        debug!("loading match {match_id}");
        let snapshot = self.client.get_match(match_id).await?;
        Ok(NetworkResponse::MatchLoaded { snapshot })
    }

    async fn handle_search(
        &self,
        user_id: &str,
        algorithm: RecommendAlgorithm,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("searching matches for {user_id} with {}", algorithm.as_param());
        let matches = self.client.recommend_matches(user_id, algorithm).await?;
        Ok(NetworkResponse::SearchResults { matches })
    }

    async fn handle_create(&self, draft: &MatchDraft) -> Result<NetworkResponse, ApiError> {
        debug!("creating match at {}", draft.location);
        let snapshot = self.client.create_match(draft).await?;
        Ok(NetworkResponse::MatchCreated { snapshot })
    }

    async fn handle_transition(
        &self,
        match_id: &str,
        call: TransitionCall,
    ) -> Result<NetworkResponse, ApiError> {
        let action = call.action();
        debug!("transition {action:?} on match {match_id}");
        let snapshot = match call {
            TransitionCall::Join { user_id } => self.client.join(match_id, &user_id).await?,
            TransitionCall::Leave { user_id } => self.client.leave(match_id, &user_id).await?,
            TransitionCall::Confirm => self.client.confirm(match_id).await?,
            TransitionCall::Start => self.client.start(match_id).await?,
            TransitionCall::Cancel => self.client.cancel(match_id).await?,
            TransitionCall::Edit(edit) => self.client.edit(match_id, &edit).await?,
            TransitionCall::FinishDuel { scores } => {
                self.client.finish_duel(match_id, &scores).await?
            }
            TransitionCall::FinishTeams(result) => {
                self.client.finish_with_result(match_id, &result).await?
            }
        };
        Ok(NetworkResponse::TransitionComplete {
            match_id: match_id.to_owned(),
            action,
            snapshot,
        })
    }

    async fn handle_login(&self, credentials: &Credentials) -> Result<NetworkResponse, ApiError> {
        debug!("logging in {}", credentials.email);
        let user = self.client.login(credentials).await?;
        Ok(NetworkResponse::SessionEstablished { user })
    }

    async fn handle_register(
        &self,
        registration: &Registration,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("registering {}", registration.email);
        let user = self.client.register(registration).await?;
        Ok(NetworkResponse::SessionEstablished { user })
    }

    async fn handle_update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("updating profile for {user_id}");
        let user = self.client.update_profile(user_id, update).await?;
        Ok(NetworkResponse::ProfileUpdated { user })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
