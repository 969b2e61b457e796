use crate::state::network::LoadingState;
use crate::state::orchestrator::TransitionCall;
use crossterm::event::KeyEvent;
use pickup_api::actions::MatchAction;
use pickup_api::{
    Credentials, Match, MatchDraft, ProfileUpdate, RecommendAlgorithm, Registration, User,
};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadMatches,
    LoadMatch { match_id: String },
    SearchMatches { user_id: String, algorithm: RecommendAlgorithm },
    CreateMatch { draft: MatchDraft },
    /// A lifecycle transition built by the orchestrator; carries enough
    /// context to report completion/failure back against the right match.
    Transition { match_id: String, call: TransitionCall },
    Login { credentials: Credentials },
    Register { registration: Registration },
    UpdateProfile { user_id: String, update: ProfileUpdate },
    /// Fire-and-forget; the worker never produces a response for it.
    PushNotificationToken { user_id: String, token: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    MatchesLoaded { matches: Vec<Match> },
    MatchLoaded { snapshot: Match },
    MatchNotFound { match_id: String },
    /// A detail load failed for reasons other than 404; carries the match
    /// id so a failed post-finalize refetch can be told apart from any
    /// other worker error.
    MatchLoadFailed { match_id: String, message: String },
    SearchResults { matches: Vec<Match> },
    MatchCreated { snapshot: Match },
    TransitionComplete { match_id: String, action: MatchAction, snapshot: Match },
    TransitionFailed { match_id: String, action: MatchAction, message: String },
    SessionEstablished { user: User },
    ProfileUpdated { user: User },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Coarse timer used to expire transient notices.
    Tick,
}
