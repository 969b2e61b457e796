use crate::state::app_settings::AppSettings;
use crate::state::app_state::{
    AppState, DetailOverlay, DetailState, LoginMode, Notice, ScoreEntry,
};
use crate::state::messages::NetworkRequest;
use crate::state::orchestrator::{self, Settled, TransitionCall};
use crate::state::session::SessionStore;
use chrono::NaiveDateTime;
use log::debug;
use pickup_api::actions::MatchAction;
use pickup_api::{
    Credentials, Match, MatchDraft, MatchEdit, ProfileUpdate, Registration, SkillLevel, User,
};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Login,
    Matches,
    Search,
    Detail,
    Create,
    Profile,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    session_store: SessionStore,
}

impl App {
    pub fn new() -> Self {
        Self::with_store(AppSettings::load(), SessionStore::open())
    }

    pub fn with_store(settings: AppSettings, session_store: SessionStore) -> Self {
        let mut app = Self {
            state: AppState::new(),
            settings,
            session_store,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app.state.session = app.session_store.load();
        if app.state.session.is_some() {
            app.state.active_tab = MenuItem::Matches;
        }
        if let Some(user) = app.state.session.clone() {
            app.state.profile.load_from(&user);
        }

        app
    }

    pub fn session_user_id(&self) -> Option<String> {
        self.state.session.as_ref().map(|u| u.id.clone())
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_matches_loaded(&mut self, matches: Vec<Match>) {
        self.state.matches.load(matches);
    }

    pub fn on_search_results(&mut self, matches: Vec<Match>) {
        self.state.search.results.load(matches);
        self.state.search.searched = true;
    }

    /// A detail snapshot arrived; may settle a pending finalize barrier.
    pub fn on_match_loaded(&mut self, snapshot: Match) {
        if self.state.detail.match_id.as_deref() != Some(snapshot.id.as_str()) {
            debug!("dropping snapshot for match {} (view moved on)", snapshot.id);
            return;
        }
        self.state.detail.not_found = false;
        if self.state.detail.orchestrator.on_match_loaded(snapshot) {
            self.notify_info("Match finished, scores recorded");
        }
    }

    /// A detail load came back 404. During a finalize barrier this is the
    /// refetch failing, which still counts as success.
    pub fn on_match_not_found(&mut self, match_id: String) {
        if self.state.detail.match_id.as_deref() != Some(match_id.as_str()) {
            return;
        }
        if self.state.detail.orchestrator.on_refetch_failed(&match_id) {
            debug!("post-finalize refetch 404 for {match_id}, keeping finalize snapshot");
            self.notify_info("Match finished, scores recorded");
            return;
        }
        self.state.detail.not_found = true;
    }

    pub fn on_match_created(&mut self, snapshot: Match) -> NetworkRequest {
        self.notify_info(format!("Match created at {}", snapshot.location));
        self.state.create.form.clear_values();
        let match_id = snapshot.id.clone();
        self.state.detail.open(&match_id);
        self.state.detail.orchestrator.on_match_loaded(snapshot);
        self.update_tab(MenuItem::Detail);
        // Refresh the list in the background so the new match shows up there.
        NetworkRequest::LoadMatches
    }

    /// Returns a follow-up request when the transition demands one
    /// (the post-finalize refetch).
    pub fn on_transition_complete(
        &mut self,
        match_id: String,
        action: MatchAction,
        snapshot: Match,
    ) -> Option<NetworkRequest> {
        if self.state.detail.match_id.as_deref() != Some(match_id.as_str()) {
            debug!("transition {action:?} settled for {match_id} after the view moved on");
            self.state.detail.orchestrator.on_stale_transition();
            return None;
        }
        match self
            .state
            .detail
            .orchestrator
            .on_transition_complete(&match_id, action, snapshot)
        {
            Settled::Updated => {
                self.notify_info(match action {
                    MatchAction::Join => "Joined the match",
                    MatchAction::Leave => "Left the match",
                    MatchAction::Confirm => "Match confirmed",
                    MatchAction::Start => "Match started",
                    MatchAction::Cancel => "Match cancelled",
                    MatchAction::Edit => "Match updated",
                    MatchAction::Finish => "Match finished",
                });
                None
            }
            Settled::AwaitingRefetch(request) => Some(request),
        }
    }

    pub fn on_transition_failed(&mut self, match_id: String, action: MatchAction, message: String) {
        self.state
            .detail
            .orchestrator
            .on_transition_failed(&match_id, action);
        self.notify_error(message);
    }

    /// Login or register succeeded. Persists the session and, when a device
    /// token is configured, returns the fire-and-forget registration request.
    pub fn on_session_established(&mut self, user: User) -> Vec<NetworkRequest> {
        if let Err(e) = self.session_store.save(&user) {
            debug!("session persist failed: {e}");
        }
        self.notify_info(format!("Signed in as {}", user.username));
        self.state.profile.load_from(&user);
        let user_id = user.id.clone();
        self.state.session = Some(user);
        self.state.login.sign_in.clear_values();
        self.state.login.register.clear_values();
        self.update_tab(MenuItem::Matches);

        let mut follow_ups = vec![NetworkRequest::LoadMatches];
        if let Some(token) = self.settings.notify_token.clone() {
            follow_ups.push(NetworkRequest::PushNotificationToken { user_id, token });
        }
        follow_ups
    }

    pub fn on_profile_updated(&mut self, user: User) {
        if let Err(e) = self.session_store.save(&user) {
            debug!("session persist failed: {e}");
        }
        self.state.profile.load_from(&user);
        self.state.session = Some(user);
        self.notify_info("Profile updated");
    }

    /// A detail load failed outright. When it was the post-finalize
    /// refetch the whole operation still counts as success with the
    /// parked finalize snapshot; any other load failure surfaces as
    /// usual. The match id keeps unrelated worker errors (list refresh,
    /// search) from ever settling the barrier.
    pub fn on_match_load_failed(&mut self, match_id: String, message: String) {
        if self.state.detail.orchestrator.on_refetch_failed(&match_id) {
            debug!("post-finalize refetch failed ({message}), keeping finalize snapshot");
            self.notify_info("Match finished, scores recorded");
            return;
        }
        self.notify_error(message);
    }

    /// Generic worker error with no match context; never touches the
    /// orchestrator.
    pub fn on_error(&mut self, message: String) {
        self.notify_error(message);
    }

    // -----------------------------------------------------------------------
    // Tabs, notices, ticks
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        // Everything except Help requires a session.
        if self.state.session.is_none() && next != MenuItem::Help {
            self.state.active_tab = MenuItem::Login;
            return;
        }
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn notify_info(&mut self, text: impl Into<String>) {
        self.state.notice = Some(Notice::info(text));
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.state.notice = Some(Notice::error(text));
    }

    pub fn on_tick(&mut self) -> bool {
        if let Some(notice) = self.state.notice.as_mut()
            && notice.tick()
        {
            self.state.notice = None;
            return true;
        }
        false
    }

    // -----------------------------------------------------------------------
    // Navigation into the detail view
    // -----------------------------------------------------------------------

    /// Open the detail view for a match and build its load request.
    pub fn open_detail(&mut self, match_id: &str) -> NetworkRequest {
        self.state.detail.open(match_id);
        self.update_tab(MenuItem::Detail);
        NetworkRequest::LoadMatch { match_id: match_id.to_owned() }
    }

    // -----------------------------------------------------------------------
    // Action triggering (detail view)
    // -----------------------------------------------------------------------

    /// User pressed an action key in the detail view. Actions that need
    /// more input (cancel confirmation, score entry, edit form) open their
    /// overlay; the rest dispatch immediately.
    pub fn trigger_action(&mut self, action: MatchAction) -> Option<NetworkRequest> {
        let user_id = self.session_user_id()?;
        let snapshot = self.state.detail.orchestrator.snapshot()?.clone();

        let availability = snapshot.actions_for(&user_id).get(action);
        if !availability.offered || !availability.enabled {
            return None;
        }

        if let Some(in_flight) = self.state.detail.orchestrator.in_flight() {
            self.notify_error(in_flight.progress_label());
            return None;
        }

        match action {
            MatchAction::Cancel => {
                self.state.detail.overlay = DetailOverlay::ConfirmCancel;
                None
            }
            MatchAction::Finish => {
                self.state.detail.overlay =
                    DetailOverlay::ScoreEntry(ScoreEntry::for_match(&snapshot));
                None
            }
            MatchAction::Edit => {
                self.state.detail.overlay = DetailOverlay::Edit(DetailState::edit_form(&snapshot));
                None
            }
            MatchAction::Join => self.dispatch(TransitionCall::Join { user_id }),
            MatchAction::Leave => self.dispatch(TransitionCall::Leave { user_id }),
            MatchAction::Confirm => self.dispatch(TransitionCall::Confirm),
            MatchAction::Start => self.dispatch(TransitionCall::Start),
        }
    }

    /// Answer the cancel confirmation. Declining closes the overlay and
    /// never reaches the orchestrator.
    pub fn answer_cancel_prompt(&mut self, accepted: bool) -> Option<NetworkRequest> {
        if !matches!(self.state.detail.overlay, DetailOverlay::ConfirmCancel) {
            return None;
        }
        self.state.detail.overlay = DetailOverlay::None;
        if !accepted {
            return None;
        }
        self.dispatch(TransitionCall::Cancel)
    }

    /// Submit the score entry overlay, building the finalize call for
    /// whichever path the match requires.
    pub fn submit_score_entry(&mut self) -> Option<NetworkRequest> {
        let overlay = std::mem::take(&mut self.state.detail.overlay);
        let DetailOverlay::ScoreEntry(entry) = overlay else {
            self.state.detail.overlay = overlay;
            return None;
        };

        let snapshot = self.state.detail.orchestrator.snapshot()?;
        let call = match &entry {
            ScoreEntry::Duel { .. } => TransitionCall::FinishDuel {
                scores: orchestrator::duel_scores(snapshot, &entry.duel_entries()),
            },
            ScoreEntry::Teams { form } => TransitionCall::FinishTeams(orchestrator::team_result(
                form.value(0),
                form.value(1),
                form.value(2),
                form.value(3),
            )),
        };
        self.dispatch(call)
    }

    pub fn submit_edit(&mut self) -> Option<NetworkRequest> {
        let overlay = std::mem::take(&mut self.state.detail.overlay);
        let DetailOverlay::Edit(form) = overlay else {
            self.state.detail.overlay = overlay;
            return None;
        };

        let snapshot = self.state.detail.orchestrator.snapshot()?;
        let edit = MatchEdit {
            location: differs(form.value(0), &snapshot.location),
            starts_at: parse_start_input(form.value(1)).filter(|t| Some(*t) != snapshot.starts_at),
            duration_minutes: form
                .value(2)
                .trim()
                .parse()
                .ok()
                .filter(|d| *d != snapshot.duration_minutes),
        };
        if edit.is_empty() {
            self.notify_info("No changes to save");
            return None;
        }
        self.dispatch(TransitionCall::Edit(edit))
    }

    pub fn close_overlay(&mut self) {
        self.state.detail.overlay = DetailOverlay::None;
    }

    fn dispatch(&mut self, call: TransitionCall) -> Option<NetworkRequest> {
        let match_id = self.state.detail.match_id.clone()?;
        match self.state.detail.orchestrator.dispatch(&match_id, call) {
            Ok(request) => Some(request),
            Err(busy) => {
                self.notify_error(busy.action.progress_label());
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Form submission (login, create, profile, search)
    // -----------------------------------------------------------------------

    pub fn submit_login(&mut self) -> Option<NetworkRequest> {
        match self.state.login.mode {
            LoginMode::SignIn => {
                let form = &self.state.login.sign_in;
                let email = form.value(0).trim().to_owned();
                let password = form.value(1).to_owned();
                if email.is_empty() || password.is_empty() {
                    self.notify_error("Email and password are required");
                    return None;
                }
                Some(NetworkRequest::Login {
                    credentials: Credentials { email, password },
                })
            }
            LoginMode::Register => {
                let form = &self.state.login.register;
                let username = form.value(0).trim().to_owned();
                let email = form.value(1).trim().to_owned();
                let password = form.value(2).to_owned();
                if username.is_empty() || email.is_empty() || password.is_empty() {
                    self.notify_error("Username, email and password are required");
                    return None;
                }
                let area = non_empty(form.value(3));
                Some(NetworkRequest::Register {
                    registration: Registration {
                        username,
                        email,
                        password,
                        favorite_sport_id: None,
                        skill: None,
                        area,
                    },
                })
            }
        }
    }

    pub fn submit_create(&mut self) -> Option<NetworkRequest> {
        let user_id = self.session_user_id()?;
        let form = &self.state.create.form;

        let sport_id = form.value(0).trim().to_owned();
        if sport_id.is_empty() {
            self.notify_error("Sport id is required");
            return None;
        }
        let Ok(required_players) = form.value(1).trim().parse::<u32>() else {
            self.notify_error("Players required must be a number");
            return None;
        };
        if required_players < 2 {
            self.notify_error("A match needs at least two players");
            return None;
        }
        let Ok(duration_minutes) = form.value(2).trim().parse::<u32>() else {
            self.notify_error("Duration must be a number of minutes");
            return None;
        };
        let location = form.value(3).trim().to_owned();
        if location.is_empty() {
            self.notify_error("Location is required");
            return None;
        }
        let Some(starts_at) = parse_start_input(form.value(4)) else {
            self.notify_error("Start time must look like 2026-03-01T19:00:00");
            return None;
        };
        let min_skill = match parse_skill_input(form.value(5)) {
            Ok(skill) => skill,
            Err(()) => {
                self.notify_error("Skill must be beginner, intermediate or advanced");
                return None;
            }
        };
        let area = non_empty(form.value(6));

        Some(NetworkRequest::CreateMatch {
            draft: MatchDraft {
                sport_id,
                required_players,
                duration_minutes,
                location,
                starts_at,
                min_skill,
                area,
                creator_id: user_id,
            },
        })
    }

    pub fn submit_profile(&mut self) -> Option<NetworkRequest> {
        let user = self.state.session.as_ref()?;
        let form = &self.state.profile.form;

        let skill = match parse_skill_input(form.value(0)) {
            Ok(skill) => skill,
            Err(()) => {
                self.notify_error("Skill must be beginner, intermediate or advanced");
                return None;
            }
        };
        let sport_id = non_empty(form.value(1));
        let area = non_empty(form.value(2));

        let update = ProfileUpdate {
            sport_id: sport_id.filter(|id| {
                user.favorite_sport.as_ref().map(|s| s.id.as_str()) != Some(id.as_str())
            }),
            skill: skill.filter(|s| user.skill != Some(*s)),
            area: area.filter(|a| user.area.as_deref() != Some(a.as_str())),
        };
        if update.sport_id.is_none() && update.skill.is_none() && update.area.is_none() {
            self.notify_info("No changes to save");
            return None;
        }
        Some(NetworkRequest::UpdateProfile {
            user_id: user.id.clone(),
            update,
        })
    }

    pub fn run_search(&mut self) -> Option<NetworkRequest> {
        let user_id = self.session_user_id()?;
        Some(NetworkRequest::SearchMatches {
            user_id,
            algorithm: self.state.search.algorithm,
        })
    }

    pub fn logout(&mut self) {
        self.session_store.clear();
        self.state = AppState::new();
        self.notify_info("Signed out");
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn differs(entered: &str, current: &str) -> Option<String> {
    let trimmed = entered.trim();
    (!trimmed.is_empty() && trimmed != current).then(|| trimmed.to_owned())
}

fn parse_start_input(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M"))
        .ok()
}

/// Empty input means "not set"; anything else must name a level.
fn parse_skill_input(value: &str) -> Result<Option<SkillLevel>, ()> {
    match value.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "beginner" => Ok(Some(SkillLevel::Beginner)),
        "intermediate" => Ok(Some(SkillLevel::Intermediate)),
        "advanced" => Ok(Some(SkillLevel::Advanced)),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_state::NoticeKind;
    use pickup_api::MatchState;

    fn test_app() -> App {
        let path = std::env::temp_dir()
            .join(format!("pmtui-app-test-{}", std::process::id()))
            .join("session.json");
        let _ = std::fs::remove_file(&path);
        let mut app = App::with_store(AppSettings::default(), SessionStore::at(path));
        app.state.session = Some(User {
            id: "c1".into(),
            username: "owner".into(),
            ..User::default()
        });
        app
    }

    fn user(id: &str) -> User {
        User { id: id.into(), username: format!("p-{id}"), ..User::default() }
    }

    fn confirmed_match(enrolled: &[&str], required: u32) -> Match {
        Match {
            id: "m1".into(),
            state: MatchState::Confirmed,
            required_players: required,
            enrolled: enrolled.iter().map(|p| user(p)).collect(),
            creator: user("c1"),
            ..Match::default()
        }
    }

    fn open_with(app: &mut App, snapshot: Match) {
        app.state.detail.open(&snapshot.id.clone());
        app.state.detail.orchestrator.on_match_loaded(snapshot);
    }

    #[test]
    fn declined_cancel_never_reaches_the_orchestrator() {
        let mut app = test_app();
        open_with(&mut app, confirmed_match(&["a", "b"], 2));

        app.trigger_action(MatchAction::Cancel);
        assert!(matches!(app.state.detail.overlay, DetailOverlay::ConfirmCancel));

        let request = app.answer_cancel_prompt(false);
        assert!(request.is_none());
        assert!(!app.state.detail.orchestrator.is_busy());
        assert!(matches!(app.state.detail.overlay, DetailOverlay::None));
    }

    #[test]
    fn accepted_cancel_dispatches_exactly_once() {
        let mut app = test_app();
        open_with(&mut app, confirmed_match(&["a", "b"], 2));

        app.trigger_action(MatchAction::Cancel);
        let request = app.answer_cancel_prompt(true);
        assert!(matches!(
            request,
            Some(NetworkRequest::Transition { ref call, .. })
                if matches!(call, TransitionCall::Cancel)
        ));
        assert!(app.state.detail.orchestrator.is_busy());

        // Answering again with no prompt open produces nothing.
        assert!(app.answer_cancel_prompt(true).is_none());
    }

    #[test]
    fn actions_are_refused_while_one_is_in_flight() {
        let mut app = test_app();
        open_with(&mut app, confirmed_match(&["a", "b"], 2));

        let first = app.trigger_action(MatchAction::Start);
        assert!(first.is_some());

        let second = app.trigger_action(MatchAction::Start);
        assert!(second.is_none());
        assert_eq!(
            app.state.notice.as_ref().map(|n| n.kind),
            Some(NoticeKind::Error)
        );
    }

    #[test]
    fn disabled_actions_do_not_dispatch() {
        let mut app = test_app();
        // Confirmed but under capacity: start is offered yet disabled.
        open_with(&mut app, confirmed_match(&["a"], 2));
        assert!(app.trigger_action(MatchAction::Start).is_none());
        assert!(!app.state.detail.orchestrator.is_busy());
    }

    #[test]
    fn finish_opens_score_entry_and_submits_duel_payload() {
        let mut app = test_app();
        let mut m = confirmed_match(&["a", "b"], 2);
        m.state = MatchState::InPlay;
        open_with(&mut app, m);

        app.trigger_action(MatchAction::Finish);
        let DetailOverlay::ScoreEntry(entry) = &mut app.state.detail.overlay else {
            panic!("expected score entry overlay");
        };
        entry.form_mut().push_char('6');
        // Second player left blank: must default to "0".

        let request = app.submit_score_entry().expect("finalize request");
        let NetworkRequest::Transition { call, .. } = request else {
            panic!("expected transition");
        };
        let TransitionCall::FinishDuel { scores } = call else {
            panic!("expected duel finalize");
        };
        assert_eq!(scores.get("a").map(String::as_str), Some("6"));
        assert_eq!(scores.get("b").map(String::as_str), Some("0"));
    }

    #[test]
    fn team_match_finish_builds_team_result() {
        let mut app = test_app();
        let mut m = confirmed_match(&["a", "b", "c"], 10);
        m.state = MatchState::InPlay;
        open_with(&mut app, m);

        app.trigger_action(MatchAction::Finish);
        let DetailOverlay::ScoreEntry(entry) = &mut app.state.detail.overlay else {
            panic!("expected score entry overlay");
        };
        assert!(matches!(entry, ScoreEntry::Teams { .. }));
        entry.form_mut().focus_next(); // home score
        entry.form_mut().push_char('3');

        let request = app.submit_score_entry().expect("finalize request");
        let NetworkRequest::Transition { call, .. } = request else {
            panic!("expected transition");
        };
        let TransitionCall::FinishTeams(result) = call else {
            panic!("expected team finalize");
        };
        assert_eq!(result.home_score, 3);
        assert_eq!(result.away_score, 0);
    }

    #[test]
    fn finalize_completion_yields_one_refetch_then_settles() {
        let mut app = test_app();
        let mut m = confirmed_match(&["a", "b"], 2);
        m.state = MatchState::InPlay;
        open_with(&mut app, m.clone());

        app.trigger_action(MatchAction::Finish);
        app.submit_score_entry().expect("finalize request");

        m.state = MatchState::Finished;
        let follow_up = app.on_transition_complete("m1".into(), MatchAction::Finish, m.clone());
        assert!(matches!(
            follow_up,
            Some(NetworkRequest::LoadMatch { ref match_id }) if match_id == "m1"
        ));
        assert!(app.state.detail.orchestrator.is_busy());

        app.on_match_loaded(m);
        assert!(!app.state.detail.orchestrator.is_busy());
    }

    #[test]
    fn failed_refetch_surfaces_as_success_and_frees_the_view() {
        let mut app = test_app();
        let mut m = confirmed_match(&["a", "b"], 2);
        m.state = MatchState::InPlay;
        open_with(&mut app, m.clone());

        app.trigger_action(MatchAction::Finish);
        app.submit_score_entry().expect("finalize request");
        m.state = MatchState::Finished;
        app.on_transition_complete("m1".into(), MatchAction::Finish, m);

        // The refetch comes back as a transport error.
        app.on_match_load_failed("m1".into(), "Network error".into());
        assert!(!app.state.detail.orchestrator.is_busy());
        assert_eq!(
            app.state.notice.as_ref().map(|n| n.kind),
            Some(NoticeKind::Info)
        );
    }

    #[test]
    fn unrelated_errors_do_not_settle_the_finalize_barrier() {
        let mut app = test_app();
        let mut m = confirmed_match(&["a", "b"], 2);
        m.state = MatchState::InPlay;
        open_with(&mut app, m.clone());

        app.trigger_action(MatchAction::Finish);
        app.submit_score_entry().expect("finalize request");
        m.state = MatchState::Finished;
        app.on_transition_complete("m1".into(), MatchAction::Finish, m);

        // A list refresh or search failing in the window must surface as
        // an error and leave the barrier waiting for the real refetch.
        app.on_error("search exploded".into());
        assert!(app.state.detail.orchestrator.awaiting_refetch());
        assert_eq!(
            app.state.notice.as_ref().map(|n| n.kind),
            Some(NoticeKind::Error)
        );

        // A load failure for some other match must not settle it either.
        app.on_match_load_failed("m9".into(), "boom".into());
        assert!(app.state.detail.orchestrator.awaiting_refetch());
    }

    #[test]
    fn guard_clears_when_a_transition_settles_after_navigation() {
        let mut app = test_app();
        open_with(&mut app, confirmed_match(&["a", "b"], 2));

        assert!(app.trigger_action(MatchAction::Start).is_some());
        assert!(app.state.detail.orchestrator.is_busy());

        // View moves to another match before the response lands.
        app.open_detail("m2");

        let mut updated = confirmed_match(&["a", "b"], 2);
        updated.state = MatchState::InPlay;
        let follow_up = app.on_transition_complete("m1".into(), MatchAction::Start, updated);
        assert!(follow_up.is_none());
        assert!(!app.state.detail.orchestrator.is_busy());
    }

    #[test]
    fn stale_snapshot_for_another_match_is_dropped() {
        let mut app = test_app();
        open_with(&mut app, confirmed_match(&["a", "b"], 2));

        let mut other = confirmed_match(&["x"], 2);
        other.id = "m9".into();
        app.on_match_loaded(other);
        assert_eq!(
            app.state.detail.orchestrator.snapshot().map(|m| m.id.as_str()),
            Some("m1")
        );
    }

    #[test]
    fn login_submit_requires_credentials() {
        let mut app = test_app();
        app.state.session = None;
        assert!(app.submit_login().is_none());

        app.state.login.sign_in.push_char('a');
        app.state.login.sign_in.focus_next();
        app.state.login.sign_in.push_char('p');
        let request = app.submit_login();
        assert!(matches!(request, Some(NetworkRequest::Login { .. })));
    }

    #[test]
    fn untouched_profile_form_is_a_no_op() {
        let mut app = test_app();
        let mut user = app.state.session.clone().unwrap();
        user.skill = Some(SkillLevel::Intermediate);
        user.area = Some("Belgrano".into());
        app.state.profile.load_from(&user);
        app.state.session = Some(user);

        assert!(app.submit_profile().is_none());
        assert_eq!(
            app.state.notice.as_ref().map(|n| n.kind),
            Some(NoticeKind::Info)
        );
    }

    #[test]
    fn tabs_require_a_session() {
        let mut app = test_app();
        app.state.session = None;
        app.state.active_tab = MenuItem::Login;
        app.update_tab(MenuItem::Matches);
        assert_eq!(app.state.active_tab, MenuItem::Login);
        app.update_tab(MenuItem::Help);
        assert_eq!(app.state.active_tab, MenuItem::Help);
    }
}
