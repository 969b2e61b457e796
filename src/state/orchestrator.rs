//! Sequencing of user-triggered match transitions.
//!
//! The orchestrator is the single gate between the detail view and the
//! network worker: it refuses to build a second request while one is in
//! flight, replaces the local snapshot wholesale from server responses,
//! and runs the finalize-then-refetch barrier for finished matches.

use crate::state::messages::NetworkRequest;
use pickup_api::actions::MatchAction;
use pickup_api::{Match, MatchEdit, TeamResult};
use std::collections::BTreeMap;

/// One concrete transition request, with whatever payload it needs.
#[derive(Debug, Clone)]
pub enum TransitionCall {
    Join { user_id: String },
    Leave { user_id: String },
    Confirm,
    Start,
    Cancel,
    Edit(MatchEdit),
    FinishDuel { scores: BTreeMap<String, String> },
    FinishTeams(TeamResult),
}

impl TransitionCall {
    pub fn action(&self) -> MatchAction {
        match self {
            TransitionCall::Join { .. } => MatchAction::Join,
            TransitionCall::Leave { .. } => MatchAction::Leave,
            TransitionCall::Confirm => MatchAction::Confirm,
            TransitionCall::Start => MatchAction::Start,
            TransitionCall::Cancel => MatchAction::Cancel,
            TransitionCall::Edit(_) => MatchAction::Edit,
            TransitionCall::FinishDuel { .. } | TransitionCall::FinishTeams(_) => {
                MatchAction::Finish
            }
        }
    }
}

/// Returned when `dispatch` is called while a transition is pending.
/// The transport is never touched in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy {
    pub action: MatchAction,
}

/// What a completed transition settled into.
#[derive(Debug)]
pub enum Settled {
    /// Snapshot replaced, guard cleared; the view may re-render actions.
    Updated,
    /// Finalize path: the guard stays held until this follow-up request
    /// resolves (or fails) and the refetch barrier settles.
    AwaitingRefetch(NetworkRequest),
}

/// Per-detail-view transition state machine. Owns the authoritative local
/// snapshot; the snapshot is only ever replaced whole, never field-patched.
#[derive(Debug, Default)]
pub struct MatchOrchestrator {
    snapshot: Option<Match>,
    in_flight: Option<MatchAction>,
    /// Match id whose post-finalize refetch has not settled yet.
    pending_refetch: Option<String>,
    /// Finalize response kept as the fallback snapshot if the refetch fails.
    finalize_fallback: Option<Match>,
}

impl MatchOrchestrator {
    pub fn snapshot(&self) -> Option<&Match> {
        self.snapshot.as_ref()
    }

    pub fn in_flight(&self) -> Option<MatchAction> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Point the orchestrator at another match. Stale barrier state from a
    /// previous match is dropped, and a guard held only for an abandoned
    /// finalize refetch clears with it (the finalize itself already
    /// succeeded). A guard for an ordinary pending transition stays until
    /// that request settles.
    pub fn open(&mut self, match_id: &str) {
        if self.snapshot.as_ref().is_some_and(|m| m.id != match_id) {
            self.snapshot = None;
        }
        if self.pending_refetch.take().is_some() {
            self.in_flight = None;
        }
        self.finalize_fallback = None;
    }

    /// Build the network request for a transition, or refuse while another
    /// one is pending. Refusal never reaches the transport.
    pub fn dispatch(&mut self, match_id: &str, call: TransitionCall) -> Result<NetworkRequest, Busy> {
        if let Some(action) = self.in_flight {
            return Err(Busy { action });
        }
        self.in_flight = Some(call.action());
        Ok(NetworkRequest::Transition { match_id: match_id.to_owned(), call })
    }

    /// Server accepted a transition. For everything except finalize the
    /// response body is the new snapshot and the guard clears. Finalize
    /// instead parks the response and demands exactly one refetch.
    pub fn on_transition_complete(
        &mut self,
        match_id: &str,
        action: MatchAction,
        snapshot: Match,
    ) -> Settled {
        if action == MatchAction::Finish {
            self.pending_refetch = Some(match_id.to_owned());
            self.finalize_fallback = Some(snapshot);
            Settled::AwaitingRefetch(NetworkRequest::LoadMatch { match_id: match_id.to_owned() })
        } else {
            self.snapshot = Some(snapshot);
            self.in_flight = None;
            Settled::Updated
        }
    }

    /// Server rejected a transition (or transport failed). The snapshot is
    /// untouched and the guard clears so the action stays retryable.
    pub fn on_transition_failed(&mut self, _match_id: &str, _action: MatchAction) {
        self.in_flight = None;
    }

    /// A transition settled for a match the view has navigated away from.
    /// There is nothing to reconcile, but the guard it held must clear or
    /// the new match's view stays refused forever. Only one request is
    /// ever in flight, so the held guard is necessarily the settled one.
    pub fn on_stale_transition(&mut self) {
        self.in_flight = None;
    }

    /// A fresh snapshot arrived, either from an ordinary load/refresh or
    /// from the post-finalize refetch. Returns true when this settled a
    /// pending finalize barrier.
    pub fn on_match_loaded(&mut self, snapshot: Match) -> bool {
        let settles_barrier = self
            .pending_refetch
            .as_deref()
            .is_some_and(|id| id == snapshot.id);
        self.snapshot = Some(snapshot);
        if settles_barrier {
            self.pending_refetch = None;
            self.finalize_fallback = None;
            self.in_flight = None;
        }
        settles_barrier
    }

    /// The post-finalize refetch failed. The finalize itself already
    /// succeeded, so the parked response becomes the snapshot and the
    /// whole operation still counts as a success.
    pub fn on_refetch_failed(&mut self, match_id: &str) -> bool {
        if self.pending_refetch.as_deref() != Some(match_id) {
            return false;
        }
        self.pending_refetch = None;
        if let Some(fallback) = self.finalize_fallback.take() {
            self.snapshot = Some(fallback);
        }
        self.in_flight = None;
        true
    }

    /// True while final scores may not be shown yet.
    pub fn awaiting_refetch(&self) -> bool {
        self.pending_refetch.is_some()
    }
}

// ---------------------------------------------------------------------------
// Finalize payload construction
// ---------------------------------------------------------------------------

/// Normalize one entered score: trimmed non-negative integer text passes
/// through, anything blank or non-numeric becomes "0".
pub fn sanitize_score(input: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed.to_owned()
    } else {
        "0".to_owned()
    }
}

/// Duel payload: one score string per enrolled player, keyed by player id.
/// Players missing from the entered map default to "0".
pub fn duel_scores(snapshot: &Match, entered: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    snapshot
        .enrolled
        .iter()
        .map(|player| {
            let score = entered
                .get(&player.id)
                .map(|s| sanitize_score(s))
                .unwrap_or_else(|| "0".to_owned());
            (player.id.clone(), score)
        })
        .collect()
}

/// Team payload: two named sides; blank or non-numeric score text becomes 0.
pub fn team_result(home_name: &str, home_score: &str, away_name: &str, away_score: &str) -> TeamResult {
    TeamResult {
        home_name: home_name.trim().to_owned(),
        home_score: home_score.trim().parse().unwrap_or(0),
        away_name: away_name.trim().to_owned(),
        away_score: away_score.trim().parse().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickup_api::{MatchState, User};

    fn player(id: &str) -> User {
        User { id: id.into(), username: format!("p-{id}"), ..User::default() }
    }

    fn snapshot(id: &str, state: MatchState, enrolled: &[&str], required: u32) -> Match {
        Match {
            id: id.into(),
            state,
            required_players: required,
            enrolled: enrolled.iter().map(|p| player(p)).collect(),
            creator: player("c1"),
            ..Match::default()
        }
    }

    fn request_action(request: &NetworkRequest) -> MatchAction {
        match request {
            NetworkRequest::Transition { call, .. } => call.action(),
            other => panic!("expected a transition, got {other:?}"),
        }
    }

    #[test]
    fn second_dispatch_is_refused_while_in_flight() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::Assembled, &["a"], 4));

        let first = orch.dispatch("m1", TransitionCall::Confirm).unwrap();
        assert_eq!(request_action(&first), MatchAction::Confirm);
        assert!(orch.is_busy());

        // Refusal exposes the pending action and builds no request.
        let refused = orch.dispatch("m1", TransitionCall::Cancel).unwrap_err();
        assert_eq!(refused.action, MatchAction::Confirm);
        assert!(orch.is_busy());
    }

    #[test]
    fn success_replaces_snapshot_whole_and_clears_guard() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::Assembled, &["a", "b"], 2));

        orch.dispatch("m1", TransitionCall::Confirm).unwrap();
        let updated = snapshot("m1", MatchState::Confirmed, &["a", "b"], 2);
        match orch.on_transition_complete("m1", MatchAction::Confirm, updated.clone()) {
            Settled::Updated => {}
            other => panic!("expected Updated, got {other:?}"),
        }

        assert!(!orch.is_busy());
        assert_eq!(orch.snapshot(), Some(&updated));
    }

    #[test]
    fn failure_keeps_snapshot_and_stays_retryable() {
        let mut orch = MatchOrchestrator::default();
        let before = snapshot("m1", MatchState::Confirmed, &["a", "b"], 2);
        orch.on_match_loaded(before.clone());

        orch.dispatch("m1", TransitionCall::Start).unwrap();
        orch.on_transition_failed("m1", MatchAction::Start);

        assert!(!orch.is_busy());
        assert_eq!(orch.snapshot(), Some(&before));
        // The same action dispatches again without complaint.
        assert!(orch.dispatch("m1", TransitionCall::Start).is_ok());
    }

    #[test]
    fn finalize_demands_exactly_one_refetch() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::InPlay, &["a", "b"], 2));

        let scores = BTreeMap::from([("a".to_string(), "6".to_string())]);
        orch.dispatch("m1", TransitionCall::FinishDuel { scores }).unwrap();

        let finalize_response = snapshot("m1", MatchState::Finished, &["a", "b"], 2);
        let follow_up =
            match orch.on_transition_complete("m1", MatchAction::Finish, finalize_response) {
                Settled::AwaitingRefetch(request) => request,
                other => panic!("expected AwaitingRefetch, got {other:?}"),
            };
        assert!(matches!(follow_up, NetworkRequest::LoadMatch { ref match_id } if match_id == "m1"));

        // Barrier open: still busy, scores not displayable yet.
        assert!(orch.is_busy());
        assert!(orch.awaiting_refetch());

        let refetched = snapshot("m1", MatchState::Finished, &["a", "b"], 2);
        assert!(orch.on_match_loaded(refetched));
        assert!(!orch.is_busy());
        assert!(!orch.awaiting_refetch());

        // The barrier settled once; a later ordinary refresh does not re-settle.
        assert!(!orch.on_match_loaded(snapshot("m1", MatchState::Finished, &["a", "b"], 2)));
    }

    #[test]
    fn failed_refetch_still_counts_as_success_with_fallback_snapshot() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::InPlay, &["a", "b"], 2));

        orch.dispatch("m1", TransitionCall::FinishDuel { scores: BTreeMap::new() }).unwrap();
        let finalize_response = snapshot("m1", MatchState::Finished, &["a", "b"], 2);
        let settled =
            orch.on_transition_complete("m1", MatchAction::Finish, finalize_response.clone());
        assert!(matches!(settled, Settled::AwaitingRefetch(_)));

        assert!(orch.on_refetch_failed("m1"));
        assert!(!orch.is_busy());
        assert_eq!(orch.snapshot(), Some(&finalize_response));
    }

    #[test]
    fn refetch_failure_for_another_match_is_ignored() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::InPlay, &["a", "b"], 2));
        assert!(!orch.on_refetch_failed("m2"));
    }

    #[test]
    fn opening_another_match_drops_stale_barrier_state() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::InPlay, &["a", "b"], 2));
        orch.dispatch("m1", TransitionCall::FinishDuel { scores: BTreeMap::new() }).unwrap();
        orch.on_transition_complete(
            "m1",
            MatchAction::Finish,
            snapshot("m1", MatchState::Finished, &["a", "b"], 2),
        );

        orch.open("m2");
        assert!(!orch.awaiting_refetch());
        assert!(orch.snapshot().is_none());
        // The finalize already succeeded; abandoning its refetch must not
        // leave the new view refused.
        assert!(!orch.is_busy());
        assert!(orch.dispatch("m2", TransitionCall::Confirm).is_ok());
    }

    #[test]
    fn stale_transition_settle_frees_the_guard() {
        let mut orch = MatchOrchestrator::default();
        orch.on_match_loaded(snapshot("m1", MatchState::Confirmed, &["a", "b"], 2));
        orch.dispatch("m1", TransitionCall::Start).unwrap();

        orch.open("m2");
        assert!(orch.is_busy());

        orch.on_stale_transition();
        assert!(!orch.is_busy());
        assert!(orch.dispatch("m2", TransitionCall::Confirm).is_ok());
    }

    #[test]
    fn duel_scores_default_missing_and_invalid_to_zero() {
        let m = snapshot("m1", MatchState::InPlay, &["a", "b", "c"], 2);
        let entered = BTreeMap::from([
            ("a".to_string(), "6".to_string()),
            ("b".to_string(), "abc".to_string()),
            // "c" never entered anything.
        ]);

        let payload = duel_scores(&m, &entered);
        assert_eq!(payload.get("a").map(String::as_str), Some("6"));
        assert_eq!(payload.get("b").map(String::as_str), Some("0"));
        assert_eq!(payload.get("c").map(String::as_str), Some("0"));
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn duel_scores_for_empty_roster_is_empty() {
        let m = snapshot("m1", MatchState::InPlay, &[], 2);
        assert!(duel_scores(&m, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn sanitize_score_accepts_only_plain_digits() {
        assert_eq!(sanitize_score(" 12 "), "12");
        assert_eq!(sanitize_score(""), "0");
        assert_eq!(sanitize_score("  "), "0");
        assert_eq!(sanitize_score("-3"), "0");
        assert_eq!(sanitize_score("3.5"), "0");
    }

    #[test]
    fn team_result_defaults_blank_scores_to_zero() {
        let result = team_result("Rojos", "3", "Azules", "");
        assert_eq!(result.home_score, 3);
        assert_eq!(result.away_score, 0);

        let result = team_result(" Rojos ", "x", "Azules", "2");
        assert_eq!(result.home_name, "Rojos");
        assert_eq!(result.home_score, 0);
        assert_eq!(result.away_score, 2);
    }

    #[test]
    fn finish_call_action_is_finish_for_both_paths() {
        let duel = TransitionCall::FinishDuel { scores: BTreeMap::new() };
        let teams = TransitionCall::FinishTeams(TeamResult::default());
        assert_eq!(duel.action(), MatchAction::Finish);
        assert_eq!(teams.action(), MatchAction::Finish);
    }
}
