pub mod actions;
pub mod client;
pub mod wire;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use actions::{ActionSet, Availability, MatchAction, Viewer, available_actions};

// ---------------------------------------------------------------------------
// Domain types: canonical model, independent of the service's wire format
// ---------------------------------------------------------------------------

/// A scheduled pick-up session. Snapshots are always server-produced; the
/// client never constructs or patches one locally (it replaces the whole
/// value after each mutation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: String,
    pub sport: Sport,
    pub required_players: u32,
    pub duration_minutes: u32,
    pub location: String,
    pub area: Option<String>,
    /// Scheduled start; the service sends local time without a zone.
    pub starts_at: Option<NaiveDateTime>,
    pub min_skill: Option<SkillLevel>,
    pub state: MatchState,
    pub enrolled: Vec<User>,
    /// Scoring entries; only meaningful once the match is finished or a
    /// result has been recorded.
    pub participants: Vec<Participant>,
    pub creator: User,
}

impl Match {
    pub fn enrolled_count(&self) -> usize {
        self.enrolled.len()
    }

    /// Derived occupancy signal. Does not imply a state transition; only
    /// the server-reported state is authoritative.
    pub fn is_full(&self) -> bool {
        self.enrolled.len() >= self.required_players as usize
    }

    pub fn open_slots(&self) -> usize {
        (self.required_players as usize).saturating_sub(self.enrolled.len())
    }

    pub fn is_creator(&self, user_id: &str) -> bool {
        self.creator.id == user_id
    }

    pub fn is_enrolled(&self, user_id: &str) -> bool {
        self.enrolled.iter().any(|u| u.id == user_id)
    }

    pub fn viewer(&self, user_id: &str) -> Viewer {
        Viewer {
            is_creator: self.is_creator(user_id),
            is_enrolled: self.is_enrolled(user_id),
        }
    }

    /// Which actions the given user may see/trigger on this snapshot.
    pub fn actions_for(&self, user_id: &str) -> ActionSet {
        available_actions(
            self.state,
            self.viewer(user_id),
            self.enrolled.len(),
            self.required_players as usize,
        )
    }

    /// More than two required players means the result is captured as two
    /// aggregate sides rather than per participant. A four-player doubles
    /// match scored individually still routes through the team path; this
    /// mirrors the service's own classification.
    pub fn is_team_match(&self) -> bool {
        self.required_players > 2
    }
}

/// Lifecycle of a match. Ordered logically; `Cancelled` is an absorbing
/// alternative reachable from any pre-`InPlay` state. `Unknown` covers
/// server-side enum extension: a state this client does not recognize
/// renders with no actions rather than failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchState {
    #[default]
    NeedsPlayers,
    Assembled,
    Confirmed,
    InPlay,
    Finished,
    Cancelled,
    Unknown,
}

impl MatchState {
    pub const ALL: [MatchState; 7] = [
        MatchState::NeedsPlayers,
        MatchState::Assembled,
        MatchState::Confirmed,
        MatchState::InPlay,
        MatchState::Finished,
        MatchState::Cancelled,
        MatchState::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MatchState::NeedsPlayers => "Needs players",
            MatchState::Assembled => "Assembled",
            MatchState::Confirmed => "Confirmed",
            MatchState::InPlay => "In play",
            MatchState::Finished => "Finished",
            MatchState::Cancelled => "Cancelled",
            MatchState::Unknown => "Unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchState::Finished | MatchState::Cancelled)
    }

    /// Position on the lifecycle ladder shown in the detail view.
    /// `None` for Cancelled/Unknown, which sit outside the ladder.
    pub fn ladder_step(&self) -> Option<usize> {
        match self {
            MatchState::NeedsPlayers => Some(0),
            MatchState::Assembled => Some(1),
            MatchState::Confirmed => Some(2),
            MatchState::InPlay => Some(3),
            MatchState::Finished => Some(4),
            MatchState::Cancelled | MatchState::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    pub name: String,
    pub allowed_players: u32,
    pub scoring: ScoringKind,
}

/// How a sport counts its score; only affects labels on score entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringKind {
    #[default]
    Goals,
    Sets,
}

impl ScoringKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScoringKind::Goals => "goals",
            ScoringKind::Sets => "sets",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

/// The authenticated-session record and every roster entry. Serde derives
/// exist because this is the one record persisted client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub favorite_sport: Option<Sport>,
    pub skill: Option<SkillLevel>,
    pub area: Option<String>,
}

/// A scoring entry: an individual player or an aggregate team side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub kind: ParticipantKind,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParticipantKind {
    #[default]
    Individual,
    Team,
}

/// Server-side recommendation algorithm for match search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecommendAlgorithm {
    #[default]
    None,
    Level,
    Proximity,
    History,
}

impl RecommendAlgorithm {
    pub fn as_param(&self) -> &'static str {
        match self {
            RecommendAlgorithm::None => "NONE",
            RecommendAlgorithm::Level => "LEVEL",
            RecommendAlgorithm::Proximity => "PROXIMITY",
            RecommendAlgorithm::History => "HISTORY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendAlgorithm::None => "All matches",
            RecommendAlgorithm::Level => "By skill level",
            RecommendAlgorithm::Proximity => "Near me",
            RecommendAlgorithm::History => "From my history",
        }
    }

    pub fn next(self) -> Self {
        match self {
            RecommendAlgorithm::None => RecommendAlgorithm::Level,
            RecommendAlgorithm::Level => RecommendAlgorithm::Proximity,
            RecommendAlgorithm::Proximity => RecommendAlgorithm::History,
            RecommendAlgorithm::History => RecommendAlgorithm::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request payloads (domain side; wire translation happens in `wire`)
// ---------------------------------------------------------------------------

/// Fields for creating a match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchDraft {
    pub sport_id: String,
    pub required_players: u32,
    pub duration_minutes: u32,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub min_skill: Option<SkillLevel>,
    pub area: Option<String>,
    pub creator_id: String,
}

/// Partial edit; `None` fields are left untouched by the server.
/// Changing `required_players` is deliberately not part of the edit surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchEdit {
    pub location: Option<String>,
    pub starts_at: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
}

impl MatchEdit {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.starts_at.is_none() && self.duration_minutes.is_none()
    }
}

/// Two named sides with integer scores, for team-match finalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamResult {
    pub home_name: String,
    pub home_score: u32,
    pub away_name: String,
    pub away_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub favorite_sport_id: Option<String>,
    pub skill: Option<SkillLevel>,
    pub area: Option<String>,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub sport_id: Option<String>,
    pub skill: Option<SkillLevel>,
    pub area: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user-{id}"),
            email: format!("{id}@example.com"),
            ..User::default()
        }
    }

    fn match_with(creator: &str, enrolled: &[&str], required: u32) -> Match {
        Match {
            id: "m1".into(),
            required_players: required,
            creator: user(creator),
            enrolled: enrolled.iter().map(|id| user(id)).collect(),
            ..Match::default()
        }
    }

    #[test]
    fn occupancy_is_derived_not_stateful() {
        let mut m = match_with("c", &["a", "b"], 2);
        assert!(m.is_full());
        assert_eq!(m.open_slots(), 0);
        // Full does not flip the lifecycle state locally.
        assert_eq!(m.state, MatchState::NeedsPlayers);

        m.required_players = 4;
        assert!(!m.is_full());
        assert_eq!(m.open_slots(), 2);
    }

    #[test]
    fn viewer_roles_come_from_creator_and_roster() {
        let m = match_with("c", &["a"], 4);
        assert!(m.viewer("c").is_creator);
        assert!(!m.viewer("c").is_enrolled);
        assert!(m.viewer("a").is_enrolled);
        assert!(!m.viewer("a").is_creator);
        let nobody = m.viewer("z");
        assert!(!nobody.is_creator && !nobody.is_enrolled);
    }

    #[test]
    fn team_threshold_is_more_than_two_required() {
        assert!(!match_with("c", &[], 2).is_team_match());
        assert!(match_with("c", &[], 3).is_team_match());
        assert!(match_with("c", &[], 10).is_team_match());
    }

    #[test]
    fn ladder_steps_cover_the_happy_path_only() {
        assert_eq!(MatchState::NeedsPlayers.ladder_step(), Some(0));
        assert_eq!(MatchState::Finished.ladder_step(), Some(4));
        assert_eq!(MatchState::Cancelled.ladder_step(), None);
        assert_eq!(MatchState::Unknown.ladder_step(), None);
    }

    #[test]
    fn terminal_states() {
        assert!(MatchState::Finished.is_terminal());
        assert!(MatchState::Cancelled.is_terminal());
        assert!(!MatchState::InPlay.is_terminal());
        assert!(!MatchState::Unknown.is_terminal());
    }

    #[test]
    fn algorithm_cycle_visits_all_four() {
        let mut a = RecommendAlgorithm::None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(a.as_param());
            a = a.next();
        }
        assert_eq!(seen, vec!["NONE", "LEVEL", "PROXIMITY", "HISTORY"]);
        assert_eq!(a, RecommendAlgorithm::None);
    }
}
