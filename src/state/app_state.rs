use crate::app::MenuItem;
use crate::state::orchestrator::MatchOrchestrator;
use pickup_api::{Match, RecommendAlgorithm, User};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Text form editing (shared by login, create, edit, profile, score entry)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    /// Render as asterisks (passwords).
    pub masked: bool,
}

impl FormField {
    pub fn new(label: &str) -> Self {
        Self { label: label.to_owned(), value: String::new(), masked: false }
    }

    pub fn masked(label: &str) -> Self {
        Self { label: label.to_owned(), value: String::new(), masked: true }
    }

    pub fn with_value(label: &str, value: impl Into<String>) -> Self {
        Self { label: label.to_owned(), value: value.into(), masked: false }
    }
}

/// Focus-and-compose text form, edited one field at a time.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub editing: bool,
}

impl FormState {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields, focus: 0, editing: false }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn clear_values(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.focus = 0;
        self.editing = false;
    }
}

// ---------------------------------------------------------------------------
// Transient notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One-line status message; expires after a handful of UI ticks.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    ticks_left: u8,
}

impl Notice {
    const LIFETIME_TICKS: u8 = 12;

    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: NoticeKind::Info, ticks_left: Self::LIFETIME_TICKS }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: NoticeKind::Error, ticks_left: Self::LIFETIME_TICKS }
    }

    /// Returns true once the notice has expired.
    pub fn tick(&mut self) -> bool {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        self.ticks_left == 0
    }
}

// ---------------------------------------------------------------------------
// Login / register
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginMode {
    #[default]
    SignIn,
    Register,
}

#[derive(Debug)]
pub struct LoginState {
    pub mode: LoginMode,
    pub sign_in: FormState,
    pub register: FormState,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            mode: LoginMode::SignIn,
            sign_in: FormState::new(vec![
                FormField::new("Email"),
                FormField::masked("Password"),
            ]),
            register: FormState::new(vec![
                FormField::new("Username"),
                FormField::new("Email"),
                FormField::masked("Password"),
                FormField::new("Area (optional)"),
            ]),
        }
    }
}

impl LoginState {
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::Register,
            LoginMode::Register => LoginMode::SignIn,
        };
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        match self.mode {
            LoginMode::SignIn => &mut self.sign_in,
            LoginMode::Register => &mut self.register,
        }
    }

    pub fn form(&self) -> &FormState {
        match self.mode {
            LoginMode::SignIn => &self.sign_in,
            LoginMode::Register => &self.register,
        }
    }
}

// ---------------------------------------------------------------------------
// Match list / search
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchListState {
    pub matches: Vec<Match>,
    pub selected: usize,
}

impl MatchListState {
    pub fn load(&mut self, matches: Vec<Match>) {
        // Keep the cursor on the same row across refreshes when possible.
        self.selected = self.selected.min(matches.len().saturating_sub(1));
        self.matches = matches;
    }

    pub fn navigate_down(&mut self) {
        let max = self.matches.len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches.get(self.selected)
    }
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub algorithm: RecommendAlgorithm,
    pub results: MatchListState,
    pub searched: bool,
}

impl SearchState {
    pub fn cycle_algorithm(&mut self) {
        self.algorithm = self.algorithm.next();
    }
}

// ---------------------------------------------------------------------------
// Detail view: orchestrator + overlays
// ---------------------------------------------------------------------------

/// Score entry for the two finalize flows.
#[derive(Debug)]
pub enum ScoreEntry {
    /// One score per enrolled player, keyed by player id.
    Duel { ids: Vec<String>, form: FormState },
    /// Two aggregate sides.
    Teams { form: FormState },
}

impl ScoreEntry {
    /// Build the entry form matching the snapshot's finalize path.
    pub fn for_match(snapshot: &Match) -> Self {
        if snapshot.is_team_match() {
            ScoreEntry::Teams {
                form: FormState::new(vec![
                    FormField::with_value("Home team", "Home"),
                    FormField::new("Home score"),
                    FormField::with_value("Away team", "Away"),
                    FormField::new("Away score"),
                ]),
            }
        } else {
            let ids: Vec<String> = snapshot.enrolled.iter().map(|u| u.id.clone()).collect();
            let fields = snapshot
                .enrolled
                .iter()
                .map(|u| FormField::new(&u.username))
                .collect();
            ScoreEntry::Duel { ids, form: FormState::new(fields) }
        }
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        match self {
            ScoreEntry::Duel { form, .. } | ScoreEntry::Teams { form } => form,
        }
    }

    pub fn form(&self) -> &FormState {
        match self {
            ScoreEntry::Duel { form, .. } | ScoreEntry::Teams { form } => form,
        }
    }

    /// Entered duel scores, keyed by player id. Only meaningful for `Duel`.
    pub fn duel_entries(&self) -> BTreeMap<String, String> {
        match self {
            ScoreEntry::Duel { ids, form } => ids
                .iter()
                .zip(form.fields.iter())
                .map(|(id, field)| (id.clone(), field.value.clone()))
                .collect(),
            ScoreEntry::Teams { .. } => BTreeMap::new(),
        }
    }
}

/// Modal layered over the detail view. At most one at a time.
#[derive(Debug, Default)]
pub enum DetailOverlay {
    #[default]
    None,
    /// Explicit yes/no gate before cancel ever reaches the orchestrator.
    ConfirmCancel,
    ScoreEntry(ScoreEntry),
    Edit(FormState),
}

#[derive(Debug, Default)]
pub struct DetailState {
    pub match_id: Option<String>,
    pub orchestrator: MatchOrchestrator,
    pub not_found: bool,
    pub overlay: DetailOverlay,
}

impl DetailState {
    pub fn open(&mut self, match_id: &str) {
        self.match_id = Some(match_id.to_owned());
        self.not_found = false;
        self.overlay = DetailOverlay::None;
        self.orchestrator.open(match_id);
    }

    pub fn edit_form(snapshot: &Match) -> FormState {
        FormState::new(vec![
            FormField::with_value("Location", snapshot.location.clone()),
            FormField::with_value(
                "Starts at (YYYY-MM-DDTHH:MM:SS)",
                snapshot
                    .starts_at
                    .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
                    .unwrap_or_default(),
            ),
            FormField::with_value("Duration (minutes)", snapshot.duration_minutes.to_string()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Create / profile forms
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CreateState {
    pub form: FormState,
}

impl Default for CreateState {
    fn default() -> Self {
        Self {
            form: FormState::new(vec![
                FormField::new("Sport id"),
                FormField::new("Players required"),
                FormField::new("Duration (minutes)"),
                FormField::new("Location"),
                FormField::new("Starts at (YYYY-MM-DDTHH:MM:SS)"),
                FormField::new("Min skill (beginner/intermediate/advanced, optional)"),
                FormField::new("Area (optional)"),
            ]),
        }
    }
}

#[derive(Debug)]
pub struct ProfileState {
    pub form: FormState,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            form: FormState::new(vec![
                FormField::new("Skill (beginner/intermediate/advanced)"),
                FormField::new("Favorite sport id"),
                FormField::new("Area"),
            ]),
        }
    }
}

impl ProfileState {
    /// Pre-fill from the session record so an untouched form is a no-op.
    pub fn load_from(&mut self, user: &User) {
        self.form = FormState::new(vec![
            FormField::with_value(
                "Skill (beginner/intermediate/advanced)",
                user.skill.map(|s| s.label().to_lowercase()).unwrap_or_default(),
            ),
            FormField::with_value(
                "Favorite sport id",
                user.favorite_sport.as_ref().map(|s| s.id.clone()).unwrap_or_default(),
            ),
            FormField::with_value("Area", user.area.clone().unwrap_or_default()),
        ]);
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub session: Option<User>,
    pub notice: Option<Notice>,
    pub login: LoginState,
    pub matches: MatchListState,
    pub search: SearchState,
    pub detail: DetailState,
    pub create: CreateState,
    pub profile: ProfileState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickup_api::MatchState;

    fn user(id: &str, name: &str) -> User {
        User { id: id.into(), username: name.into(), ..User::default() }
    }

    fn snapshot(required: u32, enrolled: &[(&str, &str)]) -> Match {
        Match {
            id: "m1".into(),
            required_players: required,
            state: MatchState::InPlay,
            enrolled: enrolled.iter().map(|(id, name)| user(id, name)).collect(),
            ..Match::default()
        }
    }

    #[test]
    fn score_entry_picks_duel_for_two_player_matches() {
        let entry = ScoreEntry::for_match(&snapshot(2, &[("p1", "ana"), ("p2", "bob")]));
        match entry {
            ScoreEntry::Duel { ref ids, ref form } => {
                assert_eq!(ids, &["p1", "p2"]);
                assert_eq!(form.fields.len(), 2);
                assert_eq!(form.fields[0].label, "ana");
            }
            ScoreEntry::Teams { .. } => panic!("expected duel entry"),
        }
    }

    #[test]
    fn score_entry_picks_teams_above_two_required() {
        let entry = ScoreEntry::for_match(&snapshot(10, &[("p1", "ana")]));
        assert!(matches!(entry, ScoreEntry::Teams { .. }));
    }

    #[test]
    fn duel_entries_pair_ids_with_entered_text() {
        let mut entry = ScoreEntry::for_match(&snapshot(2, &[("p1", "ana"), ("p2", "bob")]));
        entry.form_mut().push_char('6');
        entry.form_mut().focus_next();
        entry.form_mut().push_char('4');

        let entries = entry.duel_entries();
        assert_eq!(entries.get("p1").map(String::as_str), Some("6"));
        assert_eq!(entries.get("p2").map(String::as_str), Some("4"));
    }

    #[test]
    fn list_cursor_survives_refresh_and_clamps() {
        let mut list = MatchListState::default();
        list.load(vec![snapshot(2, &[]), snapshot(2, &[]), snapshot(2, &[])]);
        list.navigate_down();
        list.navigate_down();
        assert_eq!(list.selected, 2);

        // Shorter refresh clamps the cursor.
        list.load(vec![snapshot(2, &[])]);
        assert_eq!(list.selected, 0);
        list.navigate_up();
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn notice_expires_after_its_lifetime() {
        let mut notice = Notice::info("saved");
        for _ in 0..Notice::LIFETIME_TICKS - 1 {
            assert!(!notice.tick());
        }
        assert!(notice.tick());
    }

    #[test]
    fn form_focus_wraps_both_directions() {
        let mut form = FormState::new(vec![FormField::new("a"), FormField::new("b")]);
        form.focus_prev();
        assert_eq!(form.focus, 1);
        form.focus_next();
        assert_eq!(form.focus, 0);
        form.push_char('x');
        form.push_char('y');
        form.backspace();
        assert_eq!(form.value(0), "x");
    }
}
