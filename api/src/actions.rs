//! Match action gating: a pure mapping from lifecycle state, viewer role
//! and occupancy to the set of actions a view may expose. Transitions
//! themselves are server-enforced; this module only decides what to offer.

use crate::MatchState;

/// The transition actions a user can trigger on a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchAction {
    Join,
    Leave,
    Confirm,
    Start,
    Cancel,
    Edit,
    Finish,
}

impl MatchAction {
    pub const ALL: [MatchAction; 7] = [
        MatchAction::Join,
        MatchAction::Leave,
        MatchAction::Confirm,
        MatchAction::Start,
        MatchAction::Cancel,
        MatchAction::Edit,
        MatchAction::Finish,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MatchAction::Join => "Join match",
            MatchAction::Leave => "Leave match",
            MatchAction::Confirm => "Confirm match",
            MatchAction::Start => "Start match",
            MatchAction::Cancel => "Cancel match",
            MatchAction::Edit => "Edit match",
            MatchAction::Finish => "Finish & record score",
        }
    }

    /// Label shown while the action's request is in flight.
    pub fn progress_label(&self) -> &'static str {
        match self {
            MatchAction::Join => "Joining...",
            MatchAction::Leave => "Leaving...",
            MatchAction::Confirm => "Confirming...",
            MatchAction::Start => "Starting...",
            MatchAction::Cancel => "Cancelling...",
            MatchAction::Edit => "Saving...",
            MatchAction::Finish => "Finishing...",
        }
    }
}

/// Visibility and availability of one action. `offered == false` means the
/// control is hidden entirely; `enabled == false` means shown but inert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub offered: bool,
    pub enabled: bool,
}

impl Availability {
    pub const HIDDEN: Availability = Availability { offered: false, enabled: false };

    fn offered() -> Self {
        Availability { offered: true, enabled: true }
    }

    fn offered_if(cond: bool) -> Self {
        if cond { Self::offered() } else { Self::HIDDEN }
    }

    fn disabled() -> Self {
        Availability { offered: true, enabled: false }
    }
}

/// The requesting user's relationship to a match. If both flags are true,
/// creator rules win: `leave` is never offered to a creator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub is_creator: bool,
    pub is_enrolled: bool,
}

/// One `Availability` per action. Total over every `MatchState`, including
/// `Unknown`, and never panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub join: Availability,
    pub leave: Availability,
    pub confirm: Availability,
    pub start: Availability,
    pub cancel: Availability,
    pub edit: Availability,
    pub finish: Availability,
}

impl ActionSet {
    pub fn get(&self, action: MatchAction) -> Availability {
        match action {
            MatchAction::Join => self.join,
            MatchAction::Leave => self.leave,
            MatchAction::Confirm => self.confirm,
            MatchAction::Start => self.start,
            MatchAction::Cancel => self.cancel,
            MatchAction::Edit => self.edit,
            MatchAction::Finish => self.finish,
        }
    }

    pub fn is_empty(&self) -> bool {
        MatchAction::ALL.iter().all(|a| !self.get(*a).offered)
    }

    /// Offered actions in display order.
    pub fn offered(&self) -> Vec<(MatchAction, Availability)> {
        [
            MatchAction::Join,
            MatchAction::Edit,
            MatchAction::Confirm,
            MatchAction::Start,
            MatchAction::Finish,
            MatchAction::Leave,
            MatchAction::Cancel,
        ]
        .into_iter()
        .filter_map(|a| {
            let avail = self.get(a);
            avail.offered.then_some((a, avail))
        })
        .collect()
    }
}

/// Decide which actions are offered for a match snapshot.
///
/// Terminal states (and unrecognized ones) offer nothing. `start` is the
/// only action that can be offered-but-disabled: the creator sees it as
/// soon as the match is confirmed, but it stays inert until the roster is
/// full. `join` is gated on roster capacity and never on role.
pub fn available_actions(
    state: MatchState,
    viewer: Viewer,
    enrolled_count: usize,
    required_players: usize,
) -> ActionSet {
    use MatchState::*;

    if state.is_terminal() || state == Unknown {
        return ActionSet::default();
    }

    let Viewer { is_creator, is_enrolled } = viewer;
    let full = enrolled_count >= required_players;
    let forming = matches!(state, NeedsPlayers | Assembled);

    ActionSet {
        join: Availability::offered_if(!is_enrolled && state == NeedsPlayers && !full),
        leave: Availability::offered_if(!is_creator && is_enrolled && forming),
        confirm: Availability::offered_if(is_creator && state == Assembled),
        start: if is_creator && state == Confirmed {
            if full { Availability::offered() } else { Availability::disabled() }
        } else {
            Availability::HIDDEN
        },
        cancel: Availability::offered_if(is_creator && (forming || state == Confirmed)),
        edit: Availability::offered_if(is_creator && forming),
        finish: Availability::offered_if(is_creator && state == InPlay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchState::*;

    const ROLES: [Viewer; 4] = [
        Viewer { is_creator: false, is_enrolled: false },
        Viewer { is_creator: false, is_enrolled: true },
        Viewer { is_creator: true, is_enrolled: false },
        Viewer { is_creator: true, is_enrolled: true },
    ];

    // Occupancy samples: under capacity, exactly full, over capacity.
    const OCCUPANCY: [(usize, usize); 3] = [(3, 10), (10, 10), (11, 10)];

    /// Expectation written directly from the offer table, independent of
    /// the implementation's shortcuts.
    fn expected(
        action: MatchAction,
        state: MatchState,
        v: Viewer,
        enrolled: usize,
        required: usize,
    ) -> Availability {
        if matches!(state, Finished | Cancelled | Unknown) {
            return Availability::HIDDEN;
        }
        let offered = match action {
            MatchAction::Edit => v.is_creator && matches!(state, NeedsPlayers | Assembled),
            MatchAction::Confirm => v.is_creator && state == Assembled,
            MatchAction::Start => v.is_creator && state == Confirmed,
            MatchAction::Finish => v.is_creator && state == InPlay,
            MatchAction::Leave => {
                !v.is_creator && v.is_enrolled && matches!(state, NeedsPlayers | Assembled)
            }
            MatchAction::Cancel => {
                v.is_creator && matches!(state, NeedsPlayers | Assembled | Confirmed)
            }
            MatchAction::Join => !v.is_enrolled && state == NeedsPlayers && enrolled < required,
        };
        let enabled = match action {
            MatchAction::Start => offered && enrolled >= required,
            _ => offered,
        };
        Availability { offered, enabled }
    }

    #[test]
    fn offer_table_exhaustive() {
        for state in MatchState::ALL {
            for viewer in ROLES {
                for (enrolled, required) in OCCUPANCY {
                    let set = available_actions(state, viewer, enrolled, required);
                    for action in MatchAction::ALL {
                        assert_eq!(
                            set.get(action),
                            expected(action, state, viewer, enrolled, required),
                            "{action:?} for {state:?} viewer={viewer:?} {enrolled}/{required}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_and_unknown_offer_nothing() {
        for state in [Finished, Cancelled, Unknown] {
            for viewer in ROLES {
                for (enrolled, required) in OCCUPANCY {
                    assert!(available_actions(state, viewer, enrolled, required).is_empty());
                }
            }
        }
    }

    #[test]
    fn evaluation_is_pure() {
        let viewer = Viewer { is_creator: true, is_enrolled: true };
        let a = available_actions(Confirmed, viewer, 8, 10);
        let b = available_actions(Confirmed, viewer, 8, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn creator_is_never_offered_leave() {
        for state in MatchState::ALL {
            let set = available_actions(
                state,
                Viewer { is_creator: true, is_enrolled: true },
                3,
                10,
            );
            assert!(!set.leave.offered, "leave offered to creator in {state:?}");
        }
    }

    #[test]
    fn join_offer_disappears_once_full() {
        let outsider = Viewer::default();

        // 9/10 forming match: join is the only offer.
        let set = available_actions(NeedsPlayers, outsider, 9, 10);
        assert!(set.join.offered && set.join.enabled);
        assert_eq!(set.offered().len(), 1);

        // Server reports the tenth player: re-evaluation drops the offer.
        let set = available_actions(NeedsPlayers, outsider, 10, 10);
        assert!(!set.join.offered);
    }

    #[test]
    fn start_visible_but_disabled_until_full() {
        let creator = Viewer { is_creator: true, is_enrolled: false };

        let set = available_actions(Confirmed, creator, 8, 10);
        assert!(set.start.offered);
        assert!(!set.start.enabled);

        // Occupancy unchanged: still disabled on re-evaluation.
        let set = available_actions(Confirmed, creator, 8, 10);
        assert!(set.start.offered && !set.start.enabled);

        let set = available_actions(Confirmed, creator, 10, 10);
        assert!(set.start.enabled);
    }

    #[test]
    fn offered_list_keeps_display_order() {
        let creator = Viewer { is_creator: true, is_enrolled: false };
        let set = available_actions(Assembled, creator, 10, 10);
        let actions: Vec<MatchAction> = set.offered().into_iter().map(|(a, _)| a).collect();
        assert_eq!(
            actions,
            vec![MatchAction::Edit, MatchAction::Confirm, MatchAction::Cancel]
        );
    }
}
