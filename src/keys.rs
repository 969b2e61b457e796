use crate::app::{App, MenuItem};
use crate::state::app_state::{DetailOverlay, FormState};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pickup_api::actions::MatchAction;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut outbound: Vec<NetworkRequest> = Vec::new();

    let overlay_active = guard.state.active_tab == MenuItem::Detail
        && !matches!(guard.state.detail.overlay, DetailOverlay::None);

    if overlay_active {
        handle_overlay_keys(key_event, &mut guard, &mut outbound);
    } else if active_form(&guard).is_some_and(|form| form.editing) {
        handle_form_editing(key_event, &mut guard);
    } else {
        handle_tab_keys(key_event, &mut guard, &mut outbound);
    }

    drop(guard);
    for request in outbound {
        let _ = network_requests.send(request).await;
    }
}

/// The text form the current tab edits, if any.
fn active_form(app: &App) -> Option<&FormState> {
    match app.state.active_tab {
        MenuItem::Login => Some(app.state.login.form()),
        MenuItem::Create => Some(&app.state.create.form),
        MenuItem::Profile => Some(&app.state.profile.form),
        _ => None,
    }
}

fn active_form_mut(app: &mut App) -> Option<&mut FormState> {
    match app.state.active_tab {
        MenuItem::Login => Some(app.state.login.form_mut()),
        MenuItem::Create => Some(&mut app.state.create.form),
        MenuItem::Profile => Some(&mut app.state.profile.form),
        _ => None,
    }
}

/// Keys while a tab form has the compose flag set: characters go into the
/// focused field, Enter/Esc drop back to navigation.
fn handle_form_editing(key_event: KeyEvent, app: &mut App) {
    let Some(form) = active_form_mut(app) else {
        return;
    };
    match (key_event.code, key_event.modifiers) {
        (Char('c'), KeyModifiers::CONTROL) => quit(),
        (KeyCode::Enter | KeyCode::Esc, _) => form.editing = false,
        (KeyCode::Tab | KeyCode::Down, _) => form.focus_next(),
        (KeyCode::BackTab | KeyCode::Up, _) => form.focus_prev(),
        (KeyCode::Backspace, _) => form.backspace(),
        (Char(c), _) => form.push_char(c),
        _ => {}
    }
}

/// Keys while a detail overlay is open. Overlays capture everything; Esc
/// always closes without side effects.
fn handle_overlay_keys(key_event: KeyEvent, app: &mut App, outbound: &mut Vec<NetworkRequest>) {
    if let DetailOverlay::ConfirmCancel = app.state.detail.overlay {
        match key_event.code {
            Char('y') | Char('Y') => outbound.extend(app.answer_cancel_prompt(true)),
            Char('n') | Char('N') | KeyCode::Esc => {
                app.answer_cancel_prompt(false);
            }
            _ => {}
        }
        return;
    }

    // Score entry and edit overlays are always in compose mode.
    match (key_event.code, key_event.modifiers) {
        (Char('c'), KeyModifiers::CONTROL) => quit(),
        (KeyCode::Esc, _) => app.close_overlay(),
        (KeyCode::Enter, _) => {
            let request = if matches!(app.state.detail.overlay, DetailOverlay::ScoreEntry(_)) {
                app.submit_score_entry()
            } else {
                app.submit_edit()
            };
            outbound.extend(request);
        }
        (KeyCode::Tab | KeyCode::Down, _) => overlay_form(app, |f| f.focus_next()),
        (KeyCode::BackTab | KeyCode::Up, _) => overlay_form(app, |f| f.focus_prev()),
        (KeyCode::Backspace, _) => overlay_form(app, |f| f.backspace()),
        (Char(c), _) => overlay_form(app, |f| f.push_char(c)),
        _ => {}
    }
}

fn overlay_form(app: &mut App, apply: impl FnOnce(&mut FormState)) {
    match &mut app.state.detail.overlay {
        DetailOverlay::ScoreEntry(entry) => apply(entry.form_mut()),
        DetailOverlay::Edit(form) => apply(form),
        _ => {}
    }
}

fn handle_tab_keys(key_event: KeyEvent, app: &mut App, outbound: &mut Vec<NetworkRequest>) {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        // Login / register
        (MenuItem::Login, Char('i') | KeyCode::Enter, _) => {
            app.state.login.form_mut().editing = true;
        }
        (MenuItem::Login, Char('j') | KeyCode::Down | KeyCode::Tab, _) => {
            app.state.login.form_mut().focus_next();
        }
        (MenuItem::Login, Char('k') | KeyCode::Up | KeyCode::BackTab, _) => {
            app.state.login.form_mut().focus_prev();
        }
        (MenuItem::Login, Char('r'), _) => app.state.login.toggle_mode(),
        (MenuItem::Login, Char('s'), _) => outbound.extend(app.submit_login()),

        // Match list
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => app.state.matches.navigate_down(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => app.state.matches.navigate_up(),
        (MenuItem::Matches, Char('r'), _) => outbound.push(NetworkRequest::LoadMatches),
        (MenuItem::Matches, KeyCode::Enter, _) => {
            if let Some(id) = app.state.matches.selected_match().map(|m| m.id.clone()) {
                outbound.push(app.open_detail(&id));
            }
        }

        // Search
        (MenuItem::Search, Char('a'), _) => app.state.search.cycle_algorithm(),
        (MenuItem::Search, Char('s'), _) => outbound.extend(app.run_search()),
        (MenuItem::Search, Char('j') | KeyCode::Down, _) => {
            app.state.search.results.navigate_down();
        }
        (MenuItem::Search, Char('k') | KeyCode::Up, _) => app.state.search.results.navigate_up(),
        (MenuItem::Search, KeyCode::Enter, _) => {
            if let Some(id) = app.state.search.results.selected_match().map(|m| m.id.clone()) {
                outbound.push(app.open_detail(&id));
            }
        }

        // Detail actions; hidden/disabled ones fall through to nothing
        (MenuItem::Detail, Char('j'), _) => outbound.extend(app.trigger_action(MatchAction::Join)),
        (MenuItem::Detail, Char('v'), _) => outbound.extend(app.trigger_action(MatchAction::Leave)),
        (MenuItem::Detail, Char('c'), _) => {
            outbound.extend(app.trigger_action(MatchAction::Confirm));
        }
        (MenuItem::Detail, Char('s'), _) => outbound.extend(app.trigger_action(MatchAction::Start)),
        (MenuItem::Detail, Char('f'), _) => {
            outbound.extend(app.trigger_action(MatchAction::Finish));
        }
        (MenuItem::Detail, Char('e'), _) => outbound.extend(app.trigger_action(MatchAction::Edit)),
        (MenuItem::Detail, Char('x'), _) => {
            outbound.extend(app.trigger_action(MatchAction::Cancel));
        }
        (MenuItem::Detail, Char('r'), _) => {
            if let Some(match_id) = app.state.detail.match_id.clone() {
                outbound.push(NetworkRequest::LoadMatch { match_id });
            }
        }
        (MenuItem::Detail, KeyCode::Esc, _) => app.update_tab(MenuItem::Matches),

        // Create / profile forms
        (MenuItem::Create | MenuItem::Profile, Char('i') | KeyCode::Enter, _) => {
            if let Some(form) = active_form_mut(app) {
                form.editing = true;
            }
        }
        (MenuItem::Create | MenuItem::Profile, Char('j') | KeyCode::Down | KeyCode::Tab, _) => {
            if let Some(form) = active_form_mut(app) {
                form.focus_next();
            }
        }
        (MenuItem::Create | MenuItem::Profile, Char('k') | KeyCode::Up | KeyCode::BackTab, _) => {
            if let Some(form) = active_form_mut(app) {
                form.focus_prev();
            }
        }
        (MenuItem::Create, Char('s'), _) => outbound.extend(app.submit_create()),
        (MenuItem::Profile, Char('s'), _) => outbound.extend(app.submit_profile()),
        (MenuItem::Profile, Char('x'), _) => app.logout(),

        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Tab switching
        (_, Char('1'), _) => app.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => app.update_tab(MenuItem::Search),
        (_, Char('3'), _) => app.update_tab(MenuItem::Detail),
        (_, Char('4'), _) => app.update_tab(MenuItem::Create),
        (_, Char('5'), _) => app.update_tab(MenuItem::Profile),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),

        // Global toggles
        (_, Char('F'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}
