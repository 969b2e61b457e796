use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::app_state::{DetailOverlay, FormState, NoticeKind, ScoreEntry};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use pickup_api::actions::{ActionSet, MatchAction};
use pickup_api::{Match, MatchState};

static TABS: &[&str; 5] = &["Matches", "Search", "Detail", "Create", "Profile"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal
        .draw(|f| {
            layout.update(f.area(), app.settings.full_screen);

            if !app.settings.full_screen {
                draw_tabs(f, layout.tab_bar, app);
            }

            match app.state.active_tab {
                MenuItem::Login => draw_login(f, layout.main, app),
                MenuItem::Matches => draw_matches(f, layout.main, app),
                MenuItem::Search => draw_search(f, layout.main, app),
                MenuItem::Detail => draw_detail(f, layout.main, app),
                MenuItem::Create => draw_create(f, layout.main, app),
                MenuItem::Profile => draw_profile(f, layout.main, app),
                MenuItem::Help => draw_help(f, layout.main),
            }

            draw_status(f, layout.status, app);

            if app.state.show_logs {
                draw_log_pane(f, layout.main);
            }

            draw_loading_spinner(f, f.area(), app, loading);
        })
        .unwrap();
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Matches | MenuItem::Login | MenuItem::Help => 0,
        MenuItem::Search => 1,
        MenuItem::Detail => 2,
        MenuItem::Create => 3,
        MenuItem::Profile => 4,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    if let Some(notice) = app.state.notice.as_ref() {
        let style = match notice.kind {
            NoticeKind::Info => Style::default().fg(Color::Green),
            NoticeKind::Error => Style::default().fg(Color::Red),
        };
        f.render_widget(Paragraph::new(notice.text.as_str()).style(style), area);
        return;
    }

    let text = match app.state.session.as_ref() {
        Some(user) => format!(" {} <{}>", user.username, user.email),
        None => " not signed in".to_string(),
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

fn form_lines<'a>(form: &'a FormState) -> Vec<Line<'a>> {
    let mut lines = Vec::with_capacity(form.fields.len());
    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focus;
        let marker = if focused { '>' } else { ' ' };
        let shown: String = if field.masked {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let cursor = if focused && form.editing { "_" } else { "" };
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {}: {shown}{cursor}", field.label),
            style,
        )));
    }
    lines
}

fn draw_form_block(f: &mut Frame, area: Rect, title: &str, form: &FormState, footer: &str) {
    let block = default_border(Color::White).title(format!(" {title} "));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [fields_area, footer_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    f.render_widget(Paragraph::new(form_lines(form)), fields_area);
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        footer_area,
    );
}

fn draw_login(f: &mut Frame, area: Rect, app: &App) {
    use crate::state::app_state::LoginMode;
    let (title, footer) = match app.state.login.mode {
        LoginMode::SignIn => (
            "Sign in",
            "i=edit  j/k=field  s=submit  r=switch to register  q=quit",
        ),
        LoginMode::Register => (
            "Register",
            "i=edit  j/k=field  s=submit  r=switch to sign in  q=quit",
        ),
    };
    draw_form_block(f, area, title, app.state.login.form(), footer);
}

fn draw_create(f: &mut Frame, area: Rect, app: &App) {
    draw_form_block(
        f,
        area,
        "Create match",
        &app.state.create.form,
        "i=edit  j/k=field  s=create  1-5=tabs",
    );
}

fn draw_profile(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Profile ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [identity_area, form_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let identity = match app.state.session.as_ref() {
        Some(user) => format!("{}\n{}", user.username, user.email),
        None => "No session".to_string(),
    };
    f.render_widget(Paragraph::new(identity), identity_area);
    f.render_widget(Paragraph::new(form_lines(&app.state.profile.form)), form_area);
    f.render_widget(
        Paragraph::new("i=edit  j/k=field  s=save  x=sign out")
            .style(Style::default().fg(Color::DarkGray)),
        footer_area,
    );
}

// ---------------------------------------------------------------------------
// Match lists
// ---------------------------------------------------------------------------

fn state_color(state: MatchState) -> Color {
    match state {
        MatchState::NeedsPlayers => Color::Yellow,
        MatchState::Assembled => Color::Cyan,
        MatchState::Confirmed => Color::Green,
        MatchState::InPlay => Color::Magenta,
        MatchState::Finished => Color::DarkGray,
        MatchState::Cancelled => Color::Red,
        MatchState::Unknown => Color::DarkGray,
    }
}

fn match_row(m: &Match, selected: bool) -> Line<'static> {
    let marker = if selected { '>' } else { ' ' };
    let when = m
        .starts_at
        .map(|t| t.format("%a %d %b %H:%M").to_string())
        .unwrap_or_else(|| "time tbd".to_string());
    let occupancy = format!("{}/{}", m.enrolled_count(), m.required_players);

    Line::from(vec![
        Span::raw(format!("{marker} ")),
        Span::styled(
            format!("{:<14}", m.state.label()),
            Style::default().fg(state_color(m.state)),
        ),
        Span::raw(format!(
            " {:<12} {:<20} {:>5}  {when}",
            truncate(&m.sport.name, 12),
            truncate(&m.location, 20),
            occupancy
        )),
    ])
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn draw_match_list(
    f: &mut Frame,
    area: Rect,
    matches: &[Match],
    selected: usize,
    empty_message: &str,
) {
    if matches.is_empty() {
        f.render_widget(
            Paragraph::new(empty_message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let visible = area.height as usize;
    // Keep the selection on screen.
    let start = selected.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = matches
        .iter()
        .enumerate()
        .skip(start)
        .take(visible.max(1))
        .map(|(idx, m)| match_row(m, idx == selected))
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [legend, list_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("j/k=move  Enter=detail  r=refresh  4=create a match\n")
            .style(Style::default().fg(Color::DarkGray)),
        legend,
    );

    draw_match_list(
        f,
        list_area,
        &app.state.matches.matches,
        app.state.matches.selected,
        "No matches yet. Press r to refresh or 4 to create one.",
    );
}

fn draw_search(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Search ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [header, legend, list_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Recommendation: "),
            Span::styled(
                app.state.search.algorithm.label(),
                Style::default().fg(Color::Cyan),
            ),
        ])),
        header,
    );
    f.render_widget(
        Paragraph::new("a=change algorithm  s=search  j/k=move  Enter=detail\n")
            .style(Style::default().fg(Color::DarkGray)),
        legend,
    );

    let empty = if app.state.search.searched {
        "No matches recommended. Try another algorithm with a."
    } else {
        "Press s to search."
    };
    draw_match_list(
        f,
        list_area,
        &app.state.search.results.matches,
        app.state.search.results.selected,
        empty,
    );
}

// ---------------------------------------------------------------------------
// Detail view
// ---------------------------------------------------------------------------

fn action_key(action: MatchAction) -> char {
    match action {
        MatchAction::Join => 'j',
        MatchAction::Leave => 'v',
        MatchAction::Confirm => 'c',
        MatchAction::Start => 's',
        MatchAction::Cancel => 'x',
        MatchAction::Edit => 'e',
        MatchAction::Finish => 'f',
    }
}

fn ladder_line(state: MatchState) -> Line<'static> {
    if state == MatchState::Cancelled {
        return Line::from(Span::styled("Cancelled", Style::default().fg(Color::Red)));
    }
    let steps = [
        MatchState::NeedsPlayers,
        MatchState::Assembled,
        MatchState::Confirmed,
        MatchState::InPlay,
        MatchState::Finished,
    ];
    let reached = state.ladder_step();
    let mut spans = Vec::new();
    for (idx, step) in steps.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }
        let style = match reached {
            Some(r) if idx < r => Style::default().fg(Color::Green),
            Some(r) if idx == r => Style::default()
                .fg(state_color(*step))
                .add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::DarkGray),
        };
        spans.push(Span::styled(step.label().to_string(), style));
    }
    Line::from(spans)
}

fn actions_panel(snapshot: &Match, actions: &ActionSet, in_flight: Option<MatchAction>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(action) = in_flight {
        lines.push(Line::from(Span::styled(
            action.progress_label().to_string(),
            Style::default().fg(Color::Yellow),
        )));
        return lines;
    }

    let offered = actions.offered();
    if offered.is_empty() {
        let text = if snapshot.state.is_terminal() {
            "No actions: match is over"
        } else {
            "No actions available to you"
        };
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    let mut spans = Vec::new();
    for (action, availability) in offered {
        if !spans.is_empty() {
            spans.push(Span::raw("   "));
        }
        let style = if availability.enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!("[{}] {}", action_key(action), action.label()),
            style,
        ));
        if action == MatchAction::Start && !availability.enabled {
            spans.push(Span::styled(
                " (roster not full)",
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    lines.push(Line::from(spans));
    lines
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.detail.not_found {
        f.render_widget(
            Paragraph::new("Match not found. It may have been removed.\nEsc to go back.")
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let Some(snapshot) = app.state.detail.orchestrator.snapshot() else {
        let msg = if app.state.detail.match_id.is_some() {
            "Loading match..."
        } else {
            "Select a match from the list and press Enter"
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(
            snapshot.sport.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            snapshot.state.label(),
            Style::default().fg(state_color(snapshot.state)),
        ),
    ]));
    lines.push(ladder_line(snapshot.state));
    lines.push(Line::from(""));

    let when = snapshot
        .starts_at
        .map(|t| t.format("%A %d %B, %H:%M").to_string())
        .unwrap_or_else(|| "time to be decided".to_string());
    lines.push(Line::from(format!(
        "Where: {}{}",
        snapshot.location,
        snapshot
            .area
            .as_deref()
            .map(|a| format!(" ({a})"))
            .unwrap_or_default()
    )));
    lines.push(Line::from(format!(
        "When: {when}  ({} min)",
        snapshot.duration_minutes
    )));
    if let Some(skill) = snapshot.min_skill {
        lines.push(Line::from(format!("Minimum level: {}", skill.label())));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(format!(
        "Players ({}/{}):",
        snapshot.enrolled_count(),
        snapshot.required_players
    )));
    for player in &snapshot.enrolled {
        let organizer = if player.id == snapshot.creator.id {
            " (organizer)"
        } else {
            ""
        };
        lines.push(Line::from(format!("  {}{organizer}", player.username)));
    }
    for _ in 0..snapshot.open_slots() {
        lines.push(Line::from(Span::styled(
            "  . open slot",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !snapshot.enrolled.iter().any(|p| p.id == snapshot.creator.id) {
        lines.push(Line::from(Span::styled(
            format!("  organized by {}", snapshot.creator.username),
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Scores only once the post-finalize refetch has settled.
    if snapshot.state == MatchState::Finished
        && !app.state.detail.orchestrator.awaiting_refetch()
        && !snapshot.participants.is_empty()
    {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Result ({}):", snapshot.sport.scoring.label())));
        for participant in &snapshot.participants {
            let score = participant
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(format!("  {}: {score}", participant.name)));
        }
    }
    if app.state.detail.orchestrator.awaiting_refetch() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Recording scores...",
            Style::default().fg(Color::Yellow),
        )));
    }

    lines.push(Line::from(""));
    if let Some(user_id) = app.state.session.as_ref().map(|u| u.id.as_str()) {
        let actions = snapshot.actions_for(user_id);
        lines.extend(actions_panel(
            snapshot,
            &actions,
            app.state.detail.orchestrator.in_flight(),
        ));
    }

    f.render_widget(Paragraph::new(lines), inner);

    match &app.state.detail.overlay {
        DetailOverlay::None => {}
        DetailOverlay::ConfirmCancel => draw_cancel_confirm(f, area),
        DetailOverlay::ScoreEntry(entry) => draw_score_entry(f, area, snapshot, entry),
        DetailOverlay::Edit(form) => draw_overlay_form(f, area, " Edit match ", form),
    }
}

fn overlay_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_cancel_confirm(f: &mut Frame, area: Rect) {
    let popup = overlay_rect(area, 44, 5);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Red).title(" Cancel match ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    f.render_widget(
        Paragraph::new("Cancel this match for everyone?\n[y] yes   [n] no")
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_score_entry(f: &mut Frame, area: Rect, snapshot: &Match, entry: &ScoreEntry) {
    let form = entry.form();
    let popup = overlay_rect(area, 52, form.fields.len() as u16 + 4);
    f.render_widget(Clear, popup);

    let title = match entry {
        ScoreEntry::Duel { .. } => format!(" Final {} per player ", snapshot.sport.scoring.label()),
        ScoreEntry::Teams { .. } => format!(" Final result ({}) ", snapshot.sport.scoring.label()),
    };
    let block = default_border(Color::Green).title(title);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let [fields_area, footer_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    f.render_widget(Paragraph::new(form_lines(form)), fields_area);
    f.render_widget(
        Paragraph::new("Tab=next  Enter=record  Esc=back  (blank counts as 0)")
            .style(Style::default().fg(Color::DarkGray)),
        footer_area,
    );
}

fn draw_overlay_form(f: &mut Frame, area: Rect, title: &str, form: &FormState) {
    let popup = overlay_rect(area, 56, form.fields.len() as u16 + 4);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Yellow).title(title.to_string());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let [fields_area, footer_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    f.render_widget(Paragraph::new(form_lines(form)), fields_area);
    f.render_widget(
        Paragraph::new("Tab=next  Enter=save  Esc=back")
            .style(Style::default().fg(Color::DarkGray)),
        footer_area,
    );
}

// ---------------------------------------------------------------------------
// Help / logs / spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(
            "Tabs: 1=Matches  2=Search  3=Detail  4=Create  5=Profile  ?=Help\n\
             Lists: j/k=move  Enter=open  r=refresh\n\
             Search: a=algorithm  s=search\n\
             Detail: j=join  v=leave  c=confirm  s=start  f=finish  e=edit  x=cancel\n\
             Forms: i=edit field  Tab=next  s=submit  Esc=stop editing\n\
             Global: F=full screen  \"=logs  q=quit  Esc=close Help",
        )
        .style(Style::default().fg(Color::Gray)),
        inner,
    );
}

fn draw_log_pane(f: &mut Frame, area: Rect) {
    let [_, pane] =
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);
    f.render_widget(Clear, pane);
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, pane);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
