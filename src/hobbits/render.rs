//! Hobbit Clicker rendering.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::storage::KeyValueStore;
use crate::widgets::{ClickableList, HintBar};

use super::actions::{BUY_UPGRADE_BASE, CLICK_HOBBIT, RESET, TOGGLE_SOUND};
use super::logic::format_number;
use super::state::ResourceState;
use super::{CatalogStatus, HobbitGame};

/// Hobbit-hole door, idle and pressed.
const DOOR_ART: [&str; 3] = ["  ╭───────╮  ", " │  ( o )  │ ", " ╰─────────╯ "];
const DOOR_PRESSED_ART: [&str; 3] = ["   ╭─────╮   ", "  │ (•) │  ", "   ╰─────╯   "];

/// Key label for the n-th visible upgrade row.
fn row_key(slot: usize) -> Option<char> {
    match slot {
        0..=8 => char::from_digit(slot as u32 + 1, 10),
        9 => Some('0'),
        _ => None,
    }
}

pub fn render<S: KeyValueStore>(
    game: &HobbitGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (main_area, log_area) = if is_narrow_layout(area.width) {
        (area, None)
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (cols[0], Some(cols[1]))
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // counters
            Constraint::Length(5), // hobbit button
            Constraint::Min(5),    // upgrades
            Constraint::Length(3), // help
        ])
        .split(main_area);

    render_counters(game, f, chunks[0]);
    render_button(game, f, chunks[1], click_state);
    render_upgrades(game, f, chunks[2], click_state);
    render_help(game, f, chunks[3], click_state);

    if let Some(log_area) = log_area {
        render_log(game, f, log_area);
    }
}

fn render_counters<S: KeyValueStore>(game: &HobbitGame<S>, f: &mut Frame, area: Rect) {
    let ResourceState { total, rate } = game.progress.game.resources();
    let mut first = vec![
        Span::styled("Hobbits: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_number(total),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if game.jukebox.is_playing() {
        first.push(Span::styled("  ♪", Style::default().fg(Color::Cyan)));
    }
    let lines = vec![
        Line::from(first),
        Line::from(vec![
            Span::styled("Per second: ", Style::default().fg(Color::Gray)),
            Span::styled(format_number(rate), Style::default().fg(Color::Green)),
        ]),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" The Shire "),
    );
    f.render_widget(widget, area);
}

fn render_button<S: KeyValueStore>(
    game: &HobbitGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (art, color) = if game.click_flash > 0 {
        (DOOR_PRESSED_ART, Color::LightYellow)
    } else {
        (DOOR_ART, Color::Yellow)
    };
    let lines: Vec<Line> = art
        .iter()
        .map(|row| Line::from(Span::styled(*row, Style::default().fg(color))))
        .collect();
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" [C] Gather a hobbit "),
    );
    f.render_widget(widget, area);

    // The whole door panel is the button.
    click_state.borrow_mut().add_click_target(area, CLICK_HOBBIT);
}

fn render_upgrades<S: KeyValueStore>(
    game: &HobbitGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let p = &game.progress;
    let mut cl = ClickableList::new();

    match &game.catalog {
        CatalogStatus::Loading => {
            cl.push(Line::from(Span::styled(
                "Fetching upgrades…",
                Style::default().fg(Color::DarkGray),
            )));
        }
        CatalogStatus::Fallback(_) => {
            cl.push(Line::from(Span::styled(
                "Offline: using the bundled upgrade list",
                Style::default().fg(Color::Red),
            )));
        }
        CatalogStatus::Remote => {}
    }

    for (slot, index) in p.unlocked_indices().into_iter().enumerate() {
        let upgrade = &p.upgrades[index];
        let affordable = p.total() >= upgrade.state.next_cost;
        let name_style = if affordable {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let key = match row_key(slot) {
            Some(k) => format!("[{k}] "),
            None => "    ".to_string(),
        };
        let line = Line::from(vec![
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::styled(format!("{:<24}", upgrade.def.name), name_style),
            Span::styled(
                format!(" +{}/s", format_number(upgrade.def.increment)),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("  cost {}", format_number(upgrade.state.next_cost)),
                Style::default().fg(if affordable { Color::Yellow } else { Color::Red }),
            ),
            Span::styled(
                format!("  owned {}", upgrade.state.owned),
                Style::default().fg(Color::Cyan),
            ),
        ]);
        cl.push_clickable(line, BUY_UPGRADE_BASE + index as u16);
    }

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }

    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Upgrades "),
    );
    f.render_widget(widget, area);
}

fn render_help<S: KeyValueStore>(
    game: &HobbitGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let hint = Style::default().fg(Color::DarkGray);
    let sound_label = if game.jukebox.enabled() {
        "[M] Sound: on"
    } else {
        "[M] Sound: off"
    };
    let (reset_label, reset_style) = if game.confirm_reset {
        ("[R] Press again to reset!", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        ("[R] Reset", hint)
    };

    let line = {
        let mut cs = click_state.borrow_mut();
        HintBar::new("  ")
            .hint(Span::styled("[C] Click", hint), CLICK_HOBBIT)
            .hint(Span::styled(sound_label, hint), TOGGLE_SOUND)
            .hint(Span::styled(reset_label, reset_style), RESET)
            .into_line(area.x + 1, area.y + 1, &mut cs)
    };
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(widget, area);
}

fn render_log<S: KeyValueStore>(game: &HobbitGame<S>, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = game.log.len().saturating_sub(visible);
    let lines: Vec<Line> = game.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Red Book "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
