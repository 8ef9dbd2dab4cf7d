use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use ratatui::{
    prelude::*,
    widgets::{
        Block,
        Borders,
        Clear,
        Paragraph,
        Wrap,
    },
};
use std::io::stdout;
use tenzies::{
    DICE_COUNT,
    Die,
    GameSnapshot,
};
use tokio::sync::mpsc;

const INSTRUCTIONS: &str = "Roll until all dice are the same. \
     Freeze a die at its current value between rolls.";
const HELP: &str =
    "1-9,0: hold die | ←/→ + Enter: hold die under cursor | Space/r: roll | q: quit";
const CONFETTI_GLYPHS: [&str; 6] = ["*", "+", "•", "✦", "°", "×"];
const CONFETTI_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::LightBlue,
];

pub enum UserEvent {
    Quit,
    Roll,
    ToggleDie(usize),
    Redraw,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<Event>;

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    cursor: usize,
    frame: u64,
    status: String,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl UiState {
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Reads terminal events on a dedicated thread so the async loop never blocks.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "terminal event read failed");
                    break;
                }
            }
        }
    });
    rx
}

pub async fn next_raw_event(input_events: &mut InputEventReceiver) -> Result<Event> {
    input_events
        .recv()
        .await
        .ok_or_else(|| eyre!("terminal input closed"))
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let k = match event {
        Event::Key(k) => k,
        Event::Resize(_, _) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&k) {
        return Some(UserEvent::Quit);
    }
    match state.mode {
        Mode::QuitModal => match k.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::Normal => match k.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                state.mode = Mode::QuitModal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(' ') | KeyCode::Char('r') => Some(UserEvent::Roll),
            KeyCode::Char(c) if c.is_ascii_digit() => c
                .to_digit(10)
                .map(|d| if d == 0 { DICE_COUNT - 1 } else { d as usize - 1 })
                .map(UserEvent::ToggleDie),
            KeyCode::Left | KeyCode::Char('h') => {
                state.cursor = state.cursor.saturating_sub(1);
                Some(UserEvent::Redraw)
            }
            KeyCode::Right | KeyCode::Char('l') => {
                state.cursor = (state.cursor + 1).min(DICE_COUNT - 1);
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter | KeyCode::Char('x') => Some(UserEvent::ToggleDie(state.cursor)),
            _ => None,
        },
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

pub fn draw(state: &mut UiState, snap: &GameSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        let res = draw_to(&mut term, state, snap);
        state.terminal = Some(term);
        res?;
    }
    Ok(())
}

fn draw_to<B: Backend>(
    term: &mut Terminal<B>,
    state: &UiState,
    snap: &GameSnapshot,
) -> Result<()> {
    term.draw(|f| ui(f, state, snap))?;
    Ok(())
}

fn ui(f: &mut Frame, state: &UiState, snap: &GameSnapshot) {
    f.render_widget(Clear, f.area());
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Tenzies ", Style::default().add_modifier(Modifier::BOLD)));
    let inner = outer.inner(f.area());
    f.render_widget(outer, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // timer + rolls
            Constraint::Length(3), // best records
            Constraint::Length(3), // instructions
            Constraint::Length(5), // dice
            Constraint::Length(3), // roll button
            Constraint::Min(2),    // status + help
        ])
        .split(inner);

    draw_scores(f, chunks[0], snap);
    draw_best(f, chunks[1], snap);
    draw_instructions(f, chunks[2]);
    draw_dice(f, state, chunks[3], snap);
    draw_button(f, chunks[4], snap);
    draw_bottom(f, state, chunks[5]);
    if snap.celebrate {
        draw_confetti(f, inner, state.frame);
    }
    if state.mode == Mode::QuitModal {
        draw_quit_modal(f);
    }
}

fn draw_scores(f: &mut Frame, area: Rect, snap: &GameSnapshot) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let timer = Paragraph::new(format!("⏱ {}", snap.elapsed_display))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Time"));
    let rolls = Paragraph::new(format!("🎲 {}", snap.roll_count))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Rolls"));
    f.render_widget(timer, halves[0]);
    f.render_widget(rolls, halves[1]);
}

fn draw_best(f: &mut Frame, area: Rect, snap: &GameSnapshot) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let best_time = Paragraph::new(format!("Best ⏱ {}", snap.best_time_display))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));
    let best_roll = Paragraph::new(format!("Best 🎲 {}", snap.best_roll_display))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(best_time, halves[0]);
    f.render_widget(best_roll, halves[1]);
}

fn draw_instructions(f: &mut Frame, area: Rect) {
    let p = Paragraph::new(INSTRUCTIONS)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    f.render_widget(p, area);
}

fn draw_dice(f: &mut Frame, state: &UiState, area: Rect, snap: &GameSnapshot) {
    let cols = snap.dice.len().max(1) as u16;
    let col_w = (area.width / cols).max(3);
    for (i, die) in snap.dice.iter().enumerate() {
        let x = area.x + i as u16 * col_w;
        if x + col_w > area.x + area.width {
            break;
        }
        let rect = Rect::new(x, area.y, col_w, area.height);
        let selected = i == state.cursor && !snap.has_won;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(die_border_style(die, selected))
            .title(key_label(i));
        let face = Paragraph::new(die.value.to_string())
            .alignment(Alignment::Center)
            .style(die_face_style(die));
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        let face_area = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        f.render_widget(face, face_area.intersection(inner));
    }
}

fn key_label(index: usize) -> String {
    if index + 1 == DICE_COUNT {
        String::from("0")
    } else {
        (index + 1).to_string()
    }
}

fn die_face_style(die: &Die) -> Style {
    if die.is_held {
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn die_border_style(die: &Die, selected: bool) -> Style {
    match (selected, die.is_held) {
        (true, _) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(Color::LightGreen),
        (false, false) => Style::default(),
    }
}

fn draw_button(f: &mut Frame, area: Rect, snap: &GameSnapshot) {
    let width = (snap.button_label.len() as u16 + 8).min(area.width);
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y,
        width,
        area.height,
    );
    let style = if snap.has_won {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::White).bg(Color::Blue)
    };
    let button = Paragraph::new(snap.button_label)
        .alignment(Alignment::Center)
        .style(style.add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(button, rect);
}

fn draw_bottom(f: &mut Frame, state: &UiState, area: Rect) {
    let lines = vec![
        Line::from(state.status.clone()),
        Line::styled(HELP, Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

// Scatters glyphs over blank cells; the pattern moves with every frame.
fn draw_confetti(f: &mut Frame, area: Rect, frame: u64) {
    let mut rng = StdRng::seed_from_u64(frame);
    let pieces = (area.width as usize * area.height as usize) / 12;
    let buf = f.buffer_mut();
    for _ in 0..pieces {
        let x = area.x + rng.random_range(0..area.width.max(1));
        let y = area.y + rng.random_range(0..area.height.max(1));
        let glyph = CONFETTI_GLYPHS[rng.random_range(0..CONFETTI_GLYPHS.len())];
        let color = CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())];
        if let Some(cell) = buf.cell_mut((x, y)) {
            if cell.symbol() == " " {
                cell.set_symbol(glyph).set_fg(color);
            }
        }
    }
}

fn draw_quit_modal(f: &mut Frame) {
    let area = centered_rect(40, 20, f.area());
    f.render_widget(Clear, area);
    let p = Paragraph::new("Quit Tenzies? (y/n)")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Quit"));
    f.render_widget(p, area);
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    use ratatui::backend::TestBackend;
    use tenzies::test_helpers::TestContext;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn interpret_event__digits_map_to_dice() {
        // given
        let mut state = UiState::default();

        // then
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Char('1'))),
            Some(UserEvent::ToggleDie(0))
        ));
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Char('0'))),
            Some(UserEvent::ToggleDie(9))
        ));
    }

    #[test]
    fn interpret_event__cursor_is_clamped_to_the_dice_row() {
        // given
        let mut state = UiState::default();

        // when
        interpret_event(&mut state, press(KeyCode::Left));
        for _ in 0..20 {
            interpret_event(&mut state, press(KeyCode::Right));
        }

        // then
        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Enter)),
            Some(UserEvent::ToggleDie(9))
        ));
    }

    #[test]
    fn interpret_event__quit_needs_confirmation() {
        // given
        let mut state = UiState::default();

        // when
        let first = interpret_event(&mut state, press(KeyCode::Char('q')));
        let cancelled = interpret_event(&mut state, press(KeyCode::Char('n')));
        interpret_event(&mut state, press(KeyCode::Char('q')));
        let confirmed = interpret_event(&mut state, press(KeyCode::Char('y')));

        // then
        assert!(matches!(first, Some(UserEvent::Redraw)));
        assert!(matches!(cancelled, Some(UserEvent::Redraw)));
        assert!(matches!(confirmed, Some(UserEvent::Quit)));
    }

    #[test]
    fn interpret_event__space_rolls() {
        let mut state = UiState::default();

        assert!(matches!(
            interpret_event(&mut state, press(KeyCode::Char(' '))),
            Some(UserEvent::Roll)
        ));
    }

    fn screen_text(term: &Terminal<TestBackend>) -> String {
        term.backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn draw_to__renders_the_board_and_keeps_the_terminal_usable() {
        // given
        let ctx = TestContext::new();
        let snap = ctx.game(vec![3]).snapshot();
        let state = UiState::default();
        let mut term = Terminal::new(TestBackend::new(110, 30)).unwrap();

        // when
        draw_to(&mut term, &state, &snap).unwrap();
        draw_to(&mut term, &state, &snap).unwrap();

        // then
        let text = screen_text(&term);
        assert!(text.contains("Tenzies"));
        assert!(text.contains("Roll until"));
    }
}
