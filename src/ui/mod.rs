// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the pad controller.
//!
//! Provides a ratatui-based terminal interface with the current selection,
//! a pitch pad grid, a chord pad grid and a help overlay. Key handling lives
//! on [`UiState`] so it can be driven without a terminal.

mod pads;

pub use pads::{PadCell, PadGridWidget};

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{info, warn};

use crate::config::{ConfigEvent, ConfigWatcher, ControllerConfig};
use crate::control::{ControlAction, Keymap, PadController, PadId, PadLayout};
use crate::midi::MidiTransport;

/// Pitch pads per row, one scale degree each for heptatonic scales
pub const PITCH_COLUMNS: usize = 7;

/// Chord pads per row
pub const CHORD_COLUMNS: usize = 5;

/// How long a status message stays up
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Which pad grid has the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grid {
    #[default]
    Pitches,
    Chords,
}

impl Grid {
    pub fn columns(self) -> usize {
        match self {
            Grid::Pitches => PITCH_COLUMNS,
            Grid::Chords => CHORD_COLUMNS,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Grid::Pitches => Grid::Chords,
            Grid::Chords => Grid::Pitches,
        }
    }

    fn pad(self, index: usize) -> PadId {
        match self {
            Grid::Pitches => PadId::Pitch(index),
            Grid::Chords => PadId::Chord(index),
        }
    }

    fn len(self, layout: &PadLayout) -> usize {
        match self {
            Grid::Pitches => layout.pitches().len(),
            Grid::Chords => layout.chords().len(),
        }
    }
}

/// Cursor movement within a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

/// Move a cursor over `len` pads laid out `columns` wide.
///
/// Left and right wrap across rows; up and down stay put at the edges.
pub fn move_cursor(cursor: usize, len: usize, columns: usize, direction: Move) -> usize {
    if len == 0 {
        return 0;
    }
    let cursor = cursor.min(len - 1);
    match direction {
        Move::Left => cursor.checked_sub(1).unwrap_or(len - 1),
        Move::Right => (cursor + 1) % len,
        Move::Up => cursor.checked_sub(columns).unwrap_or(cursor),
        Move::Down => {
            let next = cursor + columns;
            if next < len {
                next
            } else {
                cursor
            }
        }
    }
}

/// Roman numeral for a 1-based scale degree
pub fn degree_numeral(degree: usize) -> String {
    const NUMERALS: [&str; 12] = [
        "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
    ];
    degree
        .checked_sub(1)
        .and_then(|i| NUMERALS.get(i))
        .map(|n| n.to_string())
        .unwrap_or_else(|| degree.to_string())
}

/// Whether the app should keep running after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// UI state: focus, cursors, help and status
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Grid with the cursor
    pub focus: Grid,
    pub pitch_cursor: usize,
    pub chord_cursor: usize,
    /// Help text visible
    pub show_help: bool,
    /// Last status line and when it was set
    status: Option<(String, Instant)>,
    /// Pads follow key down/up instead of latching
    pub momentary: bool,
    /// Pad held by the play key in momentary mode
    pressed: Option<PadId>,
}

impl UiState {
    pub fn new(momentary: bool) -> Self {
        Self {
            momentary,
            ..Self::default()
        }
    }

    /// Show `message` on the status line for [`STATUS_TTL`]
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(message, _)| message.as_str())
    }

    pub fn clear_expired_status(&mut self) {
        if matches!(&self.status, Some((_, at)) if at.elapsed() > STATUS_TTL) {
            self.status = None;
        }
    }

    /// Cursor of the focused grid
    pub fn cursor(&self) -> usize {
        match self.focus {
            Grid::Pitches => self.pitch_cursor,
            Grid::Chords => self.chord_cursor,
        }
    }

    /// Pad under the cursor
    pub fn focused_pad(&self) -> PadId {
        self.focus.pad(self.cursor())
    }

    fn set_cursor(&mut self, cursor: usize) {
        match self.focus {
            Grid::Pitches => self.pitch_cursor = cursor,
            Grid::Chords => self.chord_cursor = cursor,
        }
    }

    /// Keep both cursors on a pad after the layout changes size
    pub fn clamp_cursors(&mut self, layout: &PadLayout) {
        self.pitch_cursor = self
            .pitch_cursor
            .min(layout.pitches().len().saturating_sub(1));
        self.chord_cursor = self
            .chord_cursor
            .min(layout.chords().len().saturating_sub(1));
    }

    /// Handle one key event against the controller.
    ///
    /// Controller errors go to the status line; they never stop the UI.
    pub fn handle_key<T: MidiTransport>(
        &mut self,
        keymap: &Keymap,
        controller: &mut PadController<T>,
        key: KeyEvent,
    ) -> KeyOutcome {
        let Some(action) = keymap.action(key.code, key.modifiers) else {
            return KeyOutcome::Continue;
        };

        match key.kind {
            KeyEventKind::Release => {
                if action == ControlAction::PressPad {
                    if let Some(pad) = self.pressed.take() {
                        self.report(release(controller, pad));
                    }
                }
                KeyOutcome::Continue
            }
            KeyEventKind::Repeat if action == ControlAction::PressPad => KeyOutcome::Continue,
            _ => self.apply_action(action, controller),
        }
    }

    /// Perform an action as if its key was pressed
    pub fn apply_action<T: MidiTransport>(
        &mut self,
        action: ControlAction,
        controller: &mut PadController<T>,
    ) -> KeyOutcome {
        let result = match action {
            ControlAction::None => Ok(()),

            ControlAction::NextKey => {
                controller.next_key();
                Ok(())
            }
            ControlAction::PreviousKey => {
                controller.previous_key();
                Ok(())
            }
            ControlAction::NextScale => {
                controller.next_scale_type();
                Ok(())
            }
            ControlAction::PreviousScale => {
                controller.previous_scale_type();
                Ok(())
            }
            ControlAction::ToggleSpelling => {
                controller.toggle_spelling();
                Ok(())
            }
            ControlAction::ChordOctaveUp => controller.shift_chord_octave(1),
            ControlAction::ChordOctaveDown => controller.shift_chord_octave(-1),
            ControlAction::OctavesUp => controller.shift_octaves(1),
            ControlAction::OctavesDown => controller.shift_octaves(-1),

            ControlAction::CycleDestination => {
                controller.cycle_target();
                self.set_status(format!("Destination: {}", destination_label(controller)));
                Ok(())
            }
            ControlAction::TogglePortSwap => {
                let swapped = !controller.conductor().is_port_swapped();
                let result = controller.set_port_swapped(swapped);
                self.set_status(format!("Port swap {}", on_off(swapped)));
                result
            }
            ControlAction::ToggleOutput => {
                let open = !controller.conductor().is_output_open();
                self.pressed = None;
                let result = controller.set_output_open(open);
                self.set_status(if open { "Output open" } else { "Output closed" });
                result
            }
            ControlAction::ReleaseAll => {
                self.pressed = None;
                controller.release_all()
            }

            ControlAction::PressPad => {
                let pad = self.focused_pad();
                if self.momentary {
                    // A second play key while one is down releases the first
                    let previous = self.pressed.replace(pad);
                    let released = match previous {
                        Some(previous) if previous != pad => release(controller, previous),
                        _ => Ok(()),
                    };
                    released.and_then(|_| press(controller, pad))
                } else {
                    let target = controller.target().clone();
                    controller.toggle(pad, &target)
                }
            }
            ControlAction::SwitchGrid => {
                self.focus = self.focus.toggled();
                Ok(())
            }

            ControlAction::ToggleHelp => {
                self.show_help = !self.show_help;
                Ok(())
            }
            ControlAction::Quit => {
                self.pressed = None;
                self.report(controller.release_all());
                return KeyOutcome::Quit;
            }

            ControlAction::NavigateUp => self.navigate(controller.layout(), Move::Up),
            ControlAction::NavigateDown => self.navigate(controller.layout(), Move::Down),
            ControlAction::NavigateLeft => self.navigate(controller.layout(), Move::Left),
            ControlAction::NavigateRight => self.navigate(controller.layout(), Move::Right),
        };

        self.report(result);
        if action.is_selector() {
            self.clamp_cursors(controller.layout());
        }
        KeyOutcome::Continue
    }

    /// Apply a hot-reloaded configuration
    pub fn apply_config_event<T: MidiTransport>(
        &mut self,
        controller: &mut PadController<T>,
        event: ConfigEvent,
    ) {
        match event {
            ConfigEvent::Reloaded(config) => self.apply_config(controller, &config),
            ConfigEvent::Error(message) => {
                warn!("{}", message);
                self.set_status(message);
            }
        }
    }

    fn apply_config<T: MidiTransport>(
        &mut self,
        controller: &mut PadController<T>,
        config: &ControllerConfig,
    ) {
        match config.selection() {
            Ok(selection) => {
                controller.apply_selection(selection);
                self.clamp_cursors(controller.layout());
                let result = controller.set_port_swapped(config.midi.port_swap);
                self.report(result);
                info!("Configuration reloaded");
                self.set_status("Configuration reloaded");
            }
            Err(e) => {
                warn!("Reloaded configuration rejected: {:#}", e);
                self.set_status(format!("Config error: {:#}", e));
            }
        }
    }

    fn navigate(&mut self, layout: &PadLayout, direction: Move) -> crate::error::Result<()> {
        let len = self.focus.len(layout);
        let cursor = move_cursor(self.cursor(), len, self.focus.columns(), direction);
        self.set_cursor(cursor);
        Ok(())
    }

    fn report(&mut self, result: crate::error::Result<()>) {
        if let Err(e) = result {
            warn!("{}", e);
            self.set_status(e.to_string());
        }
    }
}

fn press<T: MidiTransport>(controller: &mut PadController<T>, pad: PadId) -> crate::error::Result<()> {
    let target = controller.target().clone();
    match pad {
        PadId::Pitch(i) => controller.press_pitch(i, &target),
        PadId::Chord(i) => controller.press_chord(i, &target),
    }
}

fn release<T: MidiTransport>(
    controller: &mut PadController<T>,
    pad: PadId,
) -> crate::error::Result<()> {
    match pad {
        PadId::Pitch(i) => controller.release_pitch(i),
        PadId::Chord(i) => controller.release_chord(i),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Name of the current pad target, or "all"
pub fn destination_label<T: MidiTransport>(controller: &PadController<T>) -> String {
    match controller.target().as_single() {
        Some(id) => controller
            .conductor()
            .endpoints()
            .into_iter()
            .find(|e| e.id == id)
            .map(|e| e.to_string())
            .unwrap_or_else(|| id.to_string()),
        None => controller.target().to_string(),
    }
}

/// Pad cells for the pitch grid
pub fn pitch_cells<T: MidiTransport>(controller: &PadController<T>) -> Vec<PadCell> {
    controller
        .layout()
        .pitches()
        .iter()
        .enumerate()
        .map(|(i, pitch)| PadCell::new(pitch.to_string(), controller.is_held(PadId::Pitch(i))))
        .collect()
}

/// Pad cells for the chord grid, labelled with degree and chord name
pub fn chord_cells<T: MidiTransport>(controller: &PadController<T>) -> Vec<PadCell> {
    controller
        .layout()
        .chords()
        .iter()
        .enumerate()
        .map(|(i, pad)| {
            PadCell::new(
                format!("{} {}", degree_numeral(pad.degree), pad.chord),
                controller.is_held(PadId::Chord(i)),
            )
        })
        .collect()
}

/// Help text built from the active key bindings
pub fn help_lines(keymap: &Keymap) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (category, bindings) in keymap.sections() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            category.title(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(bindings.into_iter().map(|b| {
            Line::from(format!("  {:<10}  {}", b.shortcut.to_string(), b.description))
        }));
    }
    lines
}

/// Terminal UI application
pub struct App {
    state: UiState,
    keymap: Keymap,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
    /// Key release reporting was enabled
    enhanced: bool,
}

impl App {
    /// Take over the terminal. Pads are momentary when the terminal can
    /// report key releases and latch otherwise.
    pub fn new(keymap: Keymap) -> io::Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        info!(
            "Pads are {}",
            if enhanced { "momentary" } else { "latching" }
        );

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state: UiState::new(enhanced),
            keymap,
            terminal,
            frame_rate: 30,
            running: true,
            enhanced,
        })
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Run until quit, applying config reloads from `watcher` between frames
    pub fn run<T: MidiTransport>(
        &mut self,
        controller: &mut PadController<T>,
        watcher: Option<&ConfigWatcher>,
    ) -> io::Result<()> {
        while self.running {
            if let Some(watcher) = watcher {
                for event in watcher.poll() {
                    self.state.apply_config_event(controller, event);
                }
            }
            self.state.clear_expired_status();
            self.draw(controller)?;

            if let Some(Event::Key(key)) = self.poll_event()? {
                let outcome = self.state.handle_key(&self.keymap, controller, key);
                if outcome == KeyOutcome::Quit {
                    self.quit();
                }
            }
        }
        Ok(())
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Draw the UI
    pub fn draw<T: MidiTransport>(&mut self, controller: &PadController<T>) -> io::Result<()> {
        let state = &self.state;
        let keymap = &self.keymap;
        let pitches = pitch_cells(controller);
        let chords = chord_cells(controller);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let pitch_rows = pitches.len().div_ceil(PITCH_COLUMNS) as u16;
            let chord_rows = chords.len().div_ceil(CHORD_COLUMNS) as u16;

            // Main layout: header, grids, footer
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),                  // Selection
                    Constraint::Length(pitch_rows * 3 + 2), // Pitch pads
                    Constraint::Length(chord_rows * 3 + 2), // Chord pads
                    Constraint::Min(0),
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            render_header(frame, chunks[0], controller);

            let focused = |grid: Grid| (state.focus == grid).then(|| state.cursor());
            frame.render_widget(
                PadGridWidget::new(&pitches, PITCH_COLUMNS)
                    .cursor(focused(Grid::Pitches))
                    .block(grid_block(" Pitches ", state.focus == Grid::Pitches)),
                chunks[1],
            );
            frame.render_widget(
                PadGridWidget::new(&chords, CHORD_COLUMNS)
                    .cursor(focused(Grid::Chords))
                    .block(grid_block(" Chords ", state.focus == Grid::Chords)),
                chunks[2],
            );

            render_status_bar(frame, chunks[4], state);

            if state.show_help {
                render_help_overlay(frame, area, keymap);
            }
        })?;

        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn grid_block(title: &'static str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

/// Render the selection header
fn render_header<T: MidiTransport>(frame: &mut Frame, area: Rect, controller: &PadController<T>) {
    let block = Block::default().borders(Borders::ALL).title(" Progression ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let selection = controller.selection();
    let conductor = controller.conductor();
    let octaves = match (selection.octaves.first(), selection.octaves.last()) {
        (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
        (Some(first), _) => first.to_string(),
        _ => "-".to_string(),
    };

    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let (output, output_style) = if conductor.is_output_open() {
        ("open", Style::default().fg(Color::Green))
    } else {
        ("closed", Style::default().fg(Color::Red))
    };

    let line = Line::from(vec![
        Span::styled("Key ", label),
        Span::styled(selection.key.to_string(), value),
        Span::styled("  Scale ", label),
        Span::styled(selection.scale_type.to_string(), value),
        Span::styled("  Spelling ", label),
        Span::styled(selection.key.spelling().to_string(), value),
        Span::styled("  Octaves ", label),
        Span::styled(octaves, value),
        Span::styled("  Chord oct ", label),
        Span::styled(selection.chord_octave.to_string(), value),
        Span::styled("  Dest ", label),
        Span::styled(destination_label(controller), value),
        Span::styled("  Output ", label),
        Span::styled(output, output_style),
        Span::styled("  Swap ", label),
        Span::styled(on_off(conductor.is_port_swapped()), value),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(message) = state.status() {
        Span::styled(message, Style::default().fg(Color::Yellow))
    } else {
        let mode = if state.momentary { "hold" } else { "toggle" };
        Span::styled(
            format!(
                " Space: {} pad | Arrows: move | Tab: switch grid | Esc: release all | ?: Help | q: Quit",
                mode
            ),
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, keymap: &Keymap) {
    let help_text = help_lines(keymap);

    let width = 50.min(area.width.saturating_sub(4));
    let height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let panel = Block::default()
        .borders(Borders::ALL)
        .title(" Keys ")
        .style(Style::default().bg(Color::Black));
    frame.render_widget(Clear, overlay);
    frame.render_widget(Paragraph::new(help_text).block(panel), overlay);
}
