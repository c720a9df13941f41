use std::ops::Rem;

use crossterm::event::{Event, KeyCode, KeyEvent};
use derive_more::From;
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};
use rote::{
    HookEvent, LoadError, Outcome, Recorder, Session, SessionState, TypingOption,
    diff::{CharClass, CharView, LineRenderConfig},
    particles::Point,
};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    config::Config,
    library::Library,
    utils::{KeyEventHelper, ROUNDED_BLOCK, center, fade},
};

use super::Message;

/// Function keys toggling each option, starting at F2
const FIRST_OPTION_KEY: u8 = 2;

/// Particles at least this large are drawn as a full dot
const LARGE_PARTICLE: f64 = 4.5;

#[derive(Debug, From, Error)]
pub enum PracticeError {
    #[error("There are no templates in category {0}")]
    #[from(skip)]
    NoTemplate(u32),

    #[error("Failed to load template: {0}")]
    Load(LoadError),
}

/// Page: Practice
///
/// Runs typing sessions over the templates of a [`Library`], moving on to the next template
/// whenever one is completed.
#[derive(Debug)]
pub struct Practice {
    session: Session<Recorder>,
    library: Library,
    template_id: String,
    title: String,
    rng: StdRng,
    last_outcome: Option<Outcome>,
    /// Reported on the poll after the outcome it interrupted
    deferred_error: Option<PracticeError>,
}

impl Practice {
    /// Starts practicing the library's current template
    pub fn new(config: &Config, library: Library) -> Result<Self, PracticeError> {
        let template = library
            .current()
            .ok_or(PracticeError::NoTemplate(library.category()))?;

        let session =
            Session::with_target(&template.template, Recorder::default())?.with_options(config.options);

        tracing::debug!(template = %template.id, options = %config.options, "practice started");

        Ok(Self {
            session,
            template_id: template.id.clone(),
            title: template.title.clone(),
            library,
            rng: StdRng::from_entropy(),
            last_outcome: None,
            deferred_error: None,
        })
    }

    fn load_current(&mut self) -> Result<(), PracticeError> {
        let template = self
            .library
            .current()
            .ok_or(PracticeError::NoTemplate(self.library.category()))?;

        self.session.load(&template.template)?;
        self.template_id.clone_from(&template.id);
        self.title.clone_from(&template.title);
        Ok(())
    }

    fn follow_up(&mut self) -> Result<(), PracticeError> {
        self.library.follow_up(self.session.options(), &mut self.rng);
        self.load_current()
    }
}

// Rendering logic
impl Practice {
    pub fn render(&mut self, frame: &mut Frame, area: Rect, config: &Config) {
        let [title, text, result, toolbar] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(area);

        frame.render_widget(
            Line::from(self.title.as_str()).bold().centered(),
            title,
        );

        self.render_text(frame, text, config);
        self.render_particles(frame, config);
        self.render_result(frame, result, config);
        self.render_toolbar(frame, toolbar, config);

        if self.session.state() == SessionState::Failed {
            self.render_failed(frame, area, config);
        }
    }

    pub fn render_top(&self, config: &Config) -> Option<Line<'_>> {
        let elapsed = self.session.elapsed_secs();
        let seconds = elapsed.rem(60);
        let minutes = elapsed / 60;
        let state = self.session.state();

        Some(Line::from(vec![
            Span::raw(format!(
                "{minutes}:{seconds:0>2} | {} wpm | {:.0}% | {}/{} | {} mistakes ",
                self.session.live_wpm(),
                self.session.live_accuracy(),
                self.session.typed().len(),
                self.session.target().len(),
                self.session.mistakes(),
            )),
            Span::raw(format!(" {} ", state.label()))
                .bold()
                .fg(config.settings.theme.term_bg)
                .bg(config.settings.theme.state.color(state)),
        ]))
    }

    pub fn poll(&mut self, _config: &Config) -> Option<Message> {
        if let Some(error) = self.deferred_error.take() {
            return Some(Message::Error(Box::new(error)));
        }

        self.session.poll();

        let mut message = None;
        for event in self.session.hooks_mut().drain() {
            match event {
                HookEvent::TestStarted => {
                    tracing::debug!(template = %self.template_id, "session started");
                }
                HookEvent::StateChanged(state) => tracing::trace!(%state, "state changed"),
                HookEvent::Failed(reason) => {
                    tracing::info!(template = %self.template_id, %reason, "session failed");
                }
                HookEvent::Completed(outcome) => {
                    tracing::info!(
                        template = %self.template_id,
                        wpm = outcome.wpm,
                        accuracy = outcome.accuracy,
                        time = outcome.time,
                        "session complete"
                    );

                    let template_id = self.template_id.clone();
                    self.last_outcome = Some(outcome);
                    if let Err(error) = self.follow_up() {
                        tracing::warn!(%error, "could not load the next template");
                        self.deferred_error = Some(error);
                    }
                    message = Some(Message::Completed {
                        template_id,
                        outcome,
                    });
                }
            }
        }

        message
    }

    pub fn handle_events(&mut self, event: &Event, _config: &Config) -> Option<Message> {
        if let Event::Key(key) = event
            && key.is_press()
        {
            return self.handle_key(key);
        }

        None
    }
}

// Render helpers
impl Practice {
    fn render_text(&mut self, frame: &mut Frame, area: Rect, config: &Config) {
        let theme = &config.settings.theme;
        let pending = fade(theme.term_fg, theme.term_bg, theme.text.pending_fade, false);
        let area = center(area, Constraint::Percentage(80), Constraint::Percentage(100));

        let mut cursor: Option<(u16, u16)> = None;
        let mut row = 0u16;

        let lines = self.session.render_lines(
            |line| {
                let spans = line
                    .contents
                    .iter()
                    .enumerate()
                    .map(|(column, view)| {
                        if view.has_cursor {
                            cursor = Some((column as u16, row));
                        }
                        let (symbol, style) = char_span(view, pending, config);
                        Span::styled(symbol, style)
                    })
                    .collect::<Vec<_>>();

                row += 1;
                Some(Line::from(spans))
            },
            LineRenderConfig::new(usize::from(area.width.saturating_sub(1))),
        );

        // Keep the cursor line in view on long templates
        let (cursor_x, cursor_y) = cursor.unwrap_or((0, row.saturating_sub(1)));
        let scroll = if row > area.height {
            cursor_y
                .saturating_sub(area.height / 2)
                .min(row - area.height)
        } else {
            0
        };

        frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);

        let particles = config.settings.particles;
        let column = area.x + cursor_x;
        let line = area.y + cursor_y.saturating_sub(scroll);
        self.session.set_cursor_anchor(Point::new(
            (f64::from(column) + 0.5) * particles.cell_width,
            (f64::from(line) + 0.5) * particles.cell_height,
        ));
    }

    fn render_particles(&self, frame: &mut Frame, config: &Config) {
        let scale = config.settings.particles;
        let background = config.settings.theme.term_bg;
        let bounds = frame.area();
        let buffer = frame.buffer_mut();

        for particle in self.session.particles().particles() {
            let x = (particle.position.x / scale.cell_width).floor();
            let y = (particle.position.y / scale.cell_height).floor();
            if x < 0.0 || y < 0.0 {
                continue;
            }

            let (x, y) = (x as u16, y as u16);
            if x >= bounds.right() || y >= bounds.bottom() {
                continue;
            }

            let (r, g, b) = particle.color.to_rgb();
            let color = fade(Color::Rgb(r, g, b), background, 1.0 - particle.opacity, false);
            let symbol = if particle.size >= LARGE_PARTICLE { "●" } else { "•" };

            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_symbol(symbol).set_fg(color);
            }
        }
    }

    fn render_result(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let Some(outcome) = self.last_outcome else {
            return;
        };

        let line = Line::from(format!(
            "Last: {:.2} wpm | {:.2}% accuracy | {:.2}s | {} mistakes",
            outcome.wpm, outcome.accuracy, outcome.time, outcome.mistakes
        ))
        .fg(config.settings.theme.text.highlight)
        .centered();

        frame.render_widget(line, area);
    }

    fn render_toolbar(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let theme = &config.settings.theme.text;
        let options = self.session.options();

        let toggles = TypingOption::iter()
            .enumerate()
            .flat_map(|(offset, option)| {
                let style = if options.contains(option) {
                    Style::new().fg(theme.success).bold()
                } else {
                    Style::new().dim()
                };
                let key = FIRST_OPTION_KEY as usize + offset;
                [
                    Span::raw(format!("<F{key}> ")),
                    Span::styled(option.to_string(), style),
                    Span::raw("  "),
                ]
            })
            .collect::<Line>();

        let note = match options.shadowed() {
            Some((winner, shadowed)) => Line::styled(
                format!("{shadowed} is ignored while {winner} is enabled"),
                Style::new().fg(theme.warning),
            ),
            None => Line::default(),
        };

        let help = Line::raw("<Ctrl-N> next | <Ctrl-P> previous | <Ctrl-R> restart").dim();

        let lines = vec![toggles.centered(), note.centered(), help.centered()];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_failed(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let area = center(area, Constraint::Percentage(50), Constraint::Length(6));
        let message = self.session.failure_message().unwrap_or_default();

        let text = Paragraph::new(vec![
            Line::default(),
            Line::from(message).centered(),
            Line::default(),
            Line::from("<Enter> to try again").dim().centered(),
        ])
        .wrap(Wrap { trim: true })
        .block(
            ROUNDED_BLOCK
                .title_top(Line::from("Test Failed!").bold().centered())
                .border_style(Style::new().fg(config.settings.theme.text.error)),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(text, area);
    }
}

/// Symbol and style for a single target character
fn char_span(view: &CharView, pending: Color, config: &Config) -> (String, Style) {
    let theme = &config.settings.theme;
    let is_whitespace = view.char.is_whitespace();

    let symbol = match view.char {
        '\n' => "⏎".to_string(),
        '\t' => "→".to_string(),
        ' ' if view.class == CharClass::Pending && config.settings.ghost_space => "·".to_string(),
        char => char.to_string(),
    };

    let mut style = match view.class {
        CharClass::Pending => Style::new().fg(pending),
        CharClass::Correct => Style::new().fg(theme.text.success),
        CharClass::Incorrect if is_whitespace => Style::new().bg(theme.text.error),
        CharClass::Incorrect => Style::new().fg(theme.text.error),
    };

    if is_whitespace && view.class != CharClass::Incorrect {
        style = style.dim();
    }

    if view.has_cursor {
        style = style.fg(theme.cursor.text).bg(theme.cursor.color);
    }

    (symbol, style)
}

// Event handlers
impl Practice {
    fn handle_key(&mut self, key: &KeyEvent) -> Option<Message> {
        if let KeyCode::F(number) = key.code
            && let Some(option) = number
                .checked_sub(FIRST_OPTION_KEY)
                .and_then(|offset| TypingOption::iter().nth(usize::from(offset)))
        {
            let enabled = self.session.toggle_option(option);
            tracing::debug!(%option, enabled, "option toggled");
            return Some(Message::OptionsChanged(self.session.options()));
        }

        let result = if key.is_ctrl_press_char('n') {
            self.library.next();
            self.load_current()
        } else if key.is_ctrl_press_char('p') {
            self.library.previous();
            self.load_current()
        } else if key.is_ctrl_press_char('r')
            || (key.code == KeyCode::Enter && self.session.state() == SessionState::Failed)
        {
            self.session.restart();
            Ok(())
        } else {
            self.session.handle_key(&key.to_rote());
            Ok(())
        };

        result.err().map(|error| Message::Error(Box::new(error)))
    }
}
