use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Frame, style::Stylize, text::ToLine, widgets::Padding};
use rote::{OptionSet, Outcome};

use crate::config::Config;
use crate::page;
use crate::stats::StatsWriter;
use crate::utils::ROUNDED_BLOCK;

/// How long to wait for input before drawing the next frame
const FRAME_TIME: Duration = Duration::from_millis(8);

const NO_TEMPLATES_ERROR: &str = r"No templates found.
Add a `.toml` file with `[[templates]]` entries to your templates directory, or remove it to get the samples back.";

/// An app message
pub enum Message {
    /// An error occurred
    Error(Box<dyn std::error::Error + Send>),
    /// Show a specific page
    Show(page::Page),
    /// Reset to the main menu
    Reset,
    /// Quit the application
    Quit,
    /// A session was completed and should be recorded
    Completed {
        template_id: String,
        outcome: Outcome,
    },
    /// The user toggled an option, remember it for the next practice
    OptionsChanged(OptionSet),
}

/// The app itself
pub struct App {
    page: page::Page,
    config: Config,
    stats: Option<StatsWriter>,
}

impl App {
    /// Creates a new `App`
    pub fn new(config: Config) -> Self {
        let page = if config.templates.is_empty() {
            page::Error::from(NO_TEMPLATES_ERROR).into()
        } else {
            page::Menu::new(&config).into()
        };

        let stats = config
            .settings
            .statistics
            .save_enabled
            .then(|| StatsWriter::spawn(config.stats_path()));

        Self {
            page,
            config,
            stats,
        }
    }

    /// Runs the app
    pub fn run(&mut self) -> std::io::Result<()> {
        let mut terminal = ratatui::init();

        loop {
            let event = event::poll(FRAME_TIME)?.then(event::read).transpose()?;
            if let Some(message) = self.handle_events(event) {
                match message {
                    Message::Error(error) => {
                        tracing::error!(%error, "showing error page");
                        self.page = page::Error::from(error).into();
                    }
                    Message::Show(page) => self.page = page,
                    Message::Reset => self.page = page::Menu::new(&self.config).into(),
                    Message::Quit => break,
                    Message::Completed {
                        template_id,
                        outcome,
                    } => self.record(&template_id, outcome),
                    Message::OptionsChanged(options) => self.config.options = options,
                }
            }
            terminal.draw(|frame| self.draw(frame))?;
        }

        ratatui::restore();

        Ok(())
    }

    fn record(&self, template_id: &str, outcome: Outcome) {
        if let Some(stats) = &self.stats {
            stats.submit(template_id, outcome);
        }
    }

    /// Draws the next frame
    fn draw(&mut self, frame: &mut Frame) {
        let mut block = ROUNDED_BLOCK
            .padding(Padding::new(1, 1, 0, 0))
            .title_top("ROTETYPE".to_line().bold().centered())
            .title_top("<CTRL-Q> to exit".to_line().right_aligned());

        if let Some(top_msg) = self.page.render_top(&self.config) {
            block = block.title_top(top_msg);
        }

        let area = frame.area();
        let content = block.inner(area);

        frame.render_widget(block, area);

        self.page.render(frame, content, &self.config);
    }

    /// Global event handler
    fn handle_events(&mut self, event_opt: Option<Event>) -> Option<Message> {
        event_opt
            .and_then(|event| {
                self.page.handle_events(&event, &self.config).or_else(|| {
                    match event {
                        Event::Key(key) => self.handle_key_event(key),
                        _ => None,
                    }
                })
            })
            .or_else(|| self.page.poll(&self.config))
    }

    /// Global key events
    const fn handle_key_event(&self, key: KeyEvent) -> Option<Message> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Esc, KeyModifiers::NONE) => Some(Message::Reset),
            _ => None,
        }
    }
}
