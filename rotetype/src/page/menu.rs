use super::{Message, activity::Activity, practice::Practice};

use chrono::{Local, NaiveDate};
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, Paragraph},
};

use crate::{
    config::Config,
    library::Library,
    stats::StatsStore,
    utils::{center, centered_padding, format_duration},
};

/// Page: Main menu
#[derive(Debug)]
pub struct Menu {
    library: Library,
    stats: StatsStore,
    today: NaiveDate,
}

impl Menu {
    /// Creates a new menu
    pub fn new(config: &Config) -> Self {
        let mut library = Library::new(config.templates.clone(), config.category);
        if library.is_empty()
            && let Some(category) = library.categories().first()
        {
            tracing::warn!(
                requested = config.category,
                shown = category,
                "category has no templates"
            );
            library.set_category(*category);
        }

        Self {
            library,
            stats: StatsStore::load_or_default(&config.stats_path()),
            today: Local::now().date_naive(),
        }
    }

    fn start(&self, config: &Config) -> Message {
        match Practice::new(config, self.library.clone()) {
            Ok(practice) => Message::Show(practice.into()),
            Err(error) => Message::Error(Box::new(error)),
        }
    }
}

// Rendering logic
impl Menu {
    pub fn render(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let area = center(area, Constraint::Percentage(80), Constraint::Percentage(80));
        let [header, list, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.render_list(frame, list, config);
        self.render_activity(frame, footer, config);
    }

    pub fn render_top(&self, _config: &Config) -> Option<Line<'_>> {
        Some(Line::raw(
            "<Enter> start | <r> random | <Tab> category | <Up/Down> select | <s> activity",
        ))
    }

    pub fn handle_events(&mut self, event: &Event, config: &Config) -> Option<Message> {
        if let Event::Key(key) = event
            && key.is_press()
        {
            return self.handle_key(key, config);
        }

        None
    }
}

// Render helpers
impl Menu {
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let categories = self.library.categories();
        let mut spans = vec![Span::raw(format!("Category {}", self.library.category())).bold()];
        if categories.len() > 1 {
            spans.push(Span::raw(format!(" ({} categories)", categories.len())).dim());
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).centered(), area);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let index = self.library.index();
        let title_width = self
            .library
            .visible()
            .map(|template| template.title.chars().count())
            .max()
            .unwrap_or(0);

        let items = self.library.visible().enumerate().map(|(i, template)| {
            let mut selector = "  ";
            let style = if i == index {
                selector = "> ";
                Style::new()
                    .fg(config.settings.theme.text.highlight)
                    .reversed()
            } else {
                Style::new()
            };

            let summary = self
                .stats
                .template(&template.id)
                .map(|stats| {
                    format!(
                        "{:>3} runs  {:>3} wpm  {}",
                        stats.count,
                        stats.best_wpm,
                        format_duration(stats.total_time)
                    )
                })
                .unwrap_or_else(|| "new".to_string());

            Line::from(Span::styled(
                format!("{selector}{:<title_width$}   {summary}", template.title),
                style,
            ))
        });

        let list = List::new(items);
        let padding = centered_padding(area, Some(list.len() as u16 + 1), None);
        let area = Block::new().padding(padding).inner(area);

        frame.render_widget(list.block(Block::new().title("Select Template")), area);
    }

    fn render_activity(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let theme = &config.settings.theme.text;
        let today = match self.stats.day(self.today) {
            Some(activity) => format!(
                "Today: {} sessions, best {} wpm, {:.2}% accuracy, fastest {}",
                activity.count,
                activity.best_wpm,
                activity.best_accuracy,
                format_duration(activity.best_time)
            ),
            None => "No sessions today".to_string(),
        };

        let totals = self.stats.totals();
        let streak = self.stats.streak(self.today);
        let lines = vec![
            Line::raw(format!(
                "{} tests, {} spent, top speed {} wpm",
                totals.tests,
                format_duration(totals.time),
                totals.top_wpm
            ))
            .dim(),
            Line::raw(today),
            Line::styled(
                format!("Streak: {streak} day{}", if streak == 1 { "" } else { "s" }),
                Style::new().fg(theme.success),
            ),
        ];

        frame.render_widget(Paragraph::new(lines).centered(), area);
    }
}

// Event handlers
impl Menu {
    fn handle_key(&mut self, key: &KeyEvent, config: &Config) -> Option<Message> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.library.previous();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.library.next();
            }
            KeyCode::Tab => self.library.cycle_category(),
            KeyCode::Char('s') => return Some(Message::Show(Activity::new(config).into())),
            KeyCode::Enter if !self.library.is_empty() => return Some(self.start(config)),
            KeyCode::Char('r') if !self.library.is_empty() => {
                self.library.random(&mut rand::thread_rng());
                return Some(self.start(config));
            }
            _ => (),
        };

        None
    }
}
