use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, ToSpan},
    widgets::Paragraph,
};

use crate::{
    app::Message,
    config::Config,
    stats::{StatsStore, activity_level},
    utils::{ROUNDED_BLOCK, center, fade, format_duration},
};

/// Days shown under the calendar
const RECENT_DAYS: usize = 8;

const WEEKDAY_LABELS: [&str; 7] = ["Mon ", "    ", "Wed ", "    ", "Fri ", "    ", "Sun "];

/// One calendar column per week, Monday first
type Week = [Option<NaiveDate>; 7];

/// Page: Activity
///
/// Overview totals and a calendar of the days practiced in one year.
#[derive(Debug)]
pub struct Activity {
    stats: StatsStore,
    year: i32,
    today: NaiveDate,
}

impl Activity {
    pub fn new(config: &Config) -> Self {
        let today = Local::now().date_naive();
        Self {
            stats: StatsStore::load_or_default(&config.stats_path()),
            year: today.year(),
            today,
        }
    }
}

/// Lays out every day of `year` in week columns
fn year_grid(year: i32) -> Vec<Week> {
    let mut weeks: Vec<Week> = Vec::new();
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return weeks;
    };

    let offset = first.weekday().num_days_from_monday() as usize;
    for (position, day) in first
        .iter_days()
        .take_while(|day| day.year() == year)
        .enumerate()
    {
        let slot = offset + position;
        if slot / 7 == weeks.len() {
            weeks.push([None; 7]);
        }
        weeks[slot / 7][slot % 7] = Some(day);
    }

    weeks
}

// Rendering logic
impl Activity {
    pub fn render(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let area = center(area, Constraint::Percentage(90), Constraint::Percentage(90));
        let [overview, calendar, recent] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(11),
            Constraint::Fill(1),
        ])
        .areas(area);

        self.render_overview(frame, overview, config);
        self.render_calendar(frame, calendar, config);
        self.render_recent(frame, recent, config);
    }

    pub fn render_top(&self, _config: &Config) -> Option<Line<'_>> {
        Some(Line::raw("<Enter> menu | <Left/Right> year"))
    }

    pub fn handle_events(&mut self, event: &Event, _config: &Config) -> Option<Message> {
        if let Event::Key(key) = event
            && key.is_press()
        {
            match key.code {
                KeyCode::Enter => return Some(Message::Reset),
                KeyCode::Left | KeyCode::Char('h') => self.year -= 1,
                KeyCode::Right | KeyCode::Char('l') if self.year < self.today.year() => {
                    self.year += 1;
                }
                _ => (),
            }
        }

        None
    }
}

// Render helpers
impl Activity {
    fn render_overview(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let totals = self.stats.totals();
        let highlight = Style::new().fg(config.settings.theme.text.highlight).bold();

        let line = Line::from(vec![
            Span::raw("Tests taken: "),
            Span::styled(totals.tests.to_string(), highlight),
            Span::raw("   Time spent: "),
            Span::styled(format_duration(totals.time), highlight),
            Span::raw("   Top speed: "),
            Span::styled(format!("{} wpm", totals.top_wpm), highlight),
        ])
        .centered();

        frame.render_widget(
            Paragraph::new(line).block(ROUNDED_BLOCK.title("Overview".to_span().bold())),
            area,
        );
    }

    fn render_calendar(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let theme = &config.settings.theme;
        let weeks = year_grid(self.year);

        let title = format!("Activity {}", self.year);
        let block = ROUNDED_BLOCK.title(title.to_span().bold());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Leave a gap between weeks when there is room for it
        let label_width = WEEKDAY_LABELS[0].len() as u16;
        let cell = if inner.width >= label_width + weeks.len() as u16 * 2 {
            "■ "
        } else {
            "■"
        };

        let level_color = |level: u8| -> Color {
            let amount = match level {
                1 => 0.6,
                2 => 0.3,
                _ => 0.0,
            };
            fade(theme.text.success, theme.term_bg, amount, false)
        };
        let empty = fade(theme.term_fg, theme.term_bg, 0.8, false);

        let mut lines: Vec<Line> = (0..7)
            .map(|weekday| {
                let mut spans = vec![Span::raw(WEEKDAY_LABELS[weekday]).dim()];
                spans.extend(weeks.iter().map(|week| match week[weekday] {
                    None => Span::raw(" ".repeat(cell.chars().count())),
                    Some(day) => {
                        let count = self.stats.day(day).map_or(0, |activity| activity.count);
                        let mut style = match activity_level(count) {
                            0 => Style::new().fg(empty),
                            level => Style::new().fg(level_color(level)),
                        };
                        if day == self.today {
                            style = style.bg(theme.text.highlight);
                        }
                        Span::styled(cell, style)
                    }
                }));
                Line::from(spans)
            })
            .collect();

        let mut legend = vec![Span::raw("Less ").dim(), Span::styled(cell, Style::new().fg(empty))];
        legend.extend((1..=3).map(|level| Span::styled(cell, Style::new().fg(level_color(level)))));
        legend.push(Span::raw(" More").dim());

        lines.push(Line::default());
        lines.push(Line::from(legend).right_aligned());

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_recent(&self, frame: &mut Frame, area: Rect, _config: &Config) {
        let block = ROUNDED_BLOCK.title("Recent days".to_span().bold());

        let lines: Vec<Line> = self
            .stats
            .days_in(self.year)
            .rev()
            .take(RECENT_DAYS)
            .map(|(day, activity)| {
                Line::raw(format!(
                    "{day}   {:>3} tests   {:>3} wpm   {:>6.2}%   fastest {}",
                    activity.count,
                    activity.best_wpm,
                    activity.best_accuracy,
                    format_duration(activity.best_time)
                ))
            })
            .collect();

        let paragraph = if lines.is_empty() {
            Paragraph::new(format!("No sessions in {}", self.year)).centered()
        } else {
            Paragraph::new(lines)
        };

        frame.render_widget(paragraph.block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};
    use rote::{OptionSet, Outcome};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_year_grid() {
        // 2024 starts on a Monday and is a leap year
        let weeks = year_grid(2024);
        assert_eq!(weeks.len(), 53);
        assert_eq!(weeks[0][0], Some(date(2024, 1, 1)));
        assert_eq!(weeks[52][0], Some(date(2024, 12, 30)));
        assert_eq!(weeks[52][1], Some(date(2024, 12, 31)));
        assert_eq!(weeks[52][2], None);

        // 2023 starts on a Sunday
        let weeks = year_grid(2023);
        assert_eq!(weeks[0][..6], [None; 6]);
        assert_eq!(weeks[0][6], Some(date(2023, 1, 1)));
        assert_eq!(weeks.iter().flatten().flatten().count(), 365);
    }

    #[test]
    fn test_year_navigation() {
        let config = Config::for_tests();
        let mut page = Activity::new(&config);
        let this_year = page.today.year();

        // The future has no activity
        page.handle_events(&press(KeyCode::Right), &config);
        assert_eq!(page.year, this_year);

        page.handle_events(&press(KeyCode::Left), &config);
        assert_eq!(page.year, this_year - 1);
        page.handle_events(&press(KeyCode::Char('l')), &config);
        assert_eq!(page.year, this_year);

        assert!(matches!(
            page.handle_events(&press(KeyCode::Enter), &config),
            Some(Message::Reset)
        ));
    }

    #[test]
    fn test_render_overview_and_recent_days() {
        let config = Config::for_tests();
        let mut stats = StatsStore::default();
        let outcome = Outcome {
            time: 95.0,
            mistakes: 0,
            wpm: 57.3,
            accuracy: 99.0,
            options: OptionSet::empty(),
        };
        stats.record("t/0", &outcome, date(2024, 6, 2));
        stats.record("t/1", &outcome, date(2024, 6, 3));

        let page = Activity {
            stats,
            year: 2024,
            today: date(2024, 6, 3),
        };
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|frame| page.render(frame, frame.area(), &config))
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Tests taken: 2"));
        assert!(screen.contains("Time spent: 3m 10s"));
        assert!(screen.contains("Top speed: 57 wpm"));
        assert!(screen.contains("Activity 2024"));
        assert!(screen.contains("2024-06-03"));
        assert!(screen.contains("2024-06-02"));
    }
}
