use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use chrono::{Datelike, Local, NaiveDate};
use derive_more::From;
use rote::Outcome;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STATS_FILE: &str = "stats.json";

#[derive(Debug, From, Error)]
pub enum StatsError {
    #[error("Failed to create statistics directory: {0}")]
    #[from(skip)]
    CreateDirectory(std::io::Error),

    #[error("Failed to read statistics file: {0}")]
    ReadFile(std::io::Error),

    #[error("Failed to write statistics file: {0}")]
    #[from(skip)]
    WriteFile(std::io::Error),

    #[error("Failed to parse statistics: {0}")]
    Parse(serde_json::Error),

    #[error("Failed to move corrupt statistics aside: {0}")]
    #[from(skip)]
    Quarantine(std::io::Error),
}

/// Totals for a single template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateStats {
    pub count: u32,
    /// Seconds spent on completed sessions
    pub total_time: f64,
    pub best_wpm: u32,
}

/// Best results of a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub count: u32,
    pub best_accuracy: f64,
    pub best_wpm: u32,
    /// Fastest completion in seconds
    pub best_time: f64,
}

/// Sums over every template
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub tests: u32,
    /// Seconds
    pub time: f64,
    pub top_wpm: u32,
}

/// Intensity bucket of a day with `count` sessions, from 0 (none) to 3
pub const fn activity_level(count: u32) -> u8 {
    match count {
        0 => 0,
        1..10 => 1,
        10..20 => 2,
        _ => 3,
    }
}

/// Everything persisted about completed sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsStore {
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateStats>,
    #[serde(default)]
    pub daily: BTreeMap<NaiveDate, DailyActivity>,
}

impl StatsStore {
    /// Reads the store at `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StatsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`StatsStore::load`], but logs failures and falls back to an empty store
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|error| {
            tracing::warn!(path = %path.display(), %error, "could not read statistics");
            Self::default()
        })
    }

    /// Like [`StatsStore::load`], but a file that does not parse is renamed to
    /// `stats.json.corrupt` and an empty store takes its place. Read errors are returned as is.
    pub fn load_or_quarantine(path: &Path) -> Result<Self, StatsError> {
        match Self::load(path) {
            Err(StatsError::Parse(error)) => {
                let corrupt = path.with_extension("json.corrupt");
                std::fs::rename(path, &corrupt).map_err(StatsError::Quarantine)?;
                tracing::warn!(
                    %error,
                    moved_to = %corrupt.display(),
                    "statistics file is corrupt, starting fresh"
                );
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Writes the store as pretty JSON, replacing the file in one step
    pub fn save(&self, path: &Path) -> Result<(), StatsError> {
        if let Some(directory) = path.parent()
            && !directory.exists()
        {
            std::fs::create_dir_all(directory).map_err(StatsError::CreateDirectory)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let temporary = path.with_extension("json.tmp");
        std::fs::write(&temporary, content).map_err(StatsError::WriteFile)?;
        std::fs::rename(&temporary, path).map_err(StatsError::WriteFile)?;
        Ok(())
    }

    /// Adds a completed session
    pub fn record(&mut self, template_id: &str, outcome: &Outcome, day: NaiveDate) {
        let wpm = outcome.wpm.trunc() as u32;

        let totals = self.templates.entry(template_id.to_string()).or_default();
        totals.count += 1;
        totals.total_time += outcome.time;
        totals.best_wpm = totals.best_wpm.max(wpm);

        self.daily
            .entry(day)
            .and_modify(|activity| {
                activity.count += 1;
                activity.best_accuracy = activity.best_accuracy.max(outcome.accuracy);
                activity.best_wpm = activity.best_wpm.max(wpm);
                activity.best_time = activity.best_time.min(outcome.time);
            })
            .or_insert(DailyActivity {
                count: 1,
                best_accuracy: outcome.accuracy,
                best_wpm: wpm,
                best_time: outcome.time,
            });
    }

    pub fn template(&self, template_id: &str) -> Option<&TemplateStats> {
        self.templates.get(template_id)
    }

    pub fn day(&self, day: NaiveDate) -> Option<&DailyActivity> {
        self.daily.get(&day)
    }

    pub fn totals(&self) -> Totals {
        self.templates
            .values()
            .fold(Totals::default(), |totals, stats| Totals {
                tests: totals.tests + stats.count,
                time: totals.time + stats.total_time,
                top_wpm: totals.top_wpm.max(stats.best_wpm),
            })
    }

    /// Days of `year` with activity, oldest first
    pub fn days_in(
        &self,
        year: i32,
    ) -> impl DoubleEndedIterator<Item = (&NaiveDate, &DailyActivity)> {
        self.daily.iter().filter(move |(day, _)| day.year() == year)
    }

    /// Consecutive days with activity, ending today or yesterday
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let start = if self.daily.contains_key(&today) {
            Some(today)
        } else {
            today.pred_opt().filter(|day| self.daily.contains_key(day))
        };

        let mut streak = 0;
        let mut day = start;
        while let Some(current) = day
            && self.daily.contains_key(&current)
        {
            streak += 1;
            day = current.pred_opt();
        }

        streak
    }
}

struct Record {
    template_id: String,
    outcome: Outcome,
    day: NaiveDate,
}

/// Persists outcomes on a background thread.
///
/// Submitting never blocks on the disk. The thread exits once the writer is dropped and every
/// queued record has been written.
#[derive(Debug)]
pub struct StatsWriter {
    sender: Option<Sender<Record>>,
    handle: Option<JoinHandle<()>>,
}

impl StatsWriter {
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel::<Record>();

        let handle = std::thread::Builder::new()
            .name("stats-writer".to_string())
            .spawn(move || {
                for record in receiver {
                    // Never overwrite a file that could not be read
                    let mut store = match StatsStore::load_or_quarantine(&path) {
                        Ok(store) => store,
                        Err(error) => {
                            tracing::warn!(%error, template = %record.template_id, "outcome not saved");
                            continue;
                        }
                    };
                    store.record(&record.template_id, &record.outcome, record.day);

                    match store.save(&path) {
                        Ok(()) => tracing::debug!(template = %record.template_id, "statistics saved"),
                        Err(error) => tracing::warn!(%error, "could not save statistics"),
                    }
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::warn!(%error, "could not start statistics writer");
                None
            }
        };

        Self {
            sender: handle.is_some().then_some(sender),
            handle,
        }
    }

    /// Queues an outcome for today
    pub fn submit(&self, template_id: &str, outcome: Outcome) {
        self.submit_on(template_id, outcome, Local::now().date_naive());
    }

    pub fn submit_on(&self, template_id: &str, outcome: Outcome, day: NaiveDate) {
        let Some(sender) = &self.sender else {
            return;
        };

        let record = Record {
            template_id: template_id.to_string(),
            outcome,
            day,
        };

        if sender.send(record).is_err() {
            tracing::warn!("statistics writer is gone, outcome dropped");
        }
    }
}

impl Drop for StatsWriter {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("statistics writer panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rote::OptionSet;

    fn outcome(time: f64, wpm: f64, accuracy: f64) -> Outcome {
        Outcome {
            time,
            mistakes: 0,
            wpm,
            accuracy,
            options: OptionSet::empty(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_aggregates() {
        let mut store = StatsStore::default();
        let day = date(2024, 3, 10);

        store.record("samples/0", &outcome(30.0, 41.7, 95.0), day);
        store.record("samples/0", &outcome(20.0, 39.2, 98.5), day);
        store.record("samples/1", &outcome(50.0, 12.0, 80.0), day);

        assert_eq!(
            store.template("samples/0"),
            Some(&TemplateStats {
                count: 2,
                total_time: 50.0,
                best_wpm: 41,
            })
        );
        assert_eq!(
            store.day(day),
            Some(&DailyActivity {
                count: 3,
                best_accuracy: 98.5,
                best_wpm: 41,
                best_time: 20.0,
            })
        );
        assert!(store.day(date(2024, 3, 11)).is_none());
    }

    #[test]
    fn test_totals_and_days() {
        let mut store = StatsStore::default();
        assert_eq!(store.totals(), Totals::default());

        store.record("a/0", &outcome(30.0, 41.7, 95.0), date(2023, 12, 31));
        store.record("a/0", &outcome(20.0, 39.2, 98.5), date(2024, 1, 1));
        store.record("b/0", &outcome(50.0, 62.9, 80.0), date(2024, 2, 3));

        assert_eq!(
            store.totals(),
            Totals {
                tests: 3,
                time: 100.0,
                top_wpm: 62,
            }
        );

        let days: Vec<_> = store.days_in(2024).map(|(day, _)| *day).collect();
        assert_eq!(days, vec![date(2024, 1, 1), date(2024, 2, 3)]);
        assert_eq!(store.days_in(2023).count(), 1);
        assert_eq!(store.days_in(2022).count(), 0);
    }

    #[test]
    fn test_activity_level() {
        assert_eq!(activity_level(0), 0);
        assert_eq!(activity_level(1), 1);
        assert_eq!(activity_level(9), 1);
        assert_eq!(activity_level(10), 2);
        assert_eq!(activity_level(19), 2);
        assert_eq!(activity_level(20), 3);
        assert_eq!(activity_level(400), 3);
    }

    #[test]
    fn test_streak() {
        let mut store = StatsStore::default();
        let today = date(2024, 3, 10);
        assert_eq!(store.streak(today), 0);

        for day in [date(2024, 3, 7), date(2024, 3, 8), date(2024, 3, 9)] {
            store.record("t", &outcome(10.0, 10.0, 100.0), day);
        }
        // Nothing today yet, but yesterday keeps the streak alive
        assert_eq!(store.streak(today), 3);

        store.record("t", &outcome(10.0, 10.0, 100.0), today);
        assert_eq!(store.streak(today), 4);

        // Two days without activity breaks it
        assert_eq!(store.streak(date(2024, 3, 12)), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(STATS_FILE);
        assert_eq!(StatsStore::load(&path).unwrap(), StatsStore::default());

        let mut store = StatsStore::default();
        store.record("samples/3", &outcome(12.5, 22.0, 90.0), date(2024, 1, 2));
        store.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"2024-01-02\""));
        assert_eq!(StatsStore::load(&path).unwrap(), store);

        std::fs::write(&path, "{ not json").unwrap();
        assert_matches!(StatsStore::load(&path), Err(StatsError::Parse(_)));
        assert_eq!(StatsStore::load_or_default(&path), StatsStore::default());
    }

    #[test]
    fn test_writer_flushes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATS_FILE);
        let day = date(2024, 5, 1);

        let writer = StatsWriter::spawn(path.clone());
        writer.submit_on("a/0", outcome(10.0, 30.0, 100.0), day);
        writer.submit_on("a/0", outcome(8.0, 35.5, 97.0), day);
        drop(writer);

        let store = StatsStore::load(&path).unwrap();
        assert_eq!(store.template("a/0").map(|t| t.count), Some(2));
        assert_eq!(store.day(day).map(|d| d.best_wpm), Some(35));
    }

    #[test]
    fn test_writer_keeps_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATS_FILE);
        let corrupt = r#"{ "templates": { "a/0": { "count": 250, "total_time": 900.0, "best_wpm": 80 }, }, "daily": {} }"#;
        std::fs::write(&path, corrupt).unwrap();

        let writer = StatsWriter::spawn(path.clone());
        writer.submit_on("b/0", outcome(10.0, 30.0, 100.0), date(2024, 5, 1));
        drop(writer);

        let kept = std::fs::read_to_string(dir.path().join("stats.json.corrupt")).unwrap();
        assert_eq!(kept, corrupt);

        let store = StatsStore::load(&path).unwrap();
        assert_eq!(store.template("b/0").map(|t| t.count), Some(1));
        assert!(store.template("a/0").is_none());
    }

    #[test]
    fn test_writer_skips_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read
        let path = dir.path().join(STATS_FILE);
        std::fs::create_dir(&path).unwrap();

        assert_matches!(StatsStore::load_or_quarantine(&path), Err(StatsError::ReadFile(_)));

        let writer = StatsWriter::spawn(path.clone());
        writer.submit_on("b/0", outcome(10.0, 30.0, 100.0), date(2024, 5, 1));
        drop(writer);

        assert!(path.is_dir());
        assert!(!dir.path().join("stats.json.corrupt").exists());
    }
}
