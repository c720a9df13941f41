use std::path::{Path, PathBuf};

use derive_more::From;
use rand::Rng;
use rote::{FollowUp, OptionSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CATEGORY: u32 = 1;
pub const MAX_TEMPLATE_LENGTH: usize = 8000;
pub const MAX_TITLE_LENGTH: usize = 255;

/// Spaces replacing each tab in a template
pub const TAB_WIDTH: usize = 4;

const SAMPLES_FILE: &str = "samples.toml";
const SAMPLES: &str = include_str!("library/samples.toml");

#[derive(Debug, From, Error)]
pub enum TemplateError {
    #[error("Failed to read templates directory '{directory}': {error}")]
    #[from(skip)]
    ReadDirectory {
        directory: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to read file: {0}")]
    ReadFile(std::io::Error),

    #[error("Failed to write sample templates: {0}")]
    #[from(skip)]
    WriteSamples(std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseFile(toml::de::Error),

    #[error("Template '{title}' in '{file}' is empty")]
    #[from(skip)]
    Empty { file: String, title: String },

    #[error("Template '{title}' in '{file}' is too long: the {field} has {length} characters, the limit is {limit}")]
    #[from(skip)]
    TooLong {
        file: String,
        title: String,
        field: &'static str,
        length: usize,
        limit: usize,
    },
}

const fn default_category() -> u32 {
    DEFAULT_CATEGORY
}

/// A code snippet to practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// `<file stem>/<position in file>`, used to key statistics
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub template: String,
    #[serde(default = "default_category")]
    pub category: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<Template>,
}

/// Loads every `*.toml` file in `from_dir`, in file name order.
///
/// An empty or missing directory gets a `samples.toml` with the built-in templates first.
pub fn load_templates(from_dir: &Path) -> Result<Vec<Template>, TemplateError> {
    if !from_dir.exists() {
        std::fs::create_dir_all(from_dir)?;
    }

    let files = from_dir
        .read_dir()
        .map_err(|error| TemplateError::ReadDirectory {
            directory: from_dir.to_path_buf(),
            error,
        })?;

    let mut paths = Vec::new();
    for entry in files {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        let samples = from_dir.join(SAMPLES_FILE);
        tracing::info!(path = %samples.display(), "no templates found, writing samples");
        std::fs::write(&samples, SAMPLES).map_err(TemplateError::WriteSamples)?;
        paths.push(samples);
    }

    paths.sort();

    let mut templates = Vec::new();
    for path in paths {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(&path)?;
        let file: TemplateFile = toml::from_str(&content)?;

        for (position, mut template) in file.templates.into_iter().enumerate() {
            template.template = normalize(&template.template);
            validate(&stem, &template)?;
            template.id = format!("{stem}/{position}");
            templates.push(template);
        }

        tracing::debug!(file = %path.display(), "templates loaded");
    }

    Ok(templates)
}

/// Makes a template typeable: tabs become [`TAB_WIDTH`] spaces, trailing whitespace is trimmed
/// and blank lines are dropped.
pub fn normalize(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate(file: &str, template: &Template) -> Result<(), TemplateError> {
    let too_long = |field, length, limit| TemplateError::TooLong {
        file: file.to_string(),
        title: template.title.clone(),
        field,
        length,
        limit,
    };

    let title_length = template.title.chars().count();
    if title_length > MAX_TITLE_LENGTH {
        return Err(too_long("title", title_length, MAX_TITLE_LENGTH));
    }

    let template_length = template.template.chars().count();
    if template_length > MAX_TEMPLATE_LENGTH {
        return Err(too_long("template", template_length, MAX_TEMPLATE_LENGTH));
    }

    if template.template.is_empty() {
        return Err(TemplateError::Empty {
            file: file.to_string(),
            title: template.title.clone(),
        });
    }

    Ok(())
}

/// The templates of one category and which of them is selected
#[derive(Debug, Clone)]
pub struct Library {
    templates: Vec<Template>,
    category: u32,
    index: usize,
}

impl Library {
    pub fn new(templates: Vec<Template>, category: u32) -> Self {
        Self {
            templates,
            category,
            index: 0,
        }
    }

    /// Every category with at least one template, ascending
    pub fn categories(&self) -> Vec<u32> {
        let mut categories: Vec<u32> = self.templates.iter().map(|t| t.category).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub const fn category(&self) -> u32 {
        self.category
    }

    pub fn set_category(&mut self, category: u32) {
        self.category = category;
        self.index = 0;
    }

    /// Switches to the next category that has templates, wrapping around
    pub fn cycle_category(&mut self) {
        let categories = self.categories();
        let next = categories
            .iter()
            .find(|category| **category > self.category)
            .or_else(|| categories.first())
            .copied();

        if let Some(category) = next {
            self.set_category(category);
        }
    }

    /// Templates in the current category
    pub fn visible(&self) -> impl Iterator<Item = &Template> {
        self.templates
            .iter()
            .filter(move |template| template.category == self.category)
    }

    pub fn len(&self) -> usize {
        self.visible().count()
    }

    pub fn is_empty(&self) -> bool {
        self.visible().next().is_none()
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Template> {
        self.visible().nth(self.index)
    }

    /// Moves to the next template, wrapping around
    pub fn next(&mut self) -> Option<&Template> {
        let len = self.len();
        if len > 0 {
            self.index = (self.index + 1) % len;
        }
        self.current()
    }

    /// Moves to the previous template, wrapping around
    pub fn previous(&mut self) -> Option<&Template> {
        let len = self.len();
        if len > 0 {
            self.index = if self.index == 0 { len - 1 } else { self.index - 1 };
        }
        self.current()
    }

    /// Moves to a random template other than the current one, if there is one
    pub fn random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Template> {
        let len = self.len();
        if len > 1 {
            let pick = rng.gen_range(0..len - 1);
            self.index = if pick >= self.index { pick + 1 } else { pick };
        }
        self.current()
    }

    /// Moves to whatever should be practiced after a completed session
    pub fn follow_up<R: Rng + ?Sized>(
        &mut self,
        options: OptionSet,
        rng: &mut R,
    ) -> Option<&Template> {
        match options.follow_up() {
            FollowUp::Repeat => self.current(),
            FollowUp::Randomize => self.random(rng),
            FollowUp::Next => self.next(),
        }
    }
}
