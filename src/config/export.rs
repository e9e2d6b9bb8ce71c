//! Export pipeline configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Hard ceiling for `max_copies`.
pub const MAX_COPIES_LIMIT: u32 = 500;

/// Hard ceiling for `channel_capacity`.
pub const CHANNEL_CAPACITY_LIMIT: usize = 1024;

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Largest accepted `quantity` for batch exports
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,

    /// Chunks buffered between a batch export and the response body
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Header lines printed on every copy
    #[serde(default)]
    pub template: TemplateConfig,
}

/// Institutional lines of the printed template
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_university")]
    pub university: String,

    #[serde(default = "default_department")]
    pub department: String,

    #[serde(default = "default_course")]
    pub course: String,

    /// Blank date placeholder
    #[serde(default = "default_date_line")]
    pub date_line: String,
}

impl ExportConfig {
    /// Validate export configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_copies == 0 || self.max_copies > MAX_COPIES_LIMIT {
            return Err(ValidationError::InvalidMaxCopies(MAX_COPIES_LIMIT));
        }
        if self.channel_capacity == 0 || self.channel_capacity > CHANNEL_CAPACITY_LIMIT {
            return Err(ValidationError::InvalidChannelCapacity(
                CHANNEL_CAPACITY_LIMIT,
            ));
        }
        self.template.validate()
    }
}

impl TemplateConfig {
    /// Validate template lines
    pub fn validate(&self) -> Result<(), ValidationError> {
        let lines = [
            ("university", &self.university),
            ("department", &self.department),
            ("course", &self.course),
            ("date_line", &self.date_line),
        ];
        for (name, value) in lines {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyTemplateLine(name));
            }
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_copies: default_max_copies(),
            channel_capacity: default_channel_capacity(),
            template: TemplateConfig::default(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            university: default_university(),
            department: default_department(),
            course: default_course(),
            date_line: default_date_line(),
        }
    }
}

fn default_max_copies() -> u32 {
    50
}

fn default_channel_capacity() -> usize {
    8
}

fn default_university() -> String {
    "Universidade Federal de Pernambuco".to_string()
}

fn default_department() -> String {
    "Centro de Informática".to_string()
}

fn default_course() -> String {
    "Engenharia de Software e Sistemas".to_string()
}

fn default_date_line() -> String {
    "Data: ____/____/________".to_string()
}
