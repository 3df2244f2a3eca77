use std::io::{self, Write};

use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::error::{ChaparralError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(ChaparralError::Config(format!(
                "unknown output format {other:?}"
            ))),
        }
    }
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Partial { completed: usize, failed: usize },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

pub fn robot_partial<T: Serialize>(data: T, completed: usize, failed: usize) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Partial { completed, failed },
        ..robot_ok(data)
    }
}

/// Error payload printed on stdout in robot mode.
#[must_use]
pub fn robot_error(err: &ChaparralError) -> serde_json::Value {
    serde_json::json!({
        "error": true,
        "code": err.code(),
        "message": err.to_string(),
    })
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl HumanLayout {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 14,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        self.lines.push(format!(
            "{} {value}",
            style(format!("{key:width$}", width = self.key_width)).dim()
        ));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("  {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

pub fn emit_human(layout: HumanLayout) {
    if !layout.is_empty() {
        println!("{}", layout.build());
    }
}

/// Ask a yes/no question on stderr. Anything but `y`/`yes` declines.
pub fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
