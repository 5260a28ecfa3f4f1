use colored::*;
use lazy_static::lazy_static;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

lazy_static! {
    static ref RENDERER: RwLock<Renderer> = RwLock::new(Renderer::default());
}

// Global debug state
static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

pub fn init(format: OutputFormat, color: bool) {
    if let Ok(mut r) = RENDERER.write() {
        r.format = format;
        r.color = color;
    }
}

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl Renderer {
    /// One output line for an event, or `None` when it cannot be encoded.
    fn render(
        &self,
        level: Level,
        code: &str,
        message: &str,
        data: Option<serde_json::Value>,
    ) -> Option<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string(&Event {
                level: level.as_str(),
                code,
                message,
                data,
            })
            .ok(),
            OutputFormat::Text if !self.color => Some(message.to_string()),
            OutputFormat::Text => Some(match level {
                Level::Info => message.normal().to_string(),
                Level::Success => message.green().bold().to_string(),
                Level::Warn => message.yellow().bold().to_string(),
                Level::Error => message.red().bold().to_string(),
                Level::Debug => message.cyan().to_string(),
            }),
        }
    }
}

pub fn emit(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
    if matches!(level, Level::Debug) && !is_debug_enabled() {
        return;
    }

    let renderer = match RENDERER.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    let Some(line) = renderer.render(level, code, message, data) else {
        return;
    };

    match level {
        Level::Error | Level::Warn => {
            let _ = writeln!(io::stderr(), "{line}");
        }
        _ => {
            let _ = writeln!(io::stdout(), "{line}");
        }
    }
}

pub mod prelude {
    pub use super::{Level, OutputFormat, emit};
}
