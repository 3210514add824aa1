//! Tracing initialisation for the step binary.
//!
//! CI logs are read top to bottom by people, so the default is the plain
//! formatter; `json` switches to newline-delimited JSON for log shipping.
//! Build output owns stdout, so every log line goes to stderr.

use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// When log lines carry ANSI colour codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Colour when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always colour; for CI log viewers that render ANSI.
    Always,
    Never,
}

impl ColorMode {
    /// Whether the plain formatter should emit ANSI codes.
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => no_color_unset() && std::io::stderr().is_terminal(),
        }
    }
}

fn no_color_unset() -> bool {
    std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. JSON lines never carry
/// colour codes. Only the first call in a process has an effect.
pub fn init_tracing(json: bool, color: ColorMode, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let layer = fmt::layer()
        .with_target(false)
        .with_ansi(!json && color.enabled())
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
