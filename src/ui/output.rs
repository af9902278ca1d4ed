//! ui::output
//!
//! Status reporting for the commands.
//!
//! # Design
//!
//! Every message goes through a [`Channel`], which fixes its stream, its
//! prefix and the lowest [`Verbosity`] that shows it. Document echoes
//! (`--stdout`) bypass verbosity, since the caller asked for them.
//! Write failures (a closed pipe, say) are ignored.

use std::fmt::Display;
use std::io::{self, Write};

/// How much the commands report, from least to most.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors and requested documents only
    Quiet,
    /// Status lines and warnings
    #[default]
    Normal,
    /// Status lines plus per-step detail
    Debug,
}

/// Kind of message, deciding where and when it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Status,
    Detail,
    Warning,
    Error,
}

impl Channel {
    fn threshold(self) -> Verbosity {
        match self {
            Channel::Error => Verbosity::Quiet,
            Channel::Status | Channel::Warning => Verbosity::Normal,
            Channel::Detail => Verbosity::Debug,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Channel::Status => "",
            Channel::Detail => "[debug] ",
            Channel::Warning => "warning: ",
            Channel::Error => "error: ",
        }
    }
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::default(),
        }
    }

    pub fn shows(self, channel: Channel) -> bool {
        self >= channel.threshold()
    }

    /// Emit `message` on `channel` if this verbosity shows it.
    pub fn emit(self, channel: Channel, message: impl Display) {
        if !self.shows(channel) {
            return;
        }
        let line = format!("{}{}", channel.prefix(), message);
        let _ = match channel {
            Channel::Status => writeln!(io::stdout().lock(), "{line}"),
            _ => writeln!(io::stderr().lock(), "{line}"),
        };
    }

    /// Status line on stdout.
    pub fn status(self, message: impl Display) {
        self.emit(Channel::Status, message);
    }

    /// Per-step detail on stderr, debug mode only.
    pub fn detail(self, message: impl Display) {
        self.emit(Channel::Detail, message);
    }

    pub fn warn(self, message: impl Display) {
        self.emit(Channel::Warning, message);
    }
}

/// Report a failure; shown at every verbosity.
pub fn error(message: impl Display) {
    Verbosity::Quiet.emit(Channel::Error, message);
}

/// Write a serialized document to stdout.
pub fn document(xml: &str) {
    let _ = io::stdout().lock().write_all(xml.as_bytes());
}

/// One line per item, each starting with `prefix`.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items.iter().fold(String::new(), |mut out, item| {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(&item.to_string());
        out
    })
}
