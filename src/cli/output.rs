//! Terminal output formatting with colors
//!
//! Colors are used on a real terminal only and respect NO_COLOR, CLICOLOR
//! and CLICOLOR_FORCE. Headless output is always plain.

use std::fmt::Display;
use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::infrastructure::io::Io;

fn paint(io: &Io, text: &str, style: fn(&str) -> ColoredString) -> String {
    if io.is_headless() {
        text.to_string()
    } else {
        style(text).to_string()
    }
}

/// Print error (red bold "error:" prefix) to stderr
pub fn error(io: &Io, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    let label = paint(io, "error", |s| s.red().bold());
    writeln!(io.stderr(), "{}: {}", label, msg)
}

/// Print plain output (no color) to stderr
pub fn info(io: &Io, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(io.stderr(), "{}", msg)
}
