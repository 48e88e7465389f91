use std::fmt::Display;

use colored::Colorize;
use supports_color::Stream;

/// Emphasizes a value in the run summary when stdout can show colors.
pub fn highlight(value: impl Display) -> String {
    let text = value.to_string();
    if supports_color::on(Stream::Stdout).is_some() {
        text.bold().green().to_string()
    } else {
        text
    }
}
