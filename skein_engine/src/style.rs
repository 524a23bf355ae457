//! Terminal styling for session output.
//!
//! One trait so every piece of player-facing text is styled by role rather
//! than ad hoc color calls scattered through the rendering code.

use colored::{ColoredString, Colorize};

pub trait GameStyle {
    /// Narrative frame text.
    fn frame_text(&self) -> ColoredString;
    /// The number in front of an offered option.
    fn option_number(&self) -> ColoredString;
    /// An offered option's label.
    fn option_label(&self) -> ColoredString;
    /// Out-of-band messages (bad choice input and the like).
    fn alert(&self) -> ColoredString;
    /// Session banner.
    fn banner(&self) -> ColoredString;
}

impl GameStyle for str {
    fn frame_text(&self) -> ColoredString {
        self.normal()
    }

    fn option_number(&self) -> ColoredString {
        self.bright_yellow().bold()
    }

    fn option_label(&self) -> ColoredString {
        self.cyan()
    }

    fn alert(&self) -> ColoredString {
        self.red()
    }

    fn banner(&self) -> ColoredString {
        self.bright_white().bold()
    }
}
