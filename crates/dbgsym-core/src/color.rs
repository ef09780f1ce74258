//! # Colorized text
//!
//! [`ColorString`] is a sequence of styled text runs. It is the only colour
//! representation in the crate: the plain-text form is a projection
//! (concatenate the run text, drop the styles) and the terminal form is
//! produced on demand with ANSI SGR sequences through `crossterm`.
//!
//! Run text never holds control sequences. Text pushed into a run is cleaned
//! of escape sequences and C0 control characters (tab and newline excepted),
//! and text arriving with SGR sequences already embedded goes through
//! [`ColorString::from_ansi`], which turns them into run styles.
//!
//! ```rust
//! use crossterm::style::Color;
//! use dbgsym_core::color::{ColorString, RunStyle};
//!
//! let mut text = ColorString::new();
//! text.push("mov", RunStyle::fg(Color::Cyan).bold());
//! text.push_plain(" rax, rbx");
//! assert_eq!(text.to_plain_text(), "mov rax, rbx");
//! ```

use std::fmt;

use crossterm::style::{Attribute, Color, ContentStyle, StyledContent};
use smallvec::SmallVec;

const ESC: char = '\u{1b}';
const BEL: char = '\u{07}';

/// Colours addressed by SGR 30–37/90–97 and by 256-colour indices 0–15, in
/// index order.
const BASIC_COLORS: [Color; 16] = [
    Color::Black,
    Color::DarkRed,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::DarkBlue,
    Color::DarkMagenta,
    Color::DarkCyan,
    Color::Grey,
    Color::DarkGrey,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

/// Style of one text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunStyle
{
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
}

impl RunStyle
{
    /// No colour, no attributes.
    pub const PLAIN: Self = Self {
        foreground: None,
        background: None,
        bold: false,
    };

    /// Style with only a foreground colour.
    pub const fn fg(color: Color) -> Self
    {
        Self {
            foreground: Some(color),
            background: None,
            bold: false,
        }
    }

    #[must_use]
    pub const fn on(self, background: Color) -> Self
    {
        Self {
            background: Some(background),
            ..self
        }
    }

    #[must_use]
    pub const fn bold(self) -> Self
    {
        Self { bold: true, ..self }
    }

    #[must_use]
    pub const fn is_plain(&self) -> bool
    {
        self.foreground.is_none() && self.background.is_none() && !self.bold
    }

    fn content_style(self) -> ContentStyle
    {
        let mut style = ContentStyle::new();
        style.foreground_color = self.foreground;
        style.background_color = self.background;
        if self.bold {
            style.attributes.set(Attribute::Bold);
        }
        style
    }
}

/// A piece of text drawn in a single style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun
{
    text: String,
    style: RunStyle,
}

impl StyledRun
{
    #[must_use]
    pub fn text(&self) -> &str
    {
        &self.text
    }

    #[must_use]
    pub fn style(&self) -> RunStyle
    {
        self.style
    }
}

/// Text made of styled runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorString
{
    runs: SmallVec<[StyledRun; 4]>,
}

impl ColorString
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Single unstyled run.
    pub fn plain(text: &str) -> Self
    {
        let mut out = Self::new();
        out.push_plain(text);
        out
    }

    /// Single run in `style`.
    pub fn styled(text: &str, style: RunStyle) -> Self
    {
        let mut out = Self::new();
        out.push(text, style);
        out
    }

    /// Append `text` in `style`.
    ///
    /// Control sequences in `text` are removed; empty text is ignored and a run
    /// continuing the previous run's style is merged into it.
    pub fn push(&mut self, text: &str, style: RunStyle) -> &mut Self
    {
        let clean = strip_control(text);
        self.push_clean(clean, style);
        self
    }

    /// Append unstyled text.
    pub fn push_plain(&mut self, text: &str) -> &mut Self
    {
        self.push(text, RunStyle::PLAIN)
    }

    /// Append all runs of `other`.
    pub fn append(&mut self, other: &ColorString) -> &mut Self
    {
        for run in &other.runs {
            self.push_clean(run.text.clone(), run.style);
        }
        self
    }

    fn push_clean(&mut self, text: String, style: RunStyle)
    {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(&text),
            _ => self.runs.push(StyledRun { text, style }),
        }
    }

    #[must_use]
    pub fn runs(&self) -> &[StyledRun]
    {
        &self.runs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.runs.is_empty()
    }

    /// `true` when the plain text is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool
    {
        self.runs.iter().all(|run| run.text.trim().is_empty())
    }

    /// Number of characters a terminal would show.
    #[must_use]
    pub fn visible_len(&self) -> usize
    {
        self.runs.iter().map(|run| run.text.chars().count()).sum()
    }

    /// Text with all styling dropped.
    #[must_use]
    pub fn to_plain_text(&self) -> String
    {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Text with ANSI SGR sequences for each styled run.
    #[must_use]
    pub fn to_ansi(&self) -> String
    {
        let mut out = String::new();
        for run in &self.runs {
            if run.style.is_plain() {
                out.push_str(&run.text);
            } else {
                out.push_str(&StyledContent::new(run.style.content_style(), run.text.as_str()).to_string());
            }
        }
        out
    }

    /// Parse text containing ANSI escape sequences into runs.
    ///
    /// SGR sequences (`ESC [ … m`) set the style of the following text: reset,
    /// bold, the 16 basic foreground/background colours, 256-colour and RGB
    /// colours. Every other escape sequence is dropped.
    ///
    /// ```rust
    /// use crossterm::style::Color;
    /// use dbgsym_core::color::ColorString;
    ///
    /// let parsed = ColorString::from_ansi("\u{1b}[1;92mok\u{1b}[0m done");
    /// assert_eq!(parsed.to_plain_text(), "ok done");
    /// assert_eq!(parsed.runs()[0].style().foreground, Some(Color::Green));
    /// assert!(parsed.runs()[0].style().bold);
    /// ```
    pub fn from_ansi(text: &str) -> Self
    {
        let mut out = Self::new();
        let mut style = RunStyle::PLAIN;
        let mut pending = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c != ESC {
                if keep_char(c) {
                    pending.push(c);
                }
                continue;
            }
            if chars.peek() == Some(&'[') {
                chars.next();
                let mut params = String::new();
                let mut terminator = None;
                for next in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&next) {
                        terminator = Some(next);
                        break;
                    }
                    params.push(next);
                }
                if terminator == Some('m') {
                    out.push_clean(std::mem::take(&mut pending), style);
                    style = apply_sgr(style, &params);
                }
            } else {
                skip_escape(&mut chars);
            }
        }
        out.push_clean(pending, style);
        out
    }
}

impl fmt::Display for ColorString
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for run in &self.runs {
            f.write_str(&run.text)?;
        }
        Ok(())
    }
}

impl From<&str> for ColorString
{
    fn from(text: &str) -> Self
    {
        ColorString::plain(text)
    }
}

impl From<String> for ColorString
{
    fn from(text: String) -> Self
    {
        ColorString::plain(&text)
    }
}

fn keep_char(c: char) -> bool
{
    !c.is_control() || c == '\t' || c == '\n'
}

/// Remove escape sequences and control characters.
fn strip_control(text: &str) -> String
{
    if !text.chars().any(char::is_control) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&next) {
                        break;
                    }
                }
            } else {
                skip_escape(&mut chars);
            }
        } else if keep_char(c) {
            out.push(c);
        }
    }
    out
}

/// Skip a non-CSI escape: OSC strings up to BEL/ST, otherwise one character.
fn skip_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>)
{
    match chars.next() {
        Some(']') => {
            while let Some(next) = chars.next() {
                if next == BEL {
                    break;
                }
                if next == ESC && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        Some(_) | None => {}
    }
}

fn apply_sgr(mut style: RunStyle, params: &str) -> RunStyle
{
    let codes: Vec<u16> = if params.is_empty() {
        vec![0]
    } else {
        // Empty parameters mean 0; colon sub-parameter forms are skipped.
        params
            .split(';')
            .filter_map(|p| if p.is_empty() { Some(0) } else { p.parse().ok() })
            .collect()
    };

    let mut iter = codes.into_iter();
    while let Some(code) = iter.next() {
        match code {
            0 => style = RunStyle::PLAIN,
            1 => style.bold = true,
            22 => style.bold = false,
            30..=37 => style.foreground = Some(BASIC_COLORS[usize::from(code - 30)]),
            90..=97 => style.foreground = Some(BASIC_COLORS[usize::from(code - 90 + 8)]),
            39 => style.foreground = None,
            40..=47 => style.background = Some(BASIC_COLORS[usize::from(code - 40)]),
            100..=107 => style.background = Some(BASIC_COLORS[usize::from(code - 100 + 8)]),
            49 => style.background = None,
            38 => style.foreground = extended_color(&mut iter).or(style.foreground),
            48 => style.background = extended_color(&mut iter).or(style.background),
            _ => {}
        }
    }
    style
}

/// `5;n` (256-colour) or `2;r;g;b` (true colour) following a 38/48 code.
fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<Color>
{
    match iter.next()? {
        5 => {
            let index = u8::try_from(iter.next()?).ok()?;
            Some(BASIC_COLORS.get(usize::from(index)).copied().unwrap_or(Color::AnsiValue(index)))
        }
        2 => {
            let r = u8::try_from(iter.next()?).ok()?;
            let g = u8::try_from(iter.next()?).ok()?;
            let b = u8::try_from(iter.next()?).ok()?;
            Some(Color::Rgb { r, g, b })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_adjacent_runs_merge()
    {
        let mut text = ColorString::new();
        text.push("ab", RunStyle::fg(Color::Red));
        text.push("cd", RunStyle::fg(Color::Red));
        text.push_plain("ef");
        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.runs()[0].text(), "abcd");
    }

    #[test]
    fn test_push_strips_escape_sequences()
    {
        let mut text = ColorString::new();
        text.push("\u{1b}[31mred\u{1b}[0m\u{7}!", RunStyle::PLAIN);
        assert_eq!(text.to_plain_text(), "red!");
    }

    #[test]
    fn test_push_strips_osc_sequences()
    {
        let text = ColorString::plain("a\u{1b}]0;title\u{7}b\u{1b}]8;;x\u{1b}\\c");
        assert_eq!(text.to_plain_text(), "abc");
    }

    #[test]
    fn test_empty_push_is_ignored()
    {
        let mut text = ColorString::new();
        text.push("", RunStyle::fg(Color::Red));
        assert!(text.is_empty());
        assert!(text.is_blank());
    }

    #[test]
    fn test_blank_detection()
    {
        assert!(ColorString::styled("  \t", RunStyle::fg(Color::Blue)).is_blank());
        assert!(!ColorString::plain(" x ").is_blank());
    }

    #[test]
    fn test_from_ansi_basic_colors()
    {
        let parsed = ColorString::from_ansi("\u{1b}[31mred\u{1b}[39m \u{1b}[44;97mbox\u{1b}[m");
        let runs = parsed.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].style().foreground, Some(Color::DarkRed));
        assert_eq!(runs[1].text(), " ");
        assert!(runs[1].style().is_plain());
        assert_eq!(runs[2].style().foreground, Some(Color::White));
        assert_eq!(runs[2].style().background, Some(Color::DarkBlue));
    }

    #[test]
    fn test_from_ansi_extended_colors()
    {
        let parsed = ColorString::from_ansi("\u{1b}[38;5;9ma\u{1b}[38;5;200mb\u{1b}[48;2;1;2;3mc");
        let runs = parsed.runs();
        assert_eq!(runs[0].style().foreground, Some(Color::Red));
        assert_eq!(runs[1].style().foreground, Some(Color::AnsiValue(200)));
        assert_eq!(runs[2].style().background, Some(Color::Rgb { r: 1, g: 2, b: 3 }));
    }

    #[test]
    fn test_from_ansi_drops_other_sequences()
    {
        let parsed = ColorString::from_ansi("\u{1b}[2Kline\u{1b}[1A\r");
        assert_eq!(parsed.to_plain_text(), "line");
    }

    #[test]
    fn test_ansi_output_round_trips_text()
    {
        let mut text = ColorString::new();
        text.push("0x1000", RunStyle::fg(Color::DarkGrey));
        text.push_plain(" ");
        text.push("ret", RunStyle::fg(Color::Cyan).bold());

        let ansi = text.to_ansi();
        assert!(ansi.contains(ESC));
        assert_eq!(ColorString::from_ansi(&ansi).to_plain_text(), "0x1000 ret");
    }

    #[test]
    fn test_plain_text_is_display()
    {
        let text = ColorString::styled("hello", RunStyle::fg(Color::Green));
        assert_eq!(text.to_string(), text.to_plain_text());
        assert_eq!(text.visible_len(), 5);
    }

    #[test]
    fn test_unparseable_sgr_parameter_keeps_style()
    {
        let parsed = ColorString::from_ansi("\u{1b}[31mred\u{1b}[38:2::0:255:0mstill\u{1b}[0m");
        assert_eq!(parsed.runs().len(), 1);
        assert_eq!(parsed.runs()[0].text(), "redstill");
        assert_eq!(parsed.runs()[0].style().foreground, Some(Color::Red));
    }

    #[test]
    fn test_empty_sgr_parameter_resets()
    {
        let parsed = ColorString::from_ansi("\u{1b}[31mred\u{1b}[;1mbold");
        assert_eq!(parsed.runs()[1].style().foreground, None);
        assert!(parsed.runs()[1].style().bold);
    }
}
