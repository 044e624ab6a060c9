//! The conversion pattern parser.
//!
//! Patterns are raw text interspersed with `%`-prefixed conversion
//! specifiers, each optionally carrying a format modifier:
//!
//! ```not_rust
//! conversion := '%' [ '-' ] [ min ] [ '.' max ] specifier [ '{' option '}' ]
//! ```
//!
//! The parser is a small state machine; it never fails outright, instead
//! reporting bad input to the internal diagnostic channel and falling
//! back to literal text, so a typo in a pattern cannot take logging down
//! with it.

use crate::internal;
use crate::layout::NEWLINE;

/// Padding and truncation applied to one converter's output.
#[derive(Copy, Clone, Debug)]
pub(crate) struct FormattingInfo {
    /// Minimum width; output shorter than this is padded with spaces.
    pub min: usize,
    /// Maximum width; output longer than this is truncated from the left.
    pub max: usize,
    /// Pad on the right (left-justify) instead of the left.
    pub left: bool,
}

impl Default for FormattingInfo {
    fn default() -> FormattingInfo {
        FormattingInfo {
            min: 0,
            max: usize::MAX,
            left: false,
        }
    }
}

/// One dynamic portion of a pattern.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Converter {
    /// Literal text, emitted as-is.
    Literal(String),
    /// `%c` - the logger name, keeping the rightmost `precision`
    /// dot-components (0 keeps all).
    Category { precision: usize },
    /// `%d{fmt}` - the event date in strftime syntax.
    Date { format: String },
    /// `%F` - the source file.
    File,
    /// `%L` - the source line.
    Line,
    /// `%M` - the function the call was made from.
    Function,
    /// `%l` - the full source location.
    Location,
    /// `%m` - the message.
    Message,
    /// `%p` - the level name.
    Level,
    /// `%r` - milliseconds since framework startup.
    RelativeTime,
    /// `%t` - the thread name.
    Thread,
    /// `%x` - the nested diagnostic context.
    Ndc,
    /// `%X{key}` - one mapped diagnostic context value.
    Mdc { key: String },
}

/// A converter plus its format modifier.
#[derive(Clone, Debug)]
pub(crate) struct Chunk {
    pub converter: Converter,
    pub fmt: FormattingInfo,
}

enum State {
    Literal,
    Converter,
    Dot,
    Min,
    Max,
}

pub(crate) struct Parser {
    chars: Vec<char>,
    i: usize,
    state: State,
    buffer: String,
    fmt: FormattingInfo,
    chunks: Vec<Chunk>,
}

impl Parser {
    pub fn new(pattern: &str) -> Parser {
        Parser {
            chars: pattern.chars().collect(),
            i: 0,
            state: State::Literal,
            buffer: String::new(),
            fmt: FormattingInfo::default(),
            chunks: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Vec<Chunk> {
        while self.i < self.chars.len() {
            let c = self.chars[self.i];
            self.i += 1;
            match self.state {
                State::Literal => self.literal(c),
                State::Converter => self.converter(c),
                State::Min => self.min(c),
                State::Dot => self.dot(c),
                State::Max => self.max(c),
            }
        }
        self.flush_literal();
        self.chunks
    }

    fn literal(&mut self, c: char) {
        if c != '%' {
            self.buffer.push(c);
            return;
        }
        match self.peek() {
            Some('%') => {
                self.buffer.push('%');
                self.i += 1;
            }
            Some('n') => {
                self.buffer.push_str(NEWLINE);
                self.i += 1;
            }
            Some(_) => {
                self.flush_literal();
                self.fmt = FormattingInfo::default();
                self.state = State::Converter;
            }
            // A trailing '%' is taken literally.
            None => self.buffer.push(c),
        }
    }

    fn converter(&mut self, c: char) {
        match c {
            '-' => self.fmt.left = true,
            '.' => self.state = State::Dot,
            '0'..='9' => {
                self.fmt.min = c as usize - '0' as usize;
                self.state = State::Min;
            }
            _ => self.finish_converter(c),
        }
    }

    fn min(&mut self, c: char) {
        match c {
            '0'..='9' => self.fmt.min = self.fmt.min * 10 + (c as usize - '0' as usize),
            '.' => self.state = State::Dot,
            _ => self.finish_converter(c),
        }
    }

    fn dot(&mut self, c: char) {
        match c {
            '0'..='9' => {
                self.fmt.max = c as usize - '0' as usize;
                self.state = State::Max;
            }
            _ => {
                internal::error(format_args!(
                    "error in conversion pattern: expected a digit, got `{}`",
                    c
                ));
                self.state = State::Literal;
            }
        }
    }

    fn max(&mut self, c: char) {
        match c {
            '0'..='9' => self.fmt.max = self.fmt.max * 10 + (c as usize - '0' as usize),
            _ => self.finish_converter(c),
        }
    }

    fn finish_converter(&mut self, c: char) {
        let converter = match c {
            'c' => Some(Converter::Category {
                precision: self.precision_option(),
            }),
            'd' => Some(Converter::Date {
                format: self
                    .brace_option()
                    .unwrap_or_else(|| super::DEFAULT_DATE_FORMAT.to_owned()),
            }),
            'F' => Some(Converter::File),
            'L' => Some(Converter::Line),
            'M' => Some(Converter::Function),
            'l' => Some(Converter::Location),
            'm' => Some(Converter::Message),
            'p' => Some(Converter::Level),
            'r' => Some(Converter::RelativeTime),
            't' => Some(Converter::Thread),
            'x' => Some(Converter::Ndc),
            'X' => match self.brace_option() {
                Some(key) => Some(Converter::Mdc { key }),
                None => {
                    internal::error(format_args!("%X conversion is missing its {{key}} option"));
                    None
                }
            },
            _ => {
                internal::error(format_args!(
                    "unexpected char `{}` in conversion pattern",
                    c
                ));
                None
            }
        };
        if let Some(converter) = converter {
            self.chunks.push(Chunk {
                converter,
                fmt: self.fmt,
            });
        }
        self.state = State::Literal;
    }

    fn flush_literal(&mut self) {
        if !self.buffer.is_empty() {
            self.chunks.push(Chunk {
                converter: Converter::Literal(std::mem::take(&mut self.buffer)),
                fmt: FormattingInfo::default(),
            });
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    /// Consumes a `{text}` option directly following the specifier.
    fn brace_option(&mut self) -> Option<String> {
        if self.peek() != Some('{') {
            return None;
        }
        let start = self.i + 1;
        let mut end = start;
        while end < self.chars.len() && self.chars[end] != '}' {
            end += 1;
        }
        if end == self.chars.len() {
            internal::error(format_args!("unterminated `{{` in conversion pattern"));
            self.i = end;
            return None;
        }
        self.i = end + 1;
        Some(self.chars[start..end].iter().collect())
    }

    fn precision_option(&mut self) -> usize {
        match self.brace_option() {
            Some(option) => match option.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    internal::error(format_args!(
                        "category precision option `{}` is not a positive integer",
                        option
                    ));
                    0
                }
            },
            None => 0,
        }
    }
}
