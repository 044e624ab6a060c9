//! Log severity levels.
//!
//! A level is a totally ordered severity with a display name and a
//! `syslog(3)` equivalent code. Levels are compared by rank; two levels
//! with the same rank are the same level regardless of name.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

const TRACE_RANK: i32 = 5_000;
const DEBUG_RANK: i32 = 10_000;
const INFO_RANK: i32 = 20_000;
const WARN_RANK: i32 = 30_000;
const ERROR_RANK: i32 = 40_000;
const FATAL_RANK: i32 = 50_000;

// syslog(3) priority codes.
const LOG_EMERG: i32 = 0;
const LOG_ERR: i32 = 3;
const LOG_WARNING: i32 = 4;
const LOG_INFO: i32 = 6;
const LOG_DEBUG: i32 = 7;

/// A log severity level.
#[derive(Copy, Clone, Debug)]
pub struct Level {
    rank: i32,
    name: &'static str,
    syslog: i32,
}

impl Level {
    /// The lowest possible rank; enables everything.
    pub const ALL: Level = Level::new(i32::MIN, "ALL", LOG_DEBUG);
    /// Fine-grained tracing.
    pub const TRACE: Level = Level::new(TRACE_RANK, "TRACE", LOG_DEBUG);
    /// Debugging information.
    pub const DEBUG: Level = Level::new(DEBUG_RANK, "DEBUG", LOG_DEBUG);
    /// Informational messages.
    pub const INFO: Level = Level::new(INFO_RANK, "INFO", LOG_INFO);
    /// Potentially harmful situations.
    pub const WARN: Level = Level::new(WARN_RANK, "WARN", LOG_WARNING);
    /// Errors that allow the application to continue.
    pub const ERROR: Level = Level::new(ERROR_RANK, "ERROR", LOG_ERR);
    /// Severe errors that will presumably abort the application.
    pub const FATAL: Level = Level::new(FATAL_RANK, "FATAL", LOG_EMERG);
    /// The highest possible rank; disables everything.
    pub const OFF: Level = Level::new(i32::MAX, "OFF", LOG_EMERG);

    /// Creates a level with the given rank, display name and syslog code.
    ///
    /// The predefined levels cover the usual cases; custom levels slot in
    /// between them by rank.
    pub const fn new(rank: i32, name: &'static str, syslog: i32) -> Level {
        Level { rank, name, syslog }
    }

    /// Returns the integer rank of this level.
    pub fn rank(&self) -> i32 {
        self.rank
    }

    /// Returns the display name of this level.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the `syslog(3)` priority equivalent of this level.
    pub fn syslog_code(&self) -> i32 {
        self.syslog
    }

    /// Returns `true` if this level is at least as severe as `other`.
    pub fn is_greater_or_equal(&self, other: &Level) -> bool {
        self.rank >= other.rank
    }

    /// Looks up a predefined level by name, case-insensitively.
    pub fn by_name(name: &str) -> Option<Level> {
        const LEVELS: [Level; 8] = [
            Level::ALL,
            Level::TRACE,
            Level::DEBUG,
            Level::INFO,
            Level::WARN,
            Level::ERROR,
            Level::FATAL,
            Level::OFF,
        ];
        LEVELS
            .iter()
            .find(|level| level.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Converts a string to a level, returning `default` if the string
    /// does not name a predefined level.
    pub fn from_name(name: &str, default: Level) -> Level {
        Level::by_name(name).unwrap_or(default)
    }

    /// Looks up a predefined level by rank.
    pub fn by_rank(rank: i32) -> Option<Level> {
        match rank {
            i32::MIN => Some(Level::ALL),
            TRACE_RANK => Some(Level::TRACE),
            DEBUG_RANK => Some(Level::DEBUG),
            INFO_RANK => Some(Level::INFO),
            WARN_RANK => Some(Level::WARN),
            ERROR_RANK => Some(Level::ERROR),
            FATAL_RANK => Some(Level::FATAL),
            i32::MAX => Some(Level::OFF),
            _ => None,
        }
    }

    /// Converts an integer rank to a level, returning `default` if the
    /// rank does not match a predefined level.
    pub fn from_rank(rank: i32, default: Level) -> Level {
        Level::by_rank(rank).unwrap_or(default)
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Level) -> bool {
        self.rank == other.rank
    }
}

impl Eq for Level {}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Level) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Level) -> Ordering {
        self.rank.cmp(&other.rank)
    }
}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank.hash(state);
    }
}

impl fmt::Display for Level {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.name)
    }
}
