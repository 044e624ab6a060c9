//! String-to-typed property coercions.
//!
//! Configuration documents carry every value as a string; components
//! coerce them with these helpers so that error reporting stays uniform
//! across the crate.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::level::Level;

fn parse<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|err| ConfigError::invalid_value(name, value, format!("{}", err)))
}

/// Coerces `true`/`false`, case-insensitively.
pub fn to_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::invalid_value(
            name,
            value,
            "expected `true` or `false`",
        ))
    }
}

/// Coerces a base-10 signed integer.
pub fn to_i64(name: &str, value: &str) -> Result<i64, ConfigError> {
    parse(name, value)
}

/// Coerces a base-10 signed 32-bit integer.
pub fn to_i32(name: &str, value: &str) -> Result<i32, ConfigError> {
    parse(name, value)
}

/// Coerces a base-10 unsigned integer.
pub fn to_u64(name: &str, value: &str) -> Result<u64, ConfigError> {
    parse(name, value)
}

/// Coerces a base-10 unsigned 32-bit integer.
pub fn to_u32(name: &str, value: &str) -> Result<u32, ConfigError> {
    parse(name, value)
}

/// Coerces a base-10 size.
pub fn to_usize(name: &str, value: &str) -> Result<usize, ConfigError> {
    parse(name, value)
}

/// Coerces a floating point number.
pub fn to_f64(name: &str, value: &str) -> Result<f64, ConfigError> {
    parse(name, value)
}

/// Coerces a single character.
pub fn to_char(name: &str, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(ConfigError::invalid_value(
            name,
            value,
            "expected a single character",
        )),
    }
}

/// Coerces a level name, case-insensitively.
pub fn to_level(name: &str, value: &str) -> Result<Level, ConfigError> {
    Level::by_name(value)
        .ok_or_else(|| ConfigError::invalid_value(name, value, "not a level name"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bools() {
        assert!(to_bool("p", "TRUE").unwrap());
        assert!(!to_bool("p", "false").unwrap());
        assert!(to_bool("p", "yes").is_err());
    }

    #[test]
    fn numbers() {
        assert_eq!(to_u64("p", "1024").unwrap(), 1024);
        assert_eq!(to_i64("p", "-3").unwrap(), -3);
        assert!(to_u32("p", "-1").is_err());
        assert_eq!(to_f64("p", "2.5").unwrap(), 2.5);
    }

    #[test]
    fn chars_and_levels() {
        assert_eq!(to_char("p", "x").unwrap(), 'x');
        assert!(to_char("p", "xy").is_err());
        assert_eq!(to_level("p", "warn").unwrap(), Level::WARN);
        assert!(to_level("p", "loud").is_err());
    }
}
