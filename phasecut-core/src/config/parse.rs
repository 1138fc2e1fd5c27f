//! Simple TOML parser for dimmer configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the dimmer configuration. It does NOT support the full TOML spec and
//! does not allocate.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - One `[ac_dimmer]` or `[ac_dimmer.name]` section
//! - Comments (# ...), including after a section header or value
//!
//! `gate_pin`, `diac_drain_pin` and `zero_cross_pin` must be present.
//!
//! Enum values are case-insensitive and spaces are treated as underscores,
//! so `"leading pulse"`, `"LEADING_PULSE"` and `leading_pulse` are equal.

use heapless::String as HString;

use super::hardware::PinConfig;
use super::types::{DimMethod, DimmerConfig, InterruptEdge, MAX_LABEL_LEN};

/// Longest enum value accepted after normalisation
const MAX_ENUM_LEN: usize = 16;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or duplicated section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// No `[ac_dimmer]` section in the input
    MissingSection,
    /// A required pin key is absent
    MissingKey(RequiredKey),
}

/// Keys every dimmer section must define
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequiredKey {
    GatePin,
    DiacDrainPin,
    ZeroCrossPin,
}

/// Required keys seen so far
#[derive(Debug, Clone, Copy, Default)]
struct SeenPins {
    gate: bool,
    drain: bool,
    zero_cross: bool,
}

impl SeenPins {
    fn mark(&mut self, key: &str) {
        match key {
            "gate_pin" => self.gate = true,
            "diac_drain_pin" => self.drain = true,
            "zero_cross_pin" => self.zero_cross = true,
            _ => {}
        }
    }

    fn check(&self) -> Result<(), ParseError> {
        if !self.gate {
            return Err(ParseError::MissingKey(RequiredKey::GatePin));
        }
        if !self.drain {
            return Err(ParseError::MissingKey(RequiredKey::DiacDrainPin));
        }
        if !self.zero_cross {
            return Err(ParseError::MissingKey(RequiredKey::ZeroCrossPin));
        }
        Ok(())
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Dimmer,
}

/// Parse TOML configuration into a `DimmerConfig`
///
/// Keys that are not recognised are ignored. Optional keys missing from
/// the file keep their `DimmerConfig::default()` value; a missing pin key is
/// an error.
pub fn parse_config(input: &str) -> Result<DimmerConfig, ParseError> {
    let mut config = DimmerConfig::default();
    let mut section = Section::Root;
    let mut seen_dimmer = false;
    let mut seen_pins = SeenPins::default();

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            if seen_dimmer {
                return Err(ParseError::InvalidSection);
            }
            if let Some(name) = parse_section_header(&line[1..line.len() - 1])? {
                config.name = name;
            }
            section = Section::Dimmer;
            seen_dimmer = true;
            continue;
        }

        if section == Section::Root {
            // Root-level keys are not used
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(key, value, &mut config)?;
            seen_pins.mark(key);
        }
    }

    if !seen_dimmer {
        return Err(ParseError::MissingSection);
    }
    seen_pins.check()?;

    Ok(config)
}

/// Cut a `#` comment that is not inside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse a section header like "ac_dimmer" or "ac_dimmer.hall"
///
/// Returns the dimmer name when one is given.
fn parse_section_header(header: &str) -> Result<Option<HString<MAX_LABEL_LEN>>, ParseError> {
    let header = header.trim();

    let (section_type, name) = match header.split_once('.') {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => (header, None),
    };

    if section_type != "ac_dimmer" {
        return Err(ParseError::InvalidSection);
    }

    let bare_key = |n: &str| {
        n.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    };

    match name {
        Some(n) if !n.is_empty() && bare_key(n) => HString::try_from(n)
            .map(Some)
            .map_err(|_| ParseError::InvalidSection),
        Some(_) => Err(ParseError::InvalidSection),
        None => Ok(None),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a float value, accepting a trailing `%`
fn parse_power(value: &str) -> Result<f32, ParseError> {
    let value = parse_string(value);
    let (digits, scale) = match value.strip_suffix('%') {
        Some(d) => (d.trim(), 0.01),
        None => (value, 1.0),
    };
    let v: f32 = digits.parse().map_err(|_| ParseError::InvalidValue)?;
    if v.is_nan() {
        return Err(ParseError::InvalidValue);
    }
    Ok(v * scale)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    // Check for modifiers
    while !s.is_empty() {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    // Parse "gpioNN"
    let digits = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = digits.parse().map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

/// Upper-case an enum value and turn spaces into underscores
fn normalize_enum(value: &str) -> Result<HString<MAX_ENUM_LEN>, ParseError> {
    let mut out = HString::new();
    for c in parse_string(value).trim().chars() {
        let c = if c == ' ' { '_' } else { c.to_ascii_uppercase() };
        out.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    Ok(out)
}

/// Parse dimming method
fn parse_method(value: &str) -> Result<DimMethod, ParseError> {
    match normalize_enum(value)?.as_str() {
        "LEADING_PULSE" => Ok(DimMethod::LeadingPulse),
        "LEADING" => Ok(DimMethod::Leading),
        "TRAILING" => Ok(DimMethod::Trailing),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse zero-cross interrupt edge
fn parse_edge(value: &str) -> Result<InterruptEdge, ParseError> {
    match normalize_enum(value)?.as_str() {
        "FALLING" => Ok(InterruptEdge::Falling),
        "RISING" => Ok(InterruptEdge::Rising),
        "ANY" => Ok(InterruptEdge::Any),
        "CHANGE" => Ok(InterruptEdge::Change),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply a key-value pair to the dimmer being built
fn apply_value(key: &str, value: &str, config: &mut DimmerConfig) -> Result<(), ParseError> {
    match key {
        "gate_pin" => config.gate_pin = parse_pin(value)?,
        "diac_drain_pin" => config.diac_drain_pin = parse_pin(value)?,
        "zero_cross_pin" => config.zero_cross_pin = parse_pin(value)?,
        "init_with_half_cycle" => config.init_with_half_cycle = parse_bool(value)?,
        "method" => config.method = parse_method(value)?,
        "interrupt_method" | "interrupt_edge" => config.interrupt_edge = parse_edge(value)?,
        "zero_means_zero" => config.zero_means_zero = parse_bool(value)?,
        "inverted" => config.inverted = parse_bool(value)?,
        "min_power" => config.min_power = parse_power(value)?,
        "max_power" => config.max_power = parse_power(value)?,
        "initial_power" => config.initial_power = parse_power(value)?,
        "mains_frequency" | "mains_frequency_hz" => {
            config.mains_frequency_hz = parse_int(parse_string(value))?
        }
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("!gpio12").unwrap();
        assert_eq!(pin.pin, 12);
        assert!(pin.inverted);

        let pin = parse_pin("\"^!gpio5\"").unwrap();
        assert_eq!(pin.pin, 5);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert_eq!(parse_pin("pin5"), Err(ParseError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ParseError::InvalidPin));
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("ac_dimmer").unwrap(), None);
        assert_eq!(
            parse_section_header("ac_dimmer.porch").unwrap().unwrap().as_str(),
            "porch"
        );
        assert_eq!(
            parse_section_header("ac_dimmer hall"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(
            parse_section_header("ac_dimmer.a.b"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(
            parse_section_header("light.hall"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_enum_normalisation() {
        assert_eq!(parse_method("\"leading pulse\""), Ok(DimMethod::LeadingPulse));
        assert_eq!(parse_method("LEADING_PULSE"), Ok(DimMethod::LeadingPulse));
        assert_eq!(parse_method("Trailing"), Ok(DimMethod::Trailing));
        assert_eq!(parse_method("sine"), Err(ParseError::InvalidValue));

        assert_eq!(parse_edge("\"change\""), Ok(InterruptEdge::Change));
        assert_eq!(parse_edge("rising"), Ok(InterruptEdge::Rising));
    }

    #[test]
    fn test_parse_power() {
        assert_eq!(parse_power("0.25"), Ok(0.25));
        assert_eq!(parse_power("\"15%\""), Ok(15.0 * 0.01));
        assert_eq!(parse_power("nan"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Hallway light
[ac_dimmer.hall]  # triac board behind the switch
gate_pin = "gpio14"
diac_drain_pin = "!gpio15"
zero_cross_pin = "^gpio16"   # optocoupler output
init_with_half_cycle = false
method = "leading"
interrupt_method = "rising"
zero_means_zero = true
inverted = true
min_power = 0.2
max_power = 0.9
mains_frequency = 60
initial_power = "50%"
unknown_key = 3
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.name.as_str(), "hall");
        assert_eq!(config.gate_pin.pin, 14);
        assert!(config.diac_drain_pin.inverted);
        assert!(config.zero_cross_pin.pull_up);
        assert!(!config.init_with_half_cycle);
        assert_eq!(config.method, DimMethod::Leading);
        assert_eq!(config.interrupt_edge, InterruptEdge::Rising);
        assert!(config.zero_means_zero);
        assert!(config.inverted);
        assert_eq!(config.min_power, 0.2);
        assert_eq!(config.max_power, 0.9);
        assert_eq!(config.mains_frequency_hz, 60);
        assert_eq!(config.initial_power, 50.0 * 0.01);
        assert_eq!(config.validate(), Ok(()));
    }

    const PINS_ONLY: &str = "[ac_dimmer]\n\
        gate_pin = \"gpio3\"\n\
        diac_drain_pin = \"gpio4\"\n\
        zero_cross_pin = \"gpio5\"\n";

    #[test]
    fn test_defaults_for_optional_keys() {
        let config = parse_config(PINS_ONLY).unwrap();
        assert_eq!(config.gate_pin.pin, 3);
        assert_eq!(config.diac_drain_pin.pin, 4);
        assert_eq!(config.zero_cross_pin.pin, 5);
        assert_eq!(config.name.as_str(), "dimmer");
        assert_eq!(config.method, DimMethod::LeadingPulse);
        assert_eq!(config.interrupt_edge, InterruptEdge::Any);
        assert!(config.init_with_half_cycle);
        assert!(!config.inverted);
    }

    #[test]
    fn test_missing_pins_rejected() {
        assert_eq!(
            parse_config("[ac_dimmer]\nmethod = \"trailing\"\n"),
            Err(ParseError::MissingKey(RequiredKey::GatePin))
        );
        assert_eq!(
            parse_config("[ac_dimmer]\ngate_pin = \"gpio3\"\nzero_cross_pin = \"gpio5\"\n"),
            Err(ParseError::MissingKey(RequiredKey::DiacDrainPin))
        );
        assert_eq!(
            parse_config("[ac_dimmer]\ngate_pin = \"gpio3\"\ndiac_drain_pin = \"gpio4\"\n"),
            Err(ParseError::MissingKey(RequiredKey::ZeroCrossPin))
        );
    }

    #[test]
    fn test_header_with_comment() {
        let config_str = "[ac_dimmer] # lamp\n\
            gate_pin = \"gpio3\" # gate\n\
            diac_drain_pin = \"gpio4\"\n\
            zero_cross_pin = \"gpio5\"\n";
        let config = parse_config(config_str).unwrap();
        assert_eq!(config.gate_pin.pin, 3);
        assert_eq!(config.name.as_str(), "dimmer");
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("key = 1 # note"), "key = 1 ");
        assert_eq!(strip_comment("key = \"a#b\""), "key = \"a#b\"");
        assert_eq!(strip_comment("# whole line"), "");
    }

    #[test]
    fn test_missing_section() {
        assert_eq!(
            parse_config("gate_pin = \"gpio3\"\n"),
            Err(ParseError::MissingSection)
        );
    }

    #[test]
    fn test_second_section_rejected() {
        let config_str = "[ac_dimmer.a]\n[ac_dimmer.b]\n";
        assert_eq!(parse_config(config_str), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_invalid_bool() {
        let config_str = "[ac_dimmer]\nzero_means_zero = yes\n";
        assert_eq!(parse_config(config_str), Err(ParseError::InvalidValue));
    }
}
