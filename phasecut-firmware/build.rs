//! Build script for phasecut-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates dimmer.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys every dimmer section must define
const REQUIRED_KEYS: &[&str] = &["gate_pin", "diac_drain_pin", "zero_cross_pin"];

const METHODS: &[&str] = &["LEADING_PULSE", "LEADING", "TRAILING"];
const EDGES: &[&str] = &["FALLING", "RISING", "ANY", "CHANGE"];
const BOOL_KEYS: &[&str] = &["init_with_half_cycle", "zero_means_zero", "inverted"];

/// Longest dimmer name the firmware label holds
const MAX_NAME_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate dimmer.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=dimmer.toml");

    let config_path = Path::new("dimmer.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: dimmer.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a dimmer.toml configuration file.         ║\n\
            ║  Please create one in the phasecut-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read dimmer.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in dimmer.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = validate_dimmer(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid dimmer configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=dimmer.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Locate the single dimmer section and check its contents
///
/// Accepts `[ac_dimmer]` or exactly one `[ac_dimmer.<name>]` table.
fn validate_dimmer(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let section = match config.get("ac_dimmer") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[ac_dimmer] must be a table".to_string());
            return errors;
        }
        None => {
            errors.push("Missing [ac_dimmer] section".to_string());
            return errors;
        }
    };

    let (label, table) = if section.contains_key("gate_pin") {
        ("ac_dimmer".to_string(), section)
    } else {
        let mut named = section.iter();
        match (named.next(), named.next()) {
            (Some((name, toml::Value::Table(t))), None) => {
                if !is_dimmer_name(name) {
                    errors.push(format!(
                        "[ac_dimmer.{}] name must be 1-{} of a-z, 0-9, '_' or '-'",
                        name, MAX_NAME_LEN
                    ));
                    return errors;
                }
                (format!("ac_dimmer.{}", name), t)
            }
            (Some(_), None) => {
                errors.push("[ac_dimmer.<name>] must be a table".to_string());
                return errors;
            }
            (None, _) => {
                errors.push("[ac_dimmer] is empty".to_string());
                return errors;
            }
            (Some(_), Some(_)) => {
                errors.push("Only one [ac_dimmer.<name>] section is supported".to_string());
                return errors;
            }
        }
    };

    for key in REQUIRED_KEYS {
        if table.get(*key).is_none() {
            errors.push(format!("[{}] missing '{}'", label, key));
        }
    }

    let mut pins = Vec::new();
    for key in REQUIRED_KEYS {
        if let Some(value) = table.get(*key) {
            match value.as_str().and_then(pin_number) {
                Some(pin) if pin <= 29 => {
                    if pins.contains(&pin) {
                        errors.push(format!("[{}] gpio{} assigned twice", label, pin));
                    }
                    pins.push(pin);
                }
                Some(pin) => errors.push(format!("[{}] {} gpio{} out of range", label, key, pin)),
                None => errors.push(format!("[{}] {} must look like \"gpio15\"", label, key)),
            }
        }
    }

    if let Some(value) = table.get("method") {
        check_enum(&mut errors, &label, "method", value, METHODS);
    }
    for key in ["interrupt_method", "interrupt_edge"] {
        if let Some(value) = table.get(key) {
            check_enum(&mut errors, &label, key, value, EDGES);
        }
    }

    for key in BOOL_KEYS {
        if let Some(value) = table.get(*key) {
            if !value.is_bool() {
                errors.push(format!("[{}] {} must be true or false", label, key));
            }
        }
    }

    let min_power = power_value(&mut errors, &label, table, "min_power").unwrap_or(0.1);
    let max_power = power_value(&mut errors, &label, table, "max_power").unwrap_or(1.0);
    power_value(&mut errors, &label, table, "initial_power");
    if min_power > max_power {
        errors.push(format!("[{}] min_power must not exceed max_power", label));
    }

    for key in ["mains_frequency", "mains_frequency_hz"] {
        if let Some(value) = table.get(key) {
            match value.as_integer() {
                Some(hz) if (45..=65).contains(&hz) => {}
                _ => errors.push(format!("[{}] {} must be 45-65", label, key)),
            }
        }
    }

    errors
}

/// Dimmer names are unquoted TOML keys that fit the firmware label
fn is_dimmer_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Pin number from "gpioNN" with optional `!`/`^` modifiers
fn pin_number(value: &str) -> Option<u8> {
    value
        .trim_start_matches(['!', '^'])
        .strip_prefix("gpio")?
        .parse()
        .ok()
}

fn check_enum(errors: &mut Vec<String>, label: &str, key: &str, value: &toml::Value, allowed: &[&str]) {
    let normalized = value
        .as_str()
        .map(|s| s.trim().to_ascii_uppercase().replace(' ', "_"));
    match normalized {
        Some(v) if allowed.contains(&v.as_str()) => {}
        _ => errors.push(format!(
            "[{}] {} must be one of {}",
            label,
            key,
            allowed.join(", ").to_ascii_lowercase()
        )),
    }
}

/// Read a power value (float, integer or "NN%") and check it is in 0-1
fn power_value(
    errors: &mut Vec<String>,
    label: &str,
    table: &toml::map::Map<String, toml::Value>,
    key: &str,
) -> Option<f64> {
    let value = table.get(key)?;
    let power = match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::String(s) => s
            .trim()
            .strip_suffix('%')
            .and_then(|p| p.trim().parse::<f64>().ok())
            .map(|p| p / 100.0),
        _ => None,
    };

    match power {
        Some(p) if (0.0..=1.0).contains(&p) => Some(p),
        _ => {
            errors.push(format!("[{}] {} must be 0.0-1.0 or \"0%\"-\"100%\"", label, key));
            None
        }
    }
}
