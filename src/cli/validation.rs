//! Value parsers for CLI arguments beyond what clap checks itself.

use std::fs;
use std::path::PathBuf;

use crate::schedule::Locale;

pub fn validate_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str.parse().map_err(|_| {
        format!("Port must be a valid number between 1 and 65535, got: '{port_str}'")
    })?;

    if port == 0 {
        return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
    }

    Ok(port)
}

/// The file must exist, be a regular file and be readable.
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{path_str}'"));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{path_str}'"));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read configuration file '{path_str}': {e}")),
    }
}

/// Accepts hostnames, `localhost` and dotted IPv4 addresses.
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.contains(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }
    if host.len() > 253 {
        return Err("Host address is too long (maximum 253 characters)".to_string());
    }

    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() != 4 || parts.iter().any(|part| part.parse::<u8>().is_err()) {
            return Err(format!("Invalid IPv4 address format: '{host_str}'"));
        }
    }

    Ok(host.to_string())
}

/// Only `en*` and `zh*` tags are accepted on the command line.
pub fn validate_locale(tag: &str) -> Result<Locale, String> {
    let language = tag.split(['_', '-']).next().unwrap_or_default();
    if language.eq_ignore_ascii_case("en") || language.eq_ignore_ascii_case("zh") {
        Ok(Locale::from_tag(tag))
    } else {
        Err(format!("Unsupported locale '{tag}'; use en or zh"))
    }
}
