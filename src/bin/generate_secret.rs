//! Prints a random key for `SESSION_SIGNING_KEY`.
//!
//! Usage: `generate_secret [length in bytes]` (64 to 4096, defaults to 64)
use std::process::ExitCode;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};

const MIN_LENGTH: usize = 64;
const MAX_LENGTH: usize = 4096;

fn parse_length(argument: Option<&str>) -> Result<usize, String> {
    let Some(argument) = argument else {
        return Ok(MIN_LENGTH);
    };

    let length: usize = argument
        .parse()
        .map_err(|error| format!("Expected key length in bytes but got {argument:?}: {error}"))?;

    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(format!(
            "Key length must be between {MIN_LENGTH} and {MAX_LENGTH} bytes but got {length}"
        ));
    }

    Ok(length)
}

fn main() -> ExitCode {
    let argument = std::env::args().nth(1);
    let length = match parse_length(argument.as_deref()) {
        Ok(length) => length,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let mut key = vec![0u8; length];
    if let Err(error) = getrandom::getrandom(&mut key) {
        eprintln!("Error generating key: {error}");
        return ExitCode::FAILURE;
    }

    println!("{}", BASE64_URL_SAFE_NO_PAD.encode(&key));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_shortest_session_key() {
        assert_eq!(parse_length(None), Ok(64));
    }

    #[test]
    fn accepts_lengths_in_range() {
        assert_eq!(parse_length(Some("64")), Ok(64));
        assert_eq!(parse_length(Some("128")), Ok(128));
        assert_eq!(parse_length(Some("4096")), Ok(4096));
    }

    #[test]
    fn rejects_keys_too_short_for_session_signing() {
        assert!(parse_length(Some("32")).is_err());
        assert!(parse_length(Some("0")).is_err());
    }

    #[test]
    fn rejects_huge_and_malformed_lengths() {
        assert!(parse_length(Some("18446744073709551615")).is_err());
        assert!(parse_length(Some("4097")).is_err());
        assert!(parse_length(Some("sixty-four")).is_err());
    }
}
