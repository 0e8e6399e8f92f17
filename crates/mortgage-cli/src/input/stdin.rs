use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialize piped JSON from stdin. `None` when stdin is a terminal or
/// nothing was piped.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: T = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin as JSON: {}", e))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortgage_core::amortization::Scenario;

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse_piped::<Scenario>("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_scenario() {
        let json = r#"{"name":"piped","principal":"5000000","annual_rate":"0.09","term_months":24,"start_date":"2025-06-01"}"#;
        let scenario: Scenario = parse_piped(json).unwrap().unwrap();
        assert_eq!(scenario.name, "piped");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_piped::<Scenario>("{ not json").is_err());
    }
}
