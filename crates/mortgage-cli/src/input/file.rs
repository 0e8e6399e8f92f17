use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON or YAML file (by extension) into a typed struct.
pub fn read_structured<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let value: T = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref(),
        Some("yaml" | "yml")
    )
}

/// Resolve and validate the path, preventing directory traversal.
pub fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortgage_core::amortization::{InsuranceCharge, Scenario};
    use rust_decimal_macros::dec;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reads_yaml_scenario() {
        let path = temp_file(
            "scenario.yaml",
            "name: Yaml\nprincipal: \"90000000\"\nannual_rate: \"0.11\"\nterm_months: 120\n\
             insurance:\n  per_period: \"25000\"\nstart_date: 2025-01-10\n",
        );
        let scenario: Scenario = read_structured(path.to_str().unwrap()).unwrap();
        assert_eq!(scenario.name, "Yaml");
        assert_eq!(scenario.insurance, InsuranceCharge::PerPeriod(dec!(25000)));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reads_json_scenario() {
        let path = temp_file(
            "scenario.json",
            r#"{"principal":"1000000","annual_rate":"0.1","term_months":12,"start_date":"2025-01-01"}"#,
        );
        let scenario: Scenario = read_structured(path.to_str().unwrap()).unwrap();
        assert_eq!(scenario.term_months, 12);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = read_structured::<Scenario>("/nonexistent/scenario.json").unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }
}
