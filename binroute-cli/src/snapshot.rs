//! Bin snapshot loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use binroute_core::Bin;

/// Read a JSON array of bin records.
pub fn load(path: &Path) -> Result<Vec<Bin>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading bin snapshot {}", path.display()))?;
    parse(&raw).with_context(|| format!("parsing bin snapshot {}", path.display()))
}

fn parse(raw: &str) -> Result<Vec<Bin>> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use binroute_core::Persona;

    use super::*;

    #[test]
    fn parses_generator_records() {
        let bins = parse(
            r#"[
                {"bin_id": "B1", "latitude": 31.256, "longitude": 75.704, "fill_level": 10, "type": "Academic", "timestamp": "2026-10-16 08:00"},
                {"bin_id": "B2", "latitude": 31.2575, "longitude": 75.7072, "fill_level": "90", "type": "Food Court"},
                {"bin_id": "B3", "latitude": 31.2531, "longitude": 75.7055, "fill_level": null},
                {"bin_id": "B4", "latitude": 31.2540, "longitude": 75.7060, "fill_level": 55, "type": null},
                {"bin_id": "B5", "latitude": 31.2550, "longitude": 75.7065, "fill_level": 60, "type": 3}
            ]"#,
        )
        .expect("snapshot parses");

        assert_eq!(bins.len(), 5);
        assert_eq!(bins[1].persona, Persona::FoodCourt);
        assert_eq!(bins[1].fill_level.percent(), 90.0);
        assert_eq!(bins[2].fill_level.percent(), 0.0);
        assert_eq!(bins[2].persona, Persona::Default);
        assert_eq!(bins[3].persona, Persona::Default);
        assert_eq!(bins[4].persona, Persona::Default);
        assert_eq!(bins[4].fill_level.percent(), 60.0);
    }

    #[test]
    fn reports_the_file_on_failure() {
        let err = load(Path::new("/nonexistent/bins.json")).unwrap_err();

        assert!(err.to_string().contains("/nonexistent/bins.json"));
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(parse(r#"{"bins": []}"#).is_err());
    }
}
