// Cover image lookup against the Metabooks API

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::CliError;

const COVER_BASE: &str = "https://api.metabooks.com/api/v1/cover/";

/// Outcome of a fetch attempt, cached so a failing identifier is not
/// retried within the process.
#[derive(Debug, Clone)]
pub enum CoverResult {
    Hit(Vec<u8>),
    Failed,
}

static COVER_CACHE: OnceLock<Mutex<HashMap<String, CoverResult>>> = OnceLock::new();

fn cache() -> &'static Mutex<HashMap<String, CoverResult>> {
    COVER_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Build the cover URL for a product code. Requires exactly 13 digits
/// after stripping formatting; anything else has no cover.
pub fn cover_url(code: &str, token: &str) -> Option<String> {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 13 {
        return None;
    }
    Some(format!("{COVER_BASE}{digits}/m?access_token={token}"))
}

/// Fetch the cover image bytes for a code, consulting the cache first.
pub fn fetch_cover(code: &str, token: &str) -> Result<Vec<u8>, CliError> {
    let url = cover_url(code, token).ok_or_else(|| {
        CliError::args(format!("'{code}' is not a 13-digit identifier"))
            .with_hint("covers are keyed by ISBN-13 (978/979 prefix)")
    })?;

    if let Ok(guard) = cache().lock() {
        match guard.get(code) {
            Some(CoverResult::Hit(bytes)) => return Ok(bytes.clone()),
            Some(CoverResult::Failed) => {
                return Err(CliError::runtime(format!("no cover available for {code}")));
            }
            None => {}
        }
    }

    let result = request(&url);

    if let Ok(mut guard) = cache().lock() {
        let entry = match &result {
            Ok(bytes) => CoverResult::Hit(bytes.clone()),
            Err(_) => CoverResult::Failed,
        };
        guard.insert(code.to_string(), entry);
    }

    result.map_err(CliError::runtime)
}

fn request(url: &str) -> Result<Vec<u8>, String> {
    let response = reqwest::blocking::get(url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("cover service returned {}", response.status()));
    }
    let bytes = response.bytes().map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_requires_exactly_13_digits() {
        assert!(cover_url("9788512345678", "t").is_some());
        assert!(cover_url("978-85-1234-567-8", "t").is_some());
        assert!(cover_url("978851234567", "t").is_none());
        assert!(cover_url("97885123456789", "t").is_none());
        assert!(cover_url("", "t").is_none());
    }

    #[test]
    fn url_shape() {
        let url = cover_url("978-8512345678", "tok").unwrap();
        assert_eq!(
            url,
            "https://api.metabooks.com/api/v1/cover/9788512345678/m?access_token=tok"
        );
    }

    #[test]
    fn failed_marker_short_circuits() {
        let code = "9790000000001";
        cache()
            .lock()
            .unwrap()
            .insert(code.to_string(), CoverResult::Failed);

        let err = fetch_cover(code, "tok").unwrap_err();
        assert!(err.message.contains("no cover available"));
    }

    #[test]
    fn cache_hit_returns_bytes_without_fetching() {
        let code = "9790000000002";
        cache()
            .lock()
            .unwrap()
            .insert(code.to_string(), CoverResult::Hit(vec![1, 2, 3]));

        assert_eq!(fetch_cover(code, "tok").unwrap(), vec![1, 2, 3]);
    }
}
