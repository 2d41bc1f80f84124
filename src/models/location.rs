//! Location query model: free-form provider location strings

use crate::{Result, WeatherError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token the provider resolves to the caller's IP location
pub const AUTO_IP_TOKEN: &str = "auto:ip";

/// A validated location query, classified by shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationQuery {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Location name (city, "city,country-code", region, etc.)
    Name(String),
    /// Postal code
    PostalCode(String),
    /// Resolve from the requesting IP address
    AutoIp,
}

impl LocationQuery {
    /// Parse location input (coordinates, city names, postal codes, `auto:ip`)
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(WeatherError::validation("location must not be empty"));
        }

        if input.eq_ignore_ascii_case(AUTO_IP_TOKEN) {
            return Ok(LocationQuery::AutoIp);
        }

        if let Some((lat, lon)) = parse_coordinates(input) {
            return Ok(LocationQuery::Coordinates(lat, lon));
        }

        if is_postal_code(input) {
            return Ok(LocationQuery::PostalCode(input.to_string()));
        }

        Ok(LocationQuery::Name(input.to_string()))
    }

    /// Value sent to the provider as the `q` parameter
    #[must_use]
    pub fn as_provider_query(&self) -> String {
        match self {
            LocationQuery::Coordinates(lat, lon) => format!("{lat},{lon}"),
            LocationQuery::Name(name) => name.clone(),
            LocationQuery::PostalCode(code) => code.clone(),
            LocationQuery::AutoIp => AUTO_IP_TOKEN.to_string(),
        }
    }

    /// Short label of the query shape, used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LocationQuery::Coordinates(..) => "coordinates",
            LocationQuery::Name(_) => "name",
            LocationQuery::PostalCode(_) => "postal_code",
            LocationQuery::AutoIp => "auto_ip",
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_provider_query())
    }
}

/// Parse coordinates from string like "-3.3869,36.6830" or "-3.3869 36.6830".
/// Anything not shaped like an in-range coordinate pair is `None`.
fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.len() != 2 {
        return None;
    }

    let lat = parts[0].parse::<f64>().ok()?;
    let lon = parts[1].parse::<f64>().ok()?;

    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }

    Some((lat, lon))
}

/// Check if input looks like a postal code
fn is_postal_code(input: &str) -> bool {
    let normalized = input.replace([' ', '-'], "");

    // US ZIP codes: 5 or 9 digits
    if normalized.len() == 5 || normalized.len() == 9 {
        if normalized.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }

    // Country prefix followed by alphanumerics with at least one digit
    if normalized.len() >= 5 && normalized.len() <= 10 && normalized.is_ascii() {
        let (prefix, suffix) = normalized.split_at(2);
        return prefix.chars().all(|c| c.is_ascii_alphabetic())
            && suffix.chars().all(|c| c.is_ascii_alphanumeric())
            && suffix.chars().any(|c| c.is_ascii_digit());
    }

    false
}
