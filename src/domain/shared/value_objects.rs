use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Shared Value Objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueObjectError {
    #[error("Phone number must contain 6 to 12 digits, got: {0}")]
    InvalidPhoneNumber(String),

    #[error("Location must be formatted as 'latitude,longitude', got: {0}")]
    MalformedLocation(String),

    #[error("Coordinates out of range: {latitude},{longitude}")]
    CoordinatesOutOfRange { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportedCountryCode {
    Italy,
}

impl SupportedCountryCode {
    pub fn dialing_prefix(&self) -> &'static str {
        match self {
            SupportedCountryCode::Italy => "+39",
        }
    }
}

/// National phone number tagged with its country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    country: SupportedCountryCode,
    number: String,
}

impl PhoneNumber {
    /// Accepts the national part with or without the country prefix;
    /// spaces and dashes are dropped.
    pub fn of(country: SupportedCountryCode, raw: &str) -> Result<Self, ValueObjectError> {
        let mut cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if let Some(rest) = cleaned.strip_prefix(country.dialing_prefix()) {
            cleaned = rest.to_string();
        }

        let digits_only = cleaned.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !(6..=12).contains(&cleaned.len()) {
            return Err(ValueObjectError::InvalidPhoneNumber(raw.to_string()));
        }

        Ok(Self {
            country,
            number: cleaned,
        })
    }

    pub fn country(&self) -> SupportedCountryCode {
        self.country
    }

    pub fn national_number(&self) -> &str {
        &self.number
    }

    pub fn complete_number(&self) -> String {
        format!("{}{}", self.country.dialing_prefix(), self.number)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.complete_number())
    }
}

/// Delivery coordinates, persisted as "latitude,longitude"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValueObjectError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValueObjectError::CoordinatesOutOfRange { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Location {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValueObjectError::MalformedLocation(s.to_string());

        let (lat, long) = s.split_once(',').ok_or_else(malformed)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| malformed())?;
        let longitude: f64 = long.trim().parse().map_err(|_| malformed())?;

        Location::new(latitude, longitude)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.to_string()
    }
}

impl TryFrom<String> for Location {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
