//! Birth dates travel and are stored exclusively as `dd-MM-yyyy` text.

use chrono::NaiveDate;
use derive_more::Display;

pub const FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display(fmt = "date {_0:?} does not match the dd-MM-yyyy format")]
pub struct DateFormatError(String);

impl std::error::Error for DateFormatError {}

/// Parses a `dd-MM-yyyy` date, rejecting unpadded days, months or years.
pub fn parse(text: &str) -> Result<NaiveDate, DateFormatError> {
    NaiveDate::parse_from_str(text, FORMAT)
        .ok()
        .filter(|date| format(date) == text)
        .ok_or_else(|| DateFormatError(text.into()))
}

pub fn format(date: &NaiveDate) -> String {
    date.format(FORMAT).to_string()
}

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format(date))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text: String = serde::Deserialize::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}

/// Serde adapter for optional birth dates, `null` and absent map to `None`.
pub mod option {
    use chrono::NaiveDate;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text: Option<String> = serde::Deserialize::deserialize(deserializer)?;
        text.map(|text| super::parse(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
