use chrono::{Local, NaiveDate, Utc};
use thiserror::Error;

/// Hire and birth dates as shown in forms.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";
/// Task dates and the sign-up hire date.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("'{0}' is not a dd/mm/yyyy date")]
    Display(String),
    #[error("'{0}' is not a yyyy-mm-dd date")]
    Iso(String),
    #[error("{0} is in the future")]
    Future(NaiveDate),
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

pub fn parse_display_date(text: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(text.trim(), DISPLAY_FORMAT)
        .map_err(|_| DateError::Display(text.to_string()))
}

pub fn parse_iso_date(text: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(text.trim(), ISO_DATE_FORMAT)
        .map_err(|_| DateError::Iso(text.to_string()))
}

/// Birth dates are picked with today as the upper bound.
pub fn parse_birth_date(text: &str) -> Result<NaiveDate, DateError> {
    let date = parse_display_date(text)?;
    if date > today() {
        return Err(DateError::Future(date));
    }
    Ok(date)
}
