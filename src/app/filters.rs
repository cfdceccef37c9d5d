use std::collections::BTreeSet;

use thiserror::Error;

use crate::market::{AmountRange, FilterSpec, Timeframe};
use crate::util::parse_date;

/// Editable, not yet applied filter state as typed into the controls panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct FilterDraft {
    pub(in crate::app) start_date: String,
    pub(in crate::app) end_date: String,
    /// Deal size bounds in millions of dollars.
    pub(in crate::app) min_amount_m: String,
    pub(in crate::app) max_amount_m: String,
    pub(in crate::app) event_types: BTreeSet<String>,
    pub(in crate::app) industries: BTreeSet<String>,
    pub(in crate::app) regions: BTreeSet<String>,
    pub(in crate::app) search_term: String,
}

#[derive(Debug, Error, PartialEq)]
pub(in crate::app) enum FilterInputError {
    #[error("{field} date {value:?} is not in YYYY-MM-DD form")]
    BadDate { field: &'static str, value: String },
    #[error("{field} deal size {value:?} is not a number")]
    BadAmount { field: &'static str, value: String },
    #[error("start date is after end date")]
    InvertedTimeframe,
    #[error("minimum deal size is above the maximum")]
    InvertedDealSize,
}

impl FilterDraft {
    pub(in crate::app) fn to_spec(&self) -> Result<FilterSpec, FilterInputError> {
        let start = parse_optional_date("start", &self.start_date)?;
        let end = parse_optional_date("end", &self.end_date)?;
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(FilterInputError::InvertedTimeframe);
        }

        let min = parse_optional_millions("minimum", &self.min_amount_m)?;
        let max = parse_optional_millions("maximum", &self.max_amount_m)?;
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(FilterInputError::InvertedDealSize);
        }

        let search_term = self.search_term.trim();

        Ok(FilterSpec {
            timeframe: (start.is_some() || end.is_some()).then_some(Timeframe { start, end }),
            deal_size: (min.is_some() || max.is_some()).then_some(AmountRange { min, max }),
            event_types: self.event_types.iter().cloned().collect(),
            industries: self.industries.iter().cloned().collect(),
            regions: self.regions.iter().cloned().collect(),
            search_term: (!search_term.is_empty()).then(|| search_term.to_owned()),
        })
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_optional_date(
    field: &'static str,
    raw: &str,
) -> Result<Option<chrono::NaiveDate>, FilterInputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| FilterInputError::BadDate {
            field,
            value: raw.to_owned(),
        })
}

fn parse_optional_millions(field: &'static str, raw: &str) -> Result<Option<f64>, FilterInputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| Some(value * 1_000_000.0))
        .ok_or_else(|| FilterInputError::BadAmount {
            field,
            value: raw.to_owned(),
        })
}
