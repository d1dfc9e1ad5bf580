//! Search strategy selection

use crate::error::SearchError;
use std::fmt;
use std::str::FromStr;

/// How authorization is combined with ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMethod {
    /// Restrict candidates to authorized documents, then rank
    #[default]
    FilterFirst,
    /// Rank everything, then drop unauthorized results
    QueryFirst,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::FilterFirst => "filter_first",
            SearchMethod::QueryFirst => "query_first",
        }
    }
}

impl FromStr for SearchMethod {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filter_first" => Ok(SearchMethod::FilterFirst),
            "query_first" => Ok(SearchMethod::QueryFirst),
            _ => Err(SearchError::invalid_argument(format!(
                "Invalid method: {}. Use 'filter_first' or 'query_first'",
                s
            ))),
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
