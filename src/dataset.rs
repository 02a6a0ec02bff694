//! Dataset adapters
//!
//! A [`Dataset`] is the small value that varies between collection targets:
//! which remote dataset to run against, whether the job is a plain scrape
//! or a discovery, which input field is mandatory, and how the trigger call
//! is shaped. Everything else — polling, fetching, persistence — is shared
//! by the collector, so a new target is a new `Dataset` value, not a new
//! client.

use crate::transport::{ApiRequest, Method};
use crate::types::InputRecord;

/// Discovery mode for datasets that find new records instead of scraping
/// known ones
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscoverBy {
    /// Discover new records matching a set of input filters
    InputFilters,
    /// Discover new records starting from seed URLs
    Url,
}

impl DiscoverBy {
    fn as_query_value(&self) -> &'static str {
        match self {
            DiscoverBy::InputFilters => "input_filters",
            DiscoverBy::Url => "url",
        }
    }
}

/// Target-specific parameters of a collection job
#[derive(Clone, Debug)]
pub struct Dataset {
    /// Remote dataset identifier, e.g. `gd_lfqkr8wm13ixtbd8f5`
    id: String,
    /// HTTP method the trigger endpoint expects
    trigger_method: Method,
    /// Discovery mode, if this is a discovery job
    discover: Option<DiscoverBy>,
    /// Input field every submitted record must carry
    primary_field: String,
}

impl Dataset {
    /// A plain scrape dataset where each input record must carry a `url`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            trigger_method: Method::Post,
            discover: None,
            primary_field: "url".to_string(),
        }
    }

    /// Turn this into a discovery job
    pub fn discover_by(mut self, mode: DiscoverBy) -> Self {
        self.discover = Some(mode);
        self
    }

    /// Require a different primary input field (e.g. `location` for
    /// filter-based discovery)
    pub fn primary_field(mut self, field: impl Into<String>) -> Self {
        self.primary_field = field.into();
        self
    }

    /// Use a different HTTP method for the trigger call
    pub fn trigger_method(mut self, method: Method) -> Self {
        self.trigger_method = method;
        self
    }

    /// The remote dataset identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The input field every record must carry after cleaning
    pub fn required_field(&self) -> &str {
        &self.primary_field
    }

    /// Build the trigger request for a cleaned set of input records
    pub(crate) fn trigger_request(&self, inputs: &[InputRecord]) -> ApiRequest {
        let mut query = vec![
            ("dataset_id".to_string(), self.id.clone()),
            ("include_errors".to_string(), "true".to_string()),
        ];
        if let Some(mode) = self.discover {
            query.push(("type".to_string(), "discover_new".to_string()));
            query.push(("discover_by".to_string(), mode.as_query_value().to_string()));
        }

        ApiRequest {
            method: self.trigger_method,
            path: "trigger".to_string(),
            query,
            body: Some(serde_json::json!(inputs)),
        }
    }
}
