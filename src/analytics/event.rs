use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AnalyticsError, Properties};

/// One telemetry record produced by an interaction handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub action: String,
    pub category: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Properties>,
}

impl TrackingEvent {
    pub fn new(action: impl Into<String>, category: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            category: category.into(),
            label: label.into(),
            value: None,
            custom_data: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_custom_data(mut self, data: Properties) -> Self {
        self.custom_data = Some(data);
        self
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.action.trim().is_empty() {
            return Err(AnalyticsError::MissingAction {
                label: self.label.clone(),
            });
        }
        if self.category.trim().is_empty() {
            return Err(AnalyticsError::MissingCategory {
                action: self.action.clone(),
            });
        }
        Ok(())
    }
}
