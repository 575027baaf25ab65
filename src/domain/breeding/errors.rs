//! Error values for breeding KPI calculations
//!
//! Every failure the KPI core can report is one of the variants below. They
//! are returned through [`KpiResult`], never raised as panics, and carry only
//! plain data so they can be cloned into logs and responses freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for KPI operations
pub type KpiResult<T> = Result<T, KpiDomainError>;

/// Closed set of KPI failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum KpiDomainError {
    /// Malformed caller input
    #[serde(rename = "ValidationError")]
    Validation {
        message: String,
        field: Option<String>,
    },
    /// Arithmetic or logic failure inside the calculator
    #[serde(rename = "CalculationError")]
    Calculation {
        message: String,
        cause: Option<String>,
    },
    /// A requested breakdown cannot be produced from the available data
    #[serde(rename = "DataInsufficientError")]
    DataInsufficient {
        message: String,
        required_data: Option<String>,
    },
    /// Invalid or reversed reporting period
    #[serde(rename = "PeriodError")]
    Period {
        message: String,
        invalid_period: Option<String>,
    },
    /// An aggregate fell outside the domain of its metric
    #[serde(rename = "MetricError")]
    Metric {
        message: String,
        metric_type: Option<String>,
        value: Option<f64>,
    },
    /// Failure surfaced by the event store
    #[serde(rename = "InfraError")]
    Infra {
        message: String,
        cause: Option<String>,
    },
}

impl KpiDomainError {
    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(str::to_owned),
        }
    }

    pub fn calculation(message: impl Into<String>, cause: Option<&str>) -> Self {
        Self::Calculation {
            message: message.into(),
            cause: cause.map(str::to_owned),
        }
    }

    pub fn data_insufficient(message: impl Into<String>, required_data: Option<&str>) -> Self {
        Self::DataInsufficient {
            message: message.into(),
            required_data: required_data.map(str::to_owned),
        }
    }

    pub fn period(message: impl Into<String>, invalid_period: Option<&str>) -> Self {
        Self::Period {
            message: message.into(),
            invalid_period: invalid_period.map(str::to_owned),
        }
    }

    pub fn metric(message: impl Into<String>, metric_type: Option<&str>, value: Option<f64>) -> Self {
        Self::Metric {
            message: message.into(),
            metric_type: metric_type.map(str::to_owned),
            value,
        }
    }

    pub fn infra(message: impl Into<String>, cause: Option<&str>) -> Self {
        Self::Infra {
            message: message.into(),
            cause: cause.map(str::to_owned),
        }
    }

    /// Tag naming the variant, as used in logs and responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Calculation { .. } => "CalculationError",
            Self::DataInsufficient { .. } => "DataInsufficientError",
            Self::Period { .. } => "PeriodError",
            Self::Metric { .. } => "MetricError",
            Self::Infra { .. } => "InfraError",
        }
    }

    /// The bare message the error was constructed with
    pub fn raw_message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Calculation { message, .. }
            | Self::DataInsufficient { message, .. }
            | Self::Period { message, .. }
            | Self::Metric { message, .. }
            | Self::Infra { message, .. } => message,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Validation error",
            Self::Calculation { .. } => "Calculation error",
            Self::DataInsufficient { .. } => "Insufficient data",
            Self::Period { .. } => "Invalid period",
            Self::Metric { .. } => "Metric error",
            Self::Infra { .. } => "Infrastructure error",
        }
    }

    /// Context appended to the rendered message. Causes are deliberately
    /// left out; they only appear in [`KpiDomainError::details`].
    fn context(&self) -> Option<String> {
        match self {
            Self::Validation { field, .. } => field.as_ref().map(|f| format!("field: {f}")),
            Self::DataInsufficient { required_data, .. } => {
                required_data.as_ref().map(|r| format!("required: {r}"))
            }
            Self::Period { invalid_period, .. } => {
                invalid_period.as_ref().map(|p| format!("period: {p}"))
            }
            Self::Metric {
                metric_type, value, ..
            } => match (metric_type, value) {
                (Some(metric), Some(value)) => Some(format!("metric: {metric}, value: {value}")),
                (Some(metric), None) => Some(format!("metric: {metric}")),
                (None, Some(value)) => Some(format!("value: {value}")),
                (None, None) => None,
            },
            Self::Calculation { .. } | Self::Infra { .. } => None,
        }
    }

    /// Human-readable rendering of the error
    pub fn message(&self) -> String {
        match self.context() {
            Some(context) => format!("{}: {} ({context})", self.label(), self.raw_message()),
            None => format!("{}: {}", self.label(), self.raw_message()),
        }
    }

    /// Structured record for logging, stamped with the current time
    pub fn details(&self) -> ErrorDetails {
        self.details_at(Utc::now())
    }

    /// Structured record for logging, stamped with `timestamp`
    pub fn details_at(&self, timestamp: DateTime<Utc>) -> ErrorDetails {
        let mut details = ErrorDetails {
            error_type: self.kind(),
            message: self.raw_message().to_owned(),
            field: None,
            cause: None,
            required_data: None,
            invalid_period: None,
            metric_type: None,
            value: None,
            timestamp,
        };
        match self {
            Self::Validation { field, .. } => details.field = field.clone(),
            Self::Calculation { cause, .. } | Self::Infra { cause, .. } => {
                details.cause = cause.clone()
            }
            Self::DataInsufficient { required_data, .. } => {
                details.required_data = required_data.clone()
            }
            Self::Period { invalid_period, .. } => {
                details.invalid_period = invalid_period.clone()
            }
            Self::Metric {
                metric_type, value, ..
            } => {
                details.metric_type = metric_type.clone();
                details.value = *value;
            }
        }
        details
    }

    /// The only view of an error that may be shown to end users
    pub fn public(&self) -> PublicError {
        PublicError {
            error_type: self.kind(),
            message: self.message(),
        }
    }
}

impl fmt::Display for KpiDomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for KpiDomainError {}

/// Structured error record for telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Tag and message only; never carries a cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicError {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub message: String,
}
