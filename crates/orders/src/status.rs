use core::str::FromStr;

use serde::{Deserialize, Serialize};

use osdesk_core::DomainError;

/// Workflow label on a service order.
///
/// Transitions are free-form: any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Open,
    InProgress,
    Finished,
    Canceled,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Open,
        OrderStatus::InProgress,
        OrderStatus::Finished,
        OrderStatus::Canceled,
        OrderStatus::Paid,
    ];

    /// Canonical storage/API key.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Finished => "finished",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Paid => "paid",
        }
    }

    /// Display label shown on screens and printed documents.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Open => "Aberta",
            OrderStatus::InProgress => "Em andamento",
            OrderStatus::Finished => "Finalizada",
            OrderStatus::Canceled => "Cancelada",
            OrderStatus::Paid => "Pago",
        }
    }

    /// Case-insensitive lookup against keys and labels.
    ///
    /// Returns `None` for anything outside the five recognised values.
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|s| {
            s.as_str() == needle || s.label().to_lowercase().replace(' ', "_") == needle
        })
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::validation("Invalid status"))
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
