//! Outcome enums for a single webhook delivery.

use serde::Serialize;

/// How a webhook delivery that returned 200 ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    /// The order already carried a label; nothing was submitted.
    AlreadyLabeled,
    /// A label was created and recorded on the Shopify order.
    WritebackOk,
    /// A label was created but recording it on the order failed.
    WritebackFailed,
}

impl DeliveryOutcome {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyLabeled => "ALREADY_LABELED",
            Self::WritebackOk => "WRITEBACK_OK",
            Self::WritebackFailed => "WRITEBACK_FAILED",
        }
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
