use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal so repeated add/remove cycles compare exactly
pub type Price = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;
