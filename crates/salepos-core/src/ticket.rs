//! # Ticket Timestamps
//!
//! Company-local timestamps printed on the POS ticket.
//!
//! ## Conversion
//! ```text
//! stored create_date (naive, UTC) ──► attach UTC ──► company timezone
//!                                                     │
//!                                   no timezone ──────┴──► stays UTC
//! ```
//!
//! Two values are produced: the order's creation time and the creation time
//! of its last payment. "Last" means last in the order's payment list, as the
//! host stores it, not the latest timestamp.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::types::{Company, Order};

/// Template key of the order creation time.
pub const CREATED_AT_KEY: &str = "fecha";

/// Template key of the last payment time.
pub const LAST_PAYMENT_AT_KEY: &str = "fecha_pago";

/// Parses the company's timezone, if it has one.
pub fn company_timezone(company: &Company) -> CoreResult<Option<Tz>> {
    company
        .timezone
        .as_deref()
        .map(|name| {
            name.parse::<Tz>().map_err(|_| CoreError::InvalidTimezone {
                company: company.name.clone(),
                timezone: name.to_string(),
            })
        })
        .transpose()
}

/// Converts a stored UTC timestamp into `tz`, or keeps it in UTC.
pub fn localize(stored: NaiveDateTime, tz: Option<Tz>) -> DateTime<Tz> {
    tz.unwrap_or(Tz::UTC).from_utc_datetime(&stored)
}

/// The two localized ticket timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketTimestamps {
    pub created_at: DateTime<Tz>,
    pub last_payment_at: Option<DateTime<Tz>>,
    /// False when the company has no timezone and UTC was used.
    pub localized: bool,
}

impl TicketTimestamps {
    /// Computes the timestamps of `order` for `company`.
    pub fn for_order(order: &Order, company: &Company) -> CoreResult<Self> {
        let tz = company_timezone(company)?;

        let mut last_payment_at = None;
        for payment in &order.payments {
            last_payment_at = Some(localize(payment.create_date, tz));
        }

        Ok(TicketTimestamps {
            created_at: localize(order.create_date, tz),
            last_payment_at,
            localized: tz.is_some(),
        })
    }

    /// Writes both timestamps into a report rendering context.
    pub fn inject(&self, context: &mut Map<String, Value>) {
        context.insert(
            CREATED_AT_KEY.to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        context.insert(
            LAST_PAYMENT_AT_KEY.to_string(),
            self.last_payment_at
                .map(|at| Value::String(at.to_rfc3339()))
                .unwrap_or(Value::Null),
        );
    }
}
