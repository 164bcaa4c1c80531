//! # POS Ticket Report
//!
//! Prepares the rendering context of the printed receipt and hands it to the
//! host's report engine.
//!
//! ```text
//! records ──► first order ──► company ──► TicketTimestamps
//!                                              │ inject "fecha", "fecha_pago"
//!                                              ▼
//!                                    ReportRenderer::render ──► bytes
//! ```

use salepos_core::ticket::TicketTimestamps;
use salepos_core::Order;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::context::SaleContext;
use crate::error::{HostError, HostResult};

/// The host's report engine.
pub trait ReportRenderer {
    /// Renders `report` for `records` with the prepared local context.
    fn render(
        &self,
        report: &str,
        records: &[Order],
        data: &Value,
        context: &Map<String, Value>,
    ) -> HostResult<Vec<u8>>;
}

/// The POS ticket report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketReport;

impl TicketReport {
    /// Report name registered with the host.
    pub const NAME: &'static str = "sale_pos.sale_pos_ticket";

    /// Adds the localized order and payment times to `localcontext`, then
    /// renders through `renderer`.
    ///
    /// The first record drives the timestamps.
    pub fn parse(
        ctx: &impl SaleContext,
        renderer: &impl ReportRenderer,
        records: &[Order],
        data: &Value,
        mut localcontext: Map<String, Value>,
    ) -> HostResult<Vec<u8>> {
        let order = records
            .first()
            .ok_or_else(|| HostError::NoRecords(Self::NAME.to_string()))?;
        let company = ctx.company(&order.company)?;

        let timestamps = TicketTimestamps::for_order(order, &company)?;
        if !timestamps.localized {
            warn!(
                company = %company.id,
                order = %order.id,
                "Company has no timezone, printing ticket times in UTC"
            );
        }
        timestamps.inject(&mut localcontext);

        debug!(
            order = %order.id,
            created_at = %timestamps.created_at,
            payments = order.payments.len(),
            "Prepared ticket context"
        );

        renderer.render(Self::NAME, records, data, &localcontext)
    }
}
