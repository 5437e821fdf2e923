//! Drip rate limiting.
//!
//! A drip is keyed twice: by the requesting caller and by the destination
//! address. The older of the two marks decides; absent marks read as 0.

use super::records::{Interval, Symbol};
use super::Repository;
use crate::types::Result;

/// Marks to write once an approved drip has been enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DripMarks {
    pub symbol: Symbol,
    /// `@username` and the lowercased destination address.
    pub subjects: Vec<String>,
    pub at_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DripDecision {
    Approved(DripMarks),
    /// Rejected; another drip is possible in `wait_millis`.
    Limited { wait_millis: u64 },
}

/// Decide a drip from its two marks.
///
/// Approved iff strictly more than the interval has elapsed since the older
/// mark.
pub fn evaluate(
    caller_mark: Option<u64>,
    address_mark: Option<u64>,
    interval: &Interval,
    now_millis: u64,
) -> bool {
    let last_allowed = caller_mark.unwrap_or(0).min(address_mark.unwrap_or(0));
    now_millis.saturating_sub(last_allowed) > interval.millis()
}

impl Repository {
    /// Check whether `caller_subject` may drip `symbol` to `address_subject`.
    pub async fn check_drip(
        &self,
        caller_subject: &str,
        address_subject: &str,
        symbol: &Symbol,
        interval: &Interval,
        now_millis: u64,
    ) -> Result<DripDecision> {
        let caller_mark = self.drip_mark(caller_subject, symbol).await?;
        let address_mark = self.drip_mark(address_subject, symbol).await?;

        if evaluate(caller_mark, address_mark, interval, now_millis) {
            return Ok(DripDecision::Approved(DripMarks {
                symbol: symbol.clone(),
                subjects: vec![caller_subject.to_string(), address_subject.to_string()],
                at_millis: now_millis,
            }));
        }

        let last_allowed = caller_mark.unwrap_or(0).min(address_mark.unwrap_or(0));
        let next_allowed = last_allowed
            .saturating_add(interval.millis())
            .saturating_add(1);
        tracing::debug!(
            caller = caller_subject,
            address = address_subject,
            symbol = %symbol,
            last_allowed,
            "drip rate limited"
        );
        Ok(DripDecision::Limited {
            wait_millis: next_allowed.saturating_sub(now_millis),
        })
    }
}
