//! Dutch-auction pricing rule
//!
//! Pure current-price computation for a listing. The mirror's offline
//! estimate and the ledger's on-chain computation must agree bit-for-bit, so
//! all arithmetic is integral and the division truncates toward zero exactly
//! as the settlement contract's does. Truncating the discount (not the price)
//! guarantees a quoted price is never lower than what settlement charges.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use types::numeric::Amount;

/// Compute the current price of a listing at ledger time `now` (seconds).
///
/// `elapsed` is clamped to `[0, duration]`. Once the decay window has fully
/// elapsed — including the degenerate `duration == 0` — the price is
/// `price_end` and stays there. For `price_start >= price_end` the result is
/// monotonically non-increasing in `now`; for `price_start == price_end` it
/// is constant (fixed price). A negative span (`price_end > price_start`,
/// which the marketplace never lists) is treated as zero, holding the quote
/// at `price_start` inside the window.
pub fn current_price(
    price_start: Amount,
    price_end: Amount,
    start_time: i64,
    duration: u64,
    now: i64,
) -> Amount {
    let elapsed = now.saturating_sub(start_time).max(0) as u64;
    if elapsed >= duration {
        return price_end;
    }

    // elapsed < duration, so duration > 0 and the divisions are defined.
    // trunc(span * elapsed / duration) computed in split form over u128:
    // the quotient term is bounded by span and the remainder term by
    // duration^2, so neither product can overflow the way the naive
    // span * elapsed can once wei-scale spans meet long windows.
    let span = (price_start.as_decimal() - price_end.as_decimal())
        .to_u128()
        .unwrap_or(0);
    let (elapsed, duration) = (elapsed as u128, duration as u128);
    let discount = (span / duration) * elapsed + (span % duration) * elapsed / duration;

    // discount <= span, which came from a representable decimal.
    match Decimal::from_u128(discount) {
        Some(discount) => Amount::new(price_start.as_decimal() - discount),
        None => price_end,
    }
}
