use rust_decimal::Decimal;

/// Trailing sums of `window` consecutive values, one entry per input value.
///
/// Entries are `None` until `window` values have been seen. The running total
/// is updated incrementally, so the whole pass is O(n) regardless of the
/// window length. `window` must be non-zero.
///
/// Returns `None` if a sum cannot be held in a `Decimal` without dropping digits.
pub(crate) fn rolling_sums(values: &[Decimal], window: usize) -> Option<Vec<Option<Decimal>>> {
    let mut sums = Vec::with_capacity(values.len());
    let mut running = Decimal::ZERO;

    for (i, value) in values.iter().enumerate() {
        running = exact_add(running, *value)?;
        if i >= window {
            running = exact_sub(running, values[i - window])?;
        }
        sums.push((i + 1 >= window).then_some(running));
    }

    Some(sums)
}

// `Decimal` silently lowers the scale of a result whose mantissa no longer fits
// in 96 bits. A result with fewer fractional digits than its operands has been rounded.
pub(crate) fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    (sum.scale() >= a.scale().max(b.scale())).then_some(sum)
}

pub(crate) fn exact_sub(a: Decimal, b: Decimal) -> Option<Decimal> {
    let difference = a.checked_sub(b)?;
    (difference.scale() >= a.scale().max(b.scale())).then_some(difference)
}

/// `value * factor` for an integral `factor`, or `None` if the product loses digits.
pub(crate) fn exact_mul(value: Decimal, factor: Decimal) -> Option<Decimal> {
    debug_assert_eq!(factor.scale(), 0);
    let product = value.checked_mul(factor)?;
    (product.scale() >= value.scale()).then_some(product)
}
