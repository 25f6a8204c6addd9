//! Fixed-decimal height truncation shared by every height read and write.
//!
//! All replicas of a networked match must agree bit for bit on terrain
//! heights, so heights are cut to [`HEIGHT_DECIMALS`] fractional digits before
//! they are stored or compared.

/// Number of fractional decimal digits kept in stored heights.
pub const HEIGHT_DECIMALS: i32 = 6;

const DECIMAL_SCALE: f64 = 1_000_000.0;

/// Truncates `value` toward zero at [`HEIGHT_DECIMALS`] fractional digits.
///
/// The product is formed in `f64`, where multiplying an `f32` by `10^6` is
/// exact. A value that already sits on the decimal lattice maps to itself
/// even when its `f32` representation falls just below the lattice point, so
/// `truncate_decimal(truncate_decimal(h)) == truncate_decimal(h)`. Non-finite
/// values pass through unchanged.
#[must_use]
pub fn truncate_decimal(value: f32) -> f32 {
    if !value.is_finite() {
        return value;
    }

    let scaled = f64::from(value) * DECIMAL_SCALE;
    let truncated = scaled.trunc();
    let result = (truncated / DECIMAL_SCALE) as f32;
    if result == value {
        return result;
    }

    let adjacent = ((truncated + scaled.signum()) / DECIMAL_SCALE) as f32;
    if adjacent == value {
        value
    } else {
        result
    }
}
