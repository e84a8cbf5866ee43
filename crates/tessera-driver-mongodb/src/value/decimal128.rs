//! BID-encoded Decimal128, the BSON form of decimal attributes.
//!
//! Only finite values with a coefficient below 2^113 are produced, which
//! covers everything `rust_decimal` can hold.

use bson::Decimal128;
use rust_decimal::Decimal;

const EXPONENT_BIAS: i32 = 6176;
const COEFFICIENT_BITS: u32 = 113;

pub fn encode(value: Decimal) -> Decimal128 {
    let coefficient = value.mantissa().unsigned_abs();
    let exponent = (EXPONENT_BIAS - value.scale() as i32) as u128;
    let sign = u128::from(value.is_sign_negative() && coefficient != 0) << 127;

    let bits = sign | exponent << COEFFICIENT_BITS | coefficient;
    Decimal128::from_bytes(bits.to_le_bytes())
}

/// `None` for infinities, NaN and values outside the range `rust_decimal`
/// can hold.
pub fn decode(value: Decimal128) -> Option<Decimal> {
    let bits = u128::from_le_bytes(value.bytes());

    let negative = bits >> 127 == 1;
    if (bits >> 125) & 0b11 == 0b11 {
        return None;
    }

    let exponent = ((bits >> COEFFICIENT_BITS) & 0x3fff) as i32 - EXPONENT_BIAS;
    let coefficient = i128::try_from(bits & ((1 << COEFFICIENT_BITS) - 1)).ok()?;
    let coefficient = if negative { -coefficient } else { coefficient };

    if exponent <= 0 {
        let (coefficient, scale) = normalize(coefficient, (-exponent) as u32)?;
        Decimal::try_from_i128_with_scale(coefficient, scale).ok()
    } else {
        let factor = Decimal::from(10_i64.checked_pow(exponent as u32)?);
        Decimal::try_from_i128_with_scale(coefficient, 0)
            .ok()?
            .checked_mul(factor)
    }
}

/// Drops trailing zero digits until the scale fits `rust_decimal`. Results
/// of server-side division can carry up to 34 digits.
fn normalize(mut coefficient: i128, mut scale: u32) -> Option<(i128, u32)> {
    while scale > Decimal::MAX_SCALE || coefficient.unsigned_abs() >= 1 << 96 {
        if scale == 0 {
            return None;
        }
        // Rounds half away from zero on the dropped digit.
        let rem = coefficient % 10;
        coefficient /= 10;
        if rem.abs() >= 5 {
            coefficient += rem.signum();
        }
        scale -= 1;
    }
    Some((coefficient, scale))
}
