//! Deserializers for numeric fields in data files that may hold fractional
//! or null values. Fractions are truncated; out-of-range values saturate.

use serde::{Deserialize, Deserializer};

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0, |n| n.trunc() as u32))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0, |n| n.trunc() as u8))
}

/// Year 0 is stored as "no year".
#[allow(clippy::cast_possible_truncation)]
pub fn year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .map(|n| n.trunc() as i32)
        .filter(|y| *y != 0))
}
