// Field coercion rules shared by the entity transformers.
//
// GTFS is loose about optional numeric fields, and the loaded tables keep the
// historical per-field policy: some fields fall back to 0, some to NULL, and a
// handful are mandatory (the row is dropped when they do not parse).

use crate::entities::RowError;

/// Integer with a fallback when missing or unparsable
pub fn int_or(raw: &str, default: i64) -> i64 {
    raw.trim().parse().unwrap_or(default)
}

/// Integer where missing, unparsable and negative values all mean "unset"
pub fn non_negative_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|v| *v >= 0)
}

/// Mandatory integer field
pub fn required_int(field: &'static str, raw: &str) -> Result<i64, RowError> {
    raw.trim().parse().map_err(|_| RowError::InvalidInteger {
        field,
        value: raw.to_string(),
    })
}

/// Mandatory real field; `NaN` and infinities are rejected
pub fn required_real(field: &'static str, raw: &str) -> Result<f64, RowError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::InvalidReal {
            field,
            value: raw.to_string(),
        })
}

/// Real field where empty means NULL but garbage is still an error
pub fn optional_real(field: &'static str, raw: &str) -> Result<Option<f64>, RowError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    required_real(field, raw).map(Some)
}

/// Day-of-week flag: only a literal "1" counts as set
pub fn flag(raw: &str) -> i64 {
    if raw == "1" {
        1
    } else {
        0
    }
}

/// Seconds since the start of the service day for an `H:M:S` clock string.
///
/// Hours may exceed 23 (trips running past midnight). Anything that is not
/// exactly three integer parts, or that overflows, yields `None`.
pub fn clock_seconds(raw: &str) -> Option<i64> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let mut total = 0i64;
    for (part, scale) in parts.iter().zip([3600i64, 60, 1]) {
        let value: i64 = part.trim().parse().ok()?;
        total = value.checked_mul(scale).and_then(|v| total.checked_add(v))?;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_seconds() {
        assert_eq!(clock_seconds("08:00:00"), Some(28_800));
        assert_eq!(clock_seconds("08:12:30"), Some(29_550));
        assert_eq!(clock_seconds("25:3:9"), Some(25 * 3600 + 3 * 60 + 9));
        assert_eq!(clock_seconds(" 7:05:00"), Some(25_500));
    }

    #[test]
    fn test_clock_seconds_wrong_shape() {
        assert_eq!(clock_seconds("bad"), None);
        assert_eq!(clock_seconds("12:30"), None);
        assert_eq!(clock_seconds(""), None);
        assert_eq!(clock_seconds("1:2:3:4"), None);
        assert_eq!(clock_seconds("aa:bb:cc"), None);
        assert_eq!(clock_seconds("3000000000000000:00:00"), None);
        assert_eq!(clock_seconds("0:0:9223372036854775807"), Some(i64::MAX));
        assert_eq!(clock_seconds("1:0:9223372036854775807"), None);
    }

    #[test]
    fn test_int_policies() {
        assert_eq!(int_or("2", 0), 2);
        assert_eq!(int_or("", 0), 0);
        assert_eq!(int_or("x", 0), 0);

        assert_eq!(non_negative_int("1"), Some(1));
        assert_eq!(non_negative_int(""), None);
        assert_eq!(non_negative_int("-1"), None);
        assert_eq!(non_negative_int("abc"), None);
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(required_int("route_type", "3").unwrap(), 3);
        assert!(required_int("route_type", "bus").is_err());
        assert!(required_int("route_type", "").is_err());

        assert_eq!(required_real("stop_lat", "45.5").unwrap(), 45.5);
        assert!(required_real("stop_lat", "north").is_err());
        assert!(required_real("stop_lat", "NaN").is_err());
        assert!(required_real("stop_lat", "inf").is_err());
        assert!(required_real("stop_lat", "1e400").is_err());
    }

    #[test]
    fn test_optional_real() {
        assert_eq!(optional_real("shape_dist_traveled", "").unwrap(), None);
        assert_eq!(optional_real("shape_dist_traveled", "12.5").unwrap(), Some(12.5));
        assert!(optional_real("shape_dist_traveled", "far").is_err());
        assert!(optional_real("shape_dist_traveled", "-infinity").is_err());
    }

    #[test]
    fn test_flag() {
        assert_eq!(flag("1"), 1);
        assert_eq!(flag("0"), 0);
        assert_eq!(flag(""), 0);
        assert_eq!(flag("yes"), 0);
    }
}
