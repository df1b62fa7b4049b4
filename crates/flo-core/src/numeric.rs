/// Floating point type used throughout the codec.
pub type Real = f64;

/// Manning coefficient used when MANNINGS_N.DAT is silent.
pub const DEFAULT_MANNING: Real = 0.04;

/// Shortest text that parses back to the same `f64`.
///
/// Integral values print without a fractional part and negative zero prints as `0`.
pub fn fmt_real(v: Real) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{}", v)
}

/// Parses a token as `f64`, accepting Fortran-style `D` exponents.
pub fn parse_real(token: &str) -> Option<Real> {
    if let Ok(v) = token.parse::<Real>() {
        return Some(v);
    }
    if token.contains(['d', 'D']) {
        return token.replace(['d', 'D'], "e").parse::<Real>().ok();
    }
    None
}

/// Parses an integer token; integral reals such as `12.0` are accepted.
pub fn parse_int(token: &str) -> Option<i64> {
    if let Ok(v) = token.parse::<i64>() {
        return Some(v);
    }
    let r = parse_real(token)?;
    if r.is_finite() && r.fract() == 0.0 && r.abs() < 9.0e15 {
        Some(r as i64)
    } else {
        None
    }
}

pub fn is_numeric(token: &str) -> bool {
    parse_real(token).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_real_is_shortest_round_trip() {
        assert_eq!(fmt_real(100.0), "100");
        assert_eq!(fmt_real(0.04), "0.04");
        assert_eq!(fmt_real(-9999.0), "-9999");
        assert_eq!(fmt_real(-0.0), "0");
        assert_eq!(fmt_real(2.5e-7), "0.00000025");
    }

    #[test]
    fn parse_accepts_fortran_exponent() {
        assert_eq!(parse_real("1.5D2"), Some(150.0));
        assert_eq!(parse_real("abc"), None);
        assert_eq!(parse_int("12.0"), Some(12));
        assert_eq!(parse_int("12.5"), None);
        assert_eq!(parse_int("-42"), Some(-42));
    }
}
