//! Scalar encoding of an averaged descriptor.
//!
//! The enrollment flow reduces the averaged descriptor to one transmissible
//! number: the mean of its components with the sign dropped. The result is
//! what the sign-up page renders as a QR-compatible string.

/// Errors from scalar encoding.
#[derive(Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// Encoding was requested for a vector with no components.
    EmptyVector,
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::EmptyVector => write!(f, "cannot encode an empty vector"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Reduce a vector to its absolute component mean.
///
/// Pure function; rejects empty input rather than producing NaN.
pub fn encode(values: &[f32]) -> Result<f64, EncodeError> {
    if values.is_empty() {
        return Err(EncodeError::EmptyVector);
    }

    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
    Ok((sum / values.len() as f64).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_mean() {
        assert_eq!(encode(&[2.0, 3.0, 4.0]), Ok(3.0));
    }

    #[test]
    fn test_encode_applies_absolute_value_after_division() {
        assert_eq!(encode(&[-5.0]), Ok(5.0));
        assert_eq!(encode(&[-1.0, -3.0]), Ok(2.0));
    }

    #[test]
    fn test_encode_empty_vector_fails() {
        assert_eq!(encode(&[]), Err(EncodeError::EmptyVector));
    }

    #[test]
    fn test_encode_mixed_signs() {
        // (1 - 2 + 4) / 3 = 1
        assert_eq!(encode(&[1.0, -2.0, 4.0]), Ok(1.0));
    }
}
