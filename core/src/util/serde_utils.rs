//! Serde adapters shared by the report types.

/// `Duration` as fractional milliseconds.
pub mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = f64::deserialize(d)?;
        if !ms.is_finite() || ms < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "invalid duration in milliseconds: {ms}"
            )));
        }
        Ok(Duration::from_secs_f64(ms / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::duration_ms")]
        took: Duration,
    }

    #[test]
    fn test_duration_serializes_as_millis() {
        let json = serde_json::to_string(&Sample {
            took: Duration::from_micros(1500),
        })
        .unwrap();
        assert_eq!(json, r#"{"took":1.5}"#);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = serde_json::from_str::<Sample>(r#"{"took":-1.0}"#).unwrap_err();
        assert!(err.to_string().contains("invalid duration"));
    }
}
