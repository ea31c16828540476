use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

/// A provider's single hourly rate. Quotes and booking totals are always
/// `rate_per_hour × duration_in_hours`; there is no separate service fee.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PricingSettings {
    pub provider_id: Uuid,
    pub rate_per_hour: f64,
    pub updated_at: OffsetDateTime,
}

impl PricingSettings {
    /// Providers are seeded with a zero rate; until they set a positive
    /// one, no booking can be confirmed against them.
    pub fn is_bookable(&self) -> bool {
        self.rate_per_hour > 0.0
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePricingPayload {
    #[validate(range(min = 0.0, message = "Rate cannot be negative"))]
    pub rate_per_hour: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn settings(rate_per_hour: f64) -> PricingSettings {
        PricingSettings {
            provider_id: Uuid::new_v4(),
            rate_per_hour,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn zero_rate_provider_is_not_bookable() {
        assert!(!settings(0.0).is_bookable());
        assert!(settings(150.0).is_bookable());
    }
}
