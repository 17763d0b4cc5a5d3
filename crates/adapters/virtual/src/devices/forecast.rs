//! Virtual forecast provider.

use cabinhub_app::ports::{ForecastError, ForecastProvider};
use cabinhub_domain::forecast::{DailyForecast, Location};

/// Returns the same forecast for every location.
///
/// Without a forecast it behaves like a provider with no API key.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualForecast {
    forecast: Option<DailyForecast>,
}

impl VirtualForecast {
    #[must_use]
    pub fn new(forecast: Option<DailyForecast>) -> Self {
        Self { forecast }
    }
}

impl ForecastProvider for VirtualForecast {
    async fn daily_forecast(&self, location: Location) -> Result<DailyForecast, ForecastError> {
        tracing::debug!(
            latitude = location.latitude,
            longitude = location.longitude,
            "virtual forecast requested"
        );
        self.forecast.ok_or(ForecastError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_return_configured_forecast() {
        let expected = DailyForecast {
            cloud_cover: 0.2,
            high_temp: 24.0,
        };
        let provider = VirtualForecast::new(Some(expected));
        assert_eq!(
            provider.daily_forecast(Location::default()).await.unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn should_report_not_configured() {
        let provider = VirtualForecast::default();
        assert!(matches!(
            provider.daily_forecast(Location::default()).await,
            Err(ForecastError::NotConfigured)
        ));
    }
}
