//! Forecast port — today's weather summary for the cabin's location.

use std::future::Future;

use cabinhub_domain::forecast::{DailyForecast, Location};

/// Provider of daily forecasts.
pub trait ForecastProvider: Send + Sync {
    /// Fetch today's forecast for `location`.
    fn daily_forecast(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<DailyForecast, ForecastError>> + Send;
}

/// The forecast could not be obtained; the morning rule is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// No API key (or no provider) is configured.
    #[error("forecast provider is not configured")]
    NotConfigured,

    /// The provider could not be reached or returned garbage.
    #[error("forecast request failed")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),
}
