//! Covering rules — close on sunny mornings, open on dark evenings.

use std::sync::Arc;

use cabinhub_domain::device::LightChannel;
use cabinhub_domain::event::TriggerCode;
use cabinhub_domain::position::Position;
use cabinhub_domain::settings::CoveringWindow;

use crate::ports::{ForecastProvider, LightSource};
use crate::settings::SharedSettings;

/// A fleet-wide move the rule wants executed.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveringCommand {
    pub target: Position,
    pub trigger: TriggerCode,
    /// Measurement that caused the move, for the event log.
    pub trigger_detail: String,
}

/// Result of one covering evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum CoveringOutcome {
    /// Covering automation is disabled.
    Disabled,
    /// No window applies for this hour and fleet average.
    OutsideWindow,
    /// A previous move is still running.
    MotionInProgress,
    /// Forecast could not be fetched; morning rule skipped.
    ForecastUnavailable,
    /// Light could not be read; evening rule skipped.
    LightUnavailable,
    /// Inside a window but conditions do not call for a move.
    Hold,
    /// A fleet-wide move was requested.
    Move(CoveringCommand),
}

/// Decides fleet-wide covering moves from the clock, forecast and light.
pub struct CoveringRule<L, F> {
    light: Arc<L>,
    forecast: Arc<F>,
    settings: SharedSettings,
}

impl<L, F> CoveringRule<L, F>
where
    L: LightSource,
    F: ForecastProvider,
{
    #[must_use]
    pub fn new(light: Arc<L>, forecast: Arc<F>, settings: SharedSettings) -> Self {
        Self {
            light,
            forecast,
            settings,
        }
    }

    /// Run the rule for local `hour` and the current fleet average.
    pub async fn evaluate(&self, hour: u32, average_position: f64) -> CoveringOutcome {
        let coverings = self.settings.read(|s| s.coverings.clone());
        if !coverings.enabled {
            return CoveringOutcome::Disabled;
        }

        match coverings.window_for(hour, average_position) {
            None => CoveringOutcome::OutsideWindow,
            Some(CoveringWindow::Morning) => {
                let forecast = match self.forecast.daily_forecast(coverings.location).await {
                    Ok(forecast) => forecast,
                    Err(err) => {
                        tracing::warn!(%err, "no forecast, skipping morning coverings");
                        return CoveringOutcome::ForecastUnavailable;
                    }
                };
                tracing::debug!(
                    cloud_cover = forecast.cloud_cover,
                    high_temp = forecast.high_temp,
                    "morning forecast"
                );
                if coverings.should_close_for(&forecast) {
                    CoveringOutcome::Move(CoveringCommand {
                        target: Position::CLOSED,
                        trigger: TriggerCode::CoveringsMorning,
                        trigger_detail: format!(
                            "cloud {} high {}",
                            forecast.cloud_cover, forecast.high_temp
                        ),
                    })
                } else {
                    CoveringOutcome::Hold
                }
            }
            Some(CoveringWindow::Evening) => {
                let light = match self.light.read_light(LightChannel::FullSpectrum).await {
                    Ok(light) => light,
                    Err(err) => {
                        tracing::warn!(%err, "no light reading, skipping evening coverings");
                        return CoveringOutcome::LightUnavailable;
                    }
                };
                tracing::debug!(light, "evening light");
                if coverings.should_open_for(light) {
                    CoveringOutcome::Move(CoveringCommand {
                        target: Position::OPEN,
                        trigger: TriggerCode::CoveringsEvening,
                        trigger_detail: light.to_string(),
                    })
                } else {
                    CoveringOutcome::Hold
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::{FakeForecast, FakeLight};
    use cabinhub_domain::forecast::DailyForecast;
    use cabinhub_domain::settings::AutomationSettings;

    const OPEN_AVERAGE: f64 = 10.0;
    const CLOSED_AVERAGE: f64 = 20.0;

    fn rule(
        light: Option<f64>,
        forecast: Option<DailyForecast>,
    ) -> CoveringRule<FakeLight, FakeForecast> {
        CoveringRule::new(
            Arc::new(FakeLight::new(light)),
            Arc::new(FakeForecast::new(forecast)),
            SharedSettings::default(),
        )
    }

    fn sunny() -> Option<DailyForecast> {
        Some(DailyForecast {
            cloud_cover: 0.3,
            high_temp: 25.0,
        })
    }

    #[tokio::test]
    async fn should_close_on_sunny_hot_morning() {
        let outcome = rule(None, sunny()).evaluate(7, OPEN_AVERAGE).await;

        let CoveringOutcome::Move(command) = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(command.target, Position::CLOSED);
        assert_eq!(command.trigger, TriggerCode::CoveringsMorning);
    }

    #[tokio::test]
    async fn should_hold_on_cloudy_morning() {
        let cloudy = Some(DailyForecast {
            cloud_cover: 0.8,
            high_temp: 25.0,
        });
        assert_eq!(
            rule(None, cloudy).evaluate(7, OPEN_AVERAGE).await,
            CoveringOutcome::Hold
        );
    }

    #[tokio::test]
    async fn should_skip_morning_when_already_closed() {
        assert_eq!(
            rule(None, sunny()).evaluate(7, CLOSED_AVERAGE).await,
            CoveringOutcome::OutsideWindow
        );
    }

    #[tokio::test]
    async fn should_skip_morning_without_forecast() {
        assert_eq!(
            rule(None, None).evaluate(7, OPEN_AVERAGE).await,
            CoveringOutcome::ForecastUnavailable
        );
    }

    #[tokio::test]
    async fn should_open_on_dark_evening() {
        let outcome = rule(Some(50.0), None).evaluate(19, CLOSED_AVERAGE).await;

        let CoveringOutcome::Move(command) = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(command.target, Position::OPEN);
        assert_eq!(command.trigger, TriggerCode::CoveringsEvening);
        assert_eq!(command.trigger_detail, "50");
    }

    #[tokio::test]
    async fn should_hold_on_bright_evening() {
        assert_eq!(
            rule(Some(1_500_000.0), None).evaluate(19, CLOSED_AVERAGE).await,
            CoveringOutcome::Hold
        );
    }

    #[tokio::test]
    async fn should_skip_evening_without_light_reading() {
        assert_eq!(
            rule(None, None).evaluate(19, CLOSED_AVERAGE).await,
            CoveringOutcome::LightUnavailable
        );
    }

    #[tokio::test]
    async fn should_do_nothing_outside_windows() {
        assert_eq!(
            rule(Some(0.0), sunny()).evaluate(12, OPEN_AVERAGE).await,
            CoveringOutcome::OutsideWindow
        );
    }

    #[tokio::test]
    async fn should_do_nothing_when_disabled() {
        let rule = rule(Some(0.0), sunny());
        rule.settings.update(|s| s.coverings.enabled = false);
        assert_eq!(rule.evaluate(7, OPEN_AVERAGE).await, CoveringOutcome::Disabled);
    }

    #[tokio::test]
    async fn should_ask_forecast_for_configured_location() {
        let forecast = Arc::new(FakeForecast::new(sunny()));
        let rule = CoveringRule::new(
            Arc::new(FakeLight::new(None)),
            Arc::clone(&forecast),
            SharedSettings::default(),
        );

        rule.evaluate(7, OPEN_AVERAGE).await;

        let requested = forecast.requested();
        assert_eq!(requested.len(), 1);
        assert!((requested[0].latitude - 51.456_857).abs() < 1e-9);
    }
}
