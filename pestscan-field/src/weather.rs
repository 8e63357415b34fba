use chrono::{Days, NaiveDate};
use pestscan_types::{TemperatureRange, WeatherForecast};

/// Source of daily forecasts for a farm.
pub trait WeatherSource: Send + Sync {
    fn forecast(&self, start: NaiveDate, days: usize) -> Vec<WeatherForecast>;
}

/// Fixed five-day outlook; stands in for a real weather API.
pub struct MockWeatherSource;

// (min °C, max °C, humidity %, rainfall mm, wind km/h)
const OUTLOOK: [(f64, f64, u8, f64, f64); 5] = [
    (18.0, 25.0, 65, 0.0, 12.0),
    (17.0, 24.0, 70, 2.5, 15.0),
    (16.0, 23.0, 75, 5.0, 18.0),
    (15.0, 22.0, 80, 8.5, 20.0),
    (16.0, 23.0, 72, 3.0, 14.0),
];

impl WeatherSource for MockWeatherSource {
    fn forecast(&self, start: NaiveDate, days: usize) -> Vec<WeatherForecast> {
        OUTLOOK
            .iter()
            .take(days)
            .enumerate()
            .filter_map(|(i, &(min, max, humidity, rainfall, wind_speed))| {
                let date = start.checked_add_days(Days::new(i as u64))?;
                Some(WeatherForecast {
                    date,
                    temperature: TemperatureRange { min, max },
                    humidity,
                    rainfall,
                    wind_speed,
                })
            })
            .collect()
    }
}
