//! WMO weather code lookup.
//! See: https://open-meteo.com/en/docs#weathervariables

use crate::types::{ConditionInfo, WeatherCondition};

const UNKNOWN: ConditionInfo = ConditionInfo {
    condition: WeatherCondition::Clear,
    description: "Unknown",
};

/// Map a WMO weather code to its condition tag and description.
///
/// Unknown codes fall back to `clear` / `"Unknown"` so the UI always has
/// something to render.
pub fn map_weather_code(code: i32) -> ConditionInfo {
    use WeatherCondition::*;

    let (condition, description) = match code {
        0 => (Clear, "Clear sky"),
        1 => (Clear, "Mainly clear"),
        2 => (Clouds, "Partly cloudy"),
        3 => (Clouds, "Overcast"),
        45 => (Mist, "Fog"),
        48 => (Mist, "Depositing rime fog"),
        51 => (Rain, "Light drizzle"),
        53 => (Rain, "Moderate drizzle"),
        55 => (Rain, "Dense drizzle"),
        56 => (Rain, "Light freezing drizzle"),
        57 => (Rain, "Dense freezing drizzle"),
        61 => (Rain, "Slight rain"),
        63 => (Rain, "Moderate rain"),
        65 => (Rain, "Heavy rain"),
        66 => (Rain, "Light freezing rain"),
        67 => (Rain, "Heavy freezing rain"),
        71 => (Snow, "Slight snow fall"),
        73 => (Snow, "Moderate snow fall"),
        75 => (Snow, "Heavy snow fall"),
        77 => (Snow, "Snow grains"),
        80 => (Rain, "Slight rain showers"),
        81 => (Rain, "Moderate rain showers"),
        82 => (Rain, "Violent rain showers"),
        85 => (Snow, "Slight snow showers"),
        86 => (Snow, "Heavy snow showers"),
        95 => (Thunderstorm, "Thunderstorm"),
        96 => (Thunderstorm, "Thunderstorm with slight hail"),
        99 => (Thunderstorm, "Thunderstorm with heavy hail"),
        _ => return UNKNOWN,
    };

    ConditionInfo {
        condition,
        description,
    }
}
