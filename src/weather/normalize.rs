//! Mapping from WeatherAPI.com payloads to the public response models
//!
//! Units pass through untouched: the provider already reports Celsius,
//! km/h and millimetres.

use super::weatherapi;
use crate::models::{
    AirQuality, CurrentConditions, DetailedForecast, DetailedForecastDay, ForecastDay,
    ForecastQuery, HOURS_PER_DAY, HourlyForecast, SimpleForecast, WeatherAlert,
};
use crate::{Result, WeatherError};
use tracing::warn;

/// One summary record per day, ascending by date, at most `query.days` long
#[must_use]
pub fn simple_forecast(
    response: &weatherapi::ForecastResponse,
    query: &ForecastQuery,
) -> SimpleForecast {
    let forecast_days = selected_days(response, query)
        .into_iter()
        .map(|day| summarize_day(day, query.include_aqi))
        .collect();

    SimpleForecast {
        location_name: response.location.name.clone(),
        country: response.location.country.clone(),
        timezone: response.location.tz_id.clone(),
        local_time: response.location.localtime.clone(),
        forecast_days,
        alerts: alerts(response, query),
    }
}

/// Summary records plus exactly 24 hourly records per day
pub fn detailed_forecast(
    response: &weatherapi::ForecastResponse,
    query: &ForecastQuery,
) -> Result<DetailedForecast> {
    let forecast_days = selected_days(response, query)
        .into_iter()
        .map(|day| detail_day(day, query.include_aqi))
        .collect::<Result<Vec<_>>>()?;

    Ok(DetailedForecast {
        location_name: response.location.name.clone(),
        country: response.location.country.clone(),
        timezone: response.location.tz_id.clone(),
        local_time: response.location.localtime.clone(),
        forecast_days,
        alerts: alerts(response, query),
    })
}

/// Real-time snapshot
#[must_use]
pub fn current_conditions(
    response: &weatherapi::CurrentResponse,
    include_aqi: bool,
) -> CurrentConditions {
    let current = &response.current;

    CurrentConditions {
        location_name: response.location.name.clone(),
        country: response.location.country.clone(),
        timezone: response.location.tz_id.clone(),
        local_time: response.location.localtime.clone(),
        last_updated: current.last_updated.clone(),
        temp_c: current.temp_c,
        feelslike_c: current.feelslike_c,
        condition: current.condition.text.clone(),
        icon: current.condition.icon.clone(),
        is_day: current.is_day == 1,
        wind_kph: current.wind_kph,
        wind_degree: current.wind_degree,
        wind_dir: current.wind_dir.clone(),
        gust_kph: current.gust_kph,
        pressure_mb: current.pressure_mb,
        precip_mm: current.precip_mm,
        humidity: percent(current.humidity),
        cloud: percent(current.cloud),
        vis_km: current.vis_km,
        uv: current.uv,
        air_quality: air_quality(current.air_quality.as_ref(), include_aqi),
    }
}

/// Provider days sorted by date and cut to the requested count.
/// Fewer days than requested are passed through as-is.
fn selected_days<'a>(
    response: &'a weatherapi::ForecastResponse,
    query: &ForecastQuery,
) -> Vec<&'a weatherapi::ForecastDay> {
    let mut days: Vec<&weatherapi::ForecastDay> = response.forecast.forecastday.iter().collect();
    days.sort_by_key(|day| day.date);
    days.dedup_by_key(|day| day.date);
    days.truncate(usize::from(query.days));

    if days.len() < usize::from(query.days) {
        warn!(
            requested = query.days,
            returned = days.len(),
            location = %query.location,
            "Provider returned fewer forecast days than requested"
        );
    }

    days
}

fn summarize_day(day: &weatherapi::ForecastDay, include_aqi: bool) -> ForecastDay {
    ForecastDay {
        date: day.date,
        condition: day.day.condition.text.clone(),
        icon: day.day.condition.icon.clone(),
        max_temp_c: day.day.maxtemp_c,
        min_temp_c: day.day.mintemp_c,
        avg_temp_c: day.day.avgtemp_c,
        chance_of_rain: percent(day.day.daily_chance_of_rain),
        total_precip_mm: day.day.totalprecip_mm,
        avg_humidity: percent(day.day.avghumidity),
        max_wind_kph: day.day.maxwind_kph,
        uv: day.day.uv,
        sunrise: day.astro.sunrise.clone(),
        sunset: day.astro.sunset.clone(),
        air_quality: air_quality(day.day.air_quality.as_ref(), include_aqi),
    }
}

fn detail_day(day: &weatherapi::ForecastDay, include_aqi: bool) -> Result<DetailedForecastDay> {
    if day.hour.len() != HOURS_PER_DAY {
        return Err(WeatherError::invalid_response(format!(
            "expected {HOURS_PER_DAY} hourly records for {}, got {}",
            day.date,
            day.hour.len()
        )));
    }

    Ok(DetailedForecastDay {
        summary: summarize_day(day, include_aqi),
        moonrise: day.astro.moonrise.clone(),
        moonset: day.astro.moonset.clone(),
        moon_phase: day.astro.moon_phase.clone(),
        hourly: day.hour.iter().map(hourly).collect(),
    })
}

fn hourly(hour: &weatherapi::Hour) -> HourlyForecast {
    HourlyForecast {
        time: hour.time.clone(),
        temp_c: hour.temp_c,
        feelslike_c: hour.feelslike_c,
        condition: hour.condition.text.clone(),
        icon: hour.condition.icon.clone(),
        is_day: hour.is_day == 1,
        wind_kph: hour.wind_kph,
        wind_degree: hour.wind_degree,
        wind_dir: hour.wind_dir.clone(),
        gust_kph: hour.gust_kph,
        pressure_mb: hour.pressure_mb,
        precip_mm: hour.precip_mm,
        humidity: percent(hour.humidity),
        cloud: percent(hour.cloud),
        chance_of_rain: percent(hour.chance_of_rain),
        chance_of_snow: percent(hour.chance_of_snow),
        will_it_rain: hour.will_it_rain == 1,
        vis_km: hour.vis_km,
        uv: hour.uv,
    }
}

fn air_quality(aqi: Option<&weatherapi::AirQuality>, include: bool) -> Option<AirQuality> {
    if !include {
        return None;
    }

    aqi.map(|aqi| AirQuality {
        co: aqi.co,
        no2: aqi.no2,
        o3: aqi.o3,
        so2: aqi.so2,
        pm2_5: aqi.pm2_5,
        pm10: aqi.pm10,
        us_epa_index: aqi.us_epa_index,
        gb_defra_index: aqi.gb_defra_index,
    })
}

fn alerts(response: &weatherapi::ForecastResponse, query: &ForecastQuery) -> Option<Vec<WeatherAlert>> {
    if !query.include_alerts {
        return None;
    }

    response.alerts.as_ref().map(|alerts| {
        alerts
            .alert
            .iter()
            .map(|alert| WeatherAlert {
                headline: alert.headline.clone(),
                severity: alert.severity.clone(),
                urgency: alert.urgency.clone(),
                areas: alert.areas.clone(),
                category: alert.category.clone(),
                event: alert.event.clone(),
                effective: alert.effective.clone(),
                expires: alert.expires.clone(),
                description: alert.desc.clone(),
                instruction: alert.instruction.clone(),
            })
            .collect()
    })
}

/// Round and clamp a provider percentage into 0-100
fn percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
