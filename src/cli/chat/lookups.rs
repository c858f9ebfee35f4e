//! Weather and local date/time replies for a named city.

use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use tracing::{error, info};

use super::error::ChatError;
use super::services::{Conditions, Place, WeatherService};
use super::session::LookupPurpose;

const WEEKDAYS: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const COLD_SUGGESTION: &str =
    "Com esse clima mais frio, que tal preparar um caldo quentinho? Posso te sugerir uma sopa reconfortante ou um feijão tropeiro bem temperado.";
const MILD_SUGGESTION: &str =
    "O clima está agradável! Que tal um risoto cremoso ou uma massa com molho ao sugo?";
const HOT_SUGGESTION: &str =
    "Com esse calor, que tal uma salada refrescante ou um ceviche? Posso te ajudar a preparar algo leve e saboroso.";
const RAIN_CLAUSE: &str = " E já que está chovendo, podemos fazer algo que aqueça o coração.";
const SUN_CLAUSE: &str = " Com esse sol, podemos preparar algo que combine com um dia bonito.";
const WEATHER_CLOSING: &str =
    "Me diga se você tem alguma restrição alimentar ou ingredientes específicos em casa, e eu posso te dar sugestões mais personalizadas!";

/// Temperature band driving the recipe suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Cold,
    Mild,
    Hot,
}

impl TemperatureBand {
    /// `< 15` is cold, `15..25` mild, `>= 25` hot.
    pub fn for_celsius(celsius: i64) -> Self {
        if celsius < 15 {
            TemperatureBand::Cold
        } else if celsius < 25 {
            TemperatureBand::Mild
        } else {
            TemperatureBand::Hot
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            TemperatureBand::Cold => COLD_SUGGESTION,
            TemperatureBand::Mild => MILD_SUGGESTION,
            TemperatureBand::Hot => HOT_SUGGESTION,
        }
    }
}

/// Rounds half up, so -2.5 becomes -2 and 14.5 becomes 15.
pub fn round_celsius(temperature: f64) -> i64 {
    (temperature + 0.5).floor() as i64
}

/// Recipe suggestion for a rounded temperature and a condition description.
pub fn recipe_suggestion(celsius: i64, description: &str) -> String {
    let mut suggestion = TemperatureBand::for_celsius(celsius).suggestion().to_string();

    if description.contains("chuva") || description.contains("nublado") {
        suggestion.push_str(RAIN_CLAUSE);
    } else if description.contains("ensolarado") || description.contains("céu limpo") {
        suggestion.push_str(SUN_CLAUSE);
    }

    suggestion
}

pub fn format_weather_report(place: &Place, conditions: &Conditions) -> String {
    let celsius = round_celsius(conditions.temperature);
    format!(
        "Em {}, {}, a temperatura atual é de {}°C, {}. Umidade do ar: {}%.\n\n{}\n\n{}",
        place.name,
        place.country,
        celsius,
        conditions.description,
        conditions.humidity,
        recipe_suggestion(celsius, &conditions.description),
        WEATHER_CLOSING
    )
}

/// "UTC-3:00", "UTC+5:30".
pub fn format_utc_offset(offset_seconds: i32) -> String {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let total = offset_seconds.unsigned_abs();
    format!("UTC{}{}:{:02}", sign, total / 3600, (total % 3600) / 60)
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Renders the local date and time of `place` at the instant `now`.
pub fn format_datetime_report(
    place: &Place,
    utc_offset_seconds: i32,
    now: DateTime<Utc>,
) -> String {
    let offset = FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset);

    let weekday = WEEKDAYS[local.weekday().num_days_from_monday() as usize];
    let month = MONTHS[local.month0() as usize];
    let time = format!("{:02}:{:02}:{:02}", local.hour(), local.minute(), local.second());
    let full = capitalize_words(&format!(
        "{}, {} de {} de {} às {}",
        weekday,
        local.day(),
        month,
        local.year(),
        time
    ));

    format!(
        "Em {}, {}:\n\n📅 Data: {}, {} de {} de {}\n⏰ Horário: {}\n🌍 Fuso Horário: {}\n\nAgora são {} no fuso horário local.",
        place.name,
        place.country,
        weekday,
        local.day(),
        month,
        local.year(),
        time,
        format_utc_offset(utc_offset_seconds),
        full
    )
}

/// Weather and time lookups backed by a geocoding/weather provider.
#[derive(Clone)]
pub struct LocationServices {
    weather: Arc<dyn WeatherService>,
}

impl LocationServices {
    pub fn new(weather: Arc<dyn WeatherService>) -> Self {
        Self { weather }
    }

    pub async fn lookup(&self, purpose: LookupPurpose, city: &str) -> Result<String, ChatError> {
        match purpose {
            LookupPurpose::Weather => self.weather_report(city).await,
            LookupPurpose::DateTime => self.datetime_report(city).await,
        }
    }

    pub async fn weather_report(&self, city: &str) -> Result<String, ChatError> {
        let (place, conditions) = self.resolve(LookupPurpose::Weather, city).await?;
        info!("Weather lookup for {} ({})", place.name, place.country);
        Ok(format_weather_report(&place, &conditions))
    }

    pub async fn datetime_report(&self, city: &str) -> Result<String, ChatError> {
        let (place, conditions) = self.resolve(LookupPurpose::DateTime, city).await?;
        info!("Time lookup for {} ({})", place.name, place.country);
        Ok(format_datetime_report(&place, conditions.utc_offset_seconds, Utc::now()))
    }

    async fn resolve(
        &self,
        purpose: LookupPurpose,
        city: &str,
    ) -> Result<(Place, Conditions), ChatError> {
        let lookup_error = || ChatError::Lookup {
            purpose,
            city: city.to_string(),
        };

        let place = match self.weather.geocode(city).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                info!("No geocoding match for {}", city);
                return Err(ChatError::CityNotFound { city: city.to_string() });
            }
            Err(e) => {
                error!("Geocoding request for {} failed: {}", city, e);
                return Err(lookup_error());
            }
        };

        let conditions = self
            .weather
            .current_conditions(place.lat, place.lon)
            .await
            .map_err(|e| {
                error!("Conditions request for {} failed: {}", city, e);
                lookup_error()
            })?;

        Ok((place, conditions))
    }
}
