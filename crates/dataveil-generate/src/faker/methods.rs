use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fake::Fake;
use fake::faker::address::raw::{
    BuildingNumber, CityName, CountryName, PostCode, StateName, StreetName,
};
use fake::faker::boolean::raw::Boolean;
use fake::faker::company::raw::CompanyName;
use fake::faker::creditcard::raw::CreditCardNumber;
use fake::faker::internet::raw::{
    DomainSuffix, FreeEmail, IPv4, IPv6, Password, SafeEmail, Username,
};
use fake::faker::job::raw::Title as JobTitle;
use fake::faker::lorem::raw::{Paragraph, Paragraphs, Sentence, Sentences, Word, Words};
use fake::faker::name::raw::{FirstName, LastName, Name, Title};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::Data;
use rand::{Rng, RngCore};
use rand_chacha::ChaCha8Rng;
use rand_regex::Regex as RandRegex;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use super::params::Params;
use crate::errors::GenerationError;

/// Every method name the faker generator answers to, in snake_case.
pub const SUPPORTED_METHODS: &[&str] = &[
    "name",
    "first_name",
    "last_name",
    "title",
    "user_name",
    "email",
    "safe_email",
    "free_email",
    "domain_name",
    "url",
    "ipv4",
    "ipv6",
    "password",
    "phone_number",
    "city",
    "street_name",
    "street_address",
    "building_number",
    "postcode",
    "state",
    "country",
    "company",
    "job_title",
    "word",
    "words",
    "sentence",
    "sentences",
    "paragraph",
    "paragraphs",
    "text",
    "boolean",
    "number_between",
    "random_number",
    "random_digit",
    "random_float",
    "date",
    "time",
    "date_time",
    "iso8601",
    "unix_time",
    "uuid",
    "sha256",
    "credit_card_number",
    "regexify",
    "hex_color",
];

const ALIASES: &[(&str, &str)] = &[
    ("datetime", "date_time"),
    ("username", "user_name"),
    ("company_name", "company"),
    ("postal_code", "postcode"),
    ("zip_code", "postcode"),
    ("country_name", "country"),
    ("city_name", "city"),
    ("domain", "domain_name"),
    ("uuid4", "uuid"),
];

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Upper bound for word, sentence and paragraph counts.
const MAX_COUNT: usize = 1_000;
/// Upper bound for generated string lengths (`text`, `password`, regex repeats).
const MAX_LENGTH: usize = 65_535;
const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Resolves `userName`, `user_name` and known aliases to a supported method.
pub fn canonical_method(name: &str) -> Option<&'static str> {
    let snake = to_snake_case(name.trim());
    let target = ALIASES
        .iter()
        .find(|(alias, _)| *alias == snake)
        .map(|(_, target)| *target)
        .unwrap_or(snake.as_str());
    SUPPORTED_METHODS
        .iter()
        .copied()
        .find(|method| *method == target)
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn generate<L: Data + Copy + fake::faker::impls::address::CityNameGenFn>(
    locale: L,
    method: &'static str,
    params: &Params<'_>,
    rng: &mut ChaCha8Rng,
) -> Result<Value, GenerationError> {
    let value = match method {
        "name" => {
            // The optional gender argument has no effect on generated names.
            params.at_most(1)?;
            text(Name(locale).fake_with_rng(rng))
        }
        "first_name" => no_params(params, FirstName(locale).fake_with_rng(rng))?,
        "last_name" => no_params(params, LastName(locale).fake_with_rng(rng))?,
        "title" => no_params(params, Title(locale).fake_with_rng(rng))?,
        "user_name" => no_params(params, Username(locale).fake_with_rng(rng))?,
        "email" | "safe_email" => no_params(params, SafeEmail(locale).fake_with_rng(rng))?,
        "free_email" => no_params(params, FreeEmail(locale).fake_with_rng(rng))?,
        "domain_name" => {
            params.at_most(0)?;
            text(domain_name(locale, rng))
        }
        "url" => {
            params.at_most(0)?;
            let path: String = Word(locale).fake_with_rng(rng);
            text(format!(
                "https://www.{}/{}",
                domain_name(locale, rng),
                ascii_slug(&path)
            ))
        }
        "ipv4" => no_params(params, IPv4(locale).fake_with_rng(rng))?,
        "ipv6" => no_params(params, IPv6(locale).fake_with_rng(rng))?,
        "password" => {
            params.at_most(2)?;
            let min = params.bounded_at(0, 8, MAX_LENGTH)?;
            let max = params.bounded_at(1, 20, MAX_LENGTH)?.max(min);
            text(Password(locale, min..max + 1).fake_with_rng(rng))
        }
        "phone_number" => no_params(params, PhoneNumber(locale).fake_with_rng(rng))?,
        "city" => no_params(params, CityName(locale).fake_with_rng(rng))?,
        "street_name" => no_params(params, StreetName(locale).fake_with_rng(rng))?,
        "street_address" => {
            params.at_most(0)?;
            let number: String = BuildingNumber(locale).fake_with_rng(rng);
            let street: String = StreetName(locale).fake_with_rng(rng);
            text(format!("{number} {street}"))
        }
        "building_number" => no_params(params, BuildingNumber(locale).fake_with_rng(rng))?,
        "postcode" => no_params(params, PostCode(locale).fake_with_rng(rng))?,
        "state" => no_params(params, StateName(locale).fake_with_rng(rng))?,
        "country" => no_params(params, CountryName(locale).fake_with_rng(rng))?,
        "company" => no_params(params, CompanyName(locale).fake_with_rng(rng))?,
        "job_title" => no_params(params, JobTitle(locale).fake_with_rng(rng))?,
        "word" => no_params(params, Word(locale).fake_with_rng(rng))?,
        "words" => {
            params.at_most(2)?;
            let count = params.bounded_at(0, 3, MAX_COUNT)?;
            let words: Vec<String> = Words(locale, count..count + 1).fake_with_rng(rng);
            list_or_text(words, params.bool_at(1, false)?, " ")
        }
        "sentence" => {
            params.at_most(2)?;
            let count = params.bounded_at(0, 6, MAX_COUNT)?;
            if count == 0 {
                text(String::new())
            } else {
                let count = vary(count, params.bool_at(1, true)?, rng);
                text(Sentence(locale, count..count + 1).fake_with_rng(rng))
            }
        }
        "sentences" => {
            params.at_most(2)?;
            let count = params.bounded_at(0, 3, MAX_COUNT)?;
            let sentences: Vec<String> = Sentences(locale, count..count + 1).fake_with_rng(rng);
            list_or_text(sentences, params.bool_at(1, false)?, " ")
        }
        "paragraph" => {
            params.at_most(2)?;
            let count = params.bounded_at(0, 3, MAX_COUNT)?;
            if count == 0 {
                text(String::new())
            } else {
                let count = vary(count, params.bool_at(1, true)?, rng);
                text(Paragraph(locale, count..count + 1).fake_with_rng(rng))
            }
        }
        "paragraphs" => {
            params.at_most(2)?;
            let count = params.bounded_at(0, 3, MAX_COUNT)?;
            let paragraphs: Vec<String> = Paragraphs(locale, count..count + 1).fake_with_rng(rng);
            list_or_text(paragraphs, params.bool_at(1, false)?, "\n\n")
        }
        "text" => {
            params.at_most(1)?;
            let max_chars = params.bounded_at(0, 200, MAX_LENGTH)?;
            if max_chars < 5 {
                return Err(params.error("text needs room for at least 5 characters"));
            }
            text(bounded_text(locale, max_chars, rng))
        }
        "boolean" => {
            params.at_most(1)?;
            let chance = params.i64_at(0, 50)?;
            let chance = u8::try_from(chance)
                .ok()
                .filter(|chance| *chance <= 100)
                .ok_or_else(|| params.error("chance must be between 0 and 100"))?;
            Value::Bool(Boolean(locale, chance).fake_with_rng(rng))
        }
        "number_between" => {
            params.at_most(2)?;
            let mut min = params.i64_at(0, 0)?;
            let mut max = params.i64_at(1, i64::from(i32::MAX))?;
            if min > max {
                std::mem::swap(&mut min, &mut max);
            }
            Value::from(rng.random_range(min..=max))
        }
        "random_number" => {
            params.at_most(2)?;
            let digits = match params.i64_at(0, -1)? {
                -1 => rng.random_range(1..=9),
                value => u32::try_from(value)
                    .ok()
                    .filter(|digits| *digits <= 18)
                    .ok_or_else(|| params.error("number of digits must be between 0 and 18"))?,
            };
            if digits == 0 {
                Value::from(0)
            } else {
                let upper = 10_i64.pow(digits) - 1;
                let lower = if params.bool_at(1, false)? {
                    10_i64.pow(digits - 1)
                } else {
                    0
                };
                Value::from(rng.random_range(lower..=upper))
            }
        }
        "random_digit" => {
            params.at_most(0)?;
            Value::from(rng.random_range(0..=9_i64))
        }
        "random_float" => {
            params.at_most(3)?;
            let decimals = params.usize_at(0, 2)?.min(10) as i32;
            let mut min = params.f64_at(1)?.unwrap_or(0.0);
            let mut max = params.f64_at(2)?.unwrap_or(min + 1_000_000.0);
            if min > max {
                std::mem::swap(&mut min, &mut max);
            }
            if !(max - min).is_finite() {
                return Err(params.error("bounds must be finite and their span representable"));
            }
            let raw = rng.random_range(min..=max);
            let factor = 10_f64.powi(decimals);
            let scaled = raw * factor;
            if scaled.is_finite() {
                Value::from(scaled.round() / factor)
            } else {
                Value::from(raw)
            }
        }
        "date" => {
            params.at_most(2)?;
            let format = strftime_format(params.str_at(0)?.unwrap_or(DEFAULT_DATE_FORMAT));
            check_format(params, &format)?;
            let moment = random_moment(params, 1, rng)?;
            text(moment.format(&format).to_string())
        }
        "time" => {
            params.at_most(2)?;
            let format = strftime_format(params.str_at(0)?.unwrap_or(DEFAULT_TIME_FORMAT));
            check_format(params, &format)?;
            let moment = random_moment(params, 1, rng)?;
            text(moment.format(&format).to_string())
        }
        "date_time" => {
            params.at_most(1)?;
            let moment = random_moment(params, 0, rng)?;
            json!({
                "date": moment.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
                "timezone_type": 3,
                "timezone": "UTC",
            })
        }
        "iso8601" => {
            params.at_most(1)?;
            let moment = random_moment(params, 0, rng)?;
            text(moment.format("%Y-%m-%dT%H:%M:%S%z").to_string())
        }
        "unix_time" => {
            params.at_most(1)?;
            Value::from(random_moment(params, 0, rng)?.timestamp())
        }
        "uuid" => {
            params.at_most(0)?;
            let mut bytes = [0_u8; 16];
            rng.fill_bytes(&mut bytes);
            text(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
        }
        "sha256" => {
            params.at_most(0)?;
            let mut seed = [0_u8; 32];
            rng.fill_bytes(&mut seed);
            text(hex::encode(Sha256::digest(seed)))
        }
        "regexify" => {
            params.at_most(2)?;
            let pattern = params.require_str(0)?;
            let max_repeat = params.bounded_at(1, 16, MAX_LENGTH)? as u32;
            let regex = RandRegex::compile(pattern, max_repeat)
                .map_err(|err| params.error(format!("invalid regex pattern: {err}")))?;
            let value: String = rng.sample(regex);
            text(value)
        }
        "credit_card_number" => {
            no_params(params, CreditCardNumber(locale).fake_with_rng(rng))?
        }
        "hex_color" => {
            params.at_most(0)?;
            text(format!("#{:06x}", rng.random_range(0..=0xff_ffff_u32)))
        }
        other => return Err(GenerationError::UnknownMethod(other.to_string())),
    };
    Ok(value)
}

fn text(value: String) -> Value {
    Value::String(value)
}

fn no_params(params: &Params<'_>, value: String) -> Result<Value, GenerationError> {
    params.at_most(0)?;
    Ok(text(value))
}

fn list_or_text(items: Vec<String>, as_text: bool, separator: &str) -> Value {
    if as_text {
        text(items.join(separator))
    } else {
        Value::Array(items.into_iter().map(Value::String).collect())
    }
}

/// Scales `count` by a random 60..=140 percent when variable.
fn vary(count: usize, variable: bool, rng: &mut ChaCha8Rng) -> usize {
    if !variable {
        return count;
    }
    let percent = rng.random_range(60..=140);
    (count.saturating_mul(percent) / 100).max(1)
}

fn domain_name<L: Data + Copy>(locale: L, rng: &mut ChaCha8Rng) -> String {
    let label: String = LastName(locale).fake_with_rng(rng);
    let suffix: String = DomainSuffix(locale).fake_with_rng(rng);
    format!("{}.{}", ascii_slug(&label), suffix)
}

fn ascii_slug(value: &str) -> String {
    let slug: String = value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    if slug.is_empty() {
        "example".to_string()
    } else {
        slug
    }
}

fn bounded_text<L: Data + Copy>(locale: L, max_chars: usize, rng: &mut ChaCha8Rng) -> String {
    let mut out = String::new();
    loop {
        let sentence: String = Sentence(locale, 3..9).fake_with_rng(rng);
        let needed = sentence.chars().count() + usize::from(!out.is_empty());
        if out.chars().count() + needed > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&sentence);
    }
    if out.is_empty() {
        let word: String = Word(locale).fake_with_rng(rng);
        out = word.chars().take(max_chars - 1).collect();
        out.push('.');
    }
    out
}

/// Accepts strftime patterns as-is and translates the common PHP date letters.
fn strftime_format(format: &str) -> String {
    if format.contains('%') {
        return format.to_string();
    }
    let mut out = String::with_capacity(format.len() * 2);
    for ch in format.chars() {
        match ch {
            'Y' | 'y' | 'm' | 'd' | 'H' | 's' => {
                out.push('%');
                out.push(ch);
            }
            'i' => out.push_str("%M"),
            'j' => out.push_str("%-d"),
            'n' => out.push_str("%-m"),
            'G' => out.push_str("%-H"),
            'D' => out.push_str("%a"),
            'l' => out.push_str("%A"),
            'M' => out.push_str("%b"),
            'F' => out.push_str("%B"),
            'A' => out.push_str("%p"),
            'U' => out.push_str("%s"),
            other => out.push(other),
        }
    }
    out
}

fn check_format(params: &Params<'_>, format: &str) -> Result<(), GenerationError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(params.error(format!("invalid date format '{format}'")));
    }
    Ok(())
}

/// Uniform instant between the Unix epoch and the `max` param (default now).
fn random_moment(
    params: &Params<'_>,
    index: usize,
    rng: &mut ChaCha8Rng,
) -> Result<DateTime<Utc>, GenerationError> {
    let upper = match params.str_at(index) {
        Ok(None) => Utc::now(),
        Ok(Some(raw)) => parse_moment(raw).ok_or_else(|| {
            params.error(format!("cannot parse '{raw}' as a date"))
        })?,
        Err(_) => {
            let seconds = params.i64_at(index, 0)?;
            DateTime::from_timestamp(seconds, 0)
                .ok_or_else(|| params.error("timestamp is out of range"))?
        }
    };
    let max = upper.timestamp();
    if max < 0 {
        return Err(params.error("upper bound must be after 1970-01-01"));
    }
    let seconds = rng.random_range(0..=max);
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| params.error("timestamp is out of range"))
}

fn parse_moment(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("now") {
        return Some(Utc::now());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|moment| moment.and_utc())
}
