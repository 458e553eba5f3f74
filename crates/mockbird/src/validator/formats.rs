//! The fixed set of `format` assertions.
//!
//! Only consulted when `validate_formats` is enabled; unknown formats are
//! annotations and always pass, per 2020-12.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use email_address::EmailAddress;
use fancy_regex::Regex;
use once_cell::sync::Lazy;
use url::Url;
use uuid_simd::{parse_hyphenated, Out};

static JSON_POINTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/(([^/~])|(~[01]))*)*\z").expect("Is a valid regex"));
static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:\d+W|(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:\.\d+)?S)?)?)$")
        .expect("Is a valid regex")
});

/// Dispatch a format name; unknown names validate successfully.
pub(crate) fn is_valid(format: &str, value: &str) -> bool {
    match format {
        "date" => is_valid_date(value),
        "time" => is_valid_time(value),
        "date-time" => is_valid_datetime(value),
        "duration" => is_valid_duration(value),
        "email" => is_valid_email(value),
        "hostname" => is_valid_hostname(value),
        "ipv4" => Ipv4Addr::from_str(value).is_ok(),
        "ipv6" => Ipv6Addr::from_str(value).is_ok(),
        "uri" => Url::parse(value).is_ok(),
        "uri-reference" => is_valid_uri_reference(value),
        "uuid" => {
            let mut out = [0_u8; 16];
            parse_hyphenated(value.as_bytes(), Out::from_mut(&mut out)).is_ok()
        }
        "json-pointer" => JSON_POINTER_RE.is_match(value).unwrap_or(false),
        "regex" => crate::regex::SafeRegex::compile(value).is_ok(),
        _ => true,
    }
}

fn is_valid_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10
        || bytes[4] != b'-'
        || bytes[7] != b'-'
        || !bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
    {
        return false;
    }
    let year = (u16::from(bytes[0] - b'0')) * 1000
        + (u16::from(bytes[1] - b'0')) * 100
        + (u16::from(bytes[2] - b'0')) * 10
        + u16::from(bytes[3] - b'0');
    let month = (bytes[5] - b'0') * 10 + (bytes[6] - b'0');
    let day = (bytes[8] - b'0') * 10 + (bytes[9] - b'0');
    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
    let max_day = match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    day <= max_day
}

fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    let len = bytes.len();
    // Shortest valid form is "HH:MM:SSZ".
    if len < 9
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || bytes[2] != b':'
        || !bytes[3].is_ascii_digit()
        || !bytes[4].is_ascii_digit()
        || bytes[5] != b':'
        || !bytes[6].is_ascii_digit()
        || !bytes[7].is_ascii_digit()
    {
        return false;
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    let second = (bytes[6] - b'0') * 10 + (bytes[7] - b'0');
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut i = 8;
    if i < len && bytes[i] == b'.' {
        i += 1;
        let fraction_start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == fraction_start {
            return false;
        }
    }
    match bytes.get(i) {
        Some(b'Z' | b'z') => i + 1 == len,
        Some(b'+' | b'-') => {
            let offset = &bytes[i + 1..];
            offset.len() == 5
                && offset[0].is_ascii_digit()
                && offset[1].is_ascii_digit()
                && offset[2] == b':'
                && offset[3].is_ascii_digit()
                && offset[4].is_ascii_digit()
                && (offset[0] - b'0') * 10 + (offset[1] - b'0') <= 23
                && (offset[3] - b'0') * 10 + (offset[4] - b'0') <= 59
        }
        _ => false,
    }
}

fn is_valid_datetime(datetime: &str) -> bool {
    let Some((date, time)) = datetime
        .split_once('T')
        .or_else(|| datetime.split_once('t'))
    else {
        return false;
    };
    is_valid_date(date) && is_valid_time(time)
}

fn is_valid_duration(duration: &str) -> bool {
    // "P" alone and "P…T" with an empty time part are not durations.
    duration.len() > 1
        && !duration.ends_with('T')
        && DURATION_RE.is_match(duration).unwrap_or(false)
}

fn is_valid_email(email: &str) -> bool {
    let Ok(parsed) = EmailAddress::from_str(email) else {
        return false;
    };
    let domain = parsed.domain();
    if let Some(literal) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        if let Some(address) = literal.strip_prefix("IPv6:") {
            address.parse::<Ipv6Addr>().is_ok()
        } else {
            literal.parse::<Ipv4Addr>().is_ok()
        }
    } else {
        is_valid_hostname(domain)
    }
}

fn is_valid_hostname(hostname: &str) -> bool {
    !(hostname.is_empty()
        || hostname.starts_with('-')
        || hostname.ends_with('-')
        || hostname.chars().count() > 255
        || hostname
            .chars()
            .any(|c| !(c.is_alphanumeric() || c == '-' || c == '.'))
        || hostname
            .split('.')
            .any(|label| label.is_empty() || label.chars().count() > 63))
}

fn is_valid_uri_reference(value: &str) -> bool {
    static DUMMY_BASE: Lazy<Url> =
        Lazy::new(|| Url::parse("https://reference.invalid/").expect("Is a valid URL"));
    match Url::parse(value) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => DUMMY_BASE.join(value).is_ok(),
        Err(_) => false,
    }
}
