//! Format-directed string synthesis.
//!
//! Every generator draws only from the seeded RNG, so values are
//! deterministic per seed and valid under the matching `format` assertion.
use super::rng::Lcg;

/// Produce a value for a known format; `None` falls back to plain strings.
pub(super) fn generate(format: &str, rng: &mut Lcg) -> Option<String> {
    match format {
        "date" => Some(date(rng)),
        "time" => Some(time(rng)),
        "date-time" => Some(format!("{}T{}", date(rng), time(rng))),
        "email" => Some(format!("user{}@example.com", rng.int_in(1, 9999))),
        "hostname" => Some(format!("host{}.example.com", rng.int_in(1, 99))),
        "ipv4" => Some(format!(
            "192.168.{}.{}",
            rng.int_in(0, 255),
            rng.int_in(1, 254)
        )),
        "ipv6" => Some(format!("2001:db8::{:x}", rng.int_in(1, 0xffff))),
        "uri" => Some(format!("https://example.com/resource/{}", rng.int_in(1, 9999))),
        "uuid" => Some(uuid(rng)),
        _ => None,
    }
}

fn date(rng: &mut Lcg) -> String {
    format!(
        "20{:02}-{:02}-{:02}",
        rng.int_in(0, 29),
        rng.int_in(1, 12),
        rng.int_in(1, 28)
    )
}

fn time(rng: &mut Lcg) -> String {
    format!(
        "{:02}:{:02}:{:02}Z",
        rng.int_in(0, 23),
        rng.int_in(0, 59),
        rng.int_in(0, 59)
    )
}

/// Version-4, variant-1 shaped.
fn uuid(rng: &mut Lcg) -> String {
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        rng.int_in(0, 0xffff_ffff),
        rng.int_in(0, 0xffff),
        rng.int_in(0, 0x0fff),
        0x8000 + rng.int_in(0, 0x3fff),
        rng.int_in(0, 0xffff_ffff_ffff)
    )
}

#[cfg(test)]
mod tests {
    use super::generate;
    use crate::generator::rng::Lcg;
    use crate::validator::formats::is_valid;
    use test_case::test_case;

    #[test_case("date")]
    #[test_case("time")]
    #[test_case("date-time")]
    #[test_case("email")]
    #[test_case("hostname")]
    #[test_case("ipv4")]
    #[test_case("ipv6")]
    #[test_case("uri")]
    #[test_case("uuid")]
    fn generated_values_satisfy_their_format(format: &str) {
        for seed in 0..32 {
            let mut rng = Lcg::new(seed);
            let value = generate(format, &mut rng).unwrap();
            assert!(
                is_valid(format, &value),
                "format {format} produced invalid value {value}"
            );
        }
    }

    #[test]
    fn unknown_formats_defer_to_plain_strings() {
        let mut rng = Lcg::new(0);
        assert_eq!(generate("customer-code", &mut rng), None);
    }
}
