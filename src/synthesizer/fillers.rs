//! Per-type example fillers.
//!
//! A filler replaces the structural fill for one named type, so well-known scalars such as
//! timestamps or UUIDs get realistic values instead of the generic string placeholder.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;

/// Produces the example value of one named type
pub trait Filler {
    fn fill(&self, rng: &mut StdRng) -> Value;
}

impl<F> Filler for F
where
    F: Fn(&mut StdRng) -> Value,
{
    fn fill(&self, rng: &mut StdRng) -> Value {
        self(rng)
    }
}

/// Fillers keyed by the qualifier of the named type they produce
#[derive(Default)]
pub struct FillerRegistry {
    fillers: HashMap<String, Box<dyn Filler>>,
}

impl FillerRegistry {
    /// An empty registry: every type is filled structurally
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with fillers for the known external scalar types
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for qualifier in [
            "chrono::DateTime",
            "chrono::NaiveDateTime",
            "time::OffsetDateTime",
            "time::PrimitiveDateTime",
            "std::time::SystemTime",
        ] {
            registry.register(qualifier, TimestampFiller);
        }
        for qualifier in ["chrono::NaiveDate", "time::Date"] {
            registry.register(qualifier, DateFiller);
        }
        registry.register("chrono::NaiveTime", TimeFiller);
        registry.register("uuid::Uuid", UuidFiller);
        registry.register("rust_decimal::Decimal", DecimalFiller);
        registry.register("url::Url", UrlFiller);
        registry
    }

    /// Registers `filler` for the named type `qualifier`, replacing any previous one
    pub fn register(&mut self, qualifier: impl Into<String>, filler: impl Filler + 'static) {
        self.fillers.insert(qualifier.into(), Box::new(filler));
    }

    pub fn get(&self, qualifier: &str) -> Option<&dyn Filler> {
        self.fillers.get(qualifier).map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fillers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fillers.is_empty()
    }
}

/// RFC 3339 UTC timestamp between 1990 and 2039
pub struct TimestampFiller;

impl Filler for TimestampFiller {
    fn fill(&self, rng: &mut StdRng) -> Value {
        let date = random_date(rng);
        let time = random_time(rng);
        Value::String(format!("{}T{}Z", date, time))
    }
}

/// ISO 8601 calendar date
pub struct DateFiller;

impl Filler for DateFiller {
    fn fill(&self, rng: &mut StdRng) -> Value {
        Value::String(random_date(rng))
    }
}

pub struct TimeFiller;

impl Filler for TimeFiller {
    fn fill(&self, rng: &mut StdRng) -> Value {
        Value::String(random_time(rng))
    }
}

/// Version 4 UUID in hyphenated form
pub struct UuidFiller;

impl Filler for UuidFiller {
    fn fill(&self, rng: &mut StdRng) -> Value {
        let mut bytes: [u8; 16] = rng.gen();
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Value::String(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }
}

/// Decimal with two fraction digits, encoded as a string the way decimal types serialize
pub struct DecimalFiller;

impl Filler for DecimalFiller {
    fn fill(&self, rng: &mut StdRng) -> Value {
        let units: u32 = rng.gen_range(0..100_000);
        let cents: u32 = rng.gen_range(0..100);
        Value::String(format!("{}.{:02}", units, cents))
    }
}

pub struct UrlFiller;

impl Filler for UrlFiller {
    fn fill(&self, rng: &mut StdRng) -> Value {
        let path: String = (0..8).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect();
        Value::String(format!("https://example.com/{}", path))
    }
}

fn random_date(rng: &mut StdRng) -> String {
    let year: u32 = rng.gen_range(1990..2040);
    let month: u32 = rng.gen_range(1..=12);
    let day: u32 = rng.gen_range(1..=28);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

fn random_time(rng: &mut StdRng) -> String {
    let hour: u32 = rng.gen_range(0..24);
    let minute: u32 = rng.gen_range(0..60);
    let second: u32 = rng.gen_range(0..60);
    format!("{:02}:{:02}:{:02}", hour, minute, second)
}
