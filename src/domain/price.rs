// src/domain/price.rs

/// Which price spellings a deployment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceGrammar {
    /// Only a single decimal number.
    Scalar,
    /// A single number or an inclusive `min-max` range.
    RangeCapable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Single(f64),
    Range { min: f64, max: f64 },
}

impl Price {
    /// Parses a price cell. Returns `None` for anything outside the grammar,
    /// including blanks, signs, exponents and `inf`/`NaN`.
    pub fn parse(raw: &str, grammar: PriceGrammar) -> Option<Price> {
        let raw = raw.trim();

        if let Some(value) = parse_decimal(raw) {
            return Some(Price::Single(value));
        }

        match grammar {
            PriceGrammar::Scalar => None,
            PriceGrammar::RangeCapable => {
                let (min, max) = raw.split_once('-')?;
                Some(Price::Range {
                    min: parse_decimal(min.trim())?,
                    max: parse_decimal(max.trim())?,
                })
            }
        }
    }

    /// Inclusive test against the draft bounds. Ranges pass when the two
    /// intervals overlap, touching ends included.
    pub fn within(&self, bounds: &PriceRange) -> bool {
        match *self {
            Price::Single(p) => p >= bounds.lo && p <= bounds.hi,
            Price::Range { min, max } => min <= bounds.hi && max >= bounds.lo,
        }
    }

    fn ends(&self) -> (f64, f64) {
        match *self {
            Price::Single(p) => (p, p),
            Price::Range { min, max } => (min, max),
        }
    }
}

/// Digits with at most one decimal point; at least one digit.
fn parse_decimal(s: &str) -> Option<f64> {
    let mut digits = 0;
    let mut dots = 0;
    for ch in s.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    s.parse::<f64>().ok()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub lo: f64,
    pub hi: f64,
}

impl PriceRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Smallest range covering every observed price, `{0, 0}` if none.
    pub fn observed<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = Price>,
    {
        let mut bounds: Option<(f64, f64)> = None;
        for price in prices {
            let (min, max) = price.ends();
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
                None => (min, max),
            });
        }
        let (lo, hi) = bounds.unwrap_or((0.0, 0.0));
        Self { lo, hi }
    }

    pub fn with_margin(self, multiplier: f64) -> Self {
        Self {
            lo: self.lo,
            hi: self.hi * multiplier,
        }
    }
}
