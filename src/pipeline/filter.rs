// src/pipeline/filter.rs

use std::borrow::Borrow;

use chrono::NaiveDate;

use crate::domain::possession::parse_possession;
use crate::domain::{Price, PriceRange, Record};
use crate::pipeline::facets::FacetSet;

/// Conjunctive filter: facets, then price (strict), then possession
/// (permissive, only with a cutoff). Never mutates `rows`.
pub fn filter<'a, R, P>(
    rows: &'a [R],
    facets: &FacetSet,
    price_range: &PriceRange,
    cutoff: Option<NaiveDate>,
    price_of: P,
    possession_field: &str,
) -> Vec<&'a R>
where
    R: Borrow<Record>,
    P: Fn(&Record) -> Option<Price>,
{
    rows.iter()
        .filter(|row| {
            let r: &Record = (*row).borrow();
            facets_match(r, facets)
                && price_of(r).is_some_and(|p| p.within(price_range))
                && match cutoff {
                    Some(cutoff) => possession_match(r, possession_field, cutoff),
                    None => true,
                }
        })
        .collect()
}

pub fn facets_match(record: &Record, facets: &FacetSet) -> bool {
    facets
        .iter()
        .filter(|f| !f.selected.is_unconstrained())
        .all(|f| {
            let value = record.get(&f.field).unwrap_or("").trim();
            f.selected.accepts(value)
        })
}

/// Missing or unreadable possession dates pass.
pub fn possession_match(record: &Record, field: &str, cutoff: NaiveDate) -> bool {
    match record.get(field).and_then(parse_possession) {
        Some(date) => date <= cutoff,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceGrammar;
    use crate::pipeline::facets::{extract_facets, FacetMode};

    const PRICE: &str = "Price (₹)";

    fn price_of(grammar: PriceGrammar) -> impl Fn(&Record) -> Option<Price> {
        move |r: &Record| r.get(PRICE).and_then(|raw| Price::parse(raw, grammar))
    }

    fn reserved(f: &str) -> bool {
        matches!(f, "Latitude" | "Longitude" | "Price (₹)")
    }

    fn listing(area: &str, price: &str) -> Record {
        Record::from_pairs([
            ("Latitude", "23.01"),
            ("Longitude", "72.5"),
            ("Area", area),
            (PRICE, price),
        ])
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_and_scalar_prices_inside_window_both_pass() {
        let rows = vec![listing("Bopal", "50-100"), listing("Bopal", "80")];
        let facets = extract_facets(&rows, FacetMode::Multi, reserved);

        let out = filter(
            &rows,
            &facets,
            &PriceRange::new(60.0, 90.0),
            None,
            price_of(PriceGrammar::RangeCapable),
            "Possession",
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn unparseable_price_is_always_excluded() {
        let rows = vec![listing("Bopal", "not-a-number"), listing("Bopal", "")];
        let facets = extract_facets(&rows, FacetMode::Multi, reserved);

        for range in [PriceRange::new(0.0, f64::MAX), PriceRange::new(f64::MIN, f64::MAX)] {
            let out = filter(
                &rows,
                &facets,
                &range,
                None,
                price_of(PriceGrammar::RangeCapable),
                "Possession",
            );
            assert!(out.is_empty());
        }
    }

    #[test]
    fn record_without_price_column_is_excluded() {
        let rows = vec![Record::from_pairs([("Area", "Bopal")])];
        let facets = extract_facets(&rows, FacetMode::Multi, reserved);
        let out = filter(
            &rows,
            &facets,
            &PriceRange::new(0.0, 1e12),
            None,
            price_of(PriceGrammar::Scalar),
            "Possession",
        );
        assert!(out.is_empty());
    }

    #[test]
    fn constrained_facet_keeps_only_selected_values() {
        let rows = vec![
            listing("Bopal", "10"),
            listing("Thaltej", "10"),
            listing(" Bopal ", "10"),
        ];
        let mut facets = extract_facets(&rows, FacetMode::Multi, reserved);
        facets.toggle_option("Area", "Bopal").unwrap();

        let out = filter(
            &rows,
            &facets,
            &PriceRange::new(0.0, 100.0),
            None,
            price_of(PriceGrammar::Scalar),
            "Possession",
        );
        // the padded value matches after trimming
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.get("Area").unwrap().trim() == "Bopal"));
    }

    #[test]
    fn unconstrained_facets_with_full_range_is_identity() {
        let rows = vec![
            listing("Bopal", "10"),
            listing("Thaltej", "20"),
            listing("Shela", "30"),
        ];
        let facets = extract_facets(&rows, FacetMode::Multi, reserved);
        let out = filter(
            &rows,
            &facets,
            &PriceRange::new(10.0, 30.0),
            None,
            price_of(PriceGrammar::Scalar),
            "Possession",
        );
        assert_eq!(out.len(), rows.len());
    }

    #[test]
    fn widening_the_range_never_drops_a_record() {
        let rows: Vec<Record> = ["5", "15", "25-35", "45", "60-70", "100"]
            .iter()
            .map(|p| listing("Bopal", p))
            .collect();
        let facets = extract_facets(&rows, FacetMode::Multi, reserved);
        let run = |lo: f64, hi: f64| {
            filter(
                &rows,
                &facets,
                &PriceRange::new(lo, hi),
                None,
                price_of(PriceGrammar::RangeCapable),
                "Possession",
            )
            .len()
        };

        let windows = [(30.0, 40.0), (20.0, 50.0), (10.0, 65.0), (0.0, 100.0)];
        let counts: Vec<_> = windows.iter().map(|(lo, hi)| run(*lo, *hi)).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
        assert_eq!(counts.last(), Some(&6));
    }

    #[test]
    fn possession_cutoff_is_on_or_before() {
        let row = Record::from_pairs([("Possession", "Dec 2027")]);
        assert!(!possession_match(&row, "Possession", ymd(2026, 6, 1)));
        assert!(possession_match(&row, "Possession", ymd(2028, 1, 1)));
        assert!(possession_match(&row, "Possession", ymd(2027, 12, 1)));
    }

    #[test]
    fn missing_or_unreadable_possession_passes() {
        let cutoff = ymd(2020, 1, 1);
        assert!(possession_match(&Record::new(), "Possession", cutoff));
        let odd = Record::from_pairs([("Possession", "Ready to move")]);
        assert!(possession_match(&odd, "Possession", cutoff));
        let no_year = Record::from_pairs([("Possession", "Dec")]);
        assert!(possession_match(&no_year, "Possession", cutoff));
    }
}
