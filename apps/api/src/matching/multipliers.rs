//! Location and salary multipliers applied on top of the weighted score.
//! Both are always within [0, 1].

use crate::models::criteria::SalaryBounds;
use crate::models::job::JobListing;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierConfig {
    /// Applied when the listing matches none of the requested locations.
    pub location_penalty: f64,
    /// Multiplier lost per unit of relative distance outside the requested band.
    pub salary_decay: f64,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            location_penalty: 0.5,
            salary_decay: 1.0,
        }
    }
}

/// 1.0 when the listing is in any requested location (or none were requested).
pub fn location_multiplier(listing: &JobListing, requested: &[String], config: &MultiplierConfig) -> f64 {
    let requested: Vec<String> = requested
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();
    if requested.is_empty() {
        return 1.0;
    }

    let display = listing.location.to_lowercase();
    let areas: Vec<String> = listing.area.iter().map(|a| a.to_lowercase()).collect();
    let overlaps = |place: &str, wanted: &str| {
        !place.is_empty() && (place.contains(wanted) || wanted.contains(place))
    };
    let matched = requested.iter().any(|wanted| {
        overlaps(display.as_str(), wanted.as_str())
            || areas.iter().any(|a| overlaps(a.as_str(), wanted.as_str()))
    });

    if matched {
        1.0
    } else {
        config.location_penalty.clamp(0.0, 1.0)
    }
}

/// 1.0 when the listing's band overlaps the requested band; otherwise decays
/// with the relative distance outside it, floored at 0.
///
/// A listing with no salary, or in another currency, is not comparable and
/// scores 1.0.
pub fn salary_range_multiplier(listing: &JobListing, bounds: &SalaryBounds, config: &MultiplierConfig) -> f64 {
    let salary = &listing.salary;
    if salary.is_unknown() {
        return 1.0;
    }
    if !salary.currency.is_empty()
        && !bounds.currency.is_empty()
        && !salary.currency.eq_ignore_ascii_case(&bounds.currency)
    {
        return 1.0;
    }

    // A one-sided band is a single point.
    let listing_low = salary.min.or(salary.max).unwrap_or(0.0);
    let listing_high = salary.max.or(salary.min).unwrap_or(0.0);

    let distance = match (bounds.min, bounds.max) {
        (Some(min), _) if listing_high < min && min > 0.0 => (min - listing_high) / min,
        (_, Some(max)) if listing_low > max && max > 0.0 => (listing_low - max) / max,
        _ => 0.0,
    };

    (1.0 - config.salary_decay.max(0.0) * distance).clamp(0.0, 1.0)
}
