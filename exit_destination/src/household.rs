//! Ages at exit and household composition.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::debug;
use std::collections::HashMap;

use crate::config::*;

/// The date formats found in the exports, tried in order.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Age from which a household member counts as an adult.
pub const ADULT_AGE: u32 = 18;

/// Parses a date from an export. Timestamps are accepted and truncated to the day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d);
        }
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// The age in completed years at the exit date.
///
/// `None` when the exit precedes the birth.
pub fn age_at(birth: NaiveDate, exit: NaiveDate) -> Option<u32> {
    let before_birthday = (exit.month(), exit.day()) < (birth.month(), birth.day());
    let age = exit.year() - birth.year() - i32::from(before_birthday);
    u32::try_from(age).ok()
}

/// The age at exit from the textual dates of an export.
/// Unknown (`None`) when either date is missing or cannot be read.
pub fn calculate_age(birth_date: &str, exit_date: &str) -> Option<u32> {
    age_at(parse_date(birth_date)?, parse_date(exit_date)?)
}

/// Counts of the members of one household by age group.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct HouseholdComposition {
    pub adults: u32,
    pub children: u32,
    pub unknown: u32,
}

impl HouseholdComposition {
    pub fn add_member(&mut self, age: Option<u32>) {
        match age {
            Some(a) if a >= ADULT_AGE => self.adults += 1,
            Some(_) => self.children += 1,
            None => self.unknown += 1,
        }
    }

    pub fn from_ages(ages: &[Option<u32>]) -> HouseholdComposition {
        let mut res = HouseholdComposition::default();
        for age in ages {
            res.add_member(*age);
        }
        res
    }

    /// The household type. The rules are applied in order:
    /// - adults and no children, no member of unknown age: without children
    /// - adults and children, unknown ages allowed: with children and adults
    /// - only children, no member of unknown age: with only children
    /// - anything else: unknown
    pub fn household_type(&self) -> HouseholdType {
        let HouseholdComposition {
            adults,
            children,
            unknown,
        } = *self;
        if adults > 0 && children == 0 && unknown == 0 {
            HouseholdType::WithoutChildren
        } else if adults > 0 && children > 0 {
            HouseholdType::WithChildrenAndAdults
        } else if adults == 0 && children > 0 && unknown == 0 {
            HouseholdType::WithOnlyChildren
        } else {
            HouseholdType::Unknown
        }
    }
}

/// The household type of a household, given the ages of its members.
pub fn classify_household(member_ages: &[Option<u32>]) -> HouseholdType {
    HouseholdComposition::from_ages(member_ages).household_type()
}

/// The composition of every household present in the records.
pub fn household_compositions(
    records: &[EnrollmentRecord],
) -> HashMap<String, HouseholdComposition> {
    let mut res: HashMap<String, HouseholdComposition> = HashMap::new();
    for r in records.iter() {
        res.entry(r.household_id.clone())
            .or_default()
            .add_member(r.age);
    }
    res
}

/// Fills the household type of every record from the composition of its household.
pub fn assign_household_types(records: &mut [EnrollmentRecord]) {
    let compositions = household_compositions(records);
    debug!(
        "assign_household_types: {} households for {} records",
        compositions.len(),
        records.len()
    );
    for r in records.iter_mut() {
        r.household_type = compositions
            .get(&r.household_id)
            .map(|c| c.household_type())
            .unwrap_or(HouseholdType::Unknown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_years() {
        assert_eq!(calculate_age("03/15/1990", "03/14/2020"), Some(29));
        assert_eq!(calculate_age("03/15/1990", "03/15/2020"), Some(30));
        assert_eq!(calculate_age("12/31/2019", "01/01/2020"), Some(0));
    }

    #[test]
    fn unknown_ages() {
        assert_eq!(calculate_age("", "03/15/2020"), None);
        assert_eq!(calculate_age("03/15/1990", "not a date"), None);
        // Exit before birth
        assert_eq!(calculate_age("03/15/2020", "03/14/2020"), None);
    }

    #[test]
    fn other_date_formats() {
        assert_eq!(
            parse_date("2020-03-15"),
            NaiveDate::from_ymd_opt(2020, 3, 15)
        );
        assert_eq!(
            parse_date("2020-03-15 00:00:00"),
            NaiveDate::from_ymd_opt(2020, 3, 15)
        );
        assert_eq!(parse_date(" 3/5/2020"), NaiveDate::from_ymd_opt(2020, 3, 5));
    }

    #[test]
    fn household_rules() {
        use HouseholdType::*;
        assert_eq!(classify_household(&[Some(25), Some(10)]), WithChildrenAndAdults);
        assert_eq!(classify_household(&[Some(25), Some(40)]), WithoutChildren);
        assert_eq!(classify_household(&[Some(12), Some(17)]), WithOnlyChildren);
        assert_eq!(classify_household(&[Some(25), Some(10), None]), WithChildrenAndAdults);
        // Adults with a member of unknown age are not known to be without children.
        assert_eq!(classify_household(&[Some(25), None]), Unknown);
        assert_eq!(classify_household(&[Some(10), None]), Unknown);
        assert_eq!(classify_household(&[None]), Unknown);
        assert_eq!(classify_household(&[]), Unknown);
        assert_eq!(classify_household(&[Some(18)]), WithoutChildren);
    }

    #[test]
    fn known_ages_always_give_a_known_type() {
        let ages = [None, Some(5), Some(30)];
        for a in ages {
            for b in ages {
                let t = classify_household(&[a, b]);
                if a.is_some() && b.is_some() {
                    assert_ne!(t, HouseholdType::Unknown);
                }
                if a.is_none() && b.is_none() {
                    assert_eq!(t, HouseholdType::Unknown);
                }
            }
        }
    }
}
