//! The destination taxonomy and the classification of the raw destinations.

use crate::config::DestinationType;

use DestinationType::*;

/// The destinations of the reporting standard and the bucket each one belongs to.
///
/// Within a bucket, the entries are in the order of the rows of the report.
/// The matching is exact: case and whitespace matter.
pub static DESTINATION_TAXONOMY: &[(&str, DestinationType)] = &[
    (
        "Moved from one HOPWA funded project to HOPWA PH",
        Permanent,
    ),
    ("Owned by client, no ongoing housing subsidy", Permanent),
    ("Owned by client, with ongoing housing subsidy", Permanent),
    ("Rental by client, no ongoing housing subsidy", Permanent),
    ("Rental by client, with VASH housing subsidy", Permanent),
    ("Rental by client, with GPD TIP housing subsidy", Permanent),
    (
        "Rental by client, with other ongoing housing subsidy",
        Permanent,
    ),
    (
        "Permanent housing (other than RRH) for formerly homeless persons",
        Permanent,
    ),
    ("Staying or living with family, permanent tenure", Permanent),
    ("Staying or living with friends, permanent tenure", Permanent),
    ("Rental by client, with RRH or equivalent subsidy", Permanent),
    (
        "Rental by client, with HCV voucher (tenant or project based)",
        Permanent,
    ),
    ("Rental by client in a public housing unit", Permanent),
    (
        "Emergency shelter, including hotel or motel paid for with emergency shelter voucher, or RHY-funded Host Home shelter",
        Temporary,
    ),
    ("Moved from one HOPWA funded project to HOPWA TH", Temporary),
    (
        "Transitional housing for homeless persons (including homeless youth)",
        Temporary,
    ),
    (
        "Staying or living with family, temporary tenure (e.g. room, apartment or house)",
        Temporary,
    ),
    (
        "Staying or living with friends, temporary tenure (e.g. room, apartment or house)",
        Temporary,
    ),
    (
        "Place not meant for habitation (e.g., a vehicle, an abandoned building, bus / train / subway station / airport or anywhere outside)",
        Temporary,
    ),
    ("Safe Haven", Temporary),
    (
        "Hotel or motel paid for without emergency shelter voucher",
        Temporary,
    ),
    ("Host Home (non-crisis)", Temporary),
    ("Foster care home or group foster care home", Institutional),
    (
        "Psychiatric hospital or other psychiatric facility",
        Institutional,
    ),
    (
        "Substance abuse treatment facility or detox center",
        Institutional,
    ),
    (
        "Hospital or other residential non-psychiatric medical facility",
        Institutional,
    ),
    ("Jail, prison, or juvenile detention facility", Institutional),
    ("Long-term care facility or nursing home", Institutional),
    (
        "Residential project or halfway house with no homeless criteria",
        Other,
    ),
    ("Deceased", Other),
    ("Other", Other),
    ("Client Doesn't Know/Client Refused", Other),
    ("Data Not Collected (no exit interview completed)", Other),
];

impl DestinationType {
    /// The destinations of this bucket, in report order.
    pub fn destinations(&self) -> Vec<&'static str> {
        DESTINATION_TAXONOMY
            .iter()
            .filter(|(_, dt)| dt == self)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// The bucket of a raw destination, regardless of move-in date.
/// `None` when the text is not part of the taxonomy.
pub fn lookup_destination(raw_destination: &str) -> Option<DestinationType> {
    // Buckets are searched in report order, the first one listing the destination wins.
    DestinationType::ordered().into_iter().find(|dt| {
        DESTINATION_TAXONOMY
            .iter()
            .any(|(name, t)| t == dt && *name == raw_destination)
    })
}

/// The destination type used by the report.
///
/// A household that never moved in has no destination type, even when its
/// destination is a known one.
pub fn classify_destination(
    raw_destination: Option<&str>,
    has_move_in_date: bool,
) -> Option<DestinationType> {
    if !has_move_in_date {
        return None;
    }
    raw_destination.and_then(lookup_destination)
}

/// True when the destination is in one of the buckets.
pub fn is_known_destination(raw_destination: &str) -> bool {
    lookup_destination(raw_destination).is_some()
}
