//! Field names and the required-field rule
//!
//! Parsers look at the keys of an incoming payload before building anything,
//! so a payload without bus/id/mode is rejected outright instead of being
//! partially constructed.

/// CAN bus the message travels on
pub const BUS_KEY: &str = "bus";
/// Arbitration id
pub const ID_KEY: &str = "id";
/// Diagnostic service mode
pub const MODE_KEY: &str = "mode";
pub const PID_KEY: &str = "pid";
pub const PAYLOAD_KEY: &str = "payload";
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Free-form vendor fields carried alongside the message
pub const EXTRAS_KEY: &str = "extras";
pub const MULTIPLE_RESPONSES_KEY: &str = "multiple_responses";
pub const FREQUENCY_KEY: &str = "frequency";
pub const NAME_KEY: &str = "name";
pub const SUCCESS_KEY: &str = "success";
pub const VALUE_KEY: &str = "value";
pub const NEGATIVE_RESPONSE_CODE_KEY: &str = "negative_response_code";

/// Fields every diagnostic request must carry
pub const REQUIRED_FIELDS: [&str; 3] = [ID_KEY, BUS_KEY, MODE_KEY];

/// Fields every diagnostic response must carry
pub const RESPONSE_REQUIRED_FIELDS: [&str; 4] = [ID_KEY, BUS_KEY, MODE_KEY, SUCCESS_KEY];

/// Check that `fields` is a superset of [`REQUIRED_FIELDS`]
///
/// Only names are checked, never values.
pub fn contains_required_fields<I, S>(fields: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    missing_fields(fields, &REQUIRED_FIELDS).is_empty()
}

/// Names from `required` that do not appear in `fields`
pub fn missing_fields<I, S>(fields: I, required: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let present: Vec<S> = fields.into_iter().collect();
    required
        .iter()
        .filter(|name| !present.iter().any(|field| field.as_ref() == **name))
        .map(|name| name.to_string())
        .collect()
}
