//! Built-in rule catalogue.

pub mod deprecation;
pub mod endpoints;
pub mod enums;
pub mod parameters;
pub mod request_body;
pub mod required_properties;
pub mod responses;
pub mod security;

use crate::rule::Rule;

/// Every built-in rule, in run order.
pub fn catalogue() -> Vec<Rule> {
    vec![
        endpoints::ENDPOINT_ADDED,
        deprecation::API_PATH_REMOVED_BEFORE_SUNSET,
        deprecation::API_REMOVED_BEFORE_SUNSET,
        deprecation::API_DEPRECATED_SUNSET_MISSING,
        deprecation::API_SUNSET_DATE_TOO_SMALL,
        deprecation::API_INVALID_SUNSET_DATE,
        deprecation::PROPERTY_SUNSET_DATE_TOO_SMALL,
        deprecation::PROPERTY_REMOVED_BEFORE_SUNSET,
        required_properties::REQUEST_REQUIRED_PROPERTY_ADDED,
        required_properties::REQUEST_PROPERTY_BECAME_REQUIRED,
        required_properties::RESPONSE_REQUIRED_PROPERTY_REMOVED,
        required_properties::RESPONSE_PROPERTY_BECAME_OPTIONAL,
        required_properties::RESPONSE_REQUIRED_PROPERTY_BECAME_NOT_WRITE_ONLY,
        enums::REQUEST_PARAMETER_ENUM_VALUE_ADDED,
        enums::REQUEST_PARAMETER_ENUM_VALUE_REMOVED,
        enums::REQUEST_HEADER_PROPERTY_BECAME_ENUM,
        enums::REQUEST_PROPERTY_ENUM_VALUE_REMOVED,
        enums::RESPONSE_PROPERTY_ENUM_VALUE_ADDED,
        parameters::REQUEST_PARAMETER_MIN_ITEMS_SET,
        parameters::NEW_REQUIRED_REQUEST_PARAMETER,
        parameters::REQUEST_PARAMETER_BECAME_REQUIRED,
        parameters::REQUEST_PARAMETER_REMOVED,
        parameters::REQUEST_PARAMETER_TYPE_CHANGED,
        request_body::REQUEST_BODY_BECAME_REQUIRED,
        responses::RESPONSE_SUCCESS_STATUS_REMOVED,
        responses::RESPONSE_NON_SUCCESS_STATUS_REMOVED,
        responses::RESPONSE_MEDIA_TYPE_REMOVED,
        security::API_SECURITY_REMOVED,
        security::API_SECURITY_ADDED,
        security::API_SECURITY_SCOPE_ADDED,
        security::API_TAG_REMOVED,
    ]
}
