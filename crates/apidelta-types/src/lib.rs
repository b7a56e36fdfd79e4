//! Document model for apidelta.
//!
//! These types are the read-only input of the diff engine: an already-parsed
//! API description with references resolved. Every other apidelta crate
//! depends on `apidelta-types`.
//!
//! # Key Types
//!
//! - [`Document`] / [`Paths`] / [`PathItem`] -- top-level structure
//! - [`Operation`] / [`Parameter`] / [`RequestBody`] / [`Response`] -- per-endpoint data
//! - [`Schema`] -- data-shape node with composition and bounds
//! - [`EndpointKey`] / [`Method`] -- endpoint identity
//! - [`DeprecationState`] -- deprecation flag plus interpreted sunset date

pub mod deprecation;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod operation;
pub mod schema;

pub use deprecation::{parse_sunset, DeprecationState, SUNSET_EXTENSION};
pub use document::{Components, Document, Info, PathItem, Paths, SecurityScheme, Server};
pub use endpoint::{normalize_template, template_params, EndpointKey, Method, ParameterLocation};
pub use error::TypeError;
pub use operation::{
    MediaType, Operation, Parameter, RequestBody, Response, SecurityRequirement, StatusClass,
};
pub use schema::Schema;
