//! # DevBook Core
//!
//! The domain layer of the DevBook backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, field allow-lists, pagination, input validation, the bearer-token
//! authorization gate and the ports that infrastructure implements.

pub mod authorization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod validation;

pub use error::{DomainError, RepoError};
pub use validation::Validator;
