//! Client library for the GraceDB gravitational-wave candidate database,
//! plus the command tree behind the `gracedb` binary.

pub mod auth;
pub mod cert;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod ops;
pub mod resource;
pub mod service;
pub mod template;
pub mod transport;

pub use client::{ClientOptions, GraceDb};
pub use error::{Error, Result};
pub use resource::{ObjectHandle, ObjectKind};
