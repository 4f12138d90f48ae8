//! OVMS telemetry bridge.
//!
//! The classification core ([`catalog`], [`classifier`], [`resolver`],
//! [`parser`], [`message`]) is synchronous and free of I/O. The runtime
//! modules ([`config`], [`state`], [`entity`], [`tracker`], [`command`],
//! [`service`], [`bridge`], [`mqtt`]) connect it to a broker.

pub mod blacklist;
pub mod catalog;
pub mod category;
pub mod classifier;
pub mod duration;
pub mod error;
pub mod gps;
pub mod message;
pub mod parser;
pub mod resolver;
pub mod topic;

pub mod bridge;
pub mod command;
pub mod config;
pub mod entity;
pub mod mqtt;
pub mod service;
pub mod state;
pub mod tracker;

pub use catalog::{MetricCatalog, MetricDefinition, VehicleModel};
pub use category::{Category, EntityType};
pub use error::{CommandError, ConfigError, Rejected};
pub use message::{Engine, ParsedMessage};
pub use parser::{TypedValue, VectorValue};
