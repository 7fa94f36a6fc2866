//! wkpack-lib: build preparation and packaging for wkhtmltox targets
//!
//! This crate provides the two-phase target pipeline used to turn a wkhtmltox
//! build into an installable artifact:
//! - `prepare_build`: compute the compiler environment and extra build arguments
//! - `package_build`: stage the install tree and drive the platform packager
//!
//! Each supported platform (macOS, Windows) implements [`pipeline::Pipeline`].

pub mod command;
pub mod config;
pub mod consts;
pub mod environment;
pub mod fetch;
pub mod pipeline;
pub mod platform;
pub mod scripts;
pub mod target;
pub mod tools;
pub mod util;
pub mod version;

pub use config::{Config, TargetConfig};
pub use environment::BuildEnvironment;
pub use pipeline::{BuildContext, PackageOutcome, Pipeline, PipelineError, Prepared, pipeline_for};
pub use target::Target;
pub use version::Version;
