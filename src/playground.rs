//! Main module for playground functionality

pub mod config;
pub mod error;
pub mod evaluation;
pub mod lexer;
pub mod processor;
pub mod segmentation;
pub mod transform;
pub mod watch;

pub use error::{ErrorReport, PlaygroundError};
pub use evaluation::{Evaluation, Playground, Status};
pub use segmentation::{segment, segment_source, UnitMap};
