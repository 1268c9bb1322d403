pub mod catalog;
pub mod catalog_builder;
pub mod code;
pub mod composer;
pub mod engine;
pub mod matcher;
pub mod resolver;
pub mod scanner;
pub mod variants;

pub use crate::domain::model::{CandidateMatch, Course, Document, ScanReport, ValidatedMatch};
pub use crate::domain::ports::{CatalogSource, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
