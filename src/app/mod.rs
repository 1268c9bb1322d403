pub mod catalog_loader;
pub mod pipelines;
pub mod report;
pub mod text_units;
