//! Lectern Report Layer
//!
//! The pipeline's external collaborators around the core: extracting the
//! table of contents before chunking begins, and integrating the persisted
//! artifacts into the final report after the pipeline drains.
//!
//! Both components are thin oracle adapters: one call each, no internal
//! concurrency.

#![warn(missing_docs)]

mod error;
mod integrator;
mod toc;

pub use error::ReportError;
pub use integrator::ReportIntegrator;
pub use toc::TocExtractor;
