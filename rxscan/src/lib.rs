//! rxscan: prescription image scanning.
//!
//! A photographed prescription goes through [`ocr`] preprocessing and text
//! recognition, then [`extraction`] pulls out patient, doctor, drug, and
//! quantity fields. [`pipeline::PrescriptionPipeline`] ties the stages
//! together and optionally hands the result to a [`db::RecordSink`] and a
//! [`catalog::CatalogMatcher`]. [`api`] exposes the pipeline over HTTP.

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pipeline;
