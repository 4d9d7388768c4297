//! Pcgstat - statistical comparison of PCG and non-PCG game projects
//!
//! This library provides the core functionality for the `pcgstat` binary:
//! CSV ingestion and cleaning, the normality-driven test-selection procedure
//! (Shapiro-Wilk, then Student's t or Mann-Whitney U), ordinary
//! least-squares regression over metric pairs, console reporting, and chart
//! rendering.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod plot;
pub mod report;
