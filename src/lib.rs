//! QMT: Quality Management Toolkit
//!
//! Records for a quality management system (documents, processes, risks,
//! opportunities, PDCA cycles, non-conformities and KPIs) held in a single
//! immutable state, changed only through reducer actions and persisted
//! as a JSON snapshot.

pub mod cli;
pub mod core;
pub mod entities;
