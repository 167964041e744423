//! Record type definitions
//!
//! The quality system tracks the following records:
//!
//! **Documentation:**
//! - [`Document`] - Controlled documents (manuals, procedures, policies)
//! - [`Process`] - Documented processes with owned [`ProcessStep`]s
//!
//! **Risk-based thinking:**
//! - [`Risk`] - Risks classified by probability × impact
//! - [`Opportunity`] - Improvement opportunities
//!
//! **Improvement:**
//! - [`PdcaItem`] - Plan-Do-Check-Act cycles with derived progress
//! - [`NonConformity`] - Deviations with owned [`CorrectiveAction`]s
//! - [`Kpi`] - Curated indicators (update only)

pub mod document;
pub mod kpi;
pub mod ncr;
pub mod opportunity;
pub mod pdca;
pub mod process;
pub mod risk;

pub use document::Document;
pub use kpi::Kpi;
pub use ncr::{CorrectiveAction, NonConformity};
pub use opportunity::Opportunity;
pub use pdca::PdcaItem;
pub use process::{Process, ProcessStep};
pub use risk::Risk;
