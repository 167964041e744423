//! Command implementations

pub mod completions;
pub mod dispatch;
pub mod doc;
pub mod export;
pub mod kpi;
pub mod ncr;
pub mod opp;
pub mod pdca;
pub mod proc;
pub mod reset;
pub mod risk;
pub mod status;
pub mod theme;
