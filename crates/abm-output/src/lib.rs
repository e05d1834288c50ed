//! `abm-output` - run output writers for the rust_abm framework.
//!
//! | Backend | Files created                                          |
//! |---------|--------------------------------------------------------|
//! | CSV     | `scorestats.csv`, `modestats.csv`, `agent_scores.csv`  |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`ControlerOutputListener`], which implements `abm_sim::ControlerListener`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use abm_output::{ControlerOutputListener, CsvWriter};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut out = ControlerOutputListener::new(writer);
//! controler.run(&mut out)?;
//! out.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod listener;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use listener::ControlerOutputListener;
pub use row::{AgentScoreRow, ModeStatsRow, ScoreStatsRow};
pub use writer::OutputWriter;
