//! Domain models for the PhysioCare client.

mod envelope;
mod patient;
mod physio;
mod record;
mod session;

pub use envelope::*;
pub use patient::*;
pub use physio::*;
pub use record::*;
pub use session::*;
