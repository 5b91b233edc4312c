pub mod config;
pub mod convert;
pub mod error;
pub mod gate;
pub mod host;
pub mod parser;
pub mod record;
pub mod session;

pub use config::{FieldNames, Locale, PollConfig, Settings};
pub use error::{ExtractionError, GateError, HostError, SessionError};
pub use record::{ActivityRecord, Km, Split};
pub use session::{PollState, Session, SessionSnapshot};
