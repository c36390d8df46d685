pub mod session;
pub mod transcript;

pub use session::{DemoSession, SessionStore};
pub use transcript::{Transcript, TranscriptStore};
