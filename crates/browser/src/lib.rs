//! Browser driving for meetpilot.
//!
//! The dispatcher talks to the [`Driver`] capability trait; the concrete
//! [`CdpDriver`] owns a single Chrome process and a Chrome DevTools Protocol
//! connection. Meeting join sequences are built on top of the same trait so
//! they can be exercised against fakes in tests.

pub mod cdp;
pub mod driver;
pub mod meeting;

pub use driver::{CdpDriver, Driver, Selector, SelectorKind};
pub use meeting::{join_meeting, JoinOutcome, JoinPhase, MeetingJoinRequest, MeetingPlatform};
