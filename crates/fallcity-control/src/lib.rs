//! Control surface for fallcity - TCP server for live parameter edits
//!
//! Start the control server in your app:
//! ```ignore
//! let handler = Arc::new(Mutex::new(MyHandler::new()));
//! let _server = ControlServer::start(handler, DEFAULT_PORT);
//! ```
//!
//! Each request is one JSON line, e.g.
//! `{"cmd":"SetSpeed","params":{"value":1.2}}`, answered by one JSON line.

pub mod protocol;
pub mod server;

pub use protocol::*;
pub use server::{ControlHandler, ControlServer};

/// Default control server port
pub const DEFAULT_PORT: u16 = 9743;
