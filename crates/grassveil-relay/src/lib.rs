//! Position relay for grassveil - TCP server that fans player updates out to
//! every other connected player
//!
//! Run the relay in your app:
//! ```ignore
//! let server = RelayServer::bind(("0.0.0.0", DEFAULT_PORT)).await?;
//! server.run().await?;
//! ```

pub mod protocol;
pub mod server;

pub use protocol::*;
pub use server::{Relay, RelayError, RelayServer};

/// Default relay port
pub const DEFAULT_PORT: u16 = 3000;
