//! # Relaywire
//!
//! Client transport shim for a datagram-based game protocol.
//!
//! Relaywire frames game messages behind a 4-byte kind, encodes the fixed
//! 60-byte update record, keeps proxy parameters in zeroed bounded
//! buffers, and fixes one wire mode per connection. The datagram transport
//! itself plugs in through [`prelude::Transport`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relaywire::prelude::*;
//!
//! # fn main() -> Result<(), RelaywireError> {
//! let (transport, _remote) = LoopbackTransport::new();
//! let mut client = Client::new(transport);
//! client.set_proxy("10.0.0.5", 1080)?;
//! client.connect("127.0.0.1", 17091, WireMode::New)?;
//!
//! let mut record = UpdateRecord::new(RecordKind::State);
//! record.net_id = 7;
//! client.send_game_packet(&record);
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::RelaywireError;

pub use relaywire_client as client;
pub use relaywire_protocol as protocol;
pub use relaywire_transport as transport;

pub mod prelude {
    pub use crate::RelaywireError;
    pub use relaywire_client::{
        Client, ClientConfig, ClientError, DiagnosticSink, NoopSink, SendStatus,
        TracingSink,
    };
    pub use relaywire_protocol::{
        Envelope, MessageKind, Payload, ProtocolError, RecordKind, UpdateRecord,
    };
    pub use relaywire_transport::{Host, Transport, TransportError, WireMode};

    #[cfg(feature = "loopback")]
    pub use relaywire_transport::{LoopbackRemote, LoopbackTransport};
}
