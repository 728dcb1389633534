use relaywire::prelude::*;
use relaywire::protocol::{Vec2f, Vec2i};
use relaywire::transport::LoopbackEvent;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Remote side: decode whatever the client puts on the wire
// ---------------------------------------------------------------------------

async fn watch(mut remote: LoopbackRemote) {
    while let Some(event) = remote.next().await {
        match event {
            LoopbackEvent::Packet { peer, data, .. } => match Envelope::parse(&data) {
                Ok(Envelope { kind, payload: Payload::Text(text) }) => {
                    tracing::info!(%peer, %kind, %text, "text message");
                }
                Ok(Envelope { kind, payload: Payload::Record(record) }) => {
                    tracing::info!(%peer, %kind, record = ?record.kind, "update record\n{record}");
                }
                Ok(Envelope { kind, payload: Payload::Raw(raw) }) => {
                    tracing::info!(%peer, %kind, len = raw.len(), "raw message");
                }
                Err(e) => tracing::warn!(%peer, error = %e, "undecodable packet"),
            },
            LoopbackEvent::Connected { peer, address, proxy, .. } => {
                tracing::info!(%peer, %address, proxied = proxy.is_some(), "peer connected");
            }
            other => tracing::debug!(?other, "transport event"),
        }
    }
}

// ---------------------------------------------------------------------------
// Client bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ClientConfig::default(),
    };
    let mode = config.default_wire_mode;

    let (transport, remote) = LoopbackTransport::new();
    let watcher = tokio::spawn(watch(remote));

    let mut client = Client::with_config(transport, TracingSink, config)?;
    client.connect("127.0.0.1", 17091, mode)?;

    client.send_generic_text("action|enter_game\n");
    client.send_game_message("action|input\n|text|hello");

    let mut state = UpdateRecord::new(RecordKind::State);
    state.net_id = 1;
    state.pos = Vec2f::new(320.0, 256.0);
    state.tile = Vec2i::new(10, 8);
    client.send_game_packet(&state);

    // Dropping the client disconnects and closes the loopback channel.
    drop(client);
    watcher.await?;
    Ok(())
}
