// File: src/web_server.rs
// Web server with explorer page, REST API and per-connection WebSocket sessions

use anyhow::{Context, Result};
use axum::{
    extract::{ws::Message, ws::WebSocket, Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, Router},
    Json,
};
use futures::{sink::SinkExt, stream::{SplitSink, StreamExt}};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc::unbounded_channel};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::data_models::{AppConfig, BlockView, ChainView, TransactionView, WebSocketMessage};
use crate::ledger_gateway::{spawn_fetch, HttpGateway, LedgerGateway};
use crate::navigator::{Explorer, FetchOutcome, FetchRequest};
use crate::view_model::explorer_view;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<dyn LedgerGateway>,
}

/// Run the web server
pub async fn run_web_mode(
    config: &AppConfig,
    bind: &str,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    let app_state = AppState {
        config: config.clone(),
        gateway: Arc::new(HttpGateway::new(config)?),
    };

    let app = build_router(app_state, enable_cors);
    let listener = bind_listener(bind, port).await?;
    let addr = listener.local_addr()?;

    println!("🌐 Explorer available at: http://{}", addr);
    println!("🔌 WebSocket endpoint: ws://{}/ws", addr);
    println!("📊 API endpoints:");
    println!("   GET /api/chain - Full chain");
    println!("   GET /api/block/:hash - Block by hash");
    println!("   GET /api/transaction/:hash - Transaction by hash");
    println!("⛓  Ledger service: {}", config.node_url);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind `host:port`, where host may be a name, an IPv4 or a bare IPv6 address
async fn bind_listener(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {} port {}", host, port))
}

/// Routes for the explorer page, the REST API and WebSocket sessions
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(explorer_html))
        .route("/api/chain", get(get_chain))
        .route("/api/block/:hash", get(get_block))
        .route("/api/transaction/:hash", get(get_transaction))
        .route("/ws", get(websocket_handler))
        .with_state(state);

    if enable_cors {
        app = app.layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            ),
        );
    }
    app
}

/// Serve the explorer page
async fn explorer_html() -> Html<&'static str> {
    Html(include_str!("explorer.html"))
}

async fn get_chain(State(state): State<AppState>) -> Json<ChainView> {
    Json(state.gateway.fetch_full_chain().await)
}

async fn get_block(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BlockView>, StatusCode> {
    state
        .gateway
        .fetch_block_by_hash(&hash)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_transaction(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionView>, StatusCode> {
    state
        .gateway
        .fetch_transaction_by_hash(&hash)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// WebSocket connection handler
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

fn view_message(explorer: &Explorer) -> WebSocketMessage {
    WebSocketMessage::View {
        view: explorer_view(explorer),
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &WebSocketMessage,
) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            log::error!("Failed to encode websocket message: {}", e);
            true
        }
    }
}

/// One explorer session per connection.
///
/// The session task is the only owner of its `Explorer`; fetches run on
/// their own tasks and report back through `outcome_rx`.
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (outcome_tx, mut outcome_rx) = unbounded_channel::<FetchOutcome>();
    log::debug!("WebSocket session opened against {}", state.config.node_url);

    let mut explorer = Explorer::new();
    if let Some(request) = explorer.mount() {
        spawn_fetch(state.gateway.clone(), request, outcome_tx.clone());
    }

    if !send_message(&mut sender, &view_message(&explorer)).await {
        return;
    }

    loop {
        tokio::select! {
            outcome = outcome_rx.recv() => {
                let Some(outcome) = outcome else { break };
                if explorer.apply(outcome) && !send_message(&mut sender, &view_message(&explorer)).await {
                    break;
                }
            }

            msg = receiver.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => continue,
                };

                let reply = match serde_json::from_str::<WebSocketMessage>(&text) {
                    Ok(request) => {
                        let (reply, fetch) = handle_websocket_message(request, &mut explorer);
                        if let Some(fetch) = fetch {
                            spawn_fetch(state.gateway.clone(), fetch, outcome_tx.clone());
                        }
                        reply
                    }
                    Err(e) => WebSocketMessage::Error {
                        message: format!("Invalid message: {}", e),
                    },
                };

                if !send_message(&mut sender, &reply).await {
                    break;
                }
            }
        }
    }

    log::debug!("WebSocket session closed");
}

/// Apply one client message to the session's explorer
fn handle_websocket_message(
    message: WebSocketMessage,
    explorer: &mut Explorer,
) -> (WebSocketMessage, Option<FetchRequest>) {
    match message {
        WebSocketMessage::Select { hash } => {
            let fetch = explorer.select(&hash);
            (view_message(explorer), fetch)
        }
        WebSocketMessage::Expand { hash } => {
            let fetch = explorer.expand_transaction(&hash);
            (view_message(explorer), fetch)
        }
        WebSocketMessage::Toggle { hash } => {
            let fetch = explorer.toggle_transaction(&hash);
            (view_message(explorer), fetch)
        }
        WebSocketMessage::Collapse => {
            explorer.collapse_transaction();
            (view_message(explorer), None)
        }
        WebSocketMessage::Ping => (WebSocketMessage::Pong, None),
        _ => (
            WebSocketMessage::Error {
                message: "Unsupported message type".to_string(),
            },
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::{BlockHeader, SignedTransaction, TransactionDetails};
    use crate::view_model::DetailStatus;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use serde_json::Value;

    struct FixedGateway;

    #[async_trait]
    impl LedgerGateway for FixedGateway {
        async fn fetch_full_chain(&self) -> ChainView {
            ChainView {
                hashes: vec!["h1".into(), "h2".into()],
                length: 2,
            }
        }

        async fn fetch_block_by_hash(&self, hash: &str) -> Option<BlockView> {
            (hash == "h2").then(|| BlockView {
                index: 2,
                transaction_hashes: vec!["tx1".into()],
                transaction_count: 1,
                header: BlockHeader::default(),
                block_hash: "h2".into(),
                size: 0,
            })
        }

        async fn fetch_transaction_by_hash(&self, hash: &str) -> Option<TransactionView> {
            (hash == "tx1").then(|| TransactionView {
                transaction_hash: "tx1".into(),
                transaction_id: "id".into(),
                signed: SignedTransaction {
                    details: TransactionDetails {
                        sender: "A".into(),
                        recipient: "B".into(),
                        amount: 5.0,
                        nonce: 0,
                        timestamp: String::new(),
                        public_key: String::new(),
                    },
                    signature: String::new(),
                },
            })
        }
    }

    fn server() -> TestServer {
        let state = AppState {
            config: AppConfig::default(),
            gateway: Arc::new(FixedGateway),
        };
        TestServer::new(build_router(state, true)).unwrap()
    }

    #[tokio::test]
    async fn rest_endpoints_return_decoded_records() {
        let server = server();

        let response = server.get("/api/chain").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["chain"][1], "h2");

        let response = server.get("/api/block/h2").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["block_hash"], "h2");
        assert_eq!(json["transactions"][0], "tx1");

        let response = server.get("/api/transaction/tx1").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["signed_transaction"]["details"]["sender"], "A");
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let server = server();
        assert_eq!(server.get("/api/block/h1").await.status_code(), 404);
        assert_eq!(server.get("/api/transaction/nope").await.status_code(), 404);
    }

    #[tokio::test]
    async fn serves_explorer_page() {
        let response = server().get("/").await;
        assert_eq!(response.status_code(), 200);
        assert!(response.text().contains("Ledger Explorer"));
    }

    #[tokio::test]
    async fn session_messages_drive_the_explorer() {
        let gateway = FixedGateway;
        let mut explorer = Explorer::new();
        let mount = explorer.mount().unwrap();
        explorer.apply(mount.resolve(&gateway).await);

        let (reply, fetch) = handle_websocket_message(WebSocketMessage::Select { hash: "h2".into() }, &mut explorer);
        let WebSocketMessage::View { view } = reply else {
            panic!("expected view");
        };
        let chain = view.chain.unwrap();
        assert!(chain.rows[1].active);
        assert_eq!(chain.block_status, DetailStatus::Loading);

        explorer.apply(fetch.unwrap().resolve(&gateway).await);
        let (_, fetch) = handle_websocket_message(WebSocketMessage::Toggle { hash: "tx1".into() }, &mut explorer);
        explorer.apply(fetch.unwrap().resolve(&gateway).await);

        let WebSocketMessage::View { view } = view_message(&explorer) else {
            unreachable!()
        };
        let entry = &view.chain.unwrap().block.unwrap().entries[0];
        assert!(entry.expanded);
        assert_eq!(entry.transaction.as_ref().unwrap().amount, 5.0);

        let (reply, fetch) = handle_websocket_message(WebSocketMessage::Collapse, &mut explorer);
        assert!(fetch.is_none());
        let WebSocketMessage::View { view } = reply else {
            panic!("expected view");
        };
        assert!(!view.chain.unwrap().block.unwrap().entries[0].expanded);

        // expanding the same entry again reuses the resolved transaction
        let (reply, fetch) = handle_websocket_message(WebSocketMessage::Expand { hash: "tx1".into() }, &mut explorer);
        assert!(fetch.is_none());
        let WebSocketMessage::View { view } = reply else {
            panic!("expected view");
        };
        let entry = &view.chain.unwrap().block.unwrap().entries[0];
        assert!(entry.expanded);
        assert_eq!(entry.transaction.as_ref().unwrap().sender, "A");
    }

    #[tokio::test]
    async fn binds_ipv4_and_bare_ipv6_hosts() {
        let listener = bind_listener("127.0.0.1", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().is_ipv4());

        // hosts without IPv6 cannot exercise the second case
        if std::net::TcpListener::bind("[::1]:0").is_err() {
            return;
        }
        let listener = bind_listener("::1", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().is_ipv6());
    }

    #[test]
    fn ping_and_unsupported_messages() {
        let mut explorer = Explorer::new();
        let (reply, fetch) = handle_websocket_message(WebSocketMessage::Ping, &mut explorer);
        assert!(matches!(reply, WebSocketMessage::Pong));
        assert!(fetch.is_none());

        let (reply, _) = handle_websocket_message(WebSocketMessage::Pong, &mut explorer);
        assert!(matches!(reply, WebSocketMessage::Error { .. }));
    }
}
