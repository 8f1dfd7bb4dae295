use std::{io, net::TcpStream, time::Duration};

use serde_json::json;
use tungstenite::{Message, WebSocket, stream::MaybeTlsStream};

use crate::{
    backend::{
        AutomationBackend, ScreenshotFormat,
        protocol::{
            Hello, Identified, Identify, OpCode, RPC_VERSION, RawMessage, Request,
            RequestResponse, auth_response, decode_image_data,
        },
    },
    config::ConnectionConfig,
    foundation::{
        core::{Canvas, SceneItemId, Transform},
        error::{AlignError, AlignResult},
    },
};

/// How long `disconnect` waits for the server to acknowledge the close.
const CLOSE_ACK_TIMEOUT: Duration = Duration::from_millis(500);

/// Blocking obs-websocket v5 client.
pub struct ObsClient {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    next_request_id: u64,
    rpc_version: u32,
    closed: bool,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoInfo {
    base_width: u32,
    base_height: u32,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneItemIdResponse {
    scene_item_id: SceneItemId,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneItemTransformResponse {
    scene_item_transform: Transform,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotResponse {
    #[serde(default)]
    image_data: String,
}

impl ObsClient {
    /// Open the socket and complete the `Hello`/`Identify` handshake.
    #[tracing::instrument(skip(cfg), fields(host = %cfg.host, port = cfg.port))]
    pub fn connect(cfg: &ConnectionConfig) -> AlignResult<Self> {
        cfg.validate()?;

        let url = cfg.url();
        let (socket, _response) = tungstenite::connect(url.as_str())
            .map_err(|e| AlignError::connection(format!("connect to '{url}': {e}")))?;

        let mut client = Self {
            socket,
            next_request_id: 1,
            rpc_version: RPC_VERSION,
            closed: false,
        };
        client.identify(cfg.password.as_deref())?;
        tracing::info!(url = %url, rpc_version = client.rpc_version, "connected");
        Ok(client)
    }

    /// RPC version agreed during the handshake.
    pub fn rpc_version(&self) -> u32 {
        self.rpc_version
    }

    fn identify(&mut self, password: Option<&str>) -> AlignResult<()> {
        let hello: Hello = self.read_message()?.payload(OpCode::Hello)?;
        tracing::debug!(server = %hello.obs_web_socket_version, "received hello");

        let authentication = match (&hello.authentication, password) {
            (Some(auth), Some(pw)) => Some(auth_response(pw, &auth.salt, &auth.challenge)),
            (Some(_), None) => {
                return Err(AlignError::connection(
                    "server requires authentication but no password is configured",
                ));
            }
            (None, _) => None,
        };

        self.send(&RawMessage::new(
            OpCode::Identify,
            Identify {
                rpc_version: RPC_VERSION.min(hello.rpc_version),
                authentication,
                event_subscriptions: 0,
            },
        )?)?;

        let identified: Identified = self.read_message()?.payload(OpCode::Identified)?;
        self.rpc_version = identified.negotiated_rpc_version;
        Ok(())
    }

    fn send(&mut self, msg: &RawMessage) -> AlignResult<()> {
        let text = msg.to_json()?;
        tracing::trace!(op = msg.op, "send");
        self.socket.send(Message::text(text))?;
        Ok(())
    }

    fn read_message(&mut self) -> AlignResult<RawMessage> {
        loop {
            match self.socket.read()? {
                Message::Text(text) => return RawMessage::parse(text.as_str()),
                Message::Close(frame) => {
                    self.closed = true;
                    let reason = frame
                        .map(|f| format!("code {}: {}", u16::from(f.code), &*f.reason))
                        .unwrap_or_else(|| "no reason given".to_string());
                    return Err(AlignError::connection(format!(
                        "server closed the connection ({reason})"
                    )));
                }
                _ => continue,
            }
        }
    }

    /// Send one request and wait for its response, skipping interleaved events.
    pub fn request(
        &mut self,
        request_type: &str,
        request_data: serde_json::Value,
    ) -> AlignResult<serde_json::Value> {
        let request_id = self.next_request_id.to_string();
        self.next_request_id += 1;

        self.send(&RawMessage::new(
            OpCode::Request,
            Request {
                request_type: request_type.to_string(),
                request_id: request_id.clone(),
                request_data,
            },
        )?)?;

        loop {
            let msg = self.read_message()?;
            if msg.op != OpCode::RequestResponse as u8 {
                tracing::trace!(op = msg.op, "ignoring message while awaiting response");
                continue;
            }
            let resp: RequestResponse = msg.payload(OpCode::RequestResponse)?;
            if resp.request_id != request_id {
                tracing::debug!(id = %resp.request_id, "ignoring response to another request");
                continue;
            }
            return resp.into_result();
        }
    }

    fn request_as<T: serde::de::DeserializeOwned>(
        &mut self,
        request_type: &str,
        request_data: serde_json::Value,
    ) -> AlignResult<T> {
        let data = self.request(request_type, request_data)?;
        serde_json::from_value(data).map_err(|e| {
            AlignError::protocol(format!("unexpected {request_type} response: {e}"))
        })
    }
}

impl AutomationBackend for ObsClient {
    fn canvas_size(&mut self) -> AlignResult<Canvas> {
        let info: VideoInfo = self.request_as("GetVideoInfo", serde_json::Value::Null)?;
        Canvas::new(info.base_width, info.base_height)
    }

    fn scene_item_id(&mut self, scene: &str, source: &str) -> AlignResult<SceneItemId> {
        let resp: SceneItemIdResponse = self
            .request_as(
                "GetSceneItemId",
                json!({ "sceneName": scene, "sourceName": source }),
            )
            .map_err(|e| match e {
                AlignError::NotFound(_) => AlignError::not_found(format!(
                    "source '{source}' is not in scene '{scene}'"
                )),
                other => other,
            })?;
        Ok(resp.scene_item_id)
    }

    fn transform(&mut self, scene: &str, item: SceneItemId) -> AlignResult<Transform> {
        let resp: SceneItemTransformResponse = self.request_as(
            "GetSceneItemTransform",
            json!({ "sceneName": scene, "sceneItemId": item }),
        )?;
        Ok(resp.scene_item_transform)
    }

    fn set_transform(
        &mut self,
        scene: &str,
        item: SceneItemId,
        transform: &Transform,
    ) -> AlignResult<()> {
        self.request(
            "SetSceneItemTransform",
            json!({
                "sceneName": scene,
                "sceneItemId": item,
                "sceneItemTransform": transform,
            }),
        )?;
        Ok(())
    }

    fn screenshot(
        &mut self,
        source: &str,
        format: ScreenshotFormat,
        width: u32,
        height: u32,
    ) -> AlignResult<Vec<u8>> {
        let resp: ScreenshotResponse = self.request_as(
            "GetSourceScreenshot",
            json!({
                "sourceName": source,
                "imageFormat": format.as_str(),
                "imageWidth": width,
                "imageHeight": height,
            }),
        )?;
        decode_image_data(&resp.image_data)
    }

    fn disconnect(&mut self) -> AlignResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.socket.close(None)?;
        if let MaybeTlsStream::Plain(stream) = self.socket.get_mut() {
            if let Err(e) = stream.set_read_timeout(Some(CLOSE_ACK_TIMEOUT)) {
                tracing::debug!(error = %e, "could not bound the close handshake");
            }
        }
        // Drain until the server acknowledges the close or stays silent too long.
        loop {
            match self.socket.read() {
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    break;
                }
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    tracing::debug!("close not acknowledged; dropping the socket");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "error while closing socket");
                    break;
                }
            }
        }
        tracing::info!("disconnected");
        Ok(())
    }
}
