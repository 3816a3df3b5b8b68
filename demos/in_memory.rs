use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde_json::json;
use whatsapi::client::{BoxFuture, ProtocolResult};
use whatsapi::domain::GroupInfo;
use whatsapi::{
    ClientConfig, CodeRequestMethod, EventDispatcher, GroupId, Message, MessageId, Nickname,
    Password, PhoneNumber, ProtocolClient, ProtocolEvent, Recipients, RegistrationCode, Response,
    WhatsAppClient,
};

/// Protocol client that never leaves the process: every reply is emitted straight back
/// into the dispatcher.
#[derive(Default)]
struct InMemoryProtocol {
    events: EventDispatcher,
    number: OnceLock<PhoneNumber>,
    next_id: AtomicU64,
    code_requested: AtomicBool,
}

impl InMemoryProtocol {
    fn next_id(&self) -> MessageId {
        MessageId::new(format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

impl ProtocolClient for InMemoryProtocol {
    fn event_dispatcher(&self) -> &EventDispatcher {
        &self.events
    }

    fn connect<'a>(&'a self, config: &'a ClientConfig) -> BoxFuture<'a, ProtocolResult<()>> {
        Box::pin(async move {
            let phone = self.number.get_or_init(|| config.number().clone()).clone();
            self.events.emit(&ProtocolEvent::Connect { phone });
            Ok(())
        })
    }

    fn login<'a>(&'a self, _password: &'a Password) -> BoxFuture<'a, ProtocolResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn disconnect(&self) -> BoxFuture<'_, ProtocolResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn send_message_composing<'a>(
        &'a self,
        _to: &'a PhoneNumber,
    ) -> BoxFuture<'a, ProtocolResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn send_message<'a>(
        &'a self,
        to: &'a PhoneNumber,
        message: &'a Message,
    ) -> BoxFuture<'a, ProtocolResult<MessageId>> {
        Box::pin(async move {
            let id = self.next_id();
            if let Message::Text(text) = message {
                let own = self.number.get().map(ToString::to_string).unwrap_or_default();
                self.events.emit(&ProtocolEvent::GetMessage {
                    phone: own,
                    from: format!("{to}@s.whatsapp.net"),
                    id: format!("reply-{id}"),
                    kind: "text".to_owned(),
                    time: 1_700_000_000,
                    name: "echo".to_owned(),
                    data: format!("echo: {text}"),
                });
            }
            Ok(id)
        })
    }

    fn send_broadcast<'a>(
        &'a self,
        _to: &'a [PhoneNumber],
        _message: &'a Message,
    ) -> BoxFuture<'a, ProtocolResult<MessageId>> {
        Box::pin(async move { Ok(self.next_id()) })
    }

    fn send_status_update<'a>(&'a self, _status: &'a str) -> BoxFuture<'a, ProtocolResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn send_get_groups(&self) -> BoxFuture<'_, ProtocolResult<()>> {
        Box::pin(async move {
            self.events.emit(&ProtocolEvent::GetGroups {
                phone: self.number.get().map(ToString::to_string).unwrap_or_default(),
                groups: vec![GroupInfo {
                    id: GroupId::new("34600000000-1700000000@g.us"),
                    subject: "demo".to_owned(),
                }],
            });
            Ok(())
        })
    }

    fn code_request<'a>(
        &'a self,
        number: &'a PhoneNumber,
        method: CodeRequestMethod,
    ) -> BoxFuture<'a, ProtocolResult<Response>> {
        Box::pin(async move {
            // The second request in a row is throttled.
            if self.code_requested.swap(true, Ordering::SeqCst) {
                self.events.emit(&ProtocolEvent::CodeRequestFailedTooRecent {
                    phone: number.clone(),
                    method,
                    reason: "too_recent".to_owned(),
                    retry_after: 1_800,
                });
            }
            Ok(response(json!({ "status": "sent", "method": method.as_str() })))
        })
    }

    fn code_register<'a>(
        &'a self,
        number: &'a PhoneNumber,
        _code: &'a RegistrationCode,
    ) -> BoxFuture<'a, ProtocolResult<Response>> {
        Box::pin(async move {
            Ok(response(json!({
                "status": "ok",
                "login": number.as_str(),
                "pw": "in-memory-password",
            })))
        })
    }
}

fn response(value: serde_json::Value) -> Response {
    match value {
        serde_json::Value::Object(map) => Response::from_map(map),
        _ => Response::from_map(serde_json::Map::new()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config =
        ClientConfig::builder(PhoneNumber::new("34600000000")?, Nickname::new("demo")?).build();
    let mut client = WhatsAppClient::new(config, InMemoryProtocol::default());

    for _ in 0..2 {
        if let Some(response) = client.send_code_request(CodeRequestMethod::Sms).await {
            println!(
                "code request: status {:?}, retry after {:?} s",
                response.status(),
                response.retry_after()
            );
        }
    }

    let code = RegistrationCode::new("123-456")?;
    let password = client
        .password_from_code(&code)
        .await
        .ok_or("registration returned no password")?;
    client.set_password(password);

    let to = Recipients::new(vec![PhoneNumber::new("34600111222")?])?;
    let ids = client.send_message(&to, &Message::text("hello")?).await?;
    println!("sent: {ids:?}");

    for group in client.group_list().await? {
        println!("{} ({})", group.name, group.id.as_str());
    }
    println!("status updated: {}", client.update_status("busy").await?);

    for message in client.messages().drain() {
        println!("[{}] {}: {}", message.time, message.from, message.data);
    }

    client.disconnect().await?;
    Ok(())
}
