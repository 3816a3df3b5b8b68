//! Typed facade over an injected WhatsApp protocol client.
//!
//! The crate does not speak the WhatsApp protocol. It wraps any [`ProtocolClient`]
//! implementation and offers a small surface on top: per-recipient sends, broadcasts,
//! the group list, status updates and the two-step phone registration flow. Outcomes are
//! reported through a uniform [`Response`] and a closed error taxonomy.
//!
//! ```rust,no_run
//! use whatsapi::{
//!     ClientConfig, CodeRequestMethod, Message, Nickname, PhoneNumber, ProtocolClient,
//!     Recipients, RegistrationCode, WhatsAppClient, WhatsAppError,
//! };
//!
//! async fn run(protocol: impl ProtocolClient + 'static) -> Result<(), WhatsAppError> {
//!     let config = ClientConfig::builder(
//!         PhoneNumber::new("34600000000")?,
//!         Nickname::new("bot")?,
//!     )
//!     .build();
//!     let mut client = WhatsAppClient::new(config, protocol);
//!
//!     if let Some(response) = client.send_code_request(CodeRequestMethod::Sms).await {
//!         if response.is_fail() {
//!             println!("retry in {:?} seconds", response.retry_after());
//!         }
//!     }
//!
//!     let code = RegistrationCode::new("123-456")?;
//!     if let Some(password) = client.password_from_code(&code).await {
//!         client.set_password(password);
//!     }
//!
//!     let to = Recipients::new(vec![PhoneNumber::new("34600111222")?])?;
//!     let ids = client.send_message(&to, &Message::text("hello")?).await?;
//!     println!("{ids:?}");
//!     client.disconnect().await
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod events;

pub use client::{
    ClientConfig, ClientConfigBuilder, MessageLog, ProtocolClient, ResponseError,
    ResponseErrorKind, WhatsAppClient, WhatsAppError,
};
pub use domain::{
    CodeRequestMethod, FailureRecord, Group, GroupId, Location, Message, MessageId, MessageKind,
    Nickname, Password, PayloadShape, PhoneNumber, ReceivedMessage, Recipients,
    RegistrationCode, Response, ValidationError,
};
pub use events::{EventDispatcher, EventName, ProtocolEvent};
