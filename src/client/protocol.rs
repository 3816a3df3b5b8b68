//! Seam to the protocol client that speaks the actual WhatsApp protocol.

use std::future::Future;
use std::pin::Pin;

use crate::client::config::ClientConfig;
use crate::client::error::ProtocolError;
use crate::domain::{
    CodeRequestMethod, Message, MessageId, Password, PhoneNumber, RegistrationCode, Response,
};
use crate::events::EventDispatcher;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Operations the facade delegates to.
///
/// Implementations emit [`crate::events::ProtocolEvent`]s into the dispatcher returned by
/// [`ProtocolClient::event_dispatcher`] while a call is in progress; handlers run before
/// the call's future completes. Failure events for code requests and registrations are
/// reported that way rather than through the returned error.
pub trait ProtocolClient: Send + Sync {
    fn event_dispatcher(&self) -> &EventDispatcher;

    fn connect<'a>(&'a self, config: &'a ClientConfig) -> BoxFuture<'a, ProtocolResult<()>>;

    fn login<'a>(&'a self, password: &'a Password) -> BoxFuture<'a, ProtocolResult<()>>;

    fn disconnect(&self) -> BoxFuture<'_, ProtocolResult<()>>;

    /// Typing notification sent ahead of a text message.
    fn send_message_composing<'a>(
        &'a self,
        to: &'a PhoneNumber,
    ) -> BoxFuture<'a, ProtocolResult<()>>;

    fn send_message<'a>(
        &'a self,
        to: &'a PhoneNumber,
        message: &'a Message,
    ) -> BoxFuture<'a, ProtocolResult<MessageId>>;

    /// One broadcast to every recipient; returns the broadcast id.
    fn send_broadcast<'a>(
        &'a self,
        to: &'a [PhoneNumber],
        message: &'a Message,
    ) -> BoxFuture<'a, ProtocolResult<MessageId>>;

    fn send_status_update<'a>(&'a self, status: &'a str) -> BoxFuture<'a, ProtocolResult<()>>;

    /// Ask for the group list; the reply arrives as a `GetGroups` event.
    fn send_get_groups(&self) -> BoxFuture<'_, ProtocolResult<()>>;

    fn code_request<'a>(
        &'a self,
        number: &'a PhoneNumber,
        method: CodeRequestMethod,
    ) -> BoxFuture<'a, ProtocolResult<Response>>;

    fn code_register<'a>(
        &'a self,
        number: &'a PhoneNumber,
        code: &'a RegistrationCode,
    ) -> BoxFuture<'a, ProtocolResult<Response>>;
}
