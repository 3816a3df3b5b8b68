//! Client layer: the facade over an injected protocol client.

mod config;
mod error;
mod message_log;
mod protocol;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

pub use config::{
    ClientConfig, ClientConfigBuilder, ENV_DEBUG, ENV_IDENTITY_FILE, ENV_NICKNAME, ENV_NUMBER,
    ENV_PASSWORD,
};
pub use error::{ProtocolError, ResponseError, ResponseErrorKind, WhatsAppError};
pub use message_log::MessageLog;
pub use protocol::{BoxFuture, ProtocolClient, ProtocolResult};

use crate::domain::{
    CodeRequestMethod, FailureRecord, Group, Message, MessageId, Password, PhoneNumber,
    ReceivedMessage, Recipients, RegistrationCode, Response,
};
use crate::events::{EventName, ProtocolEvent};

/// Property of a successful registration that holds the issued password.
const PASSWORD_PROPERTY: &str = "pw";

#[derive(Debug, Default)]
struct SessionState {
    /// Set by the `onConnect` event; the session is not usable until login succeeds.
    socket_open: bool,
    logged_in: bool,
    groups: Option<Vec<Group>>,
    pending_failure: Option<ResponseError>,
}

impl SessionState {
    // The first failure event of a call wins.
    fn fail(&mut self, err: ResponseError) {
        if self.pending_failure.is_none() {
            self.pending_failure = Some(err);
        }
    }
}

/// High-level WhatsApp client.
///
/// Wraps a [`ProtocolClient`] and binds a handler for every [`EventName`] on its
/// dispatcher when constructed. Calls are meant to be made one at a time; event handlers
/// run inside the protocol call that triggered them.
///
/// Dropping the client unbinds its handlers but does not disconnect; call
/// [`WhatsAppClient::disconnect`] first.
pub struct WhatsAppClient {
    config: ClientConfig,
    protocol: Arc<dyn ProtocolClient>,
    state: Arc<Mutex<SessionState>>,
    messages: MessageLog,
    bindings: Vec<u64>,
}

impl WhatsAppClient {
    /// Create a client with its own message log.
    pub fn new(config: ClientConfig, protocol: impl ProtocolClient + 'static) -> Self {
        Self::with_message_log(config, protocol, MessageLog::new())
    }

    /// Create a client that appends inbound messages to `messages`.
    pub fn with_message_log(
        config: ClientConfig,
        protocol: impl ProtocolClient + 'static,
        messages: MessageLog,
    ) -> Self {
        let protocol: Arc<dyn ProtocolClient> = Arc::new(protocol);
        let state = Arc::new(Mutex::new(SessionState::default()));

        let dispatcher = protocol.event_dispatcher();
        let bindings = EventName::ALL
            .into_iter()
            .map(|name| {
                let state = Arc::clone(&state);
                let messages = messages.clone();
                dispatcher.bind(name, move |event| handle_event(&state, &messages, event))
            })
            .collect();

        Self {
            config,
            protocol,
            state,
            messages,
            bindings,
        }
    }

    /// Account settings the client connects with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set the password used by the next connection, typically the one returned by
    /// [`WhatsAppClient::password_from_code`].
    pub fn set_password(&mut self, password: Password) {
        self.config.set_password(password);
    }

    /// `true` once connect and login both succeeded, until [`WhatsAppClient::disconnect`].
    pub fn is_connected(&self) -> bool {
        self.state.lock().logged_in
    }

    /// Buffer the inbound message handler appends to.
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Groups received by the last group list request, if any.
    pub fn groups(&self) -> Option<Vec<Group>> {
        self.state.lock().groups.clone()
    }

    /// Send `message` to every recipient, one protocol call per recipient.
    ///
    /// Text messages are preceded by a typing notification. Returns the id assigned to
    /// each recipient; the first failing call aborts the loop.
    pub async fn send_message(
        &self,
        recipients: &Recipients,
        message: &Message,
    ) -> Result<BTreeMap<PhoneNumber, MessageId>, WhatsAppError> {
        self.ensure_connected().await?;

        let mut ids = BTreeMap::new();
        for to in recipients.as_slice() {
            if matches!(message, Message::Text(_)) {
                self.protocol
                    .send_message_composing(to)
                    .await
                    .map_err(WhatsAppError::Protocol)?;
            }
            let id = self
                .protocol
                .send_message(to, message)
                .await
                .map_err(WhatsAppError::Protocol)?;
            debug!(%to, %id, kind = %message.kind(), "message sent");
            ids.insert(to.clone(), id);
        }
        Ok(ids)
    }

    /// Send `message` to all recipients with a single broadcast call.
    pub async fn send_broadcast(
        &self,
        recipients: &Recipients,
        message: &Message,
    ) -> Result<MessageId, WhatsAppError> {
        self.ensure_connected().await?;

        let id = self
            .protocol
            .send_broadcast(recipients.as_slice(), message)
            .await
            .map_err(WhatsAppError::Protocol)?;
        debug!(
            recipients = recipients.len(),
            %id,
            kind = %message.kind(),
            "broadcast sent"
        );
        Ok(id)
    }

    /// Fetch the groups the account belongs to or owns.
    ///
    /// Returns an empty list when the server reports no groups.
    pub async fn group_list(&self) -> Result<Vec<Group>, WhatsAppError> {
        self.ensure_connected().await?;

        self.state.lock().groups = None;
        self.protocol
            .send_get_groups()
            .await
            .map_err(WhatsAppError::Protocol)?;
        Ok(self.groups().unwrap_or_default())
    }

    /// Update the account status text. Blank text is ignored and reported as `false`.
    pub async fn update_status(&self, status: &str) -> Result<bool, WhatsAppError> {
        if status.trim().is_empty() {
            return Ok(false);
        }

        self.ensure_connected().await?;
        self.protocol
            .send_status_update(status)
            .await
            .map_err(WhatsAppError::Protocol)?;
        Ok(true)
    }

    /// Ask the server to deliver a verification code to the configured number.
    ///
    /// Failure events raised during the call are returned as
    /// [`WhatsAppError::Response`]: [`ResponseErrorKind::TooRecent`],
    /// [`ResponseErrorKind::TooManyGuesses`] or [`ResponseErrorKind::Response`].
    pub async fn try_send_code_request(
        &self,
        method: CodeRequestMethod,
    ) -> Result<Response, WhatsAppError> {
        self.state.lock().pending_failure = None;
        debug!(number = %self.config.number(), %method, "requesting code");
        let result = self
            .protocol
            .code_request(self.config.number(), method)
            .await;
        self.settle(result)
    }

    /// Like [`WhatsAppClient::try_send_code_request`], but classified failures are
    /// returned as their failure [`Response`] and anything else as `None`.
    pub async fn send_code_request(&self, method: CodeRequestMethod) -> Option<Response> {
        recover_response(self.try_send_code_request(method).await)
    }

    /// Exchange a verification code for account credentials.
    ///
    /// A refusal reported by the server is returned as
    /// [`ResponseErrorKind::CodeRegisterFailed`].
    pub async fn try_register_code(
        &self,
        code: &RegistrationCode,
    ) -> Result<Response, WhatsAppError> {
        self.state.lock().pending_failure = None;
        debug!(number = %self.config.number(), "registering code");
        let result = self
            .protocol
            .code_register(self.config.number(), code)
            .await;
        self.settle(result)
    }

    /// Like [`WhatsAppClient::try_register_code`], with the recovery rules of
    /// [`WhatsAppClient::send_code_request`].
    pub async fn register_code(&self, code: &RegistrationCode) -> Option<Response> {
        recover_response(self.try_register_code(code).await)
    }

    /// Register `code` and return the issued password, if the registration succeeded.
    pub async fn password_from_code(&self, code: &RegistrationCode) -> Option<Password> {
        let response = self.try_register_code(code).await.ok()?;
        let password = response.property_as::<String>(PASSWORD_PROPERTY)?;
        Password::new(password).ok()
    }

    /// Disconnect if a connection was opened, even when login did not complete.
    pub async fn disconnect(&self) -> Result<(), WhatsAppError> {
        if !self.has_open_socket() {
            return Ok(());
        }

        debug!(number = %self.config.number(), "disconnecting");
        self.protocol
            .disconnect()
            .await
            .map_err(WhatsAppError::Protocol)?;
        let mut state = self.state.lock();
        state.socket_open = false;
        state.logged_in = false;
        Ok(())
    }

    fn has_open_socket(&self) -> bool {
        let state = self.state.lock();
        state.socket_open || state.logged_in
    }

    async fn ensure_connected(&self) -> Result<(), WhatsAppError> {
        if self.is_connected() {
            return Ok(());
        }
        let password = self
            .config
            .password()
            .ok_or(WhatsAppError::MissingPassword)?;

        debug!(
            number = %self.config.number(),
            nickname = self.config.nickname().as_str(),
            "connecting"
        );
        self.protocol
            .connect(&self.config)
            .await
            .map_err(WhatsAppError::Protocol)?;
        self.protocol
            .login(password)
            .await
            .map_err(WhatsAppError::Protocol)?;
        self.state.lock().logged_in = true;
        Ok(())
    }

    fn settle(&self, result: ProtocolResult<Response>) -> Result<Response, WhatsAppError> {
        let failure = self.state.lock().pending_failure.take();
        match (failure, result) {
            (Some(failure), Ok(_)) => Err(failure.into()),
            (Some(failure), Err(source)) => Err(failure.with_source(source).into()),
            (None, Ok(response)) => Ok(response),
            (None, Err(source)) => Err(WhatsAppError::Protocol(source)),
        }
    }
}

impl Drop for WhatsAppClient {
    fn drop(&mut self) {
        if self.has_open_socket() {
            warn!(number = %self.config.number(), "client dropped while still connected");
        }
        let dispatcher = self.protocol.event_dispatcher();
        for id in self.bindings.drain(..) {
            dispatcher.unbind(None, Some(id));
        }
    }
}

impl std::fmt::Debug for WhatsAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .field("messages", &self.messages.len())
            .finish()
    }
}

fn recover_response(result: Result<Response, WhatsAppError>) -> Option<Response> {
    match result {
        Ok(response) => Some(response),
        Err(WhatsAppError::Response(err)) => {
            debug!(kind = ?err.kind(), "server refused request: {err}");
            err.into_response()
        }
        Err(err) => {
            warn!(error = %err, "request failed without a server response");
            None
        }
    }
}

fn handle_event(state: &Mutex<SessionState>, messages: &MessageLog, event: &ProtocolEvent) {
    match event {
        ProtocolEvent::Connect { .. } => state.lock().socket_open = true,
        ProtocolEvent::GetMessage {
            phone,
            from,
            id,
            kind,
            time,
            name,
            data,
        } => messages.push(ReceivedMessage::from_event(
            phone.as_str(),
            from,
            id.as_str(),
            kind.as_str(),
            *time,
            name.as_str(),
            data.as_str(),
        )),
        ProtocolEvent::GetGroups { groups, .. } => {
            if !groups.is_empty() {
                state.lock().groups = Some(groups.iter().cloned().map(Group::from).collect());
            }
        }
        ProtocolEvent::CodeRequestFailedTooRecent {
            phone,
            method,
            reason,
            retry_after,
        } => state.lock().fail(ResponseError::too_recent(FailureRecord::throttled(
            phone.clone(),
            *method,
            reason.as_str(),
            *retry_after,
        ))),
        ProtocolEvent::CodeRequestFailedTooManyGuesses {
            phone,
            method,
            reason,
            retry_after,
        } => state
            .lock()
            .fail(ResponseError::too_many_guesses(FailureRecord::throttled(
                phone.clone(),
                *method,
                reason.as_str(),
                *retry_after,
            ))),
        ProtocolEvent::CodeRequestFailed {
            phone,
            method,
            reason,
            param,
        } => state
            .lock()
            .fail(ResponseError::code_request_failed(FailureRecord::with_param(
                phone.clone(),
                *method,
                reason.as_str(),
                param.as_str(),
            ))),
        ProtocolEvent::CodeRegisterFailed {
            phone,
            status,
            reason,
            retry_after,
        } => state
            .lock()
            .fail(ResponseError::code_register_failed(
                FailureRecord::register_failed(
                    phone.clone(),
                    status.as_str(),
                    reason.as_str(),
                    *retry_after,
                ),
            )),
    }
}
