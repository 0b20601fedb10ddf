use super::{
    ServiceError, TransactionService, METHOD_REFRESH, METHOD_STOP_DAEMON, SIGNAL_DONE,
    SIGNAL_ERROR,
};
use crate::core::event_loop::LoopHandle;
use crate::core::models::TransactionSignal;
use crate::core::settings::BusSettings;
use async_trait::async_trait;
use futures_lite::StreamExt;
use tokio::task::JoinHandle;
use zbus::message::Type as MessageType;
use zbus::{Connection, MatchRule, Message, MessageStream};

const MAX_QUEUED_SIGNALS: usize = 8;

/// System bus client for the pamac daemon.
pub struct PamacClient {
    connection: Connection,
    bus: BusSettings,
    forwarder: Option<JoinHandle<()>>,
}

impl PamacClient {
    pub async fn connect(bus: BusSettings) -> Result<Self, ServiceError> {
        let connection = Connection::system()
            .await
            .map_err(ServiceError::Connect)?;

        tracing::debug!(service = %bus.service, path = %bus.path, "Connected to system bus");

        Ok(Self {
            connection,
            bus,
            forwarder: None,
        })
    }

    async fn signal_stream(&self, member: &'static str) -> Result<MessageStream, ServiceError> {
        let subscribe_err = |source| ServiceError::Subscribe { member, source };

        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .interface(self.bus.interface.as_str())
            .map_err(subscribe_err)?
            .member(member)
            .map_err(subscribe_err)?
            .build();

        MessageStream::for_match_rule(rule, &self.connection, Some(MAX_QUEUED_SIGNALS))
            .await
            .map_err(subscribe_err)
    }

    async fn call(&self, method: &'static str) -> Result<(), ServiceError> {
        tracing::debug!(method, service = %self.bus.service, "Calling pamac daemon");

        let result = match (method, self.bus.force_refresh) {
            (METHOD_REFRESH, Some(force)) => {
                self.connection
                    .call_method(
                        Some(self.bus.service.as_str()),
                        self.bus.path.as_str(),
                        Some(self.bus.interface.as_str()),
                        method,
                        &(force,),
                    )
                    .await
            }
            _ => {
                self.connection
                    .call_method(
                        Some(self.bus.service.as_str()),
                        self.bus.path.as_str(),
                        Some(self.bus.interface.as_str()),
                        method,
                        &(),
                    )
                    .await
            }
        };

        // Reply bodies carry nothing we act on.
        result
            .map(|_| ())
            .map_err(|source| ServiceError::Call { method, source })
    }
}

#[async_trait]
impl TransactionService for PamacClient {
    async fn subscribe(&mut self, handle: LoopHandle) -> Result<(), ServiceError> {
        let done = self.signal_stream(SIGNAL_DONE).await?;
        let error = self.signal_stream(SIGNAL_ERROR).await?;

        let forwarder = tokio::spawn(forward_signals(done.or(error), handle));
        if let Some(previous) = self.forwarder.replace(forwarder) {
            previous.abort();
        }

        tracing::debug!(interface = %self.bus.interface, "Subscribed to transaction signals");
        Ok(())
    }

    async fn refresh(&self) -> Result<(), ServiceError> {
        self.call(METHOD_REFRESH).await
    }

    async fn stop_daemon(&self) -> Result<(), ServiceError> {
        self.call(METHOD_STOP_DAEMON).await
    }
}

impl Drop for PamacClient {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

async fn forward_signals<S>(mut signals: S, handle: LoopHandle)
where
    S: futures_lite::Stream<Item = zbus::Result<Message>> + Unpin,
{
    while let Some(item) = signals.next().await {
        let message = match item {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Error reading from signal stream");
                continue;
            }
        };

        let Some(signal) = classify(&message) else {
            continue;
        };

        tracing::info!(signal = signal.member(), "Received transaction signal");

        if !handle.deliver(signal) {
            break;
        }
    }

    tracing::debug!("Signal forwarder finished");
}

fn classify(message: &Message) -> Option<TransactionSignal> {
    let header = message.header();
    let member = header.member()?;
    let reason = match member.as_str() {
        SIGNAL_ERROR => error_reason(message),
        _ => None,
    };
    signal_for_member(member.as_str(), reason)
}

fn signal_for_member(member: &str, reason: Option<String>) -> Option<TransactionSignal> {
    match member {
        SIGNAL_DONE => Some(TransactionSignal::Done),
        SIGNAL_ERROR => Some(TransactionSignal::Error { reason }),
        _ => None,
    }
}

/// Best-effort decode of the error payload; pamac versions differ in its shape.
fn error_reason(message: &Message) -> Option<String> {
    let body = message.body();

    if let Ok(text) = body.deserialize::<String>() {
        return non_empty(text);
    }

    if let Ok((summary, details)) = body.deserialize::<(String, String)>() {
        return match (non_empty(summary), non_empty(details)) {
            (Some(s), Some(d)) => Some(format!("{}: {}", s, d)),
            (s, d) => s.or(d),
        };
    }

    None
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
