use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result, TransactionError};
use crate::headers::Via;
use crate::message::{Message, SipMethod};
use crate::transaction::{State, Timers, TransactionEvent};
use crate::transport::{Addr, OutgoingMessage, TransportKind};

const TIMEOUT_CODE: u16 = 408;
const TIMEOUT_REASON: &str = "Request Timeout";

/// Handle to a running client INVITE transaction.
///
/// The state machine lives in a task spawned by [`ClientTransaction::new`].
/// Responses are passed in with [`recv`](Self::recv); everything meant for
/// the owner arrives on the `tu` channel given at creation and every message
/// to send is pushed on the transport channel.
///
/// The task ends when the transaction terminates, so `new` must be called
/// from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct ClientTransaction {
    inbox: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<State>,
    cancel: CancellationToken,
    branch: Option<String>,
    addr: Addr,
}

impl ClientTransaction {
    /// Sends the INVITE in `outgoing` and starts the transaction.
    ///
    /// Nothing is sent or spawned when the message is not an INVITE request
    /// or the address has no known transport.
    pub fn new(
        outgoing: OutgoingMessage,
        tu: mpsc::UnboundedSender<TransactionEvent>,
        transport: mpsc::UnboundedSender<OutgoingMessage>,
        timers: Timers,
    ) -> Result<Self> {
        let OutgoingMessage { message: request, addr } = outgoing;

        let Some(request_line) = request.request_line() else {
            return Err(TransactionError::RequestExpected.into());
        };
        if !request_line.sip_method().is_invite() {
            return Err(TransactionError::InviteExpected(request_line.method().to_owned()).into());
        }
        if addr.transport() == TransportKind::Unknown {
            return Err(TransactionError::InvalidAddress.into());
        }

        let branch = request.vias().next().and_then(Via::branch).map(str::to_owned);

        transport
            .send(OutgoingMessage::new(request.clone(), addr))
            .map_err(|_| Error::ChannelClosed)?;
        log::debug!("INVITE sent to {addr}, branch {branch:?}");

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(State::Calling);
        let cancel = CancellationToken::new();

        let fsm = InviteFsm {
            request,
            addr,
            timers,
            ack: None,
            state: state_tx,
            tu,
            transport,
            inbox: inbox_rx,
            cancel: cancel.clone(),
        };
        tokio::spawn(fsm.run());

        Ok(Self {
            inbox: inbox_tx,
            state: state_rx,
            cancel,
            branch,
            addr,
        })
    }

    /// Hands a received response to the transaction. Never waits.
    pub fn recv(&self, response: Message) -> Result<()> {
        if !response.is_response() {
            return Err(TransactionError::ResponseExpected.into());
        }
        if !self.matches(&response) {
            return Err(TransactionError::InvalidMessage("response does not match the transaction").into());
        }

        self.inbox
            .send(response)
            .map_err(|_| TransactionError::Terminated)?;

        Ok(())
    }

    /// RFC 3261 17.1.3: same top Via branch and an INVITE CSeq.
    pub fn matches(&self, response: &Message) -> bool {
        let same_branch = match &self.branch {
            Some(branch) => response.vias().next().and_then(Via::branch) == Some(branch.as_str()),
            None => true,
        };

        same_branch
            && response
                .cseq()
                .is_some_and(|cseq| cseq.method() == SipMethod::Invite.as_str())
    }

    /// Stops the transaction; nothing is sent or delivered afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// A receiver that sees every state change.
    pub fn state_watcher(&self) -> watch::Receiver<State> {
        self.state.clone()
    }

    pub fn is_terminated(&self) -> bool {
        self.state().is_terminated()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn addr(&self) -> Addr {
        self.addr
    }
}

/// The task side of a [`ClientTransaction`].
struct InviteFsm {
    request: Message,
    addr: Addr,
    timers: Timers,
    ack: Option<Message>,
    state: watch::Sender<State>,
    tu: mpsc::UnboundedSender<TransactionEvent>,
    transport: mpsc::UnboundedSender<OutgoingMessage>,
    inbox: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
}

impl InviteFsm {
    async fn run(mut self) {
        let reliable = self.addr.is_reliable();
        let mut interval = self.timers.a();

        let timer_a = time::sleep(interval);
        let timer_b = time::sleep(self.timers.b());
        let timer_d = time::sleep(Duration::ZERO);
        tokio::pin!(timer_a, timer_b, timer_d);

        loop {
            let state = self.state();

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    log::debug!("Transaction to {} cancelled", self.addr);
                    self.set_state(State::Terminated);
                }
                response = self.inbox.recv() => match response {
                    Some(response) => {
                        self.on_response(response);
                        if state != State::Completed && self.state() == State::Completed {
                            let wait = self.timers.d(reliable);
                            if wait.is_zero() {
                                self.set_state(State::Terminated);
                            } else {
                                timer_d.as_mut().reset(Instant::now() + wait);
                            }
                        }
                    }
                    // Every handle is gone, no response can reach us anymore.
                    None => {
                        log::debug!("Transaction to {} has no handle left, stopping", self.addr);
                        self.cancel.cancel();
                        self.set_state(State::Terminated);
                    }
                },
                _ = &mut timer_a, if !reliable && state == State::Calling => {
                    log::trace!("Timer A fired after {interval:?}, retransmitting INVITE");
                    self.send(self.request.clone());
                    interval *= 2;
                    timer_a.as_mut().reset(Instant::now() + interval);
                }
                _ = &mut timer_b, if state == State::Calling => {
                    self.on_timeout();
                }
                _ = &mut timer_d, if state == State::Completed => {
                    self.set_state(State::Terminated);
                }
            }

            if self.state().is_terminated() {
                break;
            }
        }

        self.cancel.cancel();
    }

    fn on_response(&mut self, response: Message) {
        let Some(code) = response.status_code() else {
            return;
        };

        match (self.state(), code) {
            (State::Calling | State::Proceeding, 100..=199) => {
                self.set_state(State::Proceeding);
                self.deliver(TransactionEvent::Response(response));
            }
            (State::Calling | State::Proceeding, 200..=299) => {
                self.set_state(State::Terminated);
                self.deliver(TransactionEvent::Response(response));
            }
            (State::Calling | State::Proceeding, 300..=699) => match self.request.new_ack(&response) {
                Ok(ack) => {
                    self.send(ack.clone());
                    self.ack = Some(ack);
                    self.deliver(TransactionEvent::Response(response));
                    self.set_state(State::Completed);
                }
                Err(err) => {
                    log::warn!("Failed to build ACK for {code} response: {err}");
                    self.set_state(State::Terminated);
                    self.deliver(TransactionEvent::Failed(err));
                }
            },
            // 17.1.1.2: retransmitted final responses get the ACK again and
            // are not passed up.
            (State::Completed, 300..=699) => {
                if let Some(ack) = self.ack.clone() {
                    self.send(ack);
                }
            }
            (state, code) => log::trace!("Ignoring {code} response in {state:?}"),
        }
    }

    fn on_timeout(&mut self) {
        log::debug!("Timer B fired, no final response from {}", self.addr);
        self.set_state(State::Terminated);

        let event = match self.request.new_response(TIMEOUT_CODE, TIMEOUT_REASON) {
            Ok(response) => TransactionEvent::Response(response),
            Err(err) => {
                log::warn!("Failed to build timeout response: {err}");
                TransactionEvent::Failed(err)
            }
        };
        self.deliver(event);
    }

    fn state(&self) -> State {
        *self.state.borrow()
    }

    fn set_state(&self, state: State) {
        self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            log::trace!("State Changed [{current:?} -> {state:?}]");
            *current = state;
            true
        });
    }

    fn send(&self, message: Message) {
        if self.cancel.is_cancelled() {
            return;
        }
        if self.transport.send(OutgoingMessage::new(message, self.addr)).is_err() {
            log::warn!("Transport queue closed, dropping message to {}", self.addr);
        }
    }

    fn deliver(&self, event: TransactionEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        if self.tu.send(event).is_err() {
            log::warn!("Transaction owner is gone, dropping event");
        }
    }
}
