use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use crate::headers::{FromTo, Via};
use crate::ids::IdGenerator;
use crate::message::uri::Uri;
use crate::message::{Message, RequestConfig, SipMethod};
use crate::test_utils::transport::MockTransport;
use crate::test_utils::TestContext;
use crate::transaction::{ClientTransaction, State, Timers, TransactionEvent};
use crate::transport::{Addr, OutgoingMessage};

/// Asserts that the last state received in the [`watch::Receiver<State>`] are equal to the expected.
#[macro_export]
macro_rules! assert_state_eq {
    ($watcher:expr, $state:expr $(,)?) => {{
        $crate::test_utils::transaction::wait_state_change(&mut $watcher).await;
        assert_eq!(*$watcher.borrow(), $state);
    }};

    ($watcher:expr, $state:expr, $($arg:tt)+) => {{
        $crate::test_utils::transaction::wait_state_change(&mut $watcher).await;
        assert_eq!(*$watcher.borrow(), $state, $($arg)*);
    }};
}

pub async fn wait_state_change(state: &mut watch::Receiver<State>) {
    timeout(Duration::from_secs(1), state.changed())
        .await
        .expect("timeout reached and no state change received")
        .expect("The channel has been closed");
}

pub fn create_test_request(method: SipMethod, ids: &mut IdGenerator) -> Message {
    let config = RequestConfig {
        method,
        uri: Uri::parse("sip:bob@biloxi.com").unwrap(),
        via: Some(Via::new("UDP", "pc33.atlanta.com", 5060, &[], ids).unwrap()),
        to: FromTo::to("Bob", "sip:bob@biloxi.com", &[]).unwrap(),
        from: FromTo::from("Alice", "sip:alice@atlanta.com", &[]).unwrap(),
        cseq: 1,
        max_forwards: 70,
    };

    Message::new_request(config, ids).unwrap()
}

pub fn create_test_invite(ids: &mut IdGenerator) -> Message {
    create_test_request(SipMethod::Invite, ids)
}

/// A running INVITE transaction with every channel end it talks to.
pub struct InviteContext {
    pub ids: IdGenerator,
    pub request: Message,
    pub timers: Timers,
    pub transaction: ClientTransaction,
    pub state: watch::Receiver<State>,
    pub tu: mpsc::UnboundedReceiver<TransactionEvent>,
    pub transport: MockTransport,
}

impl TestContext<Addr> for InviteContext {
    fn setup(addr: Addr) -> Self {
        let mut ids = IdGenerator::seeded(7);
        let request = create_test_invite(&mut ids);
        let timers = Timers::default();

        let (tu_sender, tu) = mpsc::unbounded_channel();
        let (transport_sender, transport) = MockTransport::new();
        let transaction = ClientTransaction::new(
            OutgoingMessage::new(request.clone(), addr),
            tu_sender,
            transport_sender,
            timers,
        )
        .unwrap();
        let state = transaction.state_watcher();

        Self {
            ids,
            request,
            timers,
            transaction,
            state,
            tu,
            transport,
        }
    }
}

impl InviteContext {
    /// A response to the request; a `To` tag is added above 100.
    pub fn response(&mut self, code: u16, reason: &str) -> Message {
        let mut response = self.request.new_response(code, reason).unwrap();
        if code > 100 {
            response.add_to_tag(&mut self.ids).unwrap();
        }
        response
    }

    /// Builds a response and passes it to the transaction.
    pub fn respond(&mut self, code: u16, reason: &str) -> Message {
        let response = self.response(code, reason);
        self.transaction.recv(response.clone()).unwrap();
        response
    }

    pub async fn next_event(&mut self) -> TransactionEvent {
        self.tu.recv().await.expect("the transaction closed the TU channel")
    }
}
