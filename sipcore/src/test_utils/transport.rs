use tokio::sync::mpsc;

use crate::message::Message;
use crate::transport::OutgoingMessage;

/// A mock transport, collects everything a transaction queues for sending.
pub struct MockTransport {
    receiver: mpsc::UnboundedReceiver<OutgoingMessage>,
    sent: Vec<OutgoingMessage>,
}

impl MockTransport {
    /// Returns the sender to give to a transaction and the mock reading it.
    pub fn new() -> (mpsc::UnboundedSender<OutgoingMessage>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mock = Self {
            receiver,
            sent: Vec::new(),
        };

        (sender, mock)
    }

    fn drain(&mut self) {
        while let Ok(msg) = self.receiver.try_recv() {
            self.sent.push(msg);
        }
    }

    pub fn sent_count(&mut self) -> usize {
        self.drain();
        self.sent.len()
    }

    pub fn last_message(&mut self) -> Option<&Message> {
        self.drain();
        self.sent.last().map(|out| &out.message)
    }

    /// The request method of every sent message, in order.
    pub fn sent_methods(&mut self) -> Vec<String> {
        self.drain();
        self.sent
            .iter()
            .map(|out| out.message.method().unwrap_or_default().to_owned())
            .collect()
    }
}
