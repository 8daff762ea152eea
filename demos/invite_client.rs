use sipcore::headers::{FromTo, Via};
use sipcore::message::uri::Uri;
use sipcore::transaction::{ClientTransaction, Timers};
use sipcore::{Addr, IdGenerator, Message, OutgoingMessage, RequestConfig, SipMethod, TransactionEvent};
use std::error::Error;
use tokio::sync::mpsc;

// Runs one INVITE transaction against a peer living in the same process.
//
//   invite_client [--udp] [--answer]
//
// The peer answers 100, 180 and then 486, or 200 with `--answer`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("sipcore=trace,invite_client=debug")
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let udp = args.iter().any(|arg| arg == "--udp");
    let answer = args.iter().any(|arg| arg == "--answer");

    let addr = if udp {
        Addr::udp("127.0.0.1:5060")?
    } else {
        Addr::tcp("127.0.0.1:5060")?
    };

    let mut ids = IdGenerator::new();
    let config = RequestConfig {
        method: SipMethod::Invite,
        uri: Uri::parse("sip:bob@127.0.0.1:5060")?,
        via: Some(Via::new(addr.transport().as_str(), "127.0.0.1", 5070, &[], &mut ids)?),
        to: FromTo::to("Bob", "sip:bob@127.0.0.1", &[])?,
        from: FromTo::from("Alice", "sip:alice@127.0.0.1:5070", &[])?,
        cseq: 1,
        max_forwards: 70,
    };
    let request = Message::new_request(config, &mut ids)?;

    let (tu_sender, mut tu) = mpsc::unbounded_channel();
    let (transport, wire) = mpsc::unbounded_channel();
    let transaction = ClientTransaction::new(
        OutgoingMessage::new(request, addr),
        tu_sender,
        transport,
        Timers::default(),
    )?;
    tracing::info!("INVITE sent to {}, branch {:?}", transaction.addr(), transaction.branch());

    tokio::spawn(peer(wire, transaction.clone(), answer));

    while let Some(event) = tu.recv().await {
        match event {
            TransactionEvent::Response(response) => {
                let status = response.status_line().map(|line| line.as_str()).unwrap_or_default();
                tracing::info!("<- {status} (state {:?})", transaction.state());
            }
            TransactionEvent::Failed(err) => {
                tracing::error!("transaction failed: {err}");
            }
        }
    }
    tracing::info!("transaction finished in state {:?}", transaction.state());

    Ok(())
}

async fn peer(mut wire: mpsc::UnboundedReceiver<OutgoingMessage>, transaction: ClientTransaction, answer: bool) {
    let mut ids = IdGenerator::new();
    let mut answered = false;

    while let Some(OutgoingMessage { message, addr }) = wire.recv().await {
        let Some(method) = message.method() else {
            continue;
        };
        tracing::debug!("peer received {method} from {addr}");
        let Some(sip_method) = message.request_line().map(|line| line.sip_method()) else {
            continue;
        };
        if sip_method.is_ack() {
            tracing::info!("peer got the ACK, call is over");
            continue;
        }
        if !sip_method.is_invite() || answered {
            continue;
        }
        answered = true;

        let (code, reason) = if answer { (200, "OK") } else { (486, "Busy Here") };
        for (code, reason) in [(100, "Trying"), (180, "Ringing"), (code, reason)] {
            let response = match build_response(&message, code, reason, &mut ids) {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!("peer could not build {code}: {err}");
                    return;
                }
            };
            if let Err(err) = transaction.recv(response) {
                tracing::warn!("transaction refused {code}: {err}");
            }
        }
    }
}

fn build_response(request: &Message, code: u16, reason: &str, ids: &mut IdGenerator) -> sipcore::Result<Message> {
    let mut response = request.new_response(code, reason)?;
    if code > 100 {
        response.add_to_tag(ids)?;
    }
    Ok(response)
}
