use sipcore::Message;
use std::error::Error;
use std::io::{self, Read};

// Parses a SIP message from the file given as argument, or from stdin.
// Line endings are normalized to CRLF so hand-written files work too.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("sipcore=trace")
        .init();

    let mut raw = String::new();
    match std::env::args().nth(1) {
        Some(path) => raw = std::fs::read_to_string(path)?,
        None => {
            io::stdin().read_to_string(&mut raw)?;
        }
    }
    let raw = raw.replace("\r\n", "\n").replace('\n', "\r\n");

    let msg = match Message::parse(raw.as_bytes()) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::error!("{err}");
            return Err(err.into());
        }
    };

    println!("{}", msg.start_line().as_str());
    for header in msg.headers().iter() {
        println!("  {:<20} {}", header.name(), header.value());
    }
    if let Some(via) = msg.vias().next() {
        println!("top via: {} {} branch={:?}", via.transport(), via.host(), via.branch());
    }
    if let Some(cseq) = msg.cseq() {
        println!("cseq: {} {}", cseq.number(), cseq.method());
    }
    println!("body: {} bytes", msg.body().len());

    Ok(())
}
