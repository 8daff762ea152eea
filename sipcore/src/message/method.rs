use std::fmt;

/// A SIP method.
///
/// The methods of RFC 3261 and its common extensions. Any other token is
/// [`SipMethod::Unknown`]; the text itself stays available on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SipMethod {
    Invite,
    Ack,
    Bye,
    Cancel,
    Register,
    Options,
    Info,
    Notify,
    Subscribe,
    Update,
    Refer,
    Prack,
    Message,
    Publish,
    /// An extension method.
    Unknown,
}

impl SipMethod {
    pub fn is_invite(&self) -> bool {
        matches!(self, Self::Invite)
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, Self::Ack)
    }

    /// The method name, empty for [`SipMethod::Unknown`].
    #[inline(always)]
    pub fn as_str(&self) -> &'static str {
        match self {
            SipMethod::Invite => "INVITE",
            SipMethod::Ack => "ACK",
            SipMethod::Bye => "BYE",
            SipMethod::Cancel => "CANCEL",
            SipMethod::Register => "REGISTER",
            SipMethod::Options => "OPTIONS",
            SipMethod::Info => "INFO",
            SipMethod::Notify => "NOTIFY",
            SipMethod::Subscribe => "SUBSCRIBE",
            SipMethod::Update => "UPDATE",
            SipMethod::Refer => "REFER",
            SipMethod::Prack => "PRACK",
            SipMethod::Message => "MESSAGE",
            SipMethod::Publish => "PUBLISH",
            SipMethod::Unknown => "",
        }
    }
}

/// Method names are case-sensitive.
impl From<&str> for SipMethod {
    fn from(value: &str) -> Self {
        match value {
            "INVITE" => SipMethod::Invite,
            "CANCEL" => SipMethod::Cancel,
            "ACK" => SipMethod::Ack,
            "BYE" => SipMethod::Bye,
            "REGISTER" => SipMethod::Register,
            "OPTIONS" => SipMethod::Options,
            "INFO" => SipMethod::Info,
            "NOTIFY" => SipMethod::Notify,
            "SUBSCRIBE" => SipMethod::Subscribe,
            "UPDATE" => SipMethod::Update,
            "REFER" => SipMethod::Refer,
            "PRACK" => SipMethod::Prack,
            "MESSAGE" => SipMethod::Message,
            "PUBLISH" => SipMethod::Publish,
            _ => SipMethod::Unknown,
        }
    }
}

impl fmt::Display for SipMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
