use std::any::Any;

/// An email address with an optional display name.
///
/// The email part is always present; an empty display name is treated the
/// same as no display name at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub email: String,
    pub name: Option<String>,
}

impl Address {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Display name, if set to something non-empty.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Full `Name <email>` form, or the bare email when there is no name.
    pub fn to_full_string(&self) -> String {
        match self.display_name() {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// A single message header. Names are not required to be unique; the list
/// preserves insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// How an attachment is rendered by the receiving client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

/// Binary attachment content plus the metadata needed to transmit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub content: Vec<u8>,
    pub media_type: String,
    pub media_subtype: String,
    pub filename: String,
    pub disposition: Disposition,
}

impl Attachment {
    pub fn new(
        content: Vec<u8>,
        media_type: impl Into<String>,
        media_subtype: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            content,
            media_type: media_type.into(),
            media_subtype: media_subtype.into(),
            filename: filename.into(),
            disposition: Disposition::Attachment,
        }
    }

    pub fn inline(mut self) -> Self {
        self.disposition = Disposition::Inline;
        self
    }
}

/// Resolved delivery envelope: the sender and the flattened recipient list
/// (To + CC + BCC) actually used for delivery, as opposed to the
/// display-level address fields on the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: Address,
    pub recipients: Vec<Address>,
}

impl Envelope {
    pub fn new(sender: Address, recipients: Vec<Address>) -> Self {
        Self { sender, recipients }
    }

    /// Derive an envelope from a message's display-level fields.
    pub fn from_email(email: &Email) -> Self {
        let mut recipients = email.to.clone();
        recipients.extend(email.cc.iter().cloned());
        recipients.extend(email.bcc.iter().cloned());
        Self {
            sender: email.from.clone(),
            recipients,
        }
    }
}

/// A composed email, immutable once handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: Address,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub reply_to: Vec<Address>,
    pub headers: Vec<Header>,
    pub attachments: Vec<Attachment>,
    /// Envelope pre-resolved by the host mail system, if any. When absent,
    /// [`Email::envelope`] derives one from the display fields.
    pub envelope: Option<Envelope>,
}

impl Email {
    pub fn new(from: Address, subject: impl Into<String>) -> Self {
        Self {
            from,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
            text: None,
            html: None,
            reply_to: Vec::new(),
            headers: Vec::new(),
            attachments: Vec::new(),
            envelope: None,
        }
    }

    pub fn to(mut self, address: Address) -> Self {
        self.to.push(address);
        self
    }

    pub fn cc(mut self, address: Address) -> Self {
        self.cc.push(address);
        self
    }

    pub fn bcc(mut self, address: Address) -> Self {
        self.bcc.push(address);
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    pub fn reply_to(mut self, address: Address) -> Self {
        self.reply_to.push(address);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// The envelope used for delivery: the pre-resolved one when the host
    /// supplied it, otherwise derived from the display fields.
    pub fn envelope(&self) -> Envelope {
        self.envelope
            .clone()
            .unwrap_or_else(|| Envelope::from_email(self))
    }
}

/// Anything the host mail system may hand to a transport. Concrete
/// transports downcast to the message types they support.
pub trait OutgoingMessage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl OutgoingMessage for Email {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
