//! # leadledger-mime
//!
//! MIME parsing for the raw messages that lead aggregators and the company
//! website send to the sales mailbox.
//!
//! ## Features
//!
//! - **Message parsing**: headers, folded lines, nested multipart bodies
//! - **Decoding**: Base64, Quoted-Printable, RFC 2047 encoded words
//! - **Body selection**: first `text/plain` and `text/html` parts that are not attachments
//!
//! ## Quick Start
//!
//! ```ignore
//! use leadledger_mime::Message;
//!
//! let raw = "From: CompareMyMove <accounts@comparemymove.com>\r\n\
//!            Subject: Removals lead\r\n\
//!            Content-Type: text/plain\r\n\
//!            \r\n\
//!            Email: john.smith@email.com";
//!
//! let message = Message::parse(raw)?;
//! assert_eq!(message.from_address().as_deref(), Some("accounts@comparemymove.com"));
//! println!("{}", message.text_body().unwrap_or_default());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::{Headers, extract_address};
pub use message::{Message, Part, TransferEncoding};
