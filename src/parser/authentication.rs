// ABOUTME: Parses `R` AuthenticationRequest frames into the handshake variant they carry
// ABOUTME: Only the three variants this core needs to route are recognized; others are protocol errors

use bytes::{Buf, Bytes};

use super::MessageOutcome;
use crate::error::Error;
use crate::tags;

/// The handshake step an `R` frame asks the client to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// Discriminator 0: handshake is complete.
    Ok,
    /// Discriminator 3: send the password in the clear.
    CleartextPassword,
    /// Discriminator 5: send an MD5-hashed password salted with these 4 bytes.
    Md5Password { salt: [u8; 4] },
}

/// `R` — authentication request. Rejects any discriminator this core does
/// not know how to drive, as a protocol error rather than silently ignoring it.
pub fn authentication(tag: u8, payload: &Bytes) -> MessageOutcome<Authentication> {
    if tag != tags::AUTHENTICATION {
        return MessageOutcome::Rejected;
    }

    if payload.len() < 4 {
        return MessageOutcome::Err(Error::Protocol(
            "authentication frame shorter than its discriminator field".into(),
        ));
    }

    let mut buf = &payload[..];
    let discriminator = buf.get_i32();

    match discriminator {
        0 => MessageOutcome::Matched(Authentication::Ok),
        3 => MessageOutcome::Matched(Authentication::CleartextPassword),
        5 => {
            if buf.remaining() < 4 {
                return MessageOutcome::Err(Error::Protocol(
                    "MD5 authentication frame missing salt".into(),
                ));
            }
            let mut salt = [0u8; 4];
            buf.copy_to_slice(&mut salt);
            MessageOutcome::Matched(Authentication::Md5Password { salt })
        }
        other => MessageOutcome::Err(Error::Protocol(format!(
            "unsupported authentication discriminator {other}"
        ))),
    }
}
