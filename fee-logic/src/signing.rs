//! Personal message (`personal_sign`) prompt.

use crate::error::SigningError;
use crate::traits::PersonalMessageSigner;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalMessage {
    pub id: String,
    /// Hex encoded message, `0x` prefixed
    pub data: String,
    pub from: Option<String>,
    pub origin: Option<String>,
}

impl PersonalMessage {
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            from: None,
            origin: None,
        }
    }

    /// Message decoded as UTF-8, or the raw data when it is not hex text
    pub fn text(&self) -> String {
        let stripped = self.data.strip_prefix("0x").unwrap_or(&self.data);
        hex::decode(stripped)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_else(|| self.data.clone())
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().split('\n').map(str::to_string).collect()
    }
}

/// Approves, signs and records the signature. Returns the raw signature.
pub fn confirm<S: PersonalMessageSigner>(
    signer: &mut S,
    message: &PersonalMessage,
) -> Result<String, SigningError> {
    let cleaned = signer.approve_message(message)?;
    let signature = signer.sign_personal_message(&cleaned).inspect_err(|e| {
        warn!("Personal sign FAILED for {}: {}", message.id, e);
    })?;
    signer.set_message_status_signed(&message.id, &signature);
    info!("Personal message {} signed", message.id);
    Ok(signature)
}

pub fn reject<S: PersonalMessageSigner>(signer: &mut S, message: &PersonalMessage) {
    signer.reject_message(&message.id);
    info!("Personal message {} rejected", message.id);
}
