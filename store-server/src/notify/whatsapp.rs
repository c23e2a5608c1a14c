//! WhatsApp-style dispatcher
//!
//! Demo adapter: composes a `wa.me` deep link for the message and logs the
//! send. A production adapter would POST to a messaging API instead.

use async_trait::async_trait;

use super::{DispatchError, Notification, NotificationDispatcher};

pub struct WhatsAppDispatcher;

impl WhatsAppDispatcher {
    /// Deep link that would open the message in a chat app
    pub fn deep_link(notification: &Notification) -> String {
        format!(
            "https://wa.me/{}?text={}",
            notification.phone,
            urlencode(&notification.text)
        )
    }
}

#[async_trait]
impl NotificationDispatcher for WhatsAppDispatcher {
    async fn deliver(&self, notification: &Notification) -> Result<(), DispatchError> {
        let url = Self::deep_link(notification);
        tracing::info!(
            kind = ?notification.kind,
            audience = ?notification.audience,
            order_id = %notification.order_id,
            url = %url,
            "WhatsApp notification prepared"
        );
        Ok(())
    }
}

/// Minimal percent-encoding for the deep-link query value
fn urlencode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push_str("%20"),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
