//! Report delivery.

pub mod webhook;

pub use webhook::{WebhookConfig, WebhookNotifier};

use crate::error::DeliveryError;
use std::future::Future;

/// Delivers a finished message somewhere people will read it.
pub trait Notifier {
    /// Deliver `message` with a single attempt.
    fn notify(&self, message: &str) -> impl Future<Output = Result<(), DeliveryError>>;
}
