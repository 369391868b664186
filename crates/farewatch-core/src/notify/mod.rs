//! Notification composition and delivery.
//!
//! A [`Template`] is rendered into a [`Message`] for a matched preference,
//! then handed to the [`Dispatcher`], which routes it to the [`Transport`]
//! registered for the owner's channel.

mod email;
mod message;
mod telegram;
mod transport;

pub use email::{EmailConfig, HttpEmailTransport};
pub use message::{Message, Template, compose};
pub use telegram::{TelegramConfig, TelegramTransport};
pub use transport::{DispatchError, Dispatcher, Transport};
