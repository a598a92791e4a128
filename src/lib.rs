//! Convert Dialogflow fulfillment messages into Microsoft Teams activities.

pub mod config;
pub mod dialogflow;
pub mod error;
pub mod platform;

pub use config::{Config, ConverterConfig, MalformedPolicy};
pub use dialogflow::{DialogflowMessage, MessageBatch, Platform};
pub use error::ConvertError;
pub use platform::teams::{TeamsConverter, TeamsMessage};
pub use platform::MessageConverter;
