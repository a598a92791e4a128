use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ConverterConfig, MalformedPolicy};
use crate::dialogflow::{Card, DialogflowMessage, Payload, Platform};
use crate::error::ConvertError;
use crate::platform::MessageConverter;

pub const HERO_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.hero";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    #[default]
    Message,
}

/// Bot Framework activity sent back to Teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsMessage {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl TeamsMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: Some(text.into()),
            attachments: None,
        }
    }

    pub fn hero_card(card: HeroCard) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: None,
            attachments: Some(vec![Attachment {
                content_type: HERO_CARD_CONTENT_TYPE.to_string(),
                content: card,
            }]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub content: HeroCard,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeroCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub images: Vec<CardImage>,
    #[serde(default)]
    pub buttons: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardAction {
    pub title: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    PostBack,
    OpenUrl,
}

impl ActionType {
    /// Links open in the browser; anything else is posted back to the bot.
    pub fn for_postback(postback: &str) -> Self {
        if is_url(postback) {
            ActionType::OpenUrl
        } else {
            ActionType::PostBack
        }
    }
}

fn is_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

impl From<&Card> for HeroCard {
    fn from(card: &Card) -> Self {
        HeroCard {
            title: card.title.clone(),
            text: card.subtitle.clone(),
            images: card
                .image_uri
                .iter()
                .filter(|uri| !uri.is_empty())
                .map(|uri| CardImage { url: uri.clone() })
                .collect(),
            buttons: card
                .buttons
                .iter()
                .map(|button| CardAction {
                    title: button.text.clone(),
                    action_type: ActionType::for_postback(&button.postback),
                    value: button.postback.clone(),
                })
                .collect(),
        }
    }
}

/// Converts Dialogflow responses for delivery on Microsoft Teams
#[derive(Debug, Clone)]
pub struct TeamsConverter {
    target: Platform,
    on_malformed: MalformedPolicy,
}

impl Default for TeamsConverter {
    fn default() -> Self {
        Self::new(Platform::Teams, MalformedPolicy::default())
    }
}

impl TeamsConverter {
    pub fn new(target: Platform, on_malformed: MalformedPolicy) -> Self {
        Self {
            target,
            on_malformed,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.target_platform.clone(), config.on_malformed)
    }

    /// Convert one raw batch element. Elements tagged for another platform are
    /// dropped before the rest of the element is read.
    pub fn convert_value(&self, value: &Value) -> Result<Option<TeamsMessage>, ConvertError> {
        if let Some(platform) = DialogflowMessage::declared_platform(value) {
            if !platform.delivers_to(&self.target) {
                debug!("Skipping message for platform {}", platform);
                return Ok(None);
            }
        }

        let message = DialogflowMessage::from_value(value)?;
        self.convert_message(&message)
    }

    /// Convert one message. `Ok(None)` means it has nothing to send on Teams,
    /// either because it targets another platform or because its kind has
    /// no Teams equivalent.
    pub fn convert_message(
        &self,
        message: &DialogflowMessage,
    ) -> Result<Option<TeamsMessage>, ConvertError> {
        if !message.applies_to(&self.target) {
            debug!(
                "Skipping {} message for platform {:?}",
                message.message, message.platform
            );
            return Ok(None);
        }

        match message.payload()? {
            Payload::Text(text) => Ok(Some(TeamsMessage::text(text))),
            Payload::Card(card) => Ok(Some(TeamsMessage::hero_card(HeroCard::from(card)))),
            Payload::Unsupported(kind) => {
                debug!("No Teams mapping for message kind '{}', skipping", kind);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MessageConverter for TeamsConverter {
    type Output = TeamsMessage;

    fn platform(&self) -> &Platform {
        &self.target
    }

    async fn convert(
        &self,
        _context: Option<&Value>,
        messages: &[Value],
    ) -> Result<Vec<TeamsMessage>, ConvertError> {
        let mut converted = Vec::with_capacity(messages.len());

        for (index, message) in messages.iter().enumerate() {
            match self.convert_value(message) {
                Ok(Some(teams_message)) => converted.push(teams_message),
                Ok(None) => {}
                Err(e) => match self.on_malformed {
                    MalformedPolicy::Skip => {
                        warn!("Dropping message {}: {}", index, e);
                    }
                    MalformedPolicy::Fail => return Err(e.at(index)),
                },
            }
        }

        debug!(
            "Converted {} of {} messages for {}",
            converted.len(),
            messages.len(),
            self.platform()
        );
        Ok(converted)
    }
}
