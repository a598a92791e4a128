//! Dialogflow fulfillment messages, the platform-agnostic input side.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConvertError;

/// Platform a fulfillment message was authored for.
///
/// `TEAMS` is not one of Dialogflow's own integrations; agents tag responses
/// with it as a custom payload platform. Unknown identifiers are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    #[default]
    Unspecified,
    Facebook,
    Slack,
    Telegram,
    Kik,
    Skype,
    Line,
    Viber,
    ActionsOnGoogle,
    GoogleHangouts,
    Teams,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Unspecified => "PLATFORM_UNSPECIFIED",
            Platform::Facebook => "FACEBOOK",
            Platform::Slack => "SLACK",
            Platform::Telegram => "TELEGRAM",
            Platform::Kik => "KIK",
            Platform::Skype => "SKYPE",
            Platform::Line => "LINE",
            Platform::Viber => "VIBER",
            Platform::ActionsOnGoogle => "ACTIONS_ON_GOOGLE",
            Platform::GoogleHangouts => "GOOGLE_HANGOUTS",
            Platform::Teams => "TEAMS",
            Platform::Other(name) => name.as_str(),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Platform::Unspecified)
    }

    /// Whether a message tagged with this platform is delivered on `target`.
    pub fn delivers_to(&self, target: &Platform) -> bool {
        self.is_unspecified() || self == target
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "PLATFORM_UNSPECIFIED" => Platform::Unspecified,
            "FACEBOOK" => Platform::Facebook,
            "SLACK" => Platform::Slack,
            "TELEGRAM" => Platform::Telegram,
            "KIK" => Platform::Kik,
            "SKYPE" => Platform::Skype,
            "LINE" => Platform::Line,
            "VIBER" => Platform::Viber,
            "ACTIONS_ON_GOOGLE" => Platform::ActionsOnGoogle,
            "GOOGLE_HANGOUTS" => Platform::GoogleHangouts,
            "TEAMS" => Platform::Teams,
            _ => Platform::Other(value),
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        Platform::from(value.to_string())
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        match value {
            Platform::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of `fulfillmentMessages`.
///
/// `message` names which sibling field carries the payload. Fields are all
/// optional here; [`DialogflowMessage::payload`] checks that the declared kind
/// actually has its payload. Batches arrive as raw JSON and each element is
/// read with [`DialogflowMessage::from_value`], so a badly typed element fails
/// on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogflowMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Button {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub postback: String,
}

/// Typed view of a message, selected by its `message` discriminator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    /// First line of a text response.
    Text(&'a str),
    Card(&'a Card),
    /// A kind with no mapping (quick replies, images, custom payloads...).
    Unsupported(&'a str),
}

impl DialogflowMessage {
    pub fn text(platform: Platform, lines: &[&str]) -> Self {
        Self {
            platform: Some(platform),
            message: "text".to_string(),
            text: Some(Text {
                text: lines.iter().map(|l| l.to_string()).collect(),
            }),
            card: None,
        }
    }

    pub fn card(platform: Platform, card: Card) -> Self {
        Self {
            platform: Some(platform),
            message: "card".to_string(),
            text: None,
            card: Some(card),
        }
    }

    /// Whether this message should be delivered on `target`.
    /// Messages without a platform apply everywhere.
    pub fn applies_to(&self, target: &Platform) -> bool {
        match &self.platform {
            None => true,
            Some(platform) => platform.delivers_to(target),
        }
    }

    /// Read one element of a raw batch.
    pub fn from_value(value: &Value) -> Result<Self, ConvertError> {
        Self::deserialize(value).map_err(|e| ConvertError::Unreadable {
            reason: e.to_string(),
        })
    }

    /// The `platform` tag of a raw element, if it is a string. Lets a batch
    /// filter elements for other platforms without reading the rest of them.
    pub fn declared_platform(value: &Value) -> Option<Platform> {
        value
            .get("platform")
            .and_then(Value::as_str)
            .map(Platform::from)
    }

    /// Resolve the discriminator against its sibling payload field.
    pub fn payload(&self) -> Result<Payload<'_>, ConvertError> {
        match self.message.as_str() {
            "text" => {
                let text = self
                    .text
                    .as_ref()
                    .ok_or_else(|| ConvertError::malformed("text", "text"))?;
                let first = text
                    .text
                    .first()
                    .ok_or_else(|| ConvertError::malformed("text", "text.text"))?;
                Ok(Payload::Text(first.as_str()))
            }
            "card" => self
                .card
                .as_ref()
                .map(Payload::Card)
                .ok_or_else(|| ConvertError::malformed("card", "card")),
            other => Ok(Payload::Unsupported(other)),
        }
    }
}

/// What a caller hands us: either the bare `fulfillmentMessages` array or the
/// whole detect-intent response it came from. Elements stay raw JSON until a
/// converter reads them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageBatch {
    Messages(Vec<Value>),
    DetectIntent {
        #[serde(rename = "queryResult")]
        query_result: QueryResult,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub fulfillment_messages: Vec<Value>,
}

impl MessageBatch {
    pub fn into_messages(self) -> Vec<Value> {
        match self {
            MessageBatch::Messages(messages) => messages,
            MessageBatch::DetectIntent { query_result } => query_result.fulfillment_messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_platform_parsing() {
        assert_eq!(Platform::from("VIBER"), Platform::Viber);
        assert_eq!(Platform::from("TEAMS"), Platform::Teams);
        assert_eq!(Platform::from(""), Platform::Unspecified);
        assert_eq!(Platform::from("PLATFORM_UNSPECIFIED"), Platform::Unspecified);
        assert_eq!(
            Platform::from("MSTEAMS"),
            Platform::Other("MSTEAMS".to_string())
        );
    }

    #[test]
    fn test_platform_serializes_as_identifier() {
        let value = serde_json::to_value(Platform::ActionsOnGoogle).unwrap();
        assert_eq!(value, json!("ACTIONS_ON_GOOGLE"));
        let value = serde_json::to_value(Platform::Other("WEBEX".to_string())).unwrap();
        assert_eq!(value, json!("WEBEX"));
    }

    #[test]
    fn test_deserialize_card_message() {
        let msg: DialogflowMessage = serde_json::from_value(json!({
            "platform": "VIBER",
            "card": {
                "buttons": [{"text": "Button to Respond", "postback": "image"}],
                "title": "Title",
                "subtitle": "subtitle",
                "imageUri": "https://www.image.org/image.png"
            },
            "message": "card"
        }))
        .unwrap();

        assert_eq!(msg.platform, Some(Platform::Viber));
        let card = msg.card.as_ref().unwrap();
        assert_eq!(
            card.image_uri.as_deref(),
            Some("https://www.image.org/image.png")
        );
        assert_eq!(card.buttons[0].postback, "image");
        assert!(matches!(msg.payload(), Ok(Payload::Card(_))));
    }

    #[test]
    fn test_null_platform_is_unset() {
        let msg: DialogflowMessage =
            serde_json::from_value(json!({"platform": null, "message": "text"})).unwrap();
        assert_eq!(msg.platform, None);
        assert!(msg.applies_to(&Platform::Teams));
    }

    #[test]
    fn test_applies_to() {
        let teams = Platform::Teams;
        assert!(DialogflowMessage::text(Platform::Teams, &["a"]).applies_to(&teams));
        assert!(DialogflowMessage::text(Platform::Unspecified, &["a"]).applies_to(&teams));
        assert!(!DialogflowMessage::text(Platform::Viber, &["a"]).applies_to(&teams));
        assert!(!DialogflowMessage::text(Platform::Slack, &["a"]).applies_to(&teams));
    }

    #[test]
    fn test_text_payload_uses_first_line() {
        let msg = DialogflowMessage::text(Platform::Teams, &["first", "second"]);
        assert_eq!(msg.payload(), Ok(Payload::Text("first")));
    }

    #[test]
    fn test_missing_payloads_are_malformed() {
        let no_text = DialogflowMessage {
            message: "text".to_string(),
            ..Default::default()
        };
        assert_eq!(
            no_text.payload(),
            Err(ConvertError::malformed("text", "text"))
        );

        let empty_text = DialogflowMessage::text(Platform::Teams, &[]);
        assert_eq!(
            empty_text.payload(),
            Err(ConvertError::malformed("text", "text.text"))
        );

        let no_card = DialogflowMessage {
            message: "card".to_string(),
            ..Default::default()
        };
        assert_eq!(
            no_card.payload(),
            Err(ConvertError::malformed("card", "card"))
        );
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let msg: DialogflowMessage = serde_json::from_value(json!({
            "message": "quickReplies",
            "quickReplies": {"title": "Pick", "quickReplies": ["a", "b"]}
        }))
        .unwrap();
        assert_eq!(msg.payload(), Ok(Payload::Unsupported("quickReplies")));
    }

    #[test]
    fn test_batch_accepts_bare_array() {
        let batch: MessageBatch = serde_json::from_value(json!([
            {"message": "text", "text": {"text": ["hi"]}}
        ]))
        .unwrap();
        let messages = batch.into_messages();
        assert_eq!(messages.len(), 1);
        let first = DialogflowMessage::from_value(&messages[0]).unwrap();
        assert_eq!(first.payload(), Ok(Payload::Text("hi")));
    }

    #[test]
    fn test_batch_accepts_detect_intent_response() {
        let batch: MessageBatch = serde_json::from_value(json!({
            "responseId": "abc-123",
            "queryResult": {
                "queryText": "hello",
                "fulfillmentMessages": [
                    {"platform": "TEAMS", "message": "text", "text": {"text": ["hello there"]}},
                    {"message": "text", "text": {"text": ["fallback"]}}
                ]
            }
        }))
        .unwrap();
        let messages = batch.into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            DialogflowMessage::declared_platform(&messages[0]),
            Some(Platform::Teams)
        );
        assert_eq!(DialogflowMessage::declared_platform(&messages[1]), None);
    }

    #[test]
    fn test_batch_keeps_badly_typed_elements() {
        let batch: MessageBatch = serde_json::from_value(json!([
            {"platform": "TEAMS", "message": "text", "text": {"text": ["keep me"]}},
            {"platform": "TEAMS", "message": "text", "text": "not an object"},
            {"platform": "VIBER", "message": "card", "card": {"buttons": null}}
        ]))
        .unwrap();
        assert_eq!(batch.into_messages().len(), 3);
    }

    #[test]
    fn test_from_value_reports_wrong_types() {
        let err = DialogflowMessage::from_value(&json!({
            "platform": "TEAMS",
            "message": "text",
            "text": "not an object"
        }))
        .unwrap_err();
        assert!(matches!(err, ConvertError::Unreadable { .. }));

        let err = DialogflowMessage::from_value(&json!("just a string")).unwrap_err();
        assert!(matches!(err, ConvertError::Unreadable { .. }));
    }

    #[test]
    fn test_declared_platform_ignores_non_strings() {
        assert_eq!(
            DialogflowMessage::declared_platform(&json!({"platform": "VIBER"})),
            Some(Platform::Viber)
        );
        assert_eq!(
            DialogflowMessage::declared_platform(&json!({"platform": 7})),
            None
        );
        assert_eq!(DialogflowMessage::declared_platform(&json!([1, 2])), None);
    }
}
