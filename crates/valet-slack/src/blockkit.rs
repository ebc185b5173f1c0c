//! Block Kit message types.
//!
//! Typed model for the subset of Slack Block Kit used by this bot: header,
//! divider, section, and actions blocks with button and static-select
//! elements. Serialization matches Slack's wire format, so a `Vec<Block>`
//! can be dropped directly into a message or response payload.

use serde::{Deserialize, Serialize};

/// The kind of an interactive element, as reported in action payloads.
///
/// Kinds this bot does not handle deserialize to [`ElementKind::Unknown`]
/// so routing can log them instead of failing the whole payload.
///
/// # Examples
///
/// ```
/// use valet_slack::blockkit::ElementKind;
///
/// let kind: ElementKind = serde_json::from_str("\"static_select\"").unwrap();
/// assert_eq!(kind, ElementKind::StaticSelect);
///
/// let kind: ElementKind = serde_json::from_str("\"overflow\"").unwrap();
/// assert_eq!(kind, ElementKind::Unknown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A clickable button.
    Button,

    /// A single-choice select menu.
    StaticSelect,

    /// Any element kind this bot does not handle.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A text object, either plain text or Slack-flavored markdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub emoji: bool,
}

impl Text {
    /// Plain text with emoji rendering enabled.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Plain,
            text: text.into(),
            emoji: true,
        }
    }

    /// Slack-flavored markdown (`mrkdwn`).
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Markdown,
            text: text.into(),
            emoji: false,
        }
    }
}

/// Wire tag for a [`Text`] object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextKind {
    #[default]
    #[serde(rename = "plain_text")]
    Plain,
    #[serde(rename = "mrkdwn")]
    Markdown,
}

/// An option entry for a static select menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: Text,
    pub value: String,
}

impl SelectOption {
    pub fn new(text: Text, value: impl Into<String>) -> Self {
        Self {
            text,
            value: value.into(),
        }
    }
}

/// An interactive element placed in a section accessory or actions block.
///
/// # Examples
///
/// ```
/// use valet_slack::blockkit::{Element, Text};
///
/// let button = Element::button("done", Text::plain("✅ Done"));
/// let value = serde_json::to_value(&button).unwrap();
/// assert_eq!(value["type"], "button");
/// assert_eq!(value["action_id"], "done");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        action_id: String,
        text: Text,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    StaticSelect {
        action_id: String,
        placeholder: Text,
        options: Vec<SelectOption>,
    },
}

impl Element {
    pub fn button(action_id: impl Into<String>, text: Text) -> Self {
        Self::Button {
            action_id: action_id.into(),
            text,
            value: None,
        }
    }

    pub fn static_select(
        action_id: impl Into<String>,
        placeholder: Text,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::StaticSelect {
            action_id: action_id.into(),
            placeholder,
            options,
        }
    }
}

/// A layout block in a message.
///
/// # Examples
///
/// ```
/// use valet_slack::blockkit::{Block, Text};
///
/// let block = Block::header(Text::plain("⭐️ Settings"));
/// let value = serde_json::to_value(&block).unwrap();
/// assert_eq!(value["type"], "header");
/// assert_eq!(value["text"]["type"], "plain_text");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Divider,
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Element>,
    },
    Actions {
        elements: Vec<Element>,
    },
}

impl Block {
    pub fn header(text: Text) -> Self {
        Self::Header { text }
    }

    pub fn divider() -> Self {
        Self::Divider
    }

    pub fn section(text: Text) -> Self {
        Self::Section {
            text: Some(text),
            fields: Vec::new(),
            accessory: None,
        }
    }

    pub fn section_with_accessory(text: Text, accessory: Element) -> Self {
        Self::Section {
            text: Some(text),
            fields: Vec::new(),
            accessory: Some(accessory),
        }
    }

    pub fn section_fields(fields: Vec<Text>) -> Self {
        Self::Section {
            text: None,
            fields,
            accessory: None,
        }
    }

    pub fn actions(elements: Vec<Element>) -> Self {
        Self::Actions { elements }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
