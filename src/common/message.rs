use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Ask,
    Show,
    Tell,
    Broadcast,
}

impl MessageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ASK" => Some(Self::Ask),
            "SHOW" => Some(Self::Show),
            "TELL" => Some(Self::Tell),
            "BROADCAST" => Some(Self::Broadcast),
            _ => None,
        }
    }
}

/// A directed message between instances. `target_node` routes it across the
/// shared folder; `sent_at` and `via_node` are stamped by the forwarding
/// agent, not the author.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub from: String,
    pub to: String,
    // "targetComputer" on the wire, predating the node terminology
    #[serde(
        rename = "targetComputer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_node: Option<String>,
    pub subject: String,
    pub content: String,
    pub timestamp: i64,
    pub read: bool,
    pub requires_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_node: Option<String>,
}

impl Message {
    pub fn new(
        message_type: MessageType,
        from: &str,
        to: &str,
        target_node: Option<&str>,
        subject: &str,
        content: &str,
        timestamp: i64,
    ) -> Self {
        let requires_response = message_type == MessageType::Ask;
        Self {
            id: Uuid::new_v4(),
            message_type,
            from: from.to_string(),
            to: to.to_string(),
            target_node: target_node.map(str::to_string),
            subject: subject.to_string(),
            content: content.to_string(),
            timestamp,
            read: false,
            requires_response,
            sent_at: None,
            via_node: None,
        }
    }
}
