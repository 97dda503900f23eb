use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewCountRow {
    pub story_id: u64,
    pub view_count: u64,
}

/// An "ask me anything" inbox owned by a creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmaRecord {
    pub id: u64,
    pub creator_address: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Tip required to post, as a decimal USDC string
    #[serde(default)]
    pub required_tip: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAma {
    pub creator_address: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_tip: Option<String>,
}

/// An anonymous message left in an AMA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmaMessage {
    pub id: u64,
    pub ama_id: u64,
    pub content: String,
    #[serde(default)]
    pub tip_amount: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAmaMessage {
    pub ama_id: u64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

const fn default_true() -> bool {
    true
}
