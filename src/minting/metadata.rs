//! Off-chain token metadata document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::schema::MintingConfig;
use crate::minting::types::TokenRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub external_url: String,
    pub attributes: Vec<Attribute>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub files: Vec<MetadataFile>,
    pub category: String,
    pub creators: Vec<Creator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub address: String,
    pub share: u8,
}

impl TokenMetadata {
    pub fn for_record(record: &TokenRecord, settings: &MintingConfig) -> Self {
        Self {
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            description: format!("Flutterbye Message Token: \"{}\"", record.message),
            image: settings.image_url.clone(),
            external_url: settings.external_url.clone(),
            attributes: vec![
                Attribute {
                    trait_type: "Message".to_string(),
                    value: Value::from(record.message.clone()),
                },
                Attribute {
                    trait_type: "Total Supply".to_string(),
                    value: Value::from(record.total_supply),
                },
                Attribute {
                    trait_type: "Token Type".to_string(),
                    value: Value::from(record.symbol.clone()),
                },
            ],
            properties: Properties {
                files: vec![MetadataFile {
                    uri: settings.image_url.clone(),
                    mime_type: "image/png".to_string(),
                }],
                category: "token".to_string(),
                creators: vec![Creator {
                    address: record.authority.to_string(),
                    share: 100,
                }],
            },
        }
    }
}
