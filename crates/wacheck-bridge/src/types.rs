//! Raw shapes reported by the automation bridge.
//!
//! Field presence varies between bridge versions, so nearly everything is
//! optional and unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use wacheck_core::models::{AccountInfo, Product, SessionStatus};

/// Platform user id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaId {
    #[serde(default, rename = "_serialized")]
    pub serialized: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
}

impl WaId {
    pub fn has_serialized(&self) -> bool {
        self.serialized.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Session state reported by `start-session` and `status-session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub qrcode: Option<String>,
}

impl BridgeStatus {
    pub fn new(status: impl Into<String>, qrcode: Option<String>) -> Self {
        Self {
            status: status.into(),
            qrcode,
        }
    }

    /// Map the bridge's state name onto the session lifecycle.
    /// `None` for transitional states that should not change the session status.
    pub fn session_status(&self) -> Option<SessionStatus> {
        match self.status.as_str() {
            "isLogged" | "CONNECTED" | "inChat" | "qrReadSuccess" => Some(SessionStatus::Connected),
            "notLogged" | "QRCODE" | "autocloseCalled" | "desconnectedMobile" => {
                Some(SessionStatus::QrReady)
            }
            "browserClose" | "CLOSED" | "DISCONNECTED" => Some(SessionStatus::Disconnected),
            "INITIALIZING" | "STARTING" | "OPENING" => Some(SessionStatus::Initializing),
            _ => None,
        }
    }
}

/// Result of `check-number-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberStatus {
    #[serde(default)]
    pub number_exists: Option<bool>,
    #[serde(default)]
    pub exists: Option<bool>,
    #[serde(default)]
    pub can_receive_message: Option<bool>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub id: Option<WaId>,
    #[serde(default)]
    pub is_business: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    #[serde(default, deserialize_with = "string_or_first")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_or_first")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "string_or_first")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "string_or_first")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_first")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub id: Option<WaId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pushname: Option<String>,
    /// About/status text
    #[serde(default, deserialize_with = "string_or_first")]
    pub status: Option<String>,
    #[serde(default)]
    pub is_my_contact: Option<bool>,
    #[serde(default)]
    pub is_business: Option<bool>,
    #[serde(default)]
    pub is_enterprise: Option<bool>,
    #[serde(default)]
    pub verified_name: Option<String>,
    #[serde(default)]
    pub business_profile: Option<BusinessProfile>,
}

impl Contact {
    pub fn has_serialized_id(&self) -> bool {
        self.id.as_ref().is_some_and(WaId::has_serialized)
    }

    pub fn display_name(&self) -> Option<String> {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| self.pushname.clone().filter(|n| !n.is_empty()))
    }

    /// Any business marker on the contact record
    pub fn has_business_marker(&self) -> bool {
        self.business_profile.is_some()
            || self.is_business.unwrap_or(false)
            || self.verified_name.as_deref().is_some_and(|v| !v.is_empty())
            || self.is_enterprise.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePhone {
    #[serde(default, alias = "device_model")]
    pub device_model: Option<String>,
    #[serde(default, alias = "device_manufacturer")]
    pub device_manufacturer: Option<String>,
}

/// Result of `host-device`: the paired account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDevice {
    #[serde(default)]
    pub id: Option<WaId>,
    #[serde(default)]
    pub wid: Option<WaId>,
    #[serde(default)]
    pub pushname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub phone: Option<DevicePhone>,
}

impl HostDevice {
    pub fn account_info(&self) -> AccountInfo {
        const UNKNOWN: &str = "Unknown";
        let device = self
            .device
            .clone()
            .or_else(|| self.phone.as_ref().and_then(|p| p.device_model.clone()));

        AccountInfo {
            name: self
                .pushname
                .clone()
                .or_else(|| self.name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            number: self
                .id
                .as_ref()
                .or(self.wid.as_ref())
                .and_then(|id| id.user.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            device: device.unwrap_or_else(|| UNKNOWN.to_string()),
            platform: self
                .platform
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            connected: true,
        }
    }
}

/// Catalog entry from `get-business-profiles-products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProduct {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

fn value_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            id: raw.id.and_then(value_to_string),
            name: raw.name,
            description: raw.description,
            price: raw.price.and_then(value_to_string),
            currency: raw.currency,
        }
    }
}

/// Accept a string, the first string of a list, or a `{ "localized_display_name" }` object.
fn string_or_first<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(first_string))
}

fn first_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Array(items) => items.into_iter().find_map(first_string),
        serde_json::Value::Object(map) => map
            .get("localized_display_name")
            .or_else(|| map.get("url"))
            .cloned()
            .and_then(first_string),
        _ => None,
    }
}
