//! Host → frame messages
//!
//! Payload maps travel JSON-stringified, the shape embedded clients parse.

use crate::core::paths::outbound;
use crate::navigation::{Context, Params};
use serde::Serialize;
use serde_json::{json, Value};

/// Host-side data accompanying a navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalData {
    pub is_navigate_back: bool,
    pub view_stack_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_permissions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePayload {
    pub context: Context,
    pub node_params: Params,
    pub path_params: Params,
    pub search_params: Params,
    pub internal: InternalData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Navigate { view_url: String, payload: FramePayload },
    Init { payload: FramePayload },
    Inactive { payload: FramePayload },
    AlertClosed { id: Option<String>, dismiss_key: Option<String> },
    ConfirmationClosed { confirmed: bool },
    PathExistsAnswer { correlation_id: Option<String>, path_exists: bool },
    Custom { data: Value },
}

fn stringify<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn payload_fields(payload: &FramePayload, search_params: bool) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    map.insert("context".into(), Value::String(stringify(&payload.context)));
    map.insert("nodeParams".into(), Value::String(stringify(&payload.node_params)));
    map.insert("pathParams".into(), Value::String(stringify(&payload.path_params)));
    if search_params {
        map.insert("searchParams".into(), Value::String(stringify(&payload.search_params)));
    }
    map.insert("internal".into(), Value::String(stringify(&payload.internal)));
    map
}

impl Outbound {
    pub fn name(&self) -> &'static str {
        match self {
            Outbound::Navigate { .. } => outbound::NAVIGATE,
            Outbound::Init { .. } => outbound::INIT,
            Outbound::Inactive { .. } => outbound::INACTIVE,
            Outbound::AlertClosed { .. } => outbound::ALERT_CLOSED,
            Outbound::ConfirmationClosed { .. } => outbound::CONFIRMATION_CLOSED,
            Outbound::PathExistsAnswer { .. } => outbound::PATH_EXISTS_ANSWER,
            Outbound::Custom { .. } => outbound::CUSTOM,
        }
    }

    /// postMessage payload.
    pub fn to_wire(&self) -> Value {
        let mut wire = match self {
            Outbound::Navigate { view_url, payload } => {
                let mut map = payload_fields(payload, true);
                map.insert("viewUrl".into(), Value::String(view_url.clone()));
                Value::Object(map)
            }
            Outbound::Init { payload } => Value::Object(payload_fields(payload, true)),
            Outbound::Inactive { payload } => Value::Object(payload_fields(payload, false)),
            Outbound::AlertClosed { id, dismiss_key } => json!({ "id": id, "dismissKey": dismiss_key }),
            Outbound::ConfirmationClosed { confirmed } => json!({ "data": { "confirmed": confirmed } }),
            Outbound::PathExistsAnswer { correlation_id, path_exists } => {
                json!({ "correlationId": correlation_id, "data": path_exists })
            }
            Outbound::Custom { data } => json!({ "data": data }),
        };
        if let Value::Object(map) = &mut wire {
            map.insert("msg".into(), Value::String(self.name().to_string()));
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_carries_stringified_maps() {
        let mut payload = FramePayload::default();
        payload.context.insert("a".into(), json!(1));
        payload.path_params.insert("id".into(), "7".into());
        let wire = Outbound::Navigate { view_url: "/x".into(), payload }.to_wire();

        assert_eq!(wire["msg"], "luigi.navigate");
        assert_eq!(wire["viewUrl"], "/x");
        assert_eq!(wire["context"], r#"{"a":1}"#);
        assert_eq!(wire["pathParams"], r#"{"id":"7"}"#);
        let internal: Value = serde_json::from_str(wire["internal"].as_str().unwrap()).unwrap();
        assert_eq!(internal["isNavigateBack"], false);
    }

    #[test]
    fn inactive_has_no_search_params() {
        let wire = Outbound::Inactive { payload: FramePayload::default() }.to_wire();
        assert_eq!(wire["msg"], "luigi-client.inactive-microfrontend");
        assert!(wire.get("searchParams").is_none());
        assert!(wire.get("nodeParams").is_some());
    }
}
