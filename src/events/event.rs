use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle events emitted by the session actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    UserRegistered {
        user_id: Uuid,
        username: String,
        ip: String,
        device: String,
        at: DateTime<Utc>,
    },
    UserLoggedIn {
        user_id: Uuid,
        username: String,
        ip: String,
        device: String,
        at: DateTime<Utc>,
    },
    /// `ip` and `device` are those of the session that was rotated away.
    TokenRefreshed {
        user_id: Uuid,
        ip: String,
        device: String,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Dot-separated event name, also used as `event_type` on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user.registered",
            Self::UserLoggedIn { .. } => "user.logged_in",
            Self::TokenRefreshed { .. } => "user.token_refreshed",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::UserRegistered { at, .. }
            | Self::UserLoggedIn { at, .. }
            | Self::TokenRefreshed { at, .. } => *at,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Self::UserRegistered { user_id, .. }
            | Self::UserLoggedIn { user_id, .. }
            | Self::TokenRefreshed { user_id, .. } => *user_id,
        }
    }

    /// Builds the wire payload with a fresh `event_id`.
    pub fn payload(&self, source: &str) -> EventPayload {
        let (username, ip, device) = match self {
            Self::UserRegistered {
                username,
                ip,
                device,
                ..
            }
            | Self::UserLoggedIn {
                username,
                ip,
                device,
                ..
            } => (Some(username.clone()), ip, device),
            Self::TokenRefreshed { ip, device, .. } => (None, ip, device),
        };

        EventPayload {
            event_id: Uuid::new_v4(),
            event_type: self.name().to_owned(),
            user_id: self.user_id(),
            username,
            ip: ip.clone(),
            device: device.clone(),
            timestamp: self.timestamp(),
            metadata: EventMetadata {
                source: source.to_owned(),
            },
        }
    }
}

/// JSON body handed to the [`EventPublisher`](super::EventPublisher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub event_id: Uuid,
    pub event_type: String,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub ip: String,
    pub device: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: EventMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(user_id: Uuid) -> AuthEvent {
        AuthEvent::UserRegistered {
            user_id,
            username: "alice".to_owned(),
            ip: "10.0.0.1".to_owned(),
            device: "curl/8.0".to_owned(),
            at: Utc::now(),
        }
    }

    #[test]
    fn test_event_names() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        assert_eq!(registered(user_id).name(), "user.registered");
        assert_eq!(
            AuthEvent::UserLoggedIn {
                user_id,
                username: "alice".to_owned(),
                ip: String::new(),
                device: String::new(),
                at: now,
            }
            .name(),
            "user.logged_in"
        );
        assert_eq!(
            AuthEvent::TokenRefreshed {
                user_id,
                ip: String::new(),
                device: String::new(),
                at: now,
            }
            .name(),
            "user.token_refreshed"
        );
    }

    #[test]
    fn test_payload_shape() {
        let user_id = Uuid::new_v4();
        let event = registered(user_id);

        let json = serde_json::to_value(event.payload("vira_id")).unwrap();
        assert_eq!(json["event_type"], "user.registered");
        assert_eq!(json["user_id"], user_id.to_string());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["ip"], "10.0.0.1");
        assert_eq!(json["device"], "curl/8.0");
        assert_eq!(json["metadata"]["source"], "vira_id");
        assert!(json["event_id"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_refresh_payload_has_no_username() {
        let event = AuthEvent::TokenRefreshed {
            user_id: Uuid::new_v4(),
            ip: "10.0.0.2".to_owned(),
            device: "ios".to_owned(),
            at: Utc::now(),
        };

        let json = serde_json::to_value(event.payload("vira_id")).unwrap();
        assert!(json.get("username").is_none());
        assert_eq!(json["device"], "ios");
    }

    #[test]
    fn test_event_ids_are_unique() {
        let event = registered(Uuid::new_v4());
        assert_ne!(event.payload("s").event_id, event.payload("s").event_id);
    }
}
