pub const DEFAULT_VERIFY_TOKEN: &str = "my_verify_token";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_PREFIX: &str = "sha256=";
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";
pub const HEALTH_OK: &str = "OK";
pub const SUBSCRIBE_MODE: &str = "subscribe";

pub const MESSAGING_PRODUCT: &str = "whatsapp";
pub const RECIPIENT_TYPE_INDIVIDUAL: &str = "individual";
pub const UNKNOWN_SENDER_NAME: &str = "Unknown";

pub const HELLO_WORLD_TEMPLATE: &str = "hello_world";
pub const HELLO_WORLD_LANGUAGE: &str = "en_US";
