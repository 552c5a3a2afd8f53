//! # Auto-reply policy
//!
//! Decides whether an inbound text deserves an automatic answer. The decision
//! is kept apart from the webhook plumbing so deployments can plug their own
//! [`ReplyPolicy`] into the application state.

/// What to send back to the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyAction {
    Text {
        body: String,
    },
    Template {
        name: String,
        language_code: String,
        body_params: Vec<String>,
    },
}

/// Outcome of a matched rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Name of the rule that matched
    pub rule: String,
    pub action: ReplyAction,
}

#[cfg_attr(test, mockall::automock)]
pub trait ReplyPolicy: Send + Sync {
    /// Returns at most one reply for a text received from `sender_id`
    fn decide(&self, sender_id: &str, sender_name: &str, text: &str) -> Option<Reply>;
}

/// Body of a rule's reply; `{name}` is replaced by the sender display name
#[derive(Debug, Clone)]
pub enum ReplyTemplate {
    Text(String),
    Template {
        name: String,
        language_code: String,
    },
}

/// Fires when the text contains any of `keywords`, ignoring case
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub name: String,
    pub keywords: Vec<String>,
    pub reply: ReplyTemplate,
}

impl KeywordRule {
    pub fn text(name: &str, keywords: &[&str], body: &str) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            reply: ReplyTemplate::Text(body.to_string()),
        }
    }

    fn matches(&self, lower_text: &str) -> bool {
        self.keywords.iter().any(|k| lower_text.contains(k.as_str()))
    }

    fn action(&self, sender_name: &str) -> ReplyAction {
        match &self.reply {
            ReplyTemplate::Text(body) => ReplyAction::Text {
                body: body.replace("{name}", sender_name),
            },
            ReplyTemplate::Template {
                name,
                language_code,
            } => ReplyAction::Template {
                name: name.clone(),
                language_code: language_code.clone(),
                body_params: vec![sender_name.to_string()],
            },
        }
    }
}

/// Ordered keyword rules; the first rule that matches wins
#[derive(Debug, Clone)]
pub struct KeywordReplyPolicy {
    rules: Vec<KeywordRule>,
}

impl KeywordReplyPolicy {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }
}

impl Default for KeywordReplyPolicy {
    /// Greeting, then help menu, then info
    fn default() -> Self {
        Self::new(vec![
            KeywordRule::text(
                "greeting",
                &["hello", "hi", "halo"],
                "Hello {name}! Welcome to our service. How can I help you today?",
            ),
            KeywordRule::text(
                "help",
                &["help", "bantuan"],
                "Hi {name}! How can I help you today?\n\n\
                 1. Type 'info' for information\n\
                 2. Type 'contact' for contact details\n\
                 3. Type 'hello' for a greeting",
            ),
            KeywordRule::text(
                "info",
                &["info"],
                "This is a WhatsApp Cloud API webhook demo.\n\nBuilt with Rust.",
            ),
        ])
    }
}

impl ReplyPolicy for KeywordReplyPolicy {
    fn decide(&self, _sender_id: &str, sender_name: &str, text: &str) -> Option<Reply> {
        let lower_text = text.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&lower_text))
            .map(|rule| Reply {
                rule: rule.name.clone(),
                action: rule.action(sender_name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(text: &str) -> Option<String> {
        KeywordReplyPolicy::default()
            .decide("16505551234", "Ana", text)
            .map(|reply| reply.rule)
    }

    #[test]
    fn test_default_rules() {
        assert_eq!(rule_for("Hello there").as_deref(), Some("greeting"));
        assert_eq!(rule_for("need HELP please").as_deref(), Some("help"));
        assert_eq!(rule_for("Info").as_deref(), Some("info"));
        assert_eq!(rule_for("bantuan dong").as_deref(), Some("help"));
        assert_eq!(rule_for("xyz"), None);
        assert_eq!(rule_for(""), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(rule_for("hi, need help").as_deref(), Some("greeting"));
        assert_eq!(rule_for("help me with info").as_deref(), Some("help"));
    }

    #[test]
    fn test_substring_match_is_not_word_match() {
        // "this" contains "hi"
        assert_eq!(rule_for("what is this").as_deref(), Some("greeting"));
    }

    #[test]
    fn test_reply_mentions_sender_name() {
        let reply = KeywordReplyPolicy::default()
            .decide("16505551234", "Ana", "HALO")
            .unwrap();

        assert_eq!(
            reply.action,
            ReplyAction::Text {
                body: "Hello Ana! Welcome to our service. How can I help you today?".into()
            }
        );
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let policy = KeywordReplyPolicy::new(vec![KeywordRule {
            name: "order".into(),
            keywords: vec!["order".into()],
            reply: ReplyTemplate::Template {
                name: "order_status".into(),
                language_code: "en_US".into(),
            },
        }]);

        assert!(policy.decide("1", "Ana", "hello").is_none());
        assert_eq!(
            policy.decide("1", "Ana", "where is my ORDER?").unwrap().action,
            ReplyAction::Template {
                name: "order_status".into(),
                language_code: "en_US".into(),
                body_params: vec!["Ana".into()],
            }
        );
    }
}
