//! Backend content types.

use serde::{Deserialize, Serialize};

/// Entry in the post index (`GET /posts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// ISO date, e.g. `2024-05-01`.
    pub published: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Full post (`GET /posts/{slug}`). The body is markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub published: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub body: String,
}

/// Static page (`GET /pages/{name}`). The body is markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub body: String,
}

/// Contact form submission (`POST /contact`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Single-use token from [`create_nonce`](crate::core::api::create_nonce).
    pub nonce: String,
}

impl ContactRequest {
    /// Basic client-side checks before sending.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Please enter your name");
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && domain.contains('.') => {}
            _ => return Err("Please enter a valid email address"),
        }
        if self.message.trim().is_empty() {
            return Err("Please enter a message");
        }
        Ok(())
    }
}

/// Acknowledgement for a contact submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_defaults() {
        let summary: PostSummary = serde_json::from_str(
            r#"{"slug":"hello","title":"Hello","published":"2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(summary.summary, "");
        assert!(summary.tags.is_empty());
    }

    #[test]
    fn test_contact_validation() {
        let mut request = ContactRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hi!".to_string(),
            nonce: "00".to_string(),
        };
        assert_eq!(request.validate(), Ok(()));

        request.email = "ada@localhost".to_string();
        assert!(request.validate().is_err());

        request.email = "ada@example.com".to_string();
        request.message = "   ".to_string();
        assert_eq!(request.validate(), Err("Please enter a message"));
    }
}
