use std::fmt;

/// A secret cached in the vault, keyed by (service, principal)
#[derive(Clone)]
pub struct Credential {
    pub service: String,
    pub principal: String,
    pub secret: String,
}

impl Credential {
    pub fn new(service: &str, principal: &str, secret: String) -> Self {
        Self {
            service: service.to_string(),
            principal: principal.to_string(),
            secret,
        }
    }

    /// Masked preview (last 4 characters)
    pub fn create_preview(secret: &str) -> String {
        let chars: Vec<char> = secret.chars().collect();
        let len = chars.len();
        if len <= 4 {
            "*".repeat(len)
        } else {
            let tail: String = chars[len - 4..].iter().collect();
            format!("{}...{}", "*".repeat(4), tail)
        }
    }

    pub fn preview(&self) -> String {
        Self::create_preview(&self.secret)
    }
}

// Never print the secret itself
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("service", &self.service)
            .field("principal", &self.principal)
            .field("secret", &self.preview())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_masks_all_but_tail() {
        assert_eq!(Credential::create_preview("abcdefgh"), "****...efgh");
        assert_eq!(Credential::create_preview("abc"), "***");
        assert_eq!(Credential::create_preview(""), "");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("binance.api.secret", "alice", "s3cr3t-value".to_string());
        let rendered = format!("{:?}", credential);

        assert!(!rendered.contains("s3cr3t-value"));
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("****...alue"));
    }
}
