//! Redaction of credentials and e-mail addresses before they are logged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::params::{ParamValue, Params};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9._%+\-]+)@([A-Za-z0-9.\-]+\.[A-Za-z]{2,})").expect("valid regex")
});

/// Parameter names whose values are credentials.
const SECRET_KEYS: &[&str] = &[
    "api_key",
    "api_secret",
    "client_secret",
    "access_token",
    "refresh_token",
    "code",
];

/// Keep only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let visible = chars.len().saturating_sub(4);
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { *c })
        .collect()
}

/// Keep only the first character of an e-mail's local part.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{}@{domain}", mask_local_part(local)),
        None => email.to_string(),
    }
}

fn mask_local_part(local: &str) -> String {
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => std::iter::once(first)
            .chain(chars.map(|_| '*'))
            .collect(),
        None => String::new(),
    }
}

/// Mask every e-mail address found in free text.
pub fn mask_text(text: &str) -> String {
    EMAIL_RE
        .replace_all(text, |caps: &Captures<'_>| {
            format!("{}@{}", mask_local_part(&caps[1]), &caps[2])
        })
        .into_owned()
}

/// Render a parameter bag for logging with secrets and e-mails masked.
pub fn masked_params(params: &Params) -> String {
    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", masked_value(key, value)))
        .collect();
    pairs.join("&")
}

fn masked_value(key: &str, value: &ParamValue) -> String {
    match value {
        ParamValue::Str(s) if SECRET_KEYS.contains(&key) => mask_secret(s),
        ParamValue::Str(s) => mask_text(s),
        other => mask_text(&serde_json::to_string(other).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_keep_last_four() {
        assert_eq!(mask_secret("sk_live_abcd1234"), "************1234");
        assert_eq!(mask_secret("abc"), "abc");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn emails_keep_first_local_character() {
        assert_eq!(mask_email("jane.doe@example.com"), "j*******@example.com");
        assert_eq!(mask_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn text_masks_embedded_addresses() {
        assert_eq!(
            mask_text(r#"{"email_address":"bob@example.org","first_name":"Bob"}"#),
            r#"{"email_address":"b**@example.org","first_name":"Bob"}"#
        );
    }

    #[test]
    fn params_mask_credentials_and_emails() {
        let params = Params::new()
            .with("api_secret", "supersecretvalue")
            .with("email", "alice@example.com")
            .with("per_page", 100u32);

        assert_eq!(
            masked_params(&params),
            "api_secret=************alue&email=a****@example.com&per_page=100"
        );
    }
}
