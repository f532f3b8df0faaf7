//! Notification recipient and phone number helpers.

use serde::{Deserialize, Serialize};

/// Display name used when the user has none on file.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Country calling code prepended to numbers given without a `+` prefix.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Who an alert should reach, and through which addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub display_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub push_token: Option<String>,
}

impl Recipient {
    /// A recipient reachable only by phone.
    pub fn with_phone(display_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            phone: Some(phone.into()),
            email: None,
            push_token: None,
        }
    }

    /// Whether any delivery address is present.
    pub fn is_reachable(&self) -> bool {
        [&self.phone, &self.email, &self.push_token]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Return a copy with empty strings dropped, the display name defaulted
    /// and the phone number put in international form.
    pub fn normalized(mut self, country_code: &str) -> Self {
        self.phone = non_empty(self.phone).map(|p| normalize_phone(&p, country_code));
        self.email = non_empty(self.email);
        self.push_token = non_empty(self.push_token);
        if self.display_name.trim().is_empty() {
            self.display_name = DEFAULT_DISPLAY_NAME.to_string();
        }
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Put a phone number in `+<country><number>` form.
///
/// Numbers that already start with `+` are returned unchanged.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("{country_code}{trimmed}")
    }
}

/// Hide most of an address before it goes into a log line.
///
/// Emails keep the first character and the domain. Anything else keeps its
/// leading `+` and last four characters.
pub fn mask_address(address: &str) -> String {
    let address = address.trim();
    if let Some((local, domain)) = address.split_once('@') {
        let first = local.chars().next().map(String::from).unwrap_or_default();
        return format!("{first}***@{domain}");
    }

    let (prefix, rest) = match address.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", address),
    };
    let len = rest.chars().count();
    if len <= 4 {
        return format!("{prefix}****");
    }
    let tail: String = rest.chars().skip(len - 4).collect();
    format!("{prefix}{}{tail}", "*".repeat(len - 4))
}
