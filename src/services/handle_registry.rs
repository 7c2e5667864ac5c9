// Handle Registry: static per-provider metadata
// One table entry per provider carrying its URL rule, PII class and referral program as data

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// =============================================================================
// PROVIDER TYPES
// =============================================================================

/// Supported payment providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Venmo,
    Cashapp,
    Paypal,
    Zelle,
    Buymeacoffee,
    Kofi,
    Github,
    Bitcoin,
    Ethereum,
}

impl ProviderType {
    pub const ALL: [ProviderType; 9] = [
        ProviderType::Venmo,
        ProviderType::Cashapp,
        ProviderType::Paypal,
        ProviderType::Zelle,
        ProviderType::Buymeacoffee,
        ProviderType::Kofi,
        ProviderType::Github,
        ProviderType::Bitcoin,
        ProviderType::Ethereum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Venmo => "venmo",
            ProviderType::Cashapp => "cashapp",
            ProviderType::Paypal => "paypal",
            ProviderType::Zelle => "zelle",
            ProviderType::Buymeacoffee => "buymeacoffee",
            ProviderType::Kofi => "kofi",
            ProviderType::Github => "github",
            ProviderType::Bitcoin => "bitcoin",
            ProviderType::Ethereum => "ethereum",
        }
    }

    /// Registry entry for this provider
    pub fn config(&self) -> &'static ProviderConfig {
        let index = match self {
            ProviderType::Venmo => 0,
            ProviderType::Cashapp => 1,
            ProviderType::Paypal => 2,
            ProviderType::Zelle => 3,
            ProviderType::Buymeacoffee => 4,
            ProviderType::Kofi => 5,
            ProviderType::Github => 6,
            ProviderType::Bitcoin => 7,
            ProviderType::Ethereum => 8,
        };
        &PROVIDERS[index]
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderType::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| format!("Unknown payment provider: {}", s))
    }
}

// =============================================================================
// PROVIDER CONFIGURATION
// =============================================================================

/// How a provider turns a handle into a payment URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRule {
    /// `venmo://paycharge` with query parameters for recipient, amount and note
    VenmoPaycharge,
    /// Handle (and amount) embedded in the path after stripping a leading prefix
    PathWithAmount {
        base: &'static str,
        strip_prefix: Option<char>,
    },
    /// Plain profile URL, amount and memo are ignored
    Profile { base: &'static str },
    /// `scheme:handle` payment URI, optionally with an `?amount=` parameter
    Uri {
        scheme: &'static str,
        amount_param: bool,
    },
    /// No deep-link scheme, callers show the raw handle with a copy affordance
    None,
}

/// Referral program shape for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReferralKind {
    /// A code the payer copies before signing up
    Code,
    /// An invite URL the payer follows
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralProgram {
    pub kind: ReferralKind,
    pub signup_url: &'static str,
}

/// Static configuration for one provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: ProviderType,
    pub name: &'static str,
    pub icon: &'static str,
    pub placeholder: &'static str,
    pub prefix: Option<&'static str>,
    pub description: &'static str,
    pub is_pii: bool,
    pub url_rule: UrlRule,
    pub referral: Option<ReferralProgram>,
}

static PROVIDERS: [ProviderConfig; 9] = [
    ProviderConfig {
        provider: ProviderType::Venmo,
        name: "Venmo",
        icon: "V",
        placeholder: "username",
        prefix: Some("@"),
        description: "Venmo username (without @)",
        is_pii: false,
        url_rule: UrlRule::VenmoPaycharge,
        referral: Some(ReferralProgram {
            kind: ReferralKind::Link,
            signup_url: "https://venmo.com/signup",
        }),
    },
    ProviderConfig {
        provider: ProviderType::Cashapp,
        name: "Cash App",
        icon: "$",
        placeholder: "cashtag",
        prefix: Some("$"),
        description: "Cash App $cashtag (without $)",
        is_pii: false,
        url_rule: UrlRule::PathWithAmount {
            base: "https://cash.app/$",
            strip_prefix: Some('$'),
        },
        referral: Some(ReferralProgram {
            kind: ReferralKind::Code,
            signup_url: "https://cash.app/app",
        }),
    },
    ProviderConfig {
        provider: ProviderType::Paypal,
        name: "PayPal",
        icon: "P",
        placeholder: "username",
        prefix: None,
        description: "PayPal.me username",
        is_pii: false,
        url_rule: UrlRule::PathWithAmount {
            base: "https://paypal.me/",
            strip_prefix: None,
        },
        referral: Some(ReferralProgram {
            kind: ReferralKind::Link,
            signup_url: "https://www.paypal.com/signup",
        }),
    },
    ProviderConfig {
        provider: ProviderType::Zelle,
        name: "Zelle",
        icon: "Z",
        placeholder: "phone or email",
        prefix: None,
        description: "Phone number or email (will be shown to payer)",
        is_pii: true,
        url_rule: UrlRule::None,
        referral: None,
    },
    ProviderConfig {
        provider: ProviderType::Buymeacoffee,
        name: "Buy Me a Coffee",
        icon: "☕",
        placeholder: "username",
        prefix: None,
        description: "Buy Me a Coffee username",
        is_pii: false,
        url_rule: UrlRule::Profile {
            base: "https://buymeacoffee.com/",
        },
        referral: None,
    },
    ProviderConfig {
        provider: ProviderType::Kofi,
        name: "Ko-fi",
        icon: "K",
        placeholder: "username",
        prefix: None,
        description: "Ko-fi username",
        is_pii: false,
        url_rule: UrlRule::Profile {
            base: "https://ko-fi.com/",
        },
        referral: None,
    },
    ProviderConfig {
        provider: ProviderType::Github,
        name: "GitHub Sponsors",
        icon: "G",
        placeholder: "username",
        prefix: None,
        description: "GitHub username",
        is_pii: false,
        url_rule: UrlRule::Profile {
            base: "https://github.com/sponsors/",
        },
        referral: None,
    },
    ProviderConfig {
        provider: ProviderType::Bitcoin,
        name: "Bitcoin",
        icon: "₿",
        placeholder: "wallet address",
        prefix: None,
        description: "Bitcoin wallet address",
        is_pii: false,
        url_rule: UrlRule::Uri {
            scheme: "bitcoin",
            amount_param: true,
        },
        referral: None,
    },
    ProviderConfig {
        provider: ProviderType::Ethereum,
        name: "Ethereum",
        icon: "Ξ",
        placeholder: "wallet address or ENS",
        prefix: None,
        description: "Ethereum address or ENS name",
        is_pii: false,
        url_rule: UrlRule::Uri {
            scheme: "ethereum",
            amount_param: false,
        },
        referral: None,
    },
];

/// Registry entry as exposed to the dashboard's add-method form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProviderInfo {
    pub provider: ProviderType,
    pub name: &'static str,
    pub icon: &'static str,
    pub placeholder: &'static str,
    pub prefix: Option<&'static str>,
    pub description: &'static str,
    pub is_pii: bool,
    pub referral: Option<ReferralKind>,
}

impl From<&ProviderConfig> for ProviderInfo {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            provider: config.provider,
            name: config.name,
            icon: config.icon,
            placeholder: config.placeholder,
            prefix: config.prefix,
            description: config.description,
            is_pii: config.is_pii,
            referral: config.referral.map(|program| program.kind),
        }
    }
}

/// All registry entries in presentation order
pub fn all_providers() -> &'static [ProviderConfig] {
    &PROVIDERS
}


// =============================================================================
// URL BUILDING
// =============================================================================

impl ProviderConfig {
    /// Build the provider payment URL for a handle.
    ///
    /// Returns `None` exactly for providers without a deep-link scheme.
    pub fn build_url(
        &self,
        handle: &str,
        amount_cents: Option<i64>,
        memo: Option<&str>,
    ) -> Option<String> {
        let amount = amount_cents.filter(|c| *c > 0).map(format_amount);

        match self.url_rule {
            UrlRule::VenmoPaycharge => {
                let mut params = url::form_urlencoded::Serializer::new(String::new());
                params.append_pair("txn", "pay");
                params.append_pair("recipients", handle.trim_start_matches('@'));
                if let Some(ref amount) = amount {
                    params.append_pair("amount", amount);
                }
                if let Some(memo) = memo.filter(|m| !m.is_empty()) {
                    params.append_pair("note", memo);
                }
                Some(format!("venmo://paycharge?{}", params.finish()))
            },
            UrlRule::PathWithAmount { base, strip_prefix } => {
                let handle = match strip_prefix {
                    Some(prefix) => handle.trim_start_matches(prefix),
                    None => handle,
                };
                let mut url = format!("{}{}", base, encode_path_segment(handle));
                if let Some(amount) = amount {
                    url.push('/');
                    url.push_str(&amount);
                }
                Some(url)
            },
            UrlRule::Profile { base } => Some(format!("{}{}", base, encode_path_segment(handle))),
            UrlRule::Uri {
                scheme,
                amount_param,
            } => {
                let mut url = format!("{}:{}", scheme, encode_path_segment(handle));
                if let (true, Some(amount)) = (amount_param, amount) {
                    url.push_str("?amount=");
                    url.push_str(&amount);
                }
                Some(url)
            },
            UrlRule::None => None,
        }
    }

    /// Handle with the provider display prefix applied
    pub fn format_handle(&self, handle: &str) -> String {
        match self.prefix {
            Some(prefix) if !handle.starts_with(prefix) => format!("{}{}", prefix, handle),
            _ => handle.to_string(),
        }
    }
}

/// Render integer cents as a plain decimal amount: `12` or `12.50`
pub fn format_amount(cents: i64) -> String {
    let dollars = cents / 100;
    let remainder = (cents % 100).abs();
    if remainder == 0 {
        dollars.to_string()
    } else {
        format!("{}.{:02}", dollars, remainder)
    }
}

fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
