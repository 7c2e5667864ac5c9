// HTML presentations for the public pay pages

use crate::models::LinkValidity;
use crate::services::pay_page::{EphemeralPage, ExpiredPage, PaymentOption, PersistentPage};

const STYLE: &str = r#"
        body {
            margin: 0;
            padding: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #fff8e1;
            color: #3e2723;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .container {
            width: 100%;
            max-width: 420px;
            padding: 2rem;
            text-align: center;
        }
        .option {
            display: flex;
            align-items: center;
            gap: 0.75rem;
            margin: 0.75rem 0;
            padding: 0.9rem 1rem;
            border-radius: 12px;
            background: white;
            box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
            color: inherit;
            text-decoration: none;
        }
        .icon {
            width: 2rem;
            font-weight: bold;
        }
        .handle {
            margin-left: auto;
            opacity: 0.7;
        }
        .referral {
            font-size: 0.85rem;
            margin: -0.25rem 0 0.75rem;
        }
        .meta {
            opacity: 0.8;
        }
        button {
            border: none;
            background: #ffca28;
            border-radius: 8px;
            padding: 0.3rem 0.6rem;
            cursor: pointer;
        }
"#;

/// Escape text for HTML bodies and double-quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, robots: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="robots" content="{robots}">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#,
        title = escape_html(title),
        robots = robots,
        STYLE = STYLE,
        body = body,
    )
}

fn render_option(option: &PaymentOption) -> String {
    let icon = escape_html(&option.icon);
    let name = escape_html(&option.name);
    let handle = escape_html(&option.display_handle);

    let button = match option.url {
        Some(ref url) => format!(
            r#"        <a class="option" href="{url}" rel="noopener noreferrer"><span class="icon">{icon}</span><span>{name}</span><span class="handle">{handle}</span></a>"#,
            url = escape_html(url),
        ),
        None => format!(
            r#"        <div class="option"><span class="icon">{icon}</span><span>{name}</span><span class="handle">{handle}</span><button type="button" data-copy="{handle}" onclick="navigator.clipboard.writeText(this.dataset.copy)">Copy</button></div>"#,
        ),
    };

    let referral = option
        .referral
        .as_ref()
        .map(|cta| match cta.kind {
            crate::services::ReferralKind::Code => format!(
                r#"
        <p class="referral">New to {name}? Sign up at <a href="{signup}">{signup}</a> with code <strong>{code}</strong></p>"#,
                signup = escape_html(&cta.signup_url),
                code = escape_html(&cta.code),
            ),
            crate::services::ReferralKind::Link => format!(
                r#"
        <p class="referral">New to {name}? <a href="{link}" rel="noopener noreferrer">Join with my invite</a></p>"#,
                link = escape_html(&cta.code),
            ),
        })
        .unwrap_or_default();

    format!("{}{}", button, referral)
}

fn render_options(options: &[PaymentOption]) -> String {
    if options.is_empty() {
        return r#"        <p class="meta">No payment methods yet.</p>"#.to_string();
    }
    options
        .iter()
        .map(render_option)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn persistent_page(page: &PersistentPage) -> String {
    let body = format!(
        r#"        <h1>Pay {name}</h1>
        <p class="meta">@{username}</p>
{options}"#,
        name = escape_html(&page.display_name),
        username = escape_html(&page.username),
        options = render_options(&page.options),
    );
    layout(&format!("Pay {}", page.display_name), "index, follow", &body)
}

pub fn ephemeral_page(page: &EphemeralPage) -> String {
    let amount = page
        .amount
        .as_ref()
        .map(|amount| format!("\n        <h2>${}</h2>", escape_html(amount)))
        .unwrap_or_default();
    let memo = page
        .memo
        .as_ref()
        .map(|memo| format!("\n        <p>{}</p>", escape_html(memo)))
        .unwrap_or_default();
    let remaining = match page.views_remaining {
        1 => "1 view remaining".to_string(),
        n => format!("{} views remaining", n),
    };

    let body = format!(
        r#"        <h1>Pay {name}</h1>{amount}{memo}
{options}
        <p class="meta">This private link expires {expires}. {remaining}.</p>"#,
        name = escape_html(&page.display_name),
        options = render_options(&page.options),
        expires = page.expires_at.format("%Y-%m-%d %H:%M UTC"),
    );
    layout(&format!("Pay {}", page.display_name), "noindex, nofollow", &body)
}

pub fn expired_page(page: &ExpiredPage) -> String {
    let detail = match page.reason {
        LinkValidity::ViewLimitReached => "This link has reached its view limit.",
        _ => "This link has expired.",
    };
    let body = format!(
        r#"        <h1>Link expired</h1>
        <p>{detail}</p>
        <p class="meta">Ask {name} for a new link, or visit <a href="/{username}">their public page</a>.</p>"#,
        name = escape_html(&page.display_name),
        username = escape_html(&page.username),
    );
    layout("Link expired", "noindex, nofollow", &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        "noindex, nofollow",
        r#"        <h1>Not found</h1>
        <p>There is no payment page here.</p>"#,
    )
}

pub fn unavailable_page() -> String {
    layout(
        "Temporarily unavailable",
        "noindex, nofollow",
        r#"        <h1>Temporarily unavailable</h1>
        <p>Please try again in a moment.</p>"#,
    )
}
