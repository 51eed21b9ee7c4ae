//! Subject, plain-text and HTML bodies for every notification the service sends.

use hq_roster::model::Power;

const SIGNATURE: &str = "The HeroHQ Team";

/// A rendered notification, ready for [`crate::Mailer::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[must_use]
pub fn test_email() -> Email {
    Email {
        subject: "Test Email from HeroHQ".to_owned(),
        text: format!(
            "This is a test email from HeroHQ.\n\nIf you received it, mail delivery is configured correctly.\n\n{SIGNATURE}"
        ),
        html: layout(
            "Mail delivery works",
            "<p>This is a test email from HeroHQ.</p>\
             <p>If you received it, mail delivery is configured correctly.</p>",
        ),
    }
}

#[must_use]
pub fn power_update(power: &Power) -> Email {
    Email {
        subject: format!("Power Updated: {}", power.name),
        text: format!(
            "The power \"{}\" has been updated.\n\nNew description: {}\n\n{SIGNATURE}",
            power.name, power.description
        ),
        html: layout(
            "Power updated",
            &format!(
                "<p>The power <strong>{}</strong> has been updated.</p>\
                 <p>New description: {}</p>",
                escape(&power.name),
                escape(&power.description)
            ),
        ),
    }
}

#[must_use]
pub fn hero_welcome(hero_name: &str, super_name: &str) -> Email {
    Email {
        subject: format!("Welcome to HeroHQ, {super_name}!"),
        text: format!(
            "Welcome, {hero_name}!\n\nYour hero identity {super_name} is now part of the roster.\n\n{SIGNATURE}"
        ),
        html: layout(
            &format!("Welcome, {}!", escape(hero_name)),
            &format!(
                "<p>Your hero identity <strong>{}</strong> is now part of the roster.</p>",
                escape(super_name)
            ),
        ),
    }
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family: sans-serif\">\
         <h2>{heading}</h2>{body}<p>{SIGNATURE}</p></body></html>"
    )
}

/// Minimal HTML escaping for user-supplied values.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
