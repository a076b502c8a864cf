//! Notification email built from an accepted submission.

use crate::config::MailConfig;
use crate::contact::ContactFields;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

/// Provider-agnostic outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl EmailMessage {
    /// Build the team notification for a submission. Reply-To points at the
    /// visitor so the team can answer straight from their inbox.
    pub fn for_submission(
        fields: &ContactFields,
        mail: &MailConfig,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            from: mail.from.clone(),
            to: mail.to.clone(),
            reply_to: fields.email.clone(),
            subject: subject_line(fields),
            html: render_html(fields, sent_at),
            text: render_text(fields, sent_at),
        }
    }
}

pub fn subject_line(fields: &ContactFields) -> String {
    let who = if fields.name.trim().is_empty() {
        fields.email.trim()
    } else {
        fields.name.trim()
    };
    let prefix = if fields.is_demo { "[DEMO] " } else { "" };
    format!("{prefix}New contact from {who}")
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

fn render_html(fields: &ContactFields, sent_at: DateTime<Utc>) -> String {
    let heading = if fields.is_demo {
        "New Demo Request"
    } else {
        "New Contact Message"
    };
    let kind = if fields.is_demo {
        "Demo request"
    } else {
        "General contact"
    };
    let email = escape_html(&fields.email);

    let mut html = String::with_capacity(2048);
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>New contact - QArk</title>\n</head>\n\
         <body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">\n\
         <div style=\"max-width: 600px; margin: 0 auto; padding: 20px;\">\n",
    );
    let _ = writeln!(
        html,
        "<h2 style=\"color: #2563eb; border-bottom: 2px solid #2563eb; padding-bottom: 10px;\">{heading}</h2>"
    );
    html.push_str("<div style=\"background: #f8fafc; padding: 20px; border-radius: 8px; margin: 20px 0;\">\n");
    let _ = writeln!(
        html,
        "<p><strong>Name:</strong> {}</p>",
        escape_html(or_placeholder(&fields.name, "Not provided (demo)"))
    );
    let _ = writeln!(
        html,
        "<p><strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>"
    );
    let _ = writeln!(
        html,
        "<p><strong>Company:</strong> {}</p>",
        escape_html(or_placeholder(&fields.company, "Not specified"))
    );
    let _ = writeln!(html, "<p><strong>Type:</strong> {kind}</p>");
    html.push_str("</div>\n");

    if !fields.is_demo && !fields.message.is_empty() {
        let body = escape_html(&fields.message).replace('\n', "<br>");
        let _ = writeln!(
            html,
            "<div style=\"margin: 20px 0;\">\n<h3 style=\"color: #1f2937;\">Message:</h3>\n\
             <div style=\"background: white; padding: 15px; border-left: 4px solid #2563eb; border-radius: 4px;\">{body}</div>\n</div>"
        );
    } else {
        html.push_str(
            "<div style=\"margin: 20px 0; background: #dbeafe; padding: 15px; border-radius: 8px;\">\n\
             <h3 style=\"color: #1e40af;\">Demo Request</h3>\n\
             <p style=\"color: #1e3a8a; margin: 5px 0;\">The visitor has requested access to the QArk demo.</p>\n\
             <p style=\"color: #1e3a8a; margin: 5px 0;\"><strong>Next steps:</strong> send demo access credentials.</p>\n\
             </div>\n",
        );
    }

    html.push_str("<hr style=\"margin: 30px 0; border: none; border-top: 1px solid #e5e7eb;\">\n");
    let _ = writeln!(
        html,
        "<p style=\"font-size: 12px; color: #6b7280;\">Sent at: {}<br>From: QArk Contact Form</p>",
        sent_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_text(fields: &ContactFields, sent_at: DateTime<Utc>) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{}",
        if fields.is_demo {
            "New Demo Request"
        } else {
            "New Contact Message"
        }
    );
    let _ = writeln!(
        text,
        "Name: {}",
        or_placeholder(&fields.name, "Not provided (demo)")
    );
    let _ = writeln!(text, "Email: {}", fields.email);
    let _ = writeln!(
        text,
        "Company: {}",
        or_placeholder(&fields.company, "Not specified")
    );
    if !fields.is_demo && !fields.message.is_empty() {
        let _ = writeln!(text, "\n{}", fields.message);
    } else {
        let _ = writeln!(text, "\nNext steps: send demo access credentials.");
    }
    let _ = writeln!(text, "\nSent at: {}", sent_at.format("%Y-%m-%d %H:%M:%S UTC"));
    text
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
