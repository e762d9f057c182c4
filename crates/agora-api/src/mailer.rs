use std::sync::Mutex;

use tracing::info;

/// A rendered email ready for delivery.
#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub html: String,
    /// The actionable link embedded in `html`.
    pub link: String,
}

impl Mail {
    pub fn confirm_email(to: &str, link: String) -> Self {
        Self {
            to: to.to_string(),
            subject: "Confirm Email".into(),
            html: format!(
                "<html lang=\"en\"><body>\
                 <p>Thanks for the registration!</p>\
                 <span>Please confirm your email <a href=\"{link}\">confirm email</a></span>\
                 </body></html>"
            ),
            link,
        }
    }

    pub fn recover_password(to: &str, link: String) -> Self {
        Self {
            to: to.to_string(),
            subject: "Password recovering".into(),
            html: format!(
                "<html lang=\"en\"><body>\
                 <p>Password recovering</p>\
                 <a href=\"{link}\">Recover password</a>\
                 </body></html>"
            ),
            link,
        }
    }
}

/// Outbound mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: Mail);
}

/// Logs every mail instead of delivering it.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: Mail) {
        info!(to = %mail.to, subject = %mail.subject, link = %mail.link, "Outgoing mail");
    }
}

/// Keeps every mail in memory so callers can inspect what was sent.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Mail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Link of the most recent mail addressed to `to`.
    pub fn last_link_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to == to)
            .map(|m| m.link)
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: Mail) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail);
        }
    }
}
