use crate::config::settings::NotifySettings;
use crate::domain::model::FailureNotice;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::{Duration, SystemTime};

/// Sends failure notices over SMTP with STARTTLS, authenticating as the sender.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
    subject: String,
}

impl SmtpNotifier {
    pub fn new(settings: &NotifySettings, password: &str) -> Result<Self> {
        let sender: Mailbox = settings.sender.parse()?;
        let recipient: Mailbox = settings.recipient.parse()?;
        let credentials = Credentials::new(settings.sender.clone(), password.to_string());

        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
        } else {
            tracing::warn!("⚠️ STARTTLS disabled, SMTP credentials are sent in clear text");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
        };
        let transport = builder
            .port(settings.smtp_port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)))
            .build();

        Ok(Self {
            transport,
            sender,
            recipient,
            subject: settings.subject.clone(),
        })
    }

    pub fn compose(&self, notice: &FailureNotice) -> Result<Message> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(self.subject.as_str())
            .date(SystemTime::from(notice.occurred_at))
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body())?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, notice: &FailureNotice) -> Result<()> {
        let message = self.compose(notice)?;
        self.transport.send(message).await?;
        tracing::info!("📧 Failure email sent to {}", self.recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Stage;
    use crate::utils::error::EtlError;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one SMTP session, answers every command positively and returns
    /// the client's lines. DATA lines are collected until the terminating dot.
    async fn smtp_listener() -> (u16, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut transcript = Vec::new();
            let mut in_data = false;

            write.write_all(b"220 stub ESMTP ready\r\n").await.unwrap();
            while let Ok(Some(line)) = lines.next_line().await {
                transcript.push(line.clone());
                let reply: &[u8] = if in_data {
                    if line != "." {
                        continue;
                    }
                    in_data = false;
                    b"250 2.0.0 queued\r\n"
                } else if line.starts_with("EHLO") {
                    b"250-stub\r\n250 AUTH PLAIN\r\n"
                } else if line.starts_with("AUTH") {
                    b"235 2.7.0 authenticated\r\n"
                } else if line == "DATA" {
                    in_data = true;
                    b"354 end data with <CR><LF>.<CR><LF>\r\n"
                } else if line == "QUIT" {
                    let _ = write.write_all(b"221 bye\r\n").await;
                    break;
                } else {
                    b"250 2.1.0 ok\r\n"
                };
                if write.write_all(reply).await.is_err() {
                    break;
                }
            }
            transcript
        });

        (port, handle)
    }

    #[tokio::test]
    async fn test_compose_plain_text_email() {
        let settings = NotifySettings {
            sender: "alerts@contoso.com".to_string(),
            recipient: "ops@contoso.com".to_string(),
            ..NotifySettings::default()
        };
        let notifier = SmtpNotifier::new(&settings, "secret").unwrap();
        let notice = FailureNotice::new(
            Stage::Fetch,
            &EtlError::ProcessingError {
                message: "connection reset".to_string(),
            },
        );

        let message = notifier.compose(&notice).unwrap();
        // Undo quoted-printable soft line breaks
        let raw = String::from_utf8(message.formatted())
            .unwrap()
            .replace("=\r\n", "")
            .replace("=20", " ");

        assert!(raw.contains("From: alerts@contoso.com"));
        assert!(raw.contains("To: ops@contoso.com"));
        assert!(raw.contains("Subject: Error in DLD Script"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("Date: "));
        assert!(raw.contains("Something went wrong in fetching DLD transaction data."));
        assert!(raw.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_notify_delivers_over_smtp_session() {
        let (port, session) = smtp_listener().await;
        let settings = NotifySettings {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: port,
            starttls: false,
            sender: "alerts@contoso.com".to_string(),
            recipient: "ops@contoso.com".to_string(),
            timeout_seconds: 5,
            ..NotifySettings::default()
        };
        let notifier = SmtpNotifier::new(&settings, "secret").unwrap();
        let notice = FailureNotice::new(
            Stage::Publish,
            &EtlError::StorageError {
                status: 403,
                message: "AuthenticationFailed".to_string(),
            },
        );

        notifier.notify(&notice).await.unwrap();
        let transcript = session.await.unwrap();

        let auth = format!("AUTH PLAIN {}", STANDARD.encode("\0alerts@contoso.com\0secret"));
        assert!(transcript.iter().any(|l| l.starts_with("EHLO ")));
        assert!(transcript.contains(&auth));
        assert!(transcript
            .iter()
            .any(|l| l.starts_with("MAIL FROM:<alerts@contoso.com>")));
        assert!(transcript
            .iter()
            .any(|l| l.starts_with("RCPT TO:<ops@contoso.com>")));

        // Undo quoted-printable soft line breaks
        let data = transcript
            .join("\n")
            .replace("=\n", "")
            .replace("=20", " ");
        assert!(data.contains("Subject: Error in DLD Script"));
        assert!(data.contains(
            "Something went wrong in uploading to Azure Blob, DLD transaction data."
        ));
        assert!(data.contains("AuthenticationFailed"));
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let settings = NotifySettings {
            sender: "not-an-address".to_string(),
            ..NotifySettings::default()
        };
        assert!(matches!(
            SmtpNotifier::new(&settings, "secret"),
            Err(EtlError::AddressError(_))
        ));
    }
}
