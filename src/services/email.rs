//! Envoi des emails (reset de mot de passe) via SMTP ou fichiers.

use async_trait::async_trait;
use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    Address,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::{EmailConfig, EmailTransportConfig};
use crate::errors::Error;

/// Email prêt à être envoyé
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// Service d'envoi d'emails (remplaçable dans les tests)
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error>;
}

pub struct LettreMailer {
    transport: EmailTransport,
    from: Mailbox,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl LettreMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, Error> {
        let transport = match &config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                        .map_err(|e| Error::internal(format!("create SMTP transport: {e}")))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                };

                let smtp = builder
                    .port(*port)
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build();
                EmailTransport::Smtp(smtp)
            }
            EmailTransportConfig::File { path } => {
                // Transport fichier pour le développement
                if !path.exists() {
                    std::fs::create_dir_all(path)
                        .map_err(|e| Error::internal(format!("create emails directory: {e}")))?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(path))
            }
        };

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::internal(format!("parse from email: {e}")))?;

        Ok(Self { transport, from })
    }

    /// Teste la connexion SMTP au démarrage (jamais bloquant)
    pub async fn verify(&self) {
        match &self.transport {
            EmailTransport::Smtp(smtp) => match smtp.test_connection().await {
                Ok(true) => tracing::info!("Email transporter ready"),
                Ok(false) => tracing::warn!("Email transporter could not connect to the SMTP server"),
                Err(e) => tracing::warn!("Email transporter error: {e}"),
            },
            EmailTransport::File(_) => tracing::info!("Email transporter ready (file transport)"),
        }
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, Error> {
        let address = email
            .to_email
            .parse::<Address>()
            .map_err(|e| Error::internal(format!("parse to email: {e}")))?;
        let to = Mailbox::new(email.to_name.clone(), address);

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| Error::internal(format!("build email message: {e}")))
    }
}

#[async_trait]
impl Mailer for LettreMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let message = self.build_message(email)?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| Error::internal(format!("send SMTP email: {e}")))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| Error::internal(format!("send file email: {e}")))?;
            }
        }

        Ok(())
    }
}

/// Email de reset : lien vers le frontend, valable 1 heure
pub fn password_reset_email(username: &str, to_email: &str, reset_url: &str) -> OutgoingEmail {
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Reset Your Password</h2>
  <p>Hello {username},</p>
  <p>You requested a password reset. Click the button below to set a new password:</p>
  <a href="{reset_url}" style="background: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">Reset Password</a>
  <p>Or copy and paste this link into your browser:</p>
  <p>{reset_url}</p>
  <p><small>This link expires in 1 hour.</small></p>
  <p>If you didn't request this, ignore this email.</p>
</div>"#,
        username = escape_html(username),
        reset_url = reset_url,
    );

    OutgoingEmail {
        to_email: to_email.to_string(),
        to_name: Some(username.to_string()),
        subject: "Password Reset Request".to_string(),
        html_body,
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
