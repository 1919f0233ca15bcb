use crate::error::Result;
use crate::models::email_outbox::EmailOutbox;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use sqlx::PgPool;

type HmacSha256 = Hmac<Sha256>;

const EMAIL_COLUMNS: &str =
    "id, recipient, subject, body, status, attempts, last_error, created_at, updated_at";

/// Outbox-backed email delivery through an HTTP relay. Enqueueing never
/// fails a caller's flow; delivery runs in the background worker.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
    relay_url: Option<String>,
    relay_secret: String,
}

impl NotificationService {
    pub fn new(pool: PgPool, relay_url: Option<String>, relay_secret: String) -> Self {
        Self {
            pool,
            client: Client::new(),
            relay_url,
            relay_secret,
        }
    }

    pub async fn enqueue(&self, recipient: &str, subject: &str, body: &str) -> Result<EmailOutbox> {
        let row = sqlx::query_as::<_, EmailOutbox>(&format!(
            r#"
            INSERT INTO email_outbox (recipient, subject, body, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {EMAIL_COLUMNS}
            "#
        ))
        .bind(recipient)
        .bind(subject)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Enqueue and swallow any failure; a decision or submission must never
    /// roll back because the outbox insert failed.
    pub async fn enqueue_best_effort(&self, recipient: &str, subject: &str, body: &str) {
        if let Err(e) = self.enqueue(recipient, subject, body).await {
            tracing::error!(recipient, error = ?e, "failed to enqueue notification email");
        }
    }

    /// Deliver the oldest pending email, if any. Returns whether one was
    /// attempted, so the worker loop can decide whether to sleep.
    pub async fn run_once(&self) -> Result<bool> {
        let Some(relay_url) = self.relay_url.as_deref() else {
            return Ok(false);
        };

        let pending = sqlx::query_as::<_, EmailOutbox>(&format!(
            r#"
            SELECT {EMAIL_COLUMNS} FROM email_outbox
            WHERE status = 'pending' AND attempts < 5
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(&self.pool)
        .await?;
        let Some(email) = pending else {
            return Ok(false);
        };

        let payload = serde_json::json!({
            "to": email.recipient,
            "subject": email.subject,
            "body": email.body,
        });
        let signature = self.sign(&payload.to_string());

        let res = self
            .client
            .post(relay_url)
            .header("X-Signature", signature)
            .json(&payload)
            .send()
            .await;

        match res {
            Ok(resp) if resp.status().is_success() => {
                sqlx::query(
                    "UPDATE email_outbox SET status = 'sent', attempts = attempts + 1, updated_at = NOW() WHERE id = $1",
                )
                .bind(email.id)
                .execute(&self.pool)
                .await?;
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                self.record_failure(email.id, &format!("relay returned {}: {}", status, body))
                    .await?;
            }
            Err(err) => {
                self.record_failure(email.id, &err.to_string()).await?;
            }
        }
        Ok(true)
    }

    async fn record_failure(&self, id: uuid::Uuid, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE email_outbox SET
                status = CASE WHEN attempts + 1 >= 5 THEN 'failed' ELSE 'pending' END,
                attempts = attempts + 1,
                last_error = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.relay_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Templated bodies for the application-submission flow.
pub fn application_received_email(candidate_name: &str, job_title: &str) -> (String, String) {
    (
        format!("Application received: {}", job_title),
        format!(
            "Hi {},\n\nWe received your application for {}. \
             You can follow its progress from your applicant dashboard.\n\n\
             The Recruiting Team",
            candidate_name, job_title
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_received_template_mentions_job_and_name() {
        let (subject, body) = application_received_email("Dana", "Backend Engineer");
        assert!(subject.contains("Backend Engineer"));
        assert!(body.contains("Dana"));
        assert!(body.contains("Backend Engineer"));
    }
}
