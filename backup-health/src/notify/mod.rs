//! Health report delivery.
//!
//! [`Notifier`] is the seam the run uses; [`PostmarkNotifier`] sends the
//! report through a Postmark email template.

use crate::history::HistoryReport;
use crate::utils::{HealthError, Result};
use serde::Serialize;
use std::future::Future;
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://api.postmarkapp.com";

/// Delivers a history report to the operator.
pub trait Notifier {
    fn notify(&self, report: &HistoryReport) -> impl Future<Output = Result<()>> + Send;
}

/// Postmark delivery settings
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Postmark server token
    pub token: String,
    pub from: String,
    pub to: String,
    pub template_id: u64,

    /// API base URL, without trailing slash
    pub api_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TemplateEmail<'a> {
    from: &'a str,
    to: &'a str,
    template_id: u64,
    template_model: TemplateModel<'a>,
}

#[derive(Serialize)]
struct TemplateModel<'a> {
    history: &'a HistoryReport,
    backup_name: &'a str,
    host: String,
    checked_at: String,
}

pub struct PostmarkNotifier {
    client: reqwest::Client,
    settings: MailSettings,
}

impl PostmarkNotifier {
    pub fn new(settings: MailSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn payload<'a>(&'a self, report: &'a HistoryReport) -> TemplateEmail<'a> {
        TemplateEmail {
            from: &self.settings.from,
            to: &self.settings.to,
            template_id: self.settings.template_id,
            template_model: TemplateModel {
                history: report,
                backup_name: report.latest_backup().unwrap_or_default(),
                host: hostname::get()
                    .ok()
                    .and_then(|h| h.into_string().ok())
                    .unwrap_or_else(|| "unknown".to_string()),
                checked_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }
}

impl Notifier for PostmarkNotifier {
    async fn notify(&self, report: &HistoryReport) -> Result<()> {
        let url = format!("{}/email/withTemplate", self.settings.api_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("X-Postmark-Server-Token", &self.settings.token)
            .json(&self.payload(report))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(HealthError::Notification(format!(
                "unexpected status code: {} {}",
                status.as_u16(),
                body.trim()
            )));
        }

        info!(to = %self.settings.to, "Health report sent");
        Ok(())
    }
}
