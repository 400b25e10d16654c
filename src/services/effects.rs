// src/services/effects.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    db::AuditRepository,
    models::audit::NewAuditEntry,
    services::mailer::{EmailMessage, Mailer},
};

/// Work a state transition asks for once its data is committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Audit(NewAuditEntry),
    Email {
        message: EmailMessage,
        /// Written only when the message was handed to the mailer
        delivery_audit: Option<NewAuditEntry>,
    },
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &NewAuditEntry) -> Result<(), AppError>;
}

#[async_trait]
impl AuditSink for AuditRepository {
    async fn append(&self, entry: &NewAuditEntry) -> Result<(), AppError> {
        AuditRepository::append(self, entry).await
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EffectReport {
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub audits_written: usize,
    pub audits_failed: usize,
}

/// Executes effects in order. Failures are logged and counted, never returned.
#[derive(Clone)]
pub struct EffectRunner {
    mailer: Arc<dyn Mailer>,
    audit: Arc<dyn AuditSink>,
}

impl EffectRunner {
    pub fn new(mailer: Arc<dyn Mailer>, audit: Arc<dyn AuditSink>) -> Self {
        Self { mailer, audit }
    }

    pub async fn run(&self, effects: Vec<Effect>) -> EffectReport {
        let mut report = EffectReport::default();

        for effect in effects {
            match effect {
                Effect::Audit(entry) => self.write_audit(&entry, &mut report).await,
                Effect::Email { message, delivery_audit } => {
                    match self.mailer.send(&message).await {
                        Ok(()) => {
                            report.emails_sent += 1;
                            if let Some(entry) = delivery_audit {
                                self.write_audit(&entry, &mut report).await;
                            }
                        }
                        Err(e) => {
                            report.emails_failed += 1;
                            tracing::warn!(to = %message.to, subject = %message.subject, "Email not sent: {}", e);
                        }
                    }
                }
            }
        }

        report
    }

    async fn write_audit(&self, entry: &NewAuditEntry, report: &mut EffectReport) {
        match self.audit.append(entry).await {
            Ok(()) => report.audits_written += 1,
            Err(e) => {
                report.audits_failed += 1;
                tracing::warn!(
                    action = %entry.action,
                    model = %entry.model_name,
                    object = ?entry.object_id,
                    "Audit entry not written: {}",
                    e
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;
    use crate::services::mailer::MailError;

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<EmailMessage>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Rejected { status: 503, body: "relay down".into() });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryAudit {
        pub entries: Mutex<Vec<NewAuditEntry>>,
        pub fail: bool,
    }

    #[async_trait]
    impl AuditSink for MemoryAudit {
        async fn append(&self, entry: &NewAuditEntry) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::InternalServerError(anyhow::anyhow!("audit table locked")));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MemoryAudit, RecordingMailer};
    use super::*;

    fn audit(action: &str) -> NewAuditEntry {
        NewAuditEntry::system(action, "WorkOrder", "WO-00000001", String::new())
    }

    fn email() -> EmailMessage {
        EmailMessage {
            to: "requester@plant.local".into(),
            subject: "Work Order Completed".into(),
            body: "done".into(),
        }
    }

    #[tokio::test]
    async fn delivery_audit_follows_a_successful_send() {
        let mailer = Arc::new(RecordingMailer::default());
        let sink = Arc::new(MemoryAudit::default());
        let runner = EffectRunner::new(mailer.clone(), sink.clone());

        let report = runner
            .run(vec![
                Effect::Audit(audit("status_change")),
                Effect::Email { message: email(), delivery_audit: Some(audit("email")) },
            ])
            .await;

        assert_eq!(report.emails_sent, 1);
        assert_eq!(report.audits_written, 2);
        let actions: Vec<String> = sink.entries.lock().unwrap().iter().map(|e| e.action.clone()).collect();
        assert_eq!(actions, vec!["status_change", "email"]);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mail_failure_is_counted_not_raised() {
        let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let sink = Arc::new(MemoryAudit::default());
        let runner = EffectRunner::new(mailer, sink.clone());

        let report = runner
            .run(vec![
                Effect::Email { message: email(), delivery_audit: Some(audit("email")) },
                Effect::Audit(audit("status_change")),
            ])
            .await;

        assert_eq!(report.emails_failed, 1);
        assert_eq!(report.audits_written, 1);
        assert_eq!(sink.entries.lock().unwrap()[0].action, "status_change");
    }

    #[tokio::test]
    async fn audit_failure_does_not_stop_later_effects() {
        let mailer = Arc::new(RecordingMailer::default());
        let sink = Arc::new(MemoryAudit { fail: true, ..Default::default() });
        let runner = EffectRunner::new(mailer.clone(), sink);

        let report = runner
            .run(vec![
                Effect::Audit(audit("create")),
                Effect::Email { message: email(), delivery_audit: None },
            ])
            .await;

        assert_eq!(report.audits_failed, 1);
        assert_eq!(report.emails_sent, 1);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }
}
