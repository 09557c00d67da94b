use crate::config::CalendarConfig;
use crate::utils::error::{AdviceError, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

const CALENDAR_FUNCTION_PATH: &str = "/functions/v1/google-calendar";

/// Result of one sync attempt. Callers can tell a missing calendar
/// connection apart from a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Succeeded { event_id: String },
    NotConnected,
    Failed(String),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Serialize)]
struct CreateEventRequest<'a> {
    event: &'a CalendarEvent,
}

#[derive(Deserialize)]
struct StatusResponse {
    connected: bool,
}

#[derive(Deserialize)]
struct CreateEventResponse {
    id: Option<String>,
}

/// An immunization appointment to put on the parent's calendar.
#[derive(Debug, Clone)]
pub struct ImmunizationEvent {
    pub vaccine_name: String,
    pub child_name: String,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
}

impl ImmunizationEvent {
    /// Quick-add schedules the vaccine one week after `today`.
    pub fn quick_add(vaccine_name: &str, child_name: &str, today: NaiveDate) -> Self {
        Self {
            vaccine_name: vaccine_name.to_string(),
            child_name: child_name.to_string(),
            scheduled_date: today + Duration::days(7),
            notes: None,
        }
    }

    pub fn summary(&self) -> String {
        format!("Imunisasi: {}", self.vaccine_name)
    }

    pub fn description(&self) -> String {
        match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => notes.to_string(),
            _ => format!(
                "Jadwal imunisasi {} untuk {}",
                self.vaccine_name, self.child_name
            ),
        }
    }
}

/// Client for the backend's calendar function, acting for one signed-in user.
pub struct CalendarSync {
    base_url: String,
    access_token: Option<SecretString>,
    start_hour: u32,
    duration: Duration,
    offset: FixedOffset,
    client: Client,
}

impl CalendarSync {
    pub fn new(config: &CalendarConfig) -> Result<Self> {
        let base_url = crate::utils::validation::validate_required_field(
            "calendar.functions_url",
            &config.functions_url,
        )?
        .trim_end_matches('/')
        .to_string();

        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            AdviceError::InvalidConfigValue {
                field: "calendar.utc_offset_minutes".to_string(),
                value: config.utc_offset_minutes.to_string(),
                reason: "offset out of range".to_string(),
            }
        })?;

        Ok(Self {
            base_url,
            access_token: config.access_token.clone(),
            start_hour: config.event_start_hour,
            duration: Duration::minutes(config.event_duration_minutes),
            offset,
            client: Client::new(),
        })
    }

    fn url(&self, action: &str) -> String {
        format!("{}{}?action={}", self.base_url, CALENDAR_FUNCTION_PATH, action)
    }

    /// Whether the user has a calendar connected. Any failure reads as `false`.
    pub async fn is_connected(&self) -> bool {
        let Some(token) = &self.access_token else {
            tracing::debug!("No session token, calendar treated as disconnected");
            return false;
        };

        match self.fetch_status(token).await {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!("Calendar status check failed: {}", e);
                false
            }
        }
    }

    async fn fetch_status(&self, token: &SecretString) -> Result<bool> {
        let response = self
            .client
            .get(self.url("status"))
            .bearer_auth(token.expose_secret())
            .send()
            .await?
            .error_for_status()?;
        let status: StatusResponse = response.json().await?;
        Ok(status.connected)
    }

    pub fn build_event(
        &self,
        summary: &str,
        description: &str,
        date: NaiveDate,
        subject_name: Option<&str>,
    ) -> Result<CalendarEvent> {
        let local_start = date
            .and_hms_opt(self.start_hour, 0, 0)
            .and_then(|naive| naive.and_local_timezone(self.offset).single())
            .ok_or_else(|| AdviceError::InvalidConfigValue {
                field: "calendar.event_start_hour".to_string(),
                value: self.start_hour.to_string(),
                reason: "not a valid time of day".to_string(),
            })?;
        let start: DateTime<Utc> = local_start.with_timezone(&Utc);
        let end = start + self.duration;

        let summary = match subject_name.map(str::trim) {
            Some(name) if !name.is_empty() => format!("[{}] {}", name, summary),
            _ => summary.to_string(),
        };

        Ok(CalendarEvent {
            summary,
            description: description.to_string(),
            start: EventTime {
                date_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            end: EventTime {
                date_time: end.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        })
    }

    /// One status probe, then (only if connected) one create-event call.
    pub async fn sync_event(
        &self,
        summary: &str,
        description: &str,
        date: NaiveDate,
        subject_name: Option<&str>,
    ) -> SyncOutcome {
        let Some(token) = &self.access_token else {
            return SyncOutcome::NotConnected;
        };

        match self.fetch_status(token).await {
            Ok(true) => {}
            Ok(false) => return SyncOutcome::NotConnected,
            Err(e) => return SyncOutcome::Failed(format!("status check failed: {e}")),
        }

        let event = match self.build_event(summary, description, date, subject_name) {
            Ok(event) => event,
            Err(e) => return SyncOutcome::Failed(e.to_string()),
        };

        match self.create_event(token, &event).await {
            Ok(Some(event_id)) => {
                tracing::info!("Synced \"{}\" to calendar as {}", event.summary, event_id);
                SyncOutcome::Succeeded { event_id }
            }
            Ok(None) => SyncOutcome::Failed("calendar did not return an event id".to_string()),
            Err(e) => {
                tracing::error!("Calendar sync error: {}", e);
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    async fn create_event(&self, token: &SecretString, event: &CalendarEvent) -> Result<Option<String>> {
        let response = self
            .client
            .post(self.url("create-event"))
            .bearer_auth(token.expose_secret())
            .json(&CreateEventRequest { event })
            .send()
            .await?
            .error_for_status()?;
        let created: CreateEventResponse = response.json().await?;
        Ok(created.id.filter(|id| !id.is_empty()))
    }

    /// Collapsed form of [`CalendarSync::sync_event`]: `true` only on success.
    pub async fn sync(
        &self,
        summary: &str,
        description: &str,
        date: &str,
        subject_name: Option<&str>,
    ) -> bool {
        let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            tracing::warn!("Calendar sync skipped, invalid date: {}", date);
            return false;
        };
        self.sync_event(summary, description, date, subject_name)
            .await
            .is_success()
    }

    pub async fn sync_immunization(&self, event: &ImmunizationEvent) -> SyncOutcome {
        self.sync_event(
            &event.summary(),
            &event.description(),
            event.scheduled_date,
            Some(&event.child_name),
        )
        .await
    }
}
