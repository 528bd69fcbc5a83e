//! Contact form submission to the external form-processing service.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tokio::time::{Instant, sleep_until};
use tracing::{info, warn};

use crate::config::ContactOptions;
use crate::error::FormError;

/// Hidden field that authenticates the form with the service.
pub const ACCESS_KEY_FIELD: &str = "access_key";

pub const PENDING_TEXT: &str = "Sending your message...";
pub const SUCCESS_TEXT: &str = "Message sent successfully!";
pub const REMOTE_FALLBACK_TEXT: &str = "Something went wrong!";
pub const NETWORK_TEXT: &str = "Something went wrong. Please try again.";
pub const MISSING_KEY_TEXT: &str = "Form is not configured: missing access key.";

/// Named form values in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// A single `name=value` pair, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldArg {
    pub name: String,
    pub value: String,
}

impl FromStr for FieldArg {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("field name is empty in `{raw}`"));
        }
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

/// What the result banner shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    /// Banner hidden.
    Idle,
    Pending,
    Success,
    Failed(FormError),
}

impl FormStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Pending => Some(PENDING_TEXT.to_string()),
            Self::Success => Some(SUCCESS_TEXT.to_string()),
            Self::Failed(err) => Some(err.to_string()),
        }
    }

    /// Class list of the result element.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Idle => "form-result",
            Self::Pending => "form-result pending",
            Self::Success => "form-result success",
            Self::Failed(_) => "form-result error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed(_))
    }
}

/// The element that displays submission progress.
pub trait ResultView: Send {
    fn show(&mut self, status: &FormStatus);
    fn hide(&mut self);
}

/// Result view that reports through `tracing`.
#[derive(Debug, Default)]
pub struct LogView {
    last: Option<FormStatus>,
}

impl LogView {
    pub fn last(&self) -> Option<&FormStatus> {
        self.last.as_ref()
    }
}

impl ResultView for LogView {
    fn show(&mut self, status: &FormStatus) {
        let message = status.message().unwrap_or_default();
        match status {
            FormStatus::Failed(_) => warn!(class = status.css_class(), %message, "form result"),
            _ => info!(class = status.css_class(), %message, "form result"),
        }
        self.last = Some(status.clone());
    }

    fn hide(&mut self) {
        info!("form result hidden");
        self.last = Some(FormStatus::Idle);
    }
}

/// Raw answer from the form service.
#[derive(Debug, Clone)]
pub struct FormReply {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends a serialized form.
pub trait FormTransport: Send + Sync {
    fn post_json(&self, body: &Value) -> impl Future<Output = Result<FormReply>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFormTransport {
    client: Client,
    endpoint: Url,
}

impl HttpFormTransport {
    pub fn new(opts: &ContactOptions) -> Result<Self> {
        let endpoint = Url::parse(&opts.endpoint)
            .with_context(|| format!("invalid contact endpoint `{}`", opts.endpoint))?;
        let client = Client::builder()
            .timeout(opts.request_timeout)
            .build()
            .context("building contact form client")?;
        Ok(Self { client, endpoint })
    }
}

impl FormTransport for HttpFormTransport {
    async fn post_json(&self, body: &Value) -> Result<FormReply> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(FormReply { status, body })
    }
}

/// Map a service reply onto the banner state.
///
/// Any JSON body with status `200` is a success. Otherwise the reply's
/// `message` is shown when it carries one.
pub fn interpret_reply(reply: &FormReply) -> FormStatus {
    let Ok(body) = serde_json::from_slice::<Value>(&reply.body) else {
        return remote_failure(reply.status, REMOTE_FALLBACK_TEXT.to_string());
    };
    if reply.status == 200 {
        return FormStatus::Success;
    }
    let message = match body.get("message") {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => REMOTE_FALLBACK_TEXT.to_string(),
        Some(other) => other.to_string(),
    };
    remote_failure(reply.status, message)
}

fn remote_failure(status: u16, message: String) -> FormStatus {
    FormStatus::Failed(FormError::Remote { status, message })
}

/// The contact form: hidden fields from configuration, user fields, and the
/// result banner.
pub struct ContactForm<T, V> {
    transport: T,
    view: V,
    hidden: FormFields,
    fields: FormFields,
    status: FormStatus,
    display: Duration,
    hide_at: Option<Instant>,
}

impl<T: FormTransport, V: ResultView> ContactForm<T, V> {
    pub fn new(transport: T, view: V, opts: &ContactOptions) -> Self {
        let mut hidden = FormFields::new();
        hidden.set(ACCESS_KEY_FIELD, opts.access_key.clone());
        Self {
            transport,
            view,
            hidden,
            fields: FormFields::new(),
            status: FormStatus::Idle,
            display: opts.result_display,
            hide_at: None,
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FormFields {
        &mut self.fields
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Every field as one JSON object; user fields override hidden ones.
    pub fn payload(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in self.hidden.iter().chain(self.fields.iter()) {
            object.insert(name.to_string(), Value::String(value.to_string()));
        }
        Value::Object(object)
    }

    fn access_key(&self) -> Option<&str> {
        self.fields
            .get(ACCESS_KEY_FIELD)
            .or_else(|| self.hidden.get(ACCESS_KEY_FIELD))
            .filter(|key| !key.trim().is_empty())
    }

    /// Submit the form and leave the outcome on the banner.
    ///
    /// A missing access key fails before anything is sent. User fields are
    /// cleared only on success.
    pub async fn submit(&mut self) -> &FormStatus {
        if self.access_key().is_none() {
            warn!("contact form has no access key; not sending");
            self.finish(FormStatus::Failed(FormError::Validation(
                MISSING_KEY_TEXT.to_string(),
            )));
            return &self.status;
        }

        self.hide_at = None;
        self.status = FormStatus::Pending;
        self.view.show(&self.status);

        let outcome = match self.transport.post_json(&self.payload()).await {
            Ok(reply) => {
                let status = interpret_reply(&reply);
                if let FormStatus::Failed(err) = &status {
                    warn!(status = reply.status, error = %err, "form service rejected submission");
                }
                status
            }
            Err(err) => {
                warn!(error = %err, "form submission did not complete");
                FormStatus::Failed(FormError::Network(NETWORK_TEXT.to_string()))
            }
        };
        if outcome == FormStatus::Success {
            info!("contact form sent");
            self.fields.clear();
        }
        self.finish(outcome);
        &self.status
    }

    fn finish(&mut self, status: FormStatus) {
        self.status = status;
        self.view.show(&self.status);
        self.hide_at = Some(Instant::now() + self.display);
    }

    /// When the current result will be hidden.
    pub fn hide_at(&self) -> Option<Instant> {
        self.hide_at
    }

    /// Wait out the display period of a terminal result, then hide it.
    pub async fn hide_when_due(&mut self) {
        let Some(at) = self.hide_at else {
            return;
        };
        sleep_until(at).await;
        self.hide_at = None;
        self.status = FormStatus::Idle;
        self.view.hide();
    }
}
