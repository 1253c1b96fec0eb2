//! Client for the generative-text endpoint behind the dashboard "insight".
//!
//! The call is optional: without an API key it short-circuits to a fixed
//! message, and any failure degrades to another fixed message. Requests run on
//! a spawned task owned by an [`InsightHandle`]; dropping the handle aborts the
//! request so a late reply is never delivered to a view that is gone.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const MISSING_KEY: &str = "API key is missing. Set advice.api_key to enable insights.";
pub const UNAVAILABLE: &str = "Unable to generate insights right now. Please try again later.";

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub label: String,
    pub balance: f64,
}

/// Figures the insight is generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub balance: f64,
    pub income: f64,
    pub expense: f64,
    /// Percent change against the previous month.
    pub income_growth: f64,
    pub expense_growth: f64,
    pub top_categories: Vec<CategoryTotal>,
    pub history: Vec<HistoryPoint>,
}

pub fn render_prompt(s: &FinancialSnapshot) -> String {
    let categories = if s.top_categories.is_empty() {
        "none recorded".to_string()
    } else {
        s.top_categories
            .iter()
            .map(|c| format!("{} (${:.2})", c.name, c.amount))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let history = s
        .history
        .iter()
        .map(|p| format!("{}: ${:.2}", p.label, p.balance))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a concise personal finance advisor. Based on the figures below, \
         give one short, actionable insight in two sentences or fewer.\n\
         Current balance: ${:.2}\n\
         Income this month: ${:.2} ({:+.1}% vs last month)\n\
         Expenses this month: ${:.2} ({:+.1}% vs last month)\n\
         Top expense categories: {}\n\
         Recent balance history: {}",
        s.balance, s.income, s.income_growth, s.expense, s.expense_growth, categories, history
    )
}

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("no API key configured")]
    MissingKey,
    #[error("advice request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("advice endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("advice response contained no text")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[async_trait]
pub trait AdviceSource: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AdviceError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        Some(text.trim().to_string()).filter(|t| !t.is_empty())
    }
}

pub struct GenerativeClient {
    http: reqwest::Client,
    opts: Options,
}

impl GenerativeClient {
    pub fn new(opts: Options) -> Result<Self, AdviceError> {
        let http = reqwest::Client::builder().timeout(opts.timeout).build()?;

        Ok(Self { http, opts })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.opts.endpoint.trim_end_matches('/'),
            self.opts.model
        )
    }
}

#[async_trait]
impl AdviceSource for GenerativeClient {
    async fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        let key = match self.opts.api_key.as_deref() {
            Some(k) if !k.trim().is_empty() => k,
            _ => return Err(AdviceError::MissingKey),
        };

        debug!(model = %self.opts.model, "requesting insight");
        let res = self
            .http
            .post(self.url())
            .query(&[("key", key)])
            .json(&GenerateRequest {
                contents: [Content {
                    parts: [Part { text: prompt }],
                }],
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(AdviceError::Status {
                status: status.as_u16(),
                body: res.text().await.unwrap_or_default(),
            });
        }

        res.json::<GenerateResponse>()
            .await?
            .into_text()
            .ok_or(AdviceError::Empty)
    }
}

/// Generate an insight, degrading every failure to a fixed message.
pub async fn insight<S: AdviceSource + ?Sized>(source: &S, snapshot: &FinancialSnapshot) -> String {
    match source.generate(&render_prompt(snapshot)).await {
        Ok(text) => text,
        Err(AdviceError::MissingKey) => MISSING_KEY.to_string(),
        Err(e) => {
            warn!("insight unavailable: {}", e);
            UNAVAILABLE.to_string()
        }
    }
}

/// An in-flight insight request. Dropping it aborts the request.
pub struct InsightHandle {
    task: Option<JoinHandle<String>>,
}

pub fn spawn_insight(source: Arc<dyn AdviceSource>, snapshot: FinancialSnapshot) -> InsightHandle {
    let task = tokio::spawn(async move { insight(source.as_ref(), &snapshot).await });

    InsightHandle { task: Some(task) }
}

impl InsightHandle {
    /// The insight text, or `None` if the request was aborted.
    ///
    /// Borrows the handle so that abandoning this future leaves the task with
    /// the handle, which still aborts it on drop.
    pub async fn wait(&mut self) -> Option<String> {
        let task = self.task.as_mut()?;
        let joined = task.await;
        self.task = None;
        match joined {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("insight task ended without a result: {}", e);
                None
            }
        }
    }

    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for InsightHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
