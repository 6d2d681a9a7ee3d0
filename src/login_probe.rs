use anyhow::{Context, Result};
use log::info;
use reqwest::Client;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::fmt;
use std::io;

use crate::config::ProbeConfig;
use crate::models::LoginCredentials;

#[derive(Debug)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: Value,
}

/// A failed request. `status` is set when the server answered but the body
/// could not be read as JSON.
#[derive(Debug)]
pub struct ProbeFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl ProbeFailure {
    fn new(status: Option<u16>, err: anyhow::Error) -> Self {
        Self {
            status,
            message: format!("{:#}", err),
        }
    }
}

impl From<anyhow::Error> for ProbeFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(None, err)
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Everything the probe has to say about one request, in print order.
#[derive(Debug)]
pub struct ProbeReport {
    pub url: String,
    pub request_body: String,
    pub result: std::result::Result<ProbeResponse, ProbeFailure>,
}

impl ProbeReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🔐 Testing login endpoint...")?;
        writeln!(f, "POST {}", self.url)?;
        writeln!(f, "Body: {}", self.request_body)?;

        match &self.result {
            Ok(response) => {
                let pretty = serde_json::to_string_pretty(&response.body)
                    .unwrap_or_else(|_| response.body.to_string());
                writeln!(f)?;
                writeln!(f, "Status: {}", response.status)?;
                write!(f, "Response:\n{}", pretty)
            }
            Err(failure) => {
                if let Some(status) = failure.status {
                    writeln!(f)?;
                    writeln!(f, "Status: {}", status)?;
                }
                write!(f, "❌ Error: {}", failure)
            }
        }
    }
}

/// Single-line JSON with a space after every `:` and `,`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn to_spaced_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

pub struct LoginProbe {
    client: Client,
    url: String,
}

impl LoginProbe {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Any status is accepted as long as the body parses as JSON.
    pub async fn send(
        &self,
        creds: &LoginCredentials,
    ) -> std::result::Result<ProbeResponse, ProbeFailure> {
        info!("Sending login request for {} to {}", creds.email, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(creds)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.url))?;

        let status = response.status().as_u16();
        info!("Login endpoint answered with status {}", status);

        let body = response
            .json::<Value>()
            .await
            .with_context(|| format!("Response from {} is not JSON", self.url))
            .map_err(|e| ProbeFailure::new(Some(status), e))?;

        Ok(ProbeResponse { status, body })
    }
}

/// Sends one login request and folds every failure into the report.
pub async fn run(config: &ProbeConfig) -> ProbeReport {
    let creds = config.credentials();
    let request_body = to_spaced_json(&creds).unwrap_or_default();

    let result = match LoginProbe::new(config) {
        Ok(probe) => probe.send(&creds).await,
        Err(e) => Err(ProbeFailure::from(e)),
    };

    ProbeReport {
        url: config.url.clone(),
        request_body,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(result: std::result::Result<ProbeResponse, ProbeFailure>) -> ProbeReport {
        ProbeReport {
            url: "http://localhost:5000/api/admin/login".to_string(),
            request_body: r#"{"email": "admin@local.test", "password": "adminpass"}"#.to_string(),
            result,
        }
    }

    #[test]
    fn success_transcript_pretty_prints_body() {
        let rendered = report(Ok(ProbeResponse {
            status: 200,
            body: json!({ "token": "abc" }),
        }))
        .to_string();

        let expected = "🔐 Testing login endpoint...\n\
                        POST http://localhost:5000/api/admin/login\n\
                        Body: {\"email\": \"admin@local.test\", \"password\": \"adminpass\"}\n\
                        \n\
                        Status: 200\n\
                        Response:\n\
                        {\n  \"token\": \"abc\"\n}";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn failure_transcript_ends_with_single_error_line() {
        let rendered = report(Err(ProbeFailure {
            status: None,
            message: "connection refused".to_string(),
        }))
        .to_string();
        let last = rendered.lines().last().unwrap();
        assert_eq!(last, "❌ Error: connection refused");
        assert!(!rendered.contains("Status:"));
    }

    #[test]
    fn answered_failure_prints_status_before_error() {
        let rendered = report(Err(ProbeFailure {
            status: Some(502),
            message: "Response is not JSON".to_string(),
        }))
        .to_string();
        assert!(rendered.ends_with("\n\nStatus: 502\n❌ Error: Response is not JSON"));
    }

    #[test]
    fn request_body_matches_spaced_json() {
        let creds = LoginCredentials {
            email: "admin@local.test".to_string(),
            password: "adminpass".to_string(),
        };
        assert_eq!(
            to_spaced_json(&creds).unwrap(),
            r#"{"email": "admin@local.test", "password": "adminpass"}"#
        );
        assert_eq!(
            to_spaced_json(&json!({ "ids": [1, 2], "empty": {} })).unwrap(),
            r#"{"empty": {}, "ids": [1, 2]}"#
        );
    }
}
