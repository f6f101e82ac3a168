/// CAPTCHA verification
///
/// The verifier never fails: it classifies every attempt into a
/// [`CaptchaDecision`]. Rejections are the user's to fix (solve the challenge
/// again); unavailability is ours (the verification service or the network
/// path to it is down) and must not be reported as a user mistake.
use crate::config::CaptchaConfig;
use crate::error::VowsError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const REASON_MISSING_INPUT: &str = "missing-input-response";
pub const REASON_LOW_SCORE: &str = "score-too-low";
pub const REASON_NETWORK_ERROR: &str = "network-error";
pub const REASON_BAD_UPSTREAM: &str = "bad-upstream-response";
pub const REASON_MISCONFIGURED: &str = "misconfigured";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CaptchaDecision {
    Valid {
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
    },
    /// Client-fixable: the token is missing, wrong, expired or scored too low
    Invalid { reason: String },
    /// The verification could not be performed
    Unavailable { reason: String, status: u16 },
}

impl CaptchaDecision {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    fn unavailable(reason: &str, status: u16) -> Self {
        Self::Unavailable {
            reason: reason.to_string(),
            status,
        }
    }

    /// Turns anything but `Valid` into the matching error
    pub fn into_result(self) -> Result<Option<f64>, VowsError> {
        match self {
            Self::Valid { score } => Ok(score),
            Self::Invalid { reason } => Err(VowsError::CaptchaRejected { reason }),
            Self::Unavailable { reason, status } => {
                Err(VowsError::CaptchaUnavailable { reason, status })
            }
        }
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> CaptchaDecision;
}

/// Accepts every request; used when verification is switched off
pub struct DisabledCaptcha;

#[async_trait]
impl CaptchaVerifier for DisabledCaptcha {
    async fn verify(&self, _token: Option<&str>, _remote_ip: Option<&str>) -> CaptchaDecision {
        CaptchaDecision::Valid { score: None }
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Google reCAPTCHA `siteverify` client
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
    min_score: Option<f64>,
}

impl RecaptchaVerifier {
    pub fn new(config: &CaptchaConfig) -> Result<Self, VowsError> {
        let secret = config
            .secret
            .clone()
            .ok_or_else(|| VowsError::Config("Missing RECAPTCHA_SECRET env var".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VowsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            secret,
            verify_url: config.verify_url.clone(),
            min_score: config.min_score,
        })
    }

    fn classify(&self, body: SiteVerifyResponse) -> CaptchaDecision {
        if !body.success {
            // Secret errors mean our configuration is broken, not the user's answer
            if body
                .error_codes
                .iter()
                .any(|c| c == "missing-input-secret" || c == "invalid-input-secret")
            {
                warn!(error_codes = ?body.error_codes, "reCAPTCHA rejected the site secret");
                return CaptchaDecision::unavailable(REASON_MISCONFIGURED, 503);
            }

            let reason = body
                .error_codes
                .into_iter()
                .next()
                .unwrap_or_else(|| "invalid-input-response".to_string());
            return CaptchaDecision::invalid(reason);
        }

        match (body.score, self.min_score) {
            (Some(score), Some(min)) if score < min => {
                debug!(score, min, "reCAPTCHA score below threshold");
                CaptchaDecision::invalid(REASON_LOW_SCORE)
            }
            (score, _) => CaptchaDecision::Valid { score },
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> CaptchaDecision {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return CaptchaDecision::invalid(REASON_MISSING_INPUT);
        };

        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = match self.client.post(&self.verify_url).form(&form).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                warn!(error = %e, "reCAPTCHA verification unreachable");
                return CaptchaDecision::unavailable(REASON_NETWORK_ERROR, 503);
            }
            Err(e) => {
                warn!(error = %e, "reCAPTCHA verification failed");
                return CaptchaDecision::unavailable(REASON_BAD_UPSTREAM, 502);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "reCAPTCHA returned an error status");
            return CaptchaDecision::unavailable(REASON_BAD_UPSTREAM, 502);
        }

        match response.json::<SiteVerifyResponse>().await {
            Ok(body) => self.classify(body),
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "reCAPTCHA response timed out");
                CaptchaDecision::unavailable(REASON_NETWORK_ERROR, 503)
            }
            Err(e) => {
                warn!(error = %e, "reCAPTCHA returned an unreadable body");
                CaptchaDecision::unavailable(REASON_BAD_UPSTREAM, 502)
            }
        }
    }
}

/// Builds the configured verifier
pub fn build_captcha_verifier(config: &CaptchaConfig) -> Result<Arc<dyn CaptchaVerifier>, VowsError> {
    if config.enabled {
        Ok(Arc::new(RecaptchaVerifier::new(config)?))
    } else {
        Ok(Arc::new(DisabledCaptcha))
    }
}
