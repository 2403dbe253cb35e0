use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{
    ai::prompts::{MAX_CONTEXT_LENGTH, MAX_EMAIL_LENGTH},
    domain::Submission,
    security::{self, is_spam_content, safe_error_message, sanitize_chat_input, sanitize_input},
};

use super::{
    types::{
        AdminActionRequest, AdminQuery, AnalyzeRequest, AnalyzeResponse, AppState, ContactRequest,
        RewriteRequest, RewriteResponse,
    },
    utils::{client_ip, user_agent, verify_admin_token},
};

/// Maximum admin lookback: 7 days.
const MAX_SUSPICIOUS_HOURS: i64 = 168;
/// Forms submitted faster than this are treated as bot traffic.
const MIN_FILL_TIME_MS: i64 = 3000;

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let timestamp = chrono::DateTime::from_timestamp_millis(state.clock.now_ms())
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    HttpResponse::Ok().json(json!({ "status": "ok", "timestamp": timestamp }))
}

pub async fn submit_contact(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let ip = client_ip(&req);
    let agent = user_agent(&req);
    let now = state.clock.now_ms();

    if state.monitor.is_blocked_ip(&ip) {
        return HttpResponse::Forbidden().json(json!({ "error": "Access denied" }));
    }

    if !state.request_limiter.is_allowed(&ip) {
        return HttpResponse::TooManyRequests()
            .json(json!({ "error": "Too many requests. Please try again later." }));
    }

    let Ok(form) = serde_json::from_slice::<ContactRequest>(&body) else {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid request body" }));
    };

    if form.honeypot.as_deref().is_some_and(|h| !h.trim().is_empty()) {
        tracing::info!(target: "contact", ip = %ip, "bot detected via honeypot");
        state.monitor.log_submission(Submission {
            ip,
            email: or_fallback(form.email, "unknown"),
            name: or_fallback(form.name, "bot"),
            subject: or_fallback(form.subject, "bot submission"),
            message: "Bot detected via honeypot".into(),
            timestamp: now,
            user_agent: Some(agent),
        });
        return HttpResponse::BadRequest().json(json!({ "error": "Submission rejected" }));
    }

    if form.timestamp.is_some_and(|ts| now - ts < MIN_FILL_TIME_MS) {
        return HttpResponse::BadRequest().json(json!({ "error": "Form submitted too quickly" }));
    }

    if form.name.is_empty()
        || form.email.is_empty()
        || form.subject.is_empty()
        || form.message.is_empty()
    {
        return HttpResponse::BadRequest().json(json!({ "error": "All fields are required" }));
    }

    let name = sanitize_input(&form.name);
    let subject = sanitize_input(&form.subject);
    let message = sanitize_input(&form.message);
    let email = form.email.trim().to_lowercase();

    if state.monitor.is_blocked_email(&email) {
        return HttpResponse::Forbidden().json(json!({ "error": "Email address is not allowed" }));
    }

    if !security::is_valid_email(&email) {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid email address" }));
    }

    let full_content = format!("{name} {subject} {message}");
    if is_spam_content(&full_content) {
        tracing::info!(target: "contact", ip = %ip, email = %email, "spam content rejected");
        state.monitor.log_submission(Submission {
            ip,
            email,
            name,
            subject,
            message,
            timestamp: now,
            user_agent: Some(agent),
        });
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Message contains inappropriate content" }));
    }

    if let Err(denial) = state.tracker.check(&ip, &email) {
        return HttpResponse::TooManyRequests().json(json!({ "error": denial.message() }));
    }
    state.tracker.record(&ip, &email);

    let scored = state.monitor.log_submission(Submission {
        ip,
        email,
        name,
        subject,
        message,
        timestamp: now,
        user_agent: Some(agent),
    });

    if scored.suspicious {
        tracing::warn!(
            target: "contact",
            ip = scored.ip(),
            spam_score = scored.spam_score,
            "suspicious submission accepted"
        );
    } else {
        tracing::info!(
            target: "contact",
            ip = scored.ip(),
            spam_score = scored.spam_score,
            "submission accepted"
        );
    }

    // delivery is the website's concern; this service records and scores
    HttpResponse::Ok().json(json!({ "message": "Message received successfully." }))
}

pub async fn admin_contact_overview(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<AdminQuery>,
) -> HttpResponse {
    if !verify_admin_token(&req, state.config.admin_token.as_deref()) {
        tracing::warn!(
            target: "http",
            ip = %client_ip(&req),
            user_agent = %user_agent(&req),
            "unauthorized admin access attempt"
        );
        return HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }));
    }

    match query.action.as_deref() {
        Some("stats") => {
            HttpResponse::Ok().json(json!({ "success": true, "data": state.monitor.stats() }))
        }
        Some("suspicious") => {
            let hours = query.hours.unwrap_or(24).min(MAX_SUSPICIOUS_HOURS);
            let suspicious = state.monitor.suspicious_activity(hours);
            HttpResponse::Ok().json(json!({ "success": true, "data": suspicious }))
        }
        _ => HttpResponse::Ok().json(json!({
            "message": "Contact monitoring API",
            "endpoints": {
                "stats": "/api/admin/contact?action=stats",
                "suspicious": "/api/admin/contact?action=suspicious&hours=24",
            },
        })),
    }
}

pub async fn admin_contact_action(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if !verify_admin_token(&req, state.config.admin_token.as_deref()) {
        tracing::warn!(
            target: "http",
            ip = %client_ip(&req),
            user_agent = %user_agent(&req),
            "unauthorized admin action attempt"
        );
        return HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }));
    }

    let json_content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if !json_content_type {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Content-Type must be application/json" }));
    }

    let Ok(request) = serde_json::from_slice::<AdminActionRequest>(&body) else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Invalid JSON in request body" }));
    };

    match request.action.as_deref() {
        Some("block_ip") => {
            let Some(ip) = request.ip.filter(|ip| !ip.is_empty()) else {
                return HttpResponse::BadRequest().json(json!({ "error": "IP address required" }));
            };
            if ip.len() > security::MAX_IP_LENGTH {
                return HttpResponse::BadRequest().json(json!({ "error": "IP address too long" }));
            }
            if !security::is_valid_ip(&ip) {
                return HttpResponse::BadRequest()
                    .json(json!({ "error": "Invalid IP address format (IPv4 or IPv6 supported)" }));
            }

            state.monitor.block_ip(&ip);
            tracing::info!(
                target: "http",
                blocked_ip = %ip,
                admin_ip = %client_ip(&req),
                "ip blocked by admin"
            );
            HttpResponse::Ok().json(json!({ "message": format!("IP {ip} blocked successfully") }))
        }
        Some("block_email") => {
            let Some(email) = request.email.filter(|email| !email.is_empty()) else {
                return HttpResponse::BadRequest()
                    .json(json!({ "error": "Email address required" }));
            };
            if email.len() > security::MAX_EMAIL_LENGTH {
                return HttpResponse::BadRequest()
                    .json(json!({ "error": "Email address too long" }));
            }
            if !security::is_valid_email(&email) {
                return HttpResponse::BadRequest()
                    .json(json!({ "error": "Invalid email address format" }));
            }

            state.monitor.block_email(&email);
            tracing::info!(
                target: "http",
                blocked_email = %email,
                admin_ip = %client_ip(&req),
                "email blocked by admin"
            );
            HttpResponse::Ok()
                .json(json!({ "message": format!("Email {email} blocked successfully") }))
        }
        Some(_) => HttpResponse::BadRequest().json(json!({ "error": "Invalid action" })),
        None => HttpResponse::BadRequest()
            .json(json!({ "error": "Action is required and must be a string" })),
    }
}

pub async fn rewrite_email(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(response) = ai_tool_gate(&state, "Email rewriter service is currently disabled") {
        return response;
    }

    let ip = client_ip(&req);
    let decision = state.usage_limiter.check(&ip);
    if !decision.allowed {
        return rate_limited_response(&state);
    }

    let Ok(request) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid request body" }));
    };
    let Ok(request) = serde_json::from_value::<RewriteRequest>(request) else {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid request data" }));
    };

    if let Some(response) = validate_email_input(&request.email) {
        return response;
    }
    let email = sanitize_chat_input(&request.email);

    match state.groq.rewrite(&email, request.tone).await {
        Ok(rewritten) => {
            let remaining = state.usage_limiter.remaining(&ip);
            HttpResponse::Ok()
                .insert_header(("X-RateLimit-Remaining", remaining.to_string()))
                .json(RewriteResponse {
                    rewritten_email: rewritten,
                    remaining,
                    success: true,
                })
        }
        Err(err) => ai_failure_response(err, "rewrite"),
    }
}

pub async fn analyze_email(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(response) = ai_tool_gate(&state, "Email analyzer service is currently disabled") {
        return response;
    }

    let ip = client_ip(&req);
    let decision = state.usage_limiter.check(&ip);
    if !decision.allowed {
        return rate_limited_response(&state);
    }

    let Ok(request) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid request body" }));
    };
    let Ok(request) = serde_json::from_value::<AnalyzeRequest>(request) else {
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid request data" }));
    };

    if let Some(response) = validate_email_input(&request.email) {
        return response;
    }
    if request
        .context
        .as_deref()
        .is_some_and(|c| c.chars().count() > MAX_CONTEXT_LENGTH)
    {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Context must be under {MAX_CONTEXT_LENGTH} characters")
        }));
    }

    let email = sanitize_chat_input(&request.email);
    let context = request
        .context
        .as_deref()
        .map(sanitize_chat_input)
        .filter(|c| !c.is_empty());

    match state.groq.analyze(&email, context.as_deref()).await {
        Ok(analysis) => {
            let remaining = state.usage_limiter.remaining(&ip);
            HttpResponse::Ok()
                .insert_header(("X-RateLimit-Remaining", remaining.to_string()))
                .json(AnalyzeResponse {
                    analysis,
                    remaining,
                    success: true,
                })
        }
        Err(err) => ai_failure_response(err, "analyze"),
    }
}

pub async fn remaining_uses(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let ip = client_ip(&req);
    HttpResponse::Ok().json(json!({ "remaining": state.usage_limiter.remaining(&ip) }))
}

/// Shared availability gate for the AI endpoints.
fn ai_tool_gate(state: &AppState, disabled_message: &str) -> Result<(), HttpResponse> {
    if !state.config.groq.enabled {
        return Err(
            HttpResponse::ServiceUnavailable().json(json!({ "error": disabled_message }))
        );
    }
    if state.config.groq.api_key.is_none() {
        tracing::error!(target: "ai", "GROQ_API_KEY not configured");
        return Err(HttpResponse::InternalServerError()
            .json(json!({ "error": "Service configuration error" })));
    }
    Ok(())
}

fn rate_limited_response(state: &AppState) -> HttpResponse {
    let max_uses = state.usage_limiter.max_uses();
    let retry_after_secs = state.usage_limiter.window().as_secs();
    HttpResponse::TooManyRequests()
        .insert_header(("Retry-After", retry_after_secs.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(json!({
            "error": format!(
                "Rate limit exceeded. You can only use the email tools {max_uses} times per day."
            ),
            "remaining": 0,
        }))
}

fn validate_email_input(email: &str) -> Option<HttpResponse> {
    if email.is_empty() {
        return Some(
            HttpResponse::BadRequest().json(json!({ "error": "Email content is required" })),
        );
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Some(HttpResponse::BadRequest().json(json!({
            "error": format!("Email must be under {MAX_EMAIL_LENGTH} characters")
        })));
    }
    if is_spam_content(email) {
        return Some(HttpResponse::BadRequest().json(json!({ "error": "Spam content detected" })));
    }
    None
}

fn ai_failure_response(err: anyhow::Error, operation: &str) -> HttpResponse {
    tracing::error!(target: "ai", error = %err, operation, "ai call failed");
    if err.to_string().contains("Groq API") {
        return HttpResponse::ServiceUnavailable().json(json!({
            "error": "AI service temporarily unavailable. Please try again later."
        }));
    }
    HttpResponse::InternalServerError().json(json!({ "error": safe_error_message(&err) }))
}

fn or_fallback(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
