use actix_web::HttpRequest;

/// Proxy-aware client address headers, most specific first.
const IP_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "x-client-ip",
];

/// Best-effort client address: first usable forwarded header (first entry of
/// a comma list), then the socket peer, then `"unknown"`.
pub fn client_ip(req: &HttpRequest) -> String {
    for header in IP_HEADERS {
        let Some(value) = req.headers().get(header).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        if let Some(ip) = value.split(',').next().map(str::trim) {
            if !ip.is_empty() && ip != "unknown" {
                return ip.to_string();
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Bearer-token check for the admin API. An unset expected token refuses
/// everything. Comparison is constant-time.
pub fn verify_admin_token(req: &HttpRequest, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        tracing::error!(target: "http", "ADMIN_TOKEN is not configured; refusing admin request");
        return false;
    };

    let Some(header) = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let token = header.strip_prefix("Bearer ").unwrap_or(header);
    constant_time_eq(token.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn forwarded_header_wins_and_takes_first_entry() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.7, 10.0.0.1"))
            .insert_header(("x-real-ip", "198.51.100.9"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn falls_through_unusable_headers() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "unknown"))
            .insert_header(("x-real-ip", "198.51.100.9"))
            .to_http_request();
        assert_eq!(client_ip(&req), "198.51.100.9");
    }

    #[test]
    fn missing_headers_and_peer_yield_unknown() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req), "unknown");
    }

    #[test]
    fn admin_token_accepts_exact_match_with_or_without_bearer() {
        let req = TestRequest::default()
            .insert_header(("authorization", "Bearer sekrit"))
            .to_http_request();
        assert!(verify_admin_token(&req, Some("sekrit")));

        let req = TestRequest::default()
            .insert_header(("authorization", "sekrit"))
            .to_http_request();
        assert!(verify_admin_token(&req, Some("sekrit")));
    }

    #[test]
    fn admin_token_rejects_mismatch_and_unset_expectation() {
        let req = TestRequest::default()
            .insert_header(("authorization", "Bearer wrong"))
            .to_http_request();
        assert!(!verify_admin_token(&req, Some("sekrit")));
        assert!(!verify_admin_token(&req, None));

        let req = TestRequest::default().to_http_request();
        assert!(!verify_admin_token(&req, Some("sekrit")));
    }
}
