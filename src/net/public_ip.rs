//! Public IP detection via external echo services.
//!
//! The detected address becomes the source prefix of every allow rule, so
//! it must be a well-formed IPv4 address, not just whatever an endpoint
//! returns.

use crate::config::{IP_DETECT_TIMEOUT, IP_ECHO_SERVICES};
use std::error::Error;
use std::future::Future;
use std::net::Ipv4Addr;

/// Query the echo services in order; first successful, parseable response
/// wins.
pub async fn detect_public_ip(client: &reqwest::Client) -> Result<Ipv4Addr, Box<dyn Error>> {
    detect_from(&IP_ECHO_SERVICES, |url| query_service(client, url)).await
}

/// Walk `services` with `fetch`, returning the first body that parses as
/// an IPv4 address. A failed service is logged and the next one tried.
async fn detect_from<F, Fut>(
    services: &[&'static str],
    mut fetch: F,
) -> Result<Ipv4Addr, Box<dyn Error>>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<String, Box<dyn Error>>>,
{
    for &service in services {
        log::debug!("Querying IP echo service {service}");
        match fetch(service).await.and_then(|body| parse_ip_body(&body)) {
            Ok(ip) => return Ok(ip),
            Err(e) => log::warn!("IP echo service {service} failed: {e}"),
        }
    }
    Err("Failed to detect public IP address. Pass it explicitly with --ip.".into())
}

async fn query_service(client: &reqwest::Client, url: &str) -> Result<String, Box<dyn Error>> {
    let body = client
        .get(url)
        .header(reqwest::header::USER_AGENT, "curl/7.68.0")
        .timeout(IP_DETECT_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Parse an echo-service response body as a dotted-quad IPv4 address.
pub fn parse_ip_body(body: &str) -> Result<Ipv4Addr, Box<dyn Error>> {
    let trimmed = body.trim();
    trimmed
        .parse::<Ipv4Addr>()
        .map_err(|_| format!("Response is not an IPv4 address: {trimmed:?}").into())
}

/// Validate an explicit `--ip` override.
pub fn parse_override(value: &str) -> Result<Ipv4Addr, Box<dyn Error>> {
    value
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| format!("Invalid IPv4 address for --ip: {value:?}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_parse_ip_body() {
        assert_eq!(
            parse_ip_body("198.51.100.7\n").unwrap(),
            Ipv4Addr::new(198, 51, 100, 7)
        );
        assert_eq!(
            parse_ip_body("  203.0.113.50  ").unwrap(),
            Ipv4Addr::new(203, 0, 113, 50)
        );
        assert!(parse_ip_body("<html>oops</html>").is_err());
        assert!(parse_ip_body("2001:db8::1").is_err());
        assert!(parse_ip_body("").is_err());
    }

    #[test]
    fn test_parse_override() {
        assert!(parse_override("203.0.113.50").is_ok());
        assert!(parse_override("999.0.0.1").is_err());
        assert!(parse_override("not-an-ip").is_err());
    }

    #[tokio::test]
    async fn test_detect_falls_through_failed_services() {
        let services = ["https://a.invalid", "https://b.invalid", "https://c.invalid"];
        let calls: RefCell<Vec<&str>> = RefCell::new(Vec::new());
        let ip = detect_from(&services, |url| {
            calls.borrow_mut().push(url);
            async move {
                match url {
                    "https://a.invalid" => Err("connection refused".into()),
                    "https://b.invalid" => Ok("<html>not an ip</html>".to_string()),
                    _ => Ok("198.51.100.7\n".to_string()),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(ip, Ipv4Addr::new(198, 51, 100, 7));
        assert_eq!(calls.into_inner(), services);
    }

    #[tokio::test]
    async fn test_detect_all_failed_suggests_override() {
        let services = ["https://a.invalid", "https://b.invalid"];
        let err = detect_from(&services, |_| async {
            Err::<String, Box<dyn Error>>("timed out".into())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("--ip"));
    }
}
