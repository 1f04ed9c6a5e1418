use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    middleware::Next,
};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct HeadersConfig {
    pub enable_hsts: bool,
    pub hsts_content: String,
    pub frame_options_content: String,
    pub referrer_policy: String,
}

impl HeadersConfig {
    /// HSTS is only sent when the deployment uses secure cookies, i.e. HTTPS
    pub fn from_config(config: &Config) -> Self {
        Self {
            enable_hsts: config.secure_cookies,
            ..Self::default()
        }
    }
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            enable_hsts: false,
            hsts_content: "max-age=31536000; includeSubDomains".to_string(),
            frame_options_content: "DENY".to_string(),
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
        }
    }
}

pub fn create_security_headers_middleware(
    config: HeadersConfig,
) -> impl Fn(
    Request<Body>,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response<Body>, StatusCode>> + Send>,
> + Clone {
    move |request: Request<Body>, next: Next| {
        let config = config.clone();
        Box::pin(async move {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();

            if config.enable_hsts {
                headers.insert(
                    header::STRICT_TRANSPORT_SECURITY,
                    config
                        .hsts_content
                        .parse()
                        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
                );
            }

            headers.insert(
                header::X_FRAME_OPTIONS,
                config
                    .frame_options_content
                    .parse()
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
            );
            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                header::HeaderValue::from_static("nosniff"),
            );
            headers.insert(
                header::REFERRER_POLICY,
                config
                    .referrer_policy
                    .parse()
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
            );

            Ok(response)
        })
    }
}
