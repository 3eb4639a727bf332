//! Edge delivery policy factory
//!
//! Builds the origin and cache-behavior descriptors for the frontend
//! distribution. Each function registers its underlying policy resources
//! in the stack and returns a plain descriptor value, so the hosting stack
//! can layer a function association on the base behavior without
//! re-declaring the policies.

use homeport_aws::cloudfront::{
    CacheKeyParameters, CloudfrontCachePolicy, CloudfrontOriginAccessControl,
    CloudfrontOriginRequestPolicy, CloudfrontResponseHeadersPolicy, ContentSecurityPolicy,
    ContentTypeOptions, CookiesConfig, CorsConfig, CustomHeader, CustomHeadersConfig,
    DefaultCacheBehavior, DistributionOrigin, FrameOptions, HeadersConfig, Items,
    QueryStringsConfig, ReferrerPolicy, SecurityHeadersConfig, StrictTransportSecurity,
    XssProtection,
};
use homeport_synth::{Expr, Result, Stack};

use crate::config::AppConfig;

/// Logical origin id shared by the origin and behavior descriptors
pub const FRONTEND_ORIGIN_ID: &str = "frontend";

const PERMISSIONS_POLICY: &str = "accelerometer=(), ambient-light-sensor=(), autoplay=(), \
    camera=(), display-capture=(), document-domain=(), encrypted-media=(), fullscreen=(), \
    geolocation=(), gyroscope=(), magnetometer=(), microphone=(), midi=(), payment=(), \
    picture-in-picture=(), sync-xhr=(), usb=(), xr-spatial-tracking=()";

/// Declare the origin-access-control and bind the frontend origin id to
/// the bucket's regional domain.
pub fn frontend_origin(
    stack: &mut Stack,
    config: &AppConfig,
    env: &str,
    origin_domain: Expr,
) -> Result<DistributionOrigin> {
    let aoc = stack.resource(
        CloudfrontOriginAccessControl::TYPE,
        "frontend-aoc",
        CloudfrontOriginAccessControl {
            name: policy_name(config, env),
            origin_access_control_origin_type: "s3".to_string(),
            signing_behavior: "always".to_string(),
            signing_protocol: "sigv4".to_string(),
        },
    )?;

    Ok(DistributionOrigin {
        origin_id: FRONTEND_ORIGIN_ID.to_string(),
        domain_name: origin_domain,
        origin_access_control_id: aoc.id(),
    })
}

/// Declare the three delivery policies and return the base cache behavior
/// referencing them.
pub fn frontend_cache_behaviour(
    stack: &mut Stack,
    config: &AppConfig,
    env: &str,
) -> Result<DefaultCacheBehavior> {
    Ok(DefaultCacheBehavior {
        target_origin_id: FRONTEND_ORIGIN_ID.to_string(),
        allowed_methods: strings(["GET", "HEAD", "OPTIONS"]),
        cached_methods: strings(["GET", "HEAD"]),
        compress: true,
        viewer_protocol_policy: "redirect-to-https".to_string(),
        cache_policy_id: cache_policy(stack, config, env)?,
        origin_request_policy_id: origin_request(stack, config, env)?,
        response_headers_policy_id: response_headers(stack, config, env)?,
        function_association: None,
    })
}

fn cache_policy(stack: &mut Stack, config: &AppConfig, env: &str) -> Result<Expr> {
    let policy = stack.resource(
        CloudfrontCachePolicy::TYPE,
        "frontend-cache-policy",
        CloudfrontCachePolicy {
            name: policy_name(config, env),
            default_ttl: 1,
            min_ttl: 1,
            max_ttl: 1,
            parameters_in_cache_key_and_forwarded_to_origin: CacheKeyParameters {
                enable_accept_encoding_gzip: true,
                enable_accept_encoding_brotli: true,
                cookies_config: CookiesConfig {
                    cookie_behavior: "none".to_string(),
                },
                headers_config: HeadersConfig {
                    header_behavior: "none".to_string(),
                },
                query_strings_config: QueryStringsConfig {
                    query_string_behavior: "none".to_string(),
                },
            },
        },
    )?;
    Ok(policy.id())
}

fn origin_request(stack: &mut Stack, config: &AppConfig, env: &str) -> Result<Expr> {
    let policy = stack.resource(
        CloudfrontOriginRequestPolicy::TYPE,
        "frontend-origin-request-policy",
        CloudfrontOriginRequestPolicy {
            name: policy_name(config, env),
            cookies_config: CookiesConfig {
                cookie_behavior: "none".to_string(),
            },
            headers_config: HeadersConfig {
                header_behavior: "none".to_string(),
            },
            query_strings_config: QueryStringsConfig {
                query_string_behavior: "none".to_string(),
            },
        },
    )?;
    Ok(policy.id())
}

fn response_headers(stack: &mut Stack, config: &AppConfig, env: &str) -> Result<Expr> {
    let policy = stack.resource(
        CloudfrontResponseHeadersPolicy::TYPE,
        "frontend-response-headers-policy",
        CloudfrontResponseHeadersPolicy {
            name: policy_name(config, env),
            cors_config: CorsConfig {
                access_control_allow_credentials: false,
                access_control_max_age_sec: 3600,
                access_control_allow_origins: Items::of(["*"]),
                access_control_allow_headers: Items::of(["*"]),
                access_control_allow_methods: Items::of(["GET"]),
                access_control_expose_headers: Items::of(["ETag"]),
                origin_override: true,
            },
            security_headers_config: SecurityHeadersConfig {
                content_type_options: ContentTypeOptions { r#override: true },
                frame_options: FrameOptions {
                    frame_option: "DENY".to_string(),
                    r#override: true,
                },
                referrer_policy: ReferrerPolicy {
                    referrer_policy: "same-origin".to_string(),
                    r#override: true,
                },
                xss_protection: XssProtection {
                    mode_block: true,
                    protection: true,
                    r#override: true,
                },
                strict_transport_security: StrictTransportSecurity {
                    access_control_max_age_sec: 63072000,
                    include_subdomains: true,
                    preload: true,
                    r#override: true,
                },
                content_security_policy: ContentSecurityPolicy {
                    content_security_policy: "frame-ancestors 'none'".to_string(),
                    r#override: true,
                },
            },
            custom_headers_config: CustomHeadersConfig {
                items: vec![CustomHeader {
                    header: "Permissions-Policy".to_string(),
                    value: PERMISSIONS_POLICY.to_string(),
                    r#override: true,
                }],
            },
        },
    )?;
    Ok(policy.id())
}

fn policy_name(config: &AppConfig, env: &str) -> String {
    format!("{}-{}-home-frontend", config.app, env)
}

fn strings<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
