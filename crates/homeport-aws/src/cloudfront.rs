//! CloudFront family: distribution, edge function, and delivery policies

use homeport_synth::Expr;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CloudfrontOriginAccessControl {
    pub name: String,
    pub origin_access_control_origin_type: String,
    pub signing_behavior: String,
    pub signing_protocol: String,
}

impl CloudfrontOriginAccessControl {
    pub const TYPE: &'static str = "aws_cloudfront_origin_access_control";
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudfrontFunction {
    pub name: String,
    pub runtime: String,
    pub code: Expr,
    pub publish: bool,
}

impl CloudfrontFunction {
    pub const TYPE: &'static str = "aws_cloudfront_function";
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudfrontCachePolicy {
    pub name: String,
    pub default_ttl: u64,
    pub min_ttl: u64,
    pub max_ttl: u64,
    pub parameters_in_cache_key_and_forwarded_to_origin: CacheKeyParameters,
}

impl CloudfrontCachePolicy {
    pub const TYPE: &'static str = "aws_cloudfront_cache_policy";
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheKeyParameters {
    pub enable_accept_encoding_gzip: bool,
    pub enable_accept_encoding_brotli: bool,
    pub cookies_config: CookiesConfig,
    pub headers_config: HeadersConfig,
    pub query_strings_config: QueryStringsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct CookiesConfig {
    pub cookie_behavior: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadersConfig {
    pub header_behavior: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryStringsConfig {
    pub query_string_behavior: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudfrontOriginRequestPolicy {
    pub name: String,
    pub cookies_config: CookiesConfig,
    pub headers_config: HeadersConfig,
    pub query_strings_config: QueryStringsConfig,
}

impl CloudfrontOriginRequestPolicy {
    pub const TYPE: &'static str = "aws_cloudfront_origin_request_policy";
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudfrontResponseHeadersPolicy {
    pub name: String,
    pub cors_config: CorsConfig,
    pub security_headers_config: SecurityHeadersConfig,
    pub custom_headers_config: CustomHeadersConfig,
}

impl CloudfrontResponseHeadersPolicy {
    pub const TYPE: &'static str = "aws_cloudfront_response_headers_policy";
}

#[derive(Debug, Clone, Serialize)]
pub struct CorsConfig {
    pub access_control_allow_credentials: bool,
    pub access_control_max_age_sec: u32,
    pub access_control_allow_origins: Items,
    pub access_control_allow_headers: Items,
    pub access_control_allow_methods: Items,
    pub access_control_expose_headers: Items,
    pub origin_override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Items {
    pub items: Vec<String>,
}

impl Items {
    pub fn of<const N: usize>(items: [&str; N]) -> Self {
        Self {
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityHeadersConfig {
    pub content_type_options: ContentTypeOptions,
    pub frame_options: FrameOptions,
    pub referrer_policy: ReferrerPolicy,
    pub xss_protection: XssProtection,
    pub strict_transport_security: StrictTransportSecurity,
    pub content_security_policy: ContentSecurityPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentTypeOptions {
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameOptions {
    pub frame_option: String,
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferrerPolicy {
    pub referrer_policy: String,
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct XssProtection {
    pub mode_block: bool,
    pub protection: bool,
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrictTransportSecurity {
    pub access_control_max_age_sec: u32,
    pub include_subdomains: bool,
    pub preload: bool,
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentSecurityPolicy {
    pub content_security_policy: String,
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomHeadersConfig {
    pub items: Vec<CustomHeader>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomHeader {
    pub header: String,
    pub value: String,
    pub r#override: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloudfrontDistribution {
    pub enabled: bool,
    pub is_ipv6_enabled: bool,
    pub http_version: String,
    pub comment: String,
    pub default_root_object: String,
    pub viewer_certificate: ViewerCertificate,
    pub restrictions: Restrictions,
    pub origin: Vec<DistributionOrigin>,
    pub default_cache_behavior: DefaultCacheBehavior,
}

impl CloudfrontDistribution {
    pub const TYPE: &'static str = "aws_cloudfront_distribution";
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerCertificate {
    pub cloudfront_default_certificate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Restrictions {
    pub geo_restriction: GeoRestriction,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoRestriction {
    pub restriction_type: String,
}

/// Origin descriptor binding a logical origin id to a storage domain and
/// its origin-access-control resource
#[derive(Debug, Clone, Serialize)]
pub struct DistributionOrigin {
    pub origin_id: String,
    pub domain_name: Expr,
    pub origin_access_control_id: Expr,
}

/// Cache behavior descriptor referencing the three delivery policies
#[derive(Debug, Clone, Serialize)]
pub struct DefaultCacheBehavior {
    pub target_origin_id: String,
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub compress: bool,
    pub viewer_protocol_policy: String,
    pub cache_policy_id: Expr,
    pub origin_request_policy_id: Expr,
    pub response_headers_policy_id: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_association: Option<Vec<FunctionAssociation>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionAssociation {
    pub event_type: String,
    pub function_arn: Expr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_fields_serialize_without_raw_prefix() {
        let options = ContentTypeOptions { r#override: true };
        let value = serde_json::to_value(options).unwrap();
        assert_eq!(value["override"], true);
    }

    #[test]
    fn behavior_omits_absent_function_association() {
        let behavior = DefaultCacheBehavior {
            target_origin_id: "frontend".into(),
            allowed_methods: vec!["GET".into()],
            cached_methods: vec!["GET".into()],
            compress: true,
            viewer_protocol_policy: "redirect-to-https".into(),
            cache_policy_id: Expr::interpolation("aws_cloudfront_cache_policy.c.id"),
            origin_request_policy_id: Expr::interpolation("aws_cloudfront_origin_request_policy.o.id"),
            response_headers_policy_id: Expr::interpolation(
                "aws_cloudfront_response_headers_policy.r.id",
            ),
            function_association: None,
        };
        let value = serde_json::to_value(behavior).unwrap();
        assert!(value.get("function_association").is_none());
    }
}
