//! Endpoint resolution
//!
//! Maps `(region, API family)` to a base URL. Service-account calls share the
//! query host. Overrides (proxies, mock servers) replace the built-in table
//! per family.

use mixpanel_domain::{ApiFamily, EndpointOverrides, MixpanelError, Region, Result};
use url::Url;

/// Built-in base URL for a region and family.
pub const fn default_base_url(region: Region, family: ApiFamily) -> &'static str {
    match (region, family) {
        (Region::Us, ApiFamily::Ingestion) => "https://api.mixpanel.com",
        (Region::Us, ApiFamily::Query | ApiFamily::ServiceAccount) => "https://mixpanel.com/api",
        (Region::Us, ApiFamily::Export) => "https://data.mixpanel.com/api/2.0/export",
        (Region::Eu, ApiFamily::Ingestion) => "https://api-eu.mixpanel.com",
        (Region::Eu, ApiFamily::Query | ApiFamily::ServiceAccount) => "https://eu.mixpanel.com/api",
        (Region::Eu, ApiFamily::Export) => "https://data-eu.mixpanel.com/api/2.0/export",
        (Region::In, ApiFamily::Ingestion) => "https://api-in.mixpanel.com",
        (Region::In, ApiFamily::Query | ApiFamily::ServiceAccount) => "https://in.mixpanel.com/api",
        (Region::In, ApiFamily::Export) => "https://data-in.mixpanel.com/api/2.0/export",
    }
}

/// Resolves base URLs, honouring configured overrides.
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    overrides: EndpointOverrides,
}

impl EndpointResolver {
    /// Create a resolver after checking that every override is an absolute URL.
    ///
    /// # Errors
    /// Returns `MixpanelError::Config` for an override that does not parse.
    pub fn new(overrides: EndpointOverrides) -> Result<Self> {
        for family in [ApiFamily::Ingestion, ApiFamily::Query, ApiFamily::Export] {
            if let Some(raw) = overrides.for_family(family) {
                Url::parse(raw).map_err(|err| {
                    MixpanelError::Config(format!("invalid {family} endpoint override '{raw}': {err}"))
                })?;
            }
        }
        Ok(Self { overrides })
    }

    /// Base URL for a region and family, without a trailing slash.
    ///
    /// # Errors
    /// Infallible for the built-in table; kept fallible so callers treat a
    /// missing mapping as a configuration error.
    pub fn resolve(&self, region: Region, family: ApiFamily) -> Result<String> {
        let base = self
            .overrides
            .for_family(family)
            .unwrap_or_else(|| default_base_url(region, family));
        Ok(base.trim_end_matches('/').to_string())
    }

    /// Resolve from a region name as it appears in credentials or config.
    ///
    /// # Errors
    /// Returns `MixpanelError::Config` for an unknown region.
    pub fn resolve_named(&self, region: &str, family: ApiFamily) -> Result<String> {
        let region: Region = region.parse().map_err(MixpanelError::Config)?;
        self.resolve(region, family)
    }

    /// Full URL for `path` under the family's base URL.
    ///
    /// # Errors
    /// See [`EndpointResolver::resolve`].
    pub fn url(&self, region: Region, family: ApiFamily, path: &str) -> Result<String> {
        let base = self.resolve(region, family)?;
        if path.is_empty() {
            return Ok(base);
        }
        if path.starts_with('/') {
            Ok(format!("{base}{path}"))
        } else {
            Ok(format!("{base}/{path}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_region_maps_every_family() {
        let resolver = EndpointResolver::default();
        for region in Region::ALL {
            for family in ApiFamily::ALL {
                let url = resolver.resolve(region, family).unwrap();
                assert!(url.starts_with("https://"), "{region}/{family} -> {url}");
            }
        }
    }

    #[test]
    fn service_account_reuses_query_host() {
        let resolver = EndpointResolver::default();
        for region in Region::ALL {
            assert_eq!(
                resolver.resolve(region, ApiFamily::ServiceAccount).unwrap(),
                resolver.resolve(region, ApiFamily::Query).unwrap()
            );
        }
    }

    #[test]
    fn regional_hosts_are_distinct() {
        let resolver = EndpointResolver::default();
        assert_eq!(
            resolver.resolve(Region::Eu, ApiFamily::Ingestion).unwrap(),
            "https://api-eu.mixpanel.com"
        );
        assert_eq!(
            resolver.resolve(Region::In, ApiFamily::Export).unwrap(),
            "https://data-in.mixpanel.com/api/2.0/export"
        );
    }

    #[test]
    fn unknown_region_name_is_config_error() {
        let resolver = EndpointResolver::default();
        let err = resolver.resolve_named("ap", ApiFamily::Query).unwrap_err();
        assert!(matches!(err, MixpanelError::Config(_)));
        assert_eq!(
            resolver.resolve_named("EU", ApiFamily::Query).unwrap(),
            "https://eu.mixpanel.com/api"
        );
    }

    #[test]
    fn overrides_replace_base_and_strip_trailing_slash() {
        let resolver = EndpointResolver::new(EndpointOverrides::all("http://127.0.0.1:9000/")).unwrap();
        assert_eq!(
            resolver.url(Region::Eu, ApiFamily::Ingestion, "/track").unwrap(),
            "http://127.0.0.1:9000/track"
        );
        assert_eq!(
            resolver.url(Region::Us, ApiFamily::Export, "").unwrap(),
            "http://127.0.0.1:9000"
        );
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = EndpointOverrides { query: Some("not a url".into()), ..Default::default() };
        assert!(matches!(EndpointResolver::new(overrides), Err(MixpanelError::Config(_))));
    }
}
