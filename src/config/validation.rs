use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_selectors(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site root and region
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url must use http or https, got '{}'",
            config.root_url
        )));
    }

    // Relative hrefs are joined onto the root, so it has to name a directory
    if !url.path().ends_with('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url must end with '/', got '{}'",
            config.root_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.detail_workers < 1 || config.detail_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "detail_workers must be between 1 and 64, got {}",
            config.detail_workers
        )));
    }

    if config.completion_capacity < 1 || config.completion_capacity > 1024 {
        return Err(ConfigError::Validation(format!(
            "completion_capacity must be between 1 and 1024, got {}",
            config.completion_capacity
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every configured selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.listing_item,
        &config.detail_link,
        &config.listing_price,
        &config.detail_address,
    ] {
        parse_selector(selector)?;
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output path cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Compiles a CSS selector, mapping failures to a config error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: "selector cannot be empty".to_string(),
        });
    }

    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_root_url() {
        let mut site = SiteConfig::default();
        assert!(validate_site_config(&site).is_ok());

        site.root_url = "not a url".to_string();
        assert!(validate_site_config(&site).is_err());

        site.root_url = "ftp://store.example.com/".to_string();
        assert!(validate_site_config(&site).is_err());

        site.root_url = "https://store.example.com/listings".to_string();
        assert!(validate_site_config(&site).is_err());

        site.root_url = "https://store.example.com/listings/".to_string();
        assert!(validate_site_config(&site).is_ok());
    }

    #[test]
    fn test_validate_worker_bounds() {
        let mut crawler = CrawlerConfig::default();
        crawler.detail_workers = 0;
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.detail_workers = 65;
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.detail_workers = 10;
        crawler.completion_capacity = 0;
        assert!(validate_crawler_config(&crawler).is_err());
    }

    #[test]
    fn test_validate_selectors() {
        let mut selectors = SelectorConfig::default();
        assert!(validate_selectors(&selectors).is_ok());

        selectors.detail_address = "div[[".to_string();
        assert!(matches!(
            validate_selectors(&selectors),
            Err(ConfigError::InvalidSelector { .. })
        ));

        selectors.detail_address = "   ".to_string();
        assert!(validate_selectors(&selectors).is_err());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut agent = UserAgentConfig::default();
        assert!(validate_user_agent_config(&agent).is_ok());

        agent.crawler_name = "Bad Name!".to_string();
        assert!(validate_user_agent_config(&agent).is_err());
    }
}
