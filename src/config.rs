//! TOML configuration for a web security filter chain.
//!
//! ```toml
//! reject_public_invocations = false
//! decision_strategy = "affirmative"   # or "consensus", "unanimous"
//! role_hierarchy = """
//! ROLE_ADMIN > ROLE_STAFF
//! ROLE_STAFF > ROLE_USER
//! """
//!
//! [anonymous]
//! enabled = true
//! key = "${ANONYMOUS_KEY}"
//!
//! [run_as]
//! key = "${RUN_AS_KEY}"
//!
//! [[rules]]
//! pattern = "/admin/**"
//! attributes = ["ROLE_ADMIN"]
//!
//! [[rules]]
//! pattern = "/**"
//! attributes = ["IS_AUTHENTICATED_ANONYMOUSLY"]
//! ```
//!
//! `${NAME}` references are replaced with environment variables before
//! parsing, except inside comments, so keys need not be written to disk.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::access::{
    AccessDecisionManager, AccessDecisionVoter, AffirmativeBased, AuthenticatedVoter, ConfigAttribute,
    ConsensusBased, RoleHierarchyVoter, RoleVoter, RunAsManagerImpl, UnanimousBased,
};
use crate::authority::RoleHierarchyImpl;
use crate::error::Error;
use crate::intercept::SecurityInterceptor;
use crate::observation::TracingObservationSink;
use crate::web::{
    AnonymousAuthenticationFilter, AntPathRequestMatcher, FilterInvocation, RequestMatcher,
    RequestMatcherMetadataSource, SecurityFilterChain, SessionSecurityContextRepository,
};

/// Root security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Deny requests no rule matches instead of letting them through.
    #[serde(default)]
    pub reject_public_invocations: bool,

    /// How voter results are combined.
    #[serde(default)]
    pub decision_strategy: DecisionStrategy,

    /// Grant when every voter abstains.
    #[serde(default)]
    pub allow_if_all_abstain: bool,

    /// Consensus only: grant when grants and denials tie.
    #[serde(default = "default_true")]
    pub allow_if_equal_granted_denied: bool,

    /// Role hierarchy, one `ROLE_A > ROLE_B` chain per line.
    #[serde(default)]
    pub role_hierarchy: Option<String>,

    /// Anonymous fallback for requests with no login.
    #[serde(default)]
    pub anonymous: AnonymousConfig,

    /// Run-as substitution; disabled when omitted.
    #[serde(default)]
    pub run_as: Option<RunAsConfig>,

    /// Request rules, first match wins.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Voting strategy for the decision manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStrategy {
    /// Any grant wins.
    #[default]
    Affirmative,
    /// Majority wins.
    Consensus,
    /// Any denial loses.
    Unanimous,
}

/// Anonymous authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnonymousConfig {
    /// Install an anonymous authentication when nobody is logged in.
    #[serde(default)]
    pub enabled: bool,

    /// Key the anonymous authentication is minted with.
    #[serde(default)]
    pub key: String,

    /// Principal name.
    #[serde(default = "default_anonymous_principal")]
    pub principal: String,

    /// Authorities granted to anonymous requests.
    #[serde(default = "default_anonymous_authorities")]
    pub authorities: Vec<String>,
}

impl Default for AnonymousConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: String::new(),
            principal: default_anonymous_principal(),
            authorities: default_anonymous_authorities(),
        }
    }
}

/// Run-as settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunAsConfig {
    /// Key run-as authentications are minted with.
    pub key: String,

    /// Prefix for authorities derived from `RUN_AS_` attributes.
    #[serde(default = "default_role_prefix")]
    pub role_prefix: String,
}

/// One request rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Ant-style path pattern.
    pub pattern: String,

    /// HTTP method the rule is limited to.
    #[serde(default)]
    pub method: Option<String>,

    /// Attributes required; empty means public.
    #[serde(default)]
    pub attributes: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_anonymous_principal() -> String {
    "anonymousUser".to_string()
}

fn default_anonymous_authorities() -> Vec<String> {
    vec!["ROLE_ANONYMOUS".to_string()]
}

fn default_role_prefix() -> String {
    "ROLE_".to_string()
}

impl SecurityConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: SecurityConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.anonymous.enabled {
            if self.anonymous.key.is_empty() {
                return Err(ConfigError::Validation(
                    "anonymous.key is required when anonymous.enabled = true".into(),
                ));
            }
            if self.anonymous.authorities.is_empty() {
                return Err(ConfigError::Validation(
                    "anonymous.authorities cannot be empty".into(),
                ));
            }
        }
        if let Some(run_as) = &self.run_as {
            if run_as.key.is_empty() {
                return Err(ConfigError::Validation("run_as.key cannot be empty".into()));
            }
        }
        if let Some(hierarchy) = &self.role_hierarchy {
            RoleHierarchyImpl::from_hierarchy(hierarchy)?;
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.pattern.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "rules[{}].pattern cannot be empty",
                    index
                )));
            }
        }
        Ok(())
    }

    /// Builds the interceptor guarding web requests.
    pub fn build_interceptor(&self) -> Result<SecurityInterceptor<FilterInvocation>, ConfigError> {
        let mut metadata = RequestMatcherMetadataSource::new();
        for rule in &self.rules {
            let matcher: Arc<dyn RequestMatcher> = match &rule.method {
                Some(method) => Arc::new(AntPathRequestMatcher::with_method(rule.pattern.as_str(), method)?),
                None => Arc::new(AntPathRequestMatcher::new(rule.pattern.as_str())?),
            };
            let attributes = rule.attributes.iter().map(ConfigAttribute::new).collect();
            metadata = metadata.rule(matcher, attributes);
        }

        let mut interceptor =
            SecurityInterceptor::<FilterInvocation>::new(Arc::new(metadata), self.decision_manager()?)
                .reject_public_invocations(self.reject_public_invocations)
                .observation_sink(Arc::new(TracingObservationSink));
        if let Some(run_as) = &self.run_as {
            let manager = RunAsManagerImpl::new(run_as.key.as_str())?.role_prefix(run_as.role_prefix.as_str());
            interceptor = interceptor.run_as_manager(Arc::new(manager));
        }
        Ok(interceptor)
    }

    /// Builds a filter chain with an in-memory session repository.
    pub fn build_filter_chain(&self) -> Result<SecurityFilterChain, ConfigError> {
        let interceptor = self.build_interceptor()?;
        let mut chain = SecurityFilterChain::new(
            Arc::new(interceptor),
            Arc::new(SessionSecurityContextRepository::new()),
        );
        if self.anonymous.enabled {
            chain = chain.anonymous(AnonymousAuthenticationFilter::with_principal(
                &self.anonymous.key,
                self.anonymous.principal.as_str(),
                &self.anonymous.authorities,
            )?);
        }
        tracing::debug!(
            rules = self.rules.len(),
            strategy = ?self.decision_strategy,
            anonymous = self.anonymous.enabled,
            run_as = self.run_as.is_some(),
            "Built security filter chain"
        );
        Ok(chain)
    }

    fn decision_manager(&self) -> Result<Arc<dyn AccessDecisionManager<FilterInvocation>>, ConfigError> {
        let role_voter: Arc<dyn AccessDecisionVoter<FilterInvocation>> = match &self.role_hierarchy {
            Some(hierarchy) => Arc::new(RoleHierarchyVoter::new(Arc::new(
                RoleHierarchyImpl::from_hierarchy(hierarchy)?,
            ))),
            None => Arc::new(RoleVoter::new()),
        };
        let voters: Vec<Arc<dyn AccessDecisionVoter<FilterInvocation>>> =
            vec![role_voter, Arc::new(AuthenticatedVoter)];

        let manager: Arc<dyn AccessDecisionManager<FilterInvocation>> = match self.decision_strategy {
            DecisionStrategy::Affirmative => {
                Arc::new(AffirmativeBased::new(voters)?.allow_if_all_abstain(self.allow_if_all_abstain))
            }
            DecisionStrategy::Consensus => Arc::new(
                ConsensusBased::new(voters)?
                    .allow_if_all_abstain(self.allow_if_all_abstain)
                    .allow_if_equal_granted_denied(self.allow_if_equal_granted_denied),
            ),
            DecisionStrategy::Unanimous => {
                Arc::new(UnanimousBased::new(voters)?.allow_if_all_abstain(self.allow_if_all_abstain))
            }
        };
        Ok(manager)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    /// The TOML is malformed or does not fit the schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `${NAME}` reference named an unset variable.
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// The values are inconsistent.
    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// A component rejected its settings.
    #[error(transparent)]
    Security(#[from] Error),
}

fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Validation(e.to_string()))?;
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };
            if comment_pos.is_some_and(|pos| whole.start() >= pos) {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);
            let name = &cap[1];
            let value = std::env::var(name).map_err(|_| ConfigError::EnvVarNotFound(name.to_string()))?;
            result.push_str(&value);
            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') {
        result.pop();
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = SecurityConfig::from_str("").unwrap();
        assert!(!config.reject_public_invocations);
        assert_eq!(config.decision_strategy, DecisionStrategy::Affirmative);
        assert!(config.allow_if_equal_granted_denied);
        assert_eq!(config.anonymous.principal, "anonymousUser");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            SecurityConfig::from_str("reject_public = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn anonymous_requires_key() {
        let result = SecurityConfig::from_str("[anonymous]\nenabled = true\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn cyclic_hierarchy_is_rejected() {
        let result = SecurityConfig::from_str("role_hierarchy = \"ROLE_A > ROLE_B\\nROLE_B > ROLE_A\"");
        assert!(matches!(result, Err(ConfigError::Security(Error::InvalidArgument(_)))));
    }

    #[test]
    fn env_vars_expand_outside_comments() {
        std::env::set_var("ACCESS_CORE_TEST_ANON_KEY", "from-env");
        let toml = "[anonymous]\nenabled = true # ${NOT_SET_ANYWHERE}\nkey = \"${ACCESS_CORE_TEST_ANON_KEY}\"\n";
        let config = SecurityConfig::from_str(toml).unwrap();
        assert_eq!(config.anonymous.key, "from-env");
    }

    #[test]
    fn missing_env_var_is_reported() {
        let result = SecurityConfig::from_str("[run_as]\nkey = \"${ACCESS_CORE_SURELY_UNSET_VAR}\"\n");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "ACCESS_CORE_SURELY_UNSET_VAR"));
    }

    #[test]
    fn strategies_parse_lowercase() {
        let config = SecurityConfig::from_str("decision_strategy = \"unanimous\"").unwrap();
        assert_eq!(config.decision_strategy, DecisionStrategy::Unanimous);
        assert!(config.build_filter_chain().is_ok());
    }
}
