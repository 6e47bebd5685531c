use std::fmt;

/// Framework-agnostic description of an HTTP request reaching the filter chain.
///
/// Holds only what access decisions need: the application's context path,
/// the path within the application (query included), the method and the
/// session identifier, if the client has one.
///
/// # Examples
///
/// ```
/// use access_core::FilterInvocation;
///
/// let invocation = FilterInvocation::new("/admin/users?page=2")
///     .with_context_path("/app")
///     .with_method("post");
///
/// assert_eq!(invocation.request_url(), "/admin/users");
/// assert_eq!(invocation.query(), Some("page=2"));
/// assert_eq!(invocation.request_uri(), "/app/admin/users");
/// assert_eq!(invocation.method(), "POST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
    context_path: String,
    path: String,
    method: String,
    session_id: Option<String>,
}

impl FilterInvocation {
    /// Creates a `GET` invocation of `path` with an empty context path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            context_path: String::new(),
            path: path.into(),
            method: "GET".to_string(),
            session_id: None,
        }
    }

    /// Splits a raw request URI into context path and application path.
    ///
    /// If `request_uri` does not start with `context_path` the whole URI is
    /// taken as the application path.
    pub fn from_request_uri(context_path: &str, request_uri: &str) -> Self {
        let path = request_uri.strip_prefix(context_path).unwrap_or(request_uri);
        Self::new(path).with_context_path(context_path)
    }

    /// Sets the context path the application is mounted under.
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Sets the HTTP method, upper-cased; an empty method means `GET`.
    pub fn with_method(mut self, method: impl AsRef<str>) -> Self {
        let method = method.as_ref().trim();
        self.method = if method.is_empty() {
            "GET".to_string()
        } else {
            method.to_ascii_uppercase()
        };
        self
    }

    /// Attaches the client's session identifier.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Returns the context path.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Returns the path within the application without the query; `/` when empty.
    pub fn request_url(&self) -> &str {
        let url = self.path.split('?').next().unwrap_or_default();
        if url.is_empty() {
            "/"
        } else {
            url
        }
    }

    /// Returns the query string, if present.
    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, query)| query)
    }

    /// Returns the full request path including the context path.
    pub fn request_uri(&self) -> String {
        format!("{}{}", self.context_path, self.request_url())
    }

    /// Returns the upper-case HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the session identifier, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl fmt::Display for FilterInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter invocation [{} {}]", self.method, self.request_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_get_and_root() {
        let invocation = FilterInvocation::new("");
        assert_eq!(invocation.method(), "GET");
        assert_eq!(invocation.request_url(), "/");
        assert!(invocation.session_id().is_none());
    }

    #[test]
    fn empty_method_means_get() {
        assert_eq!(FilterInvocation::new("/").with_method("").method(), "GET");
        assert_eq!(FilterInvocation::new("/").with_method("delete").method(), "DELETE");
    }

    #[test]
    fn from_request_uri_strips_context_path() {
        let invocation = FilterInvocation::from_request_uri("/ctx", "/ctx/secure/page");
        assert_eq!(invocation.request_url(), "/secure/page");
        assert_eq!(invocation.context_path(), "/ctx");

        let outside = FilterInvocation::from_request_uri("/ctx", "/other");
        assert_eq!(outside.request_url(), "/other");
    }

    #[test]
    fn display_names_method_and_url() {
        let invocation = FilterInvocation::new("/foo/index.jsp?x=1");
        assert_eq!(invocation.to_string(), "filter invocation [GET /foo/index.jsp]");
    }
}
