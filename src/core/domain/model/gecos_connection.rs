use crate::core::domain::value_object::GecosUrl;

/// HTTP basic credentials of the administrator.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where and as whom the console talks to the Control Center.
#[derive(Debug, Clone)]
pub struct GecosConnection {
    base_url: GecosUrl,
    credentials: Option<Credentials>,
}

impl GecosConnection {
    pub fn new(base_url: GecosUrl, credentials: Option<Credentials>) -> Self {
        Self {
            base_url,
            credentials,
        }
    }

    pub fn base_url(&self) -> &GecosUrl {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Name of the administrator, used to filter job notifications.
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::username)
    }
}
