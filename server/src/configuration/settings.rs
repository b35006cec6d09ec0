//! The decoded `config.json` document.
//!
//! Every field has a default, so a partial document (or no document at all)
//! still produces a complete `Settings`. Unknown fields are ignored, and so
//! are fields set to `null`. Comments and string-encoded numbers are accepted.

use serde::{Deserialize, Serialize};

use super::lenient;

/// Plain configuration values of the keyshare server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SettingsDocument")]
pub struct Settings {
    server_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    human_readable_name: Option<String>,

    jwt_privatekey: String,
    jwt_publickey: String,

    #[serde(rename = "pinExpiry")]
    pin_expiry: u64,

    mail_user: String,
    mail_password: String,
    mail_host: String,
    mail_from: String,
    mail_port: u16,

    webclient_url: String,

    scheme_manager: String,
    email_issuer: String,
    email_credential: String,
    email_attribute: String,
    email_login_credential: String,
    email_login_attribute: String,

    login_email_subject: String,
    login_email_body: String,
    register_email_subject: String,
    register_email_body: String,

    session_timeout: u32,
    rate_limit: u32,

    apiserver_publickey: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_name: "IRMATestCloud".to_string(),
            human_readable_name: None,
            jwt_privatekey: "sk.der".to_string(),
            jwt_publickey: "pk.der".to_string(),
            pin_expiry: 900, // 15 minutes
            mail_user: String::new(),
            mail_password: String::new(),
            mail_host: String::new(),
            mail_from: String::new(),
            mail_port: 587,
            webclient_url: String::new(),
            scheme_manager: String::new(),
            email_issuer: String::new(),
            email_credential: String::new(),
            email_attribute: String::new(),
            email_login_credential: String::new(),
            email_login_attribute: String::new(),
            login_email_subject: "Log in on the keyshare server".to_string(),
            login_email_body: "Click on the link below to log in on the keyshare server."
                .to_string(),
            register_email_subject: "Verify your email address".to_string(),
            register_email_body:
                "To finish registering to the keyshare server, please click on the link below."
                    .to_string(),
            session_timeout: 30,
            rate_limit: 3,
            apiserver_publickey: "apiserver.der".to_string(),
        }
    }
}

/// `config.json` as written: every field optional, `null` meaning absent.
#[derive(Default, Deserialize)]
#[serde(default)]
struct SettingsDocument {
    #[serde(deserialize_with = "lenient::string")]
    server_name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    human_readable_name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    jwt_privatekey: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    jwt_publickey: Option<String>,
    #[serde(rename = "pinExpiry", deserialize_with = "lenient::number")]
    pin_expiry: Option<u64>,
    #[serde(deserialize_with = "lenient::string")]
    mail_user: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    mail_password: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    mail_host: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    mail_from: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    mail_port: Option<u16>,
    #[serde(deserialize_with = "lenient::string")]
    webclient_url: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    scheme_manager: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    email_issuer: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    email_credential: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    email_attribute: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    email_login_credential: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    email_login_attribute: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    login_email_subject: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    login_email_body: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    register_email_subject: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    register_email_body: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    session_timeout: Option<u32>,
    #[serde(deserialize_with = "lenient::number")]
    rate_limit: Option<u32>,
    #[serde(deserialize_with = "lenient::string")]
    apiserver_publickey: Option<String>,
}

impl From<SettingsDocument> for Settings {
    fn from(document: SettingsDocument) -> Self {
        let defaults = Self::default();
        Self {
            server_name: document.server_name.unwrap_or(defaults.server_name),
            human_readable_name: document.human_readable_name.or(defaults.human_readable_name),
            jwt_privatekey: document.jwt_privatekey.unwrap_or(defaults.jwt_privatekey),
            jwt_publickey: document.jwt_publickey.unwrap_or(defaults.jwt_publickey),
            pin_expiry: document.pin_expiry.unwrap_or(defaults.pin_expiry),
            mail_user: document.mail_user.unwrap_or(defaults.mail_user),
            mail_password: document.mail_password.unwrap_or(defaults.mail_password),
            mail_host: document.mail_host.unwrap_or(defaults.mail_host),
            mail_from: document.mail_from.unwrap_or(defaults.mail_from),
            mail_port: document.mail_port.unwrap_or(defaults.mail_port),
            webclient_url: document.webclient_url.unwrap_or(defaults.webclient_url),
            scheme_manager: document.scheme_manager.unwrap_or(defaults.scheme_manager),
            email_issuer: document.email_issuer.unwrap_or(defaults.email_issuer),
            email_credential: document.email_credential.unwrap_or(defaults.email_credential),
            email_attribute: document.email_attribute.unwrap_or(defaults.email_attribute),
            email_login_credential: document
                .email_login_credential
                .unwrap_or(defaults.email_login_credential),
            email_login_attribute: document
                .email_login_attribute
                .unwrap_or(defaults.email_login_attribute),
            login_email_subject: document
                .login_email_subject
                .unwrap_or(defaults.login_email_subject),
            login_email_body: document.login_email_body.unwrap_or(defaults.login_email_body),
            register_email_subject: document
                .register_email_subject
                .unwrap_or(defaults.register_email_subject),
            register_email_body: document
                .register_email_body
                .unwrap_or(defaults.register_email_body),
            session_timeout: document.session_timeout.unwrap_or(defaults.session_timeout),
            rate_limit: document.rate_limit.unwrap_or(defaults.rate_limit),
            apiserver_publickey: document
                .apiserver_publickey
                .unwrap_or(defaults.apiserver_publickey),
        }
    }
}

impl Settings {
    /// Decode a JSON document, comments allowed. Absent and `null` fields take their defaults.
    ///
    /// # Errors
    /// Returns the decoder error if the bytes are not a JSON object or a field
    /// holds a value its type cannot take (a negative count, a port above
    /// 65535, an object where a string belongs).
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let document: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&lenient::strip_comments(bytes))?;
        serde_json::from_value(serde_json::Value::Object(document))
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns the encoder error, which does not happen for this type in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// The display name, falling back to the server name when unset or empty.
    #[must_use]
    pub fn human_readable_name(&self) -> &str {
        match self.human_readable_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.server_name,
        }
    }

    /// Resource name of the PKCS#8 signing key.
    #[must_use]
    pub fn jwt_private_key_name(&self) -> &str {
        &self.jwt_privatekey
    }

    /// Resource name of the SPKI signing public key.
    #[must_use]
    pub fn jwt_public_key_name(&self) -> &str {
        &self.jwt_publickey
    }

    /// Resource name of the API server's SPKI public key.
    #[must_use]
    pub fn api_server_public_key_name(&self) -> &str {
        &self.apiserver_publickey
    }

    /// PIN token lifetime in seconds.
    #[must_use]
    pub const fn pin_expiry(&self) -> u64 {
        self.pin_expiry
    }

    #[must_use]
    pub fn mail_user(&self) -> &str {
        &self.mail_user
    }

    #[must_use]
    pub fn mail_password(&self) -> &str {
        &self.mail_password
    }

    #[must_use]
    pub fn mail_host(&self) -> &str {
        &self.mail_host
    }

    #[must_use]
    pub const fn mail_port(&self) -> u16 {
        self.mail_port
    }

    #[must_use]
    pub fn mail_from(&self) -> &str {
        &self.mail_from
    }

    #[must_use]
    pub fn webclient_url(&self) -> &str {
        &self.webclient_url
    }

    /// Whether the web client is served over HTTPS.
    ///
    /// A plain, case-sensitive prefix test on the web client URL.
    #[must_use]
    pub fn is_https_enabled(&self) -> bool {
        self.webclient_url.starts_with("https://")
    }

    #[must_use]
    pub fn scheme_manager(&self) -> &str {
        &self.scheme_manager
    }

    #[must_use]
    pub fn email_issuer(&self) -> &str {
        &self.email_issuer
    }

    #[must_use]
    pub fn email_credential(&self) -> &str {
        &self.email_credential
    }

    #[must_use]
    pub fn email_attribute(&self) -> &str {
        &self.email_attribute
    }

    #[must_use]
    pub fn email_login_credential(&self) -> &str {
        &self.email_login_credential
    }

    #[must_use]
    pub fn email_login_attribute(&self) -> &str {
        &self.email_login_attribute
    }

    #[must_use]
    pub fn login_email_subject(&self) -> &str {
        &self.login_email_subject
    }

    #[must_use]
    pub fn login_email_body(&self) -> &str {
        &self.login_email_body
    }

    #[must_use]
    pub fn register_email_subject(&self) -> &str {
        &self.register_email_subject
    }

    #[must_use]
    pub fn register_email_body(&self) -> &str {
        &self.register_email_body
    }

    /// Session timeout in minutes.
    #[must_use]
    pub const fn session_timeout(&self) -> u32 {
        self.session_timeout
    }

    /// Allowed PIN attempts before rate limiting kicks in.
    #[must_use]
    pub const fn rate_limit(&self) -> u32 {
        self.rate_limit
    }
}
