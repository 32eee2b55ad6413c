// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Service account assertions and OAuth access tokens.
//!
//! See <https://developers.google.com/identity/protocols/oauth2/service-account#httprest>.

use {
    crate::{
        unix_now, PlayPublisherClient, Result, ANDROID_PUBLISHER_SCOPE, GOOGLE_OAUTH_TOKEN_URL,
    },
    jsonwebtoken::{Algorithm, EncodingKey, Header},
    serde::{Deserialize, Serialize},
    std::time::{Duration, Instant},
};

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claims of a service account assertion.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub exp: u64,
    pub iat: u64,
}

/// Issues RS256 signed assertions on behalf of a service account.
///
/// Instances are usually derived from a [crate::ServiceAccountKey].
#[derive(Clone)]
pub struct AssertionEncoder {
    issuer: String,
    encoding_key: EncodingKey,
}

impl AssertionEncoder {
    /// Construct an instance from an [EncodingKey] instance.
    pub fn from_jwt_encoding_key(issuer: String, encoding_key: EncodingKey) -> Self {
        Self {
            issuer,
            encoding_key,
        }
    }

    /// Construct an instance from a PEM encoded RSA private key.
    pub fn from_rsa_pem(issuer: String, pem_data: &[u8]) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(pem_data)?;

        Ok(Self::from_jwt_encoding_key(issuer, encoding_key))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Claims for an assertion issued at `iat` and valid for `lifetime`.
    pub fn claims(&self, iat: u64, lifetime: Duration) -> AssertionClaims {
        AssertionClaims {
            iss: self.issuer.clone(),
            scope: ANDROID_PUBLISHER_SCOPE.to_string(),
            aud: GOOGLE_OAUTH_TOKEN_URL.to_string(),
            exp: iat + lifetime.as_secs(),
            iat,
        }
    }

    /// Sign a new assertion valid from now for `lifetime`.
    pub fn new_assertion(&self, lifetime: Duration) -> Result<String> {
        let claims = self.claims(unix_now(), lifetime);

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

impl std::fmt::Debug for AssertionEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertionEncoder")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// A bearer token for the Android Publisher API.
///
/// The token value is never printed; [std::fmt::Debug] only shows its length.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    obtained_at: Instant,
    lifetime: Duration,
}

impl AccessToken {
    pub fn new(token: String, lifetime: Duration) -> Self {
        Self {
            token,
            obtained_at: Instant::now(),
            lifetime,
        }
    }

    /// The raw token value, for use in an `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn age(&self) -> Duration {
        self.obtained_at.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.age() >= self.lifetime
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "****({})", self.token.len())
    }
}

impl PlayPublisherClient {
    /// Exchange a freshly signed assertion for an access token.
    pub fn obtain_access_token(&self, encoder: &AssertionEncoder) -> Result<AccessToken> {
        let assertion = encoder.new_assertion(self.config.token_lifetime)?;

        let req = self
            .client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ]);

        let res: TokenResponse = self.send_request(req)?.json()?;

        let lifetime = res
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(self.config.token_lifetime);

        Ok(AccessToken::new(res.access_token, lifetime))
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        jsonwebtoken::{DecodingKey, Validation},
    };

    const RSA_PRIVATE_KEY: &[u8] = include_bytes!("testdata/rsa-2048.pem");
    const RSA_PUBLIC_KEY: &[u8] = include_bytes!("testdata/rsa-2048.pub.pem");

    const ISSUER: &str = "publisher@example-project.iam.gserviceaccount.com";

    fn encoder() -> AssertionEncoder {
        AssertionEncoder::from_rsa_pem(ISSUER.to_string(), RSA_PRIVATE_KEY).unwrap()
    }

    #[test]
    fn claims_expire_after_lifetime() {
        let claims = encoder().claims(1_700_000_000, Duration::from_secs(600));

        assert_eq!(
            claims,
            AssertionClaims {
                iss: ISSUER.to_string(),
                scope: "https://www.googleapis.com/auth/androidpublisher".to_string(),
                aud: "https://oauth2.googleapis.com/token".to_string(),
                exp: 1_700_000_600,
                iat: 1_700_000_000,
            }
        );
    }

    #[test]
    fn assertion_is_rs256_signed() -> Result<()> {
        let assertion = encoder().new_assertion(Duration::from_secs(600))?;

        let header = jsonwebtoken::decode_header(&assertion)?;
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.typ.as_deref(), Some("JWT"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[GOOGLE_OAUTH_TOKEN_URL]);
        let data = jsonwebtoken::decode::<AssertionClaims>(
            &assertion,
            &DecodingKey::from_rsa_pem(RSA_PUBLIC_KEY)?,
            &validation,
        )?;

        assert_eq!(data.claims.iss, ISSUER);
        assert_eq!(data.claims.scope, ANDROID_PUBLISHER_SCOPE);
        assert_eq!(data.claims.exp, data.claims.iat + 600);

        Ok(())
    }

    #[test]
    fn encoder_debug_hides_key() {
        let s = format!("{:?}", encoder());

        assert_eq!(
            s,
            "AssertionEncoder { issuer: \"publisher@example-project.iam.gserviceaccount.com\", .. }"
        );
    }

    #[test]
    fn non_rsa_key_rejected() {
        assert!(AssertionEncoder::from_rsa_pem(ISSUER.to_string(), b"not a key").is_err());
    }

    #[test]
    fn access_token_debug_hides_value() {
        let token = AccessToken::new("ya29.secret".to_string(), Duration::from_secs(600));

        assert_eq!(format!("{token:?}"), "****(11)");
        assert!(!token.is_expired());
    }

    #[test]
    fn zero_lifetime_token_is_expired() {
        let token = AccessToken::new("ya29.secret".to_string(), Duration::ZERO);

        assert!(token.is_expired());
    }
}
