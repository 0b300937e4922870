//! Identity of the staff member behind a request.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::config::ServerConfig;

/// Claims issued by the auth service and stored as the session identity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
            log::error!("Server config is not registered");
            return ready(Err(ErrorInternalServerError("Server misconfigured")));
        };

        let token = match req.get_identity().map(|identity| identity.id()) {
            Ok(Ok(token)) => token,
            _ => return ready(Err(ErrorUnauthorized("Not signed in"))),
        };

        ready(
            AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
                log::warn!("Rejected identity token: {err}");
                ErrorUnauthorized("Invalid token")
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_claims() {
        let user = AuthenticatedUser {
            sub: "1".into(),
            email: "staff@bbe.test".into(),
            name: "Staff".into(),
            roles: vec!["bbe".into()],
            exp: 4_102_444_800,
        };

        let token = user.to_jwt("secret").unwrap();
        assert_eq!(AuthenticatedUser::from_jwt(&token, "secret").unwrap(), user);
        assert!(AuthenticatedUser::from_jwt(&token, "other").is_err());
    }
}
