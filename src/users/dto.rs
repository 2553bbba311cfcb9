use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for registration. Fields are optional so that every missing
/// one can be reported at once.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// A registration with every required field present.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub country: String,
    pub city: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl RegisterRequest {
    /// Yields the complete registration, or the names of absent or empty
    /// fields in declaration order.
    pub fn validate(self) -> Result<Registration, Vec<&'static str>> {
        match (
            present(self.email),
            present(self.password),
            present(self.name),
            present(self.country),
            present(self.city),
        ) {
            (Some(email), Some(password), Some(name), Some(country), Some(city)) => {
                Ok(Registration {
                    email,
                    password,
                    name,
                    country,
                    city,
                })
            }
            (email, password, name, country, city) => Err([
                ("email", email.is_none()),
                ("password", password.is_none()),
                ("name", name.is_none()),
                ("country", country.is_none()),
                ("city", city.is_none()),
            ]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(field, _)| field)
            .collect()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: i64,
}

/// Public part of the user returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub country: String,
    pub city: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            country: u.country,
            city: u.city,
        }
    }
}
