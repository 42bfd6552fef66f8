use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Validate, Deserialize)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Password must be 1-100 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Missing or empty fields leave the stored value unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 100, message = "Password must be at most 100 characters"))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// Treats `""` the same as an absent field.
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.filter(|email| !email.is_empty()),
            password: self.password.filter(|password| !password.is_empty()),
        }
    }
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreateChirpRequest {
    #[validate(length(max = 140, message = "Chirp is too long"))]
    pub body: String,
}

/// Query parameters for `GET /api/chirps`.
///
/// Both are parsed leniently: an unknown sort order means ascending and an
/// author id that is not a number lists every chirp.
#[derive(Debug, Default, Deserialize)]
pub struct ChirpListParams {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl ChirpListParams {
    pub fn author_id(&self) -> Option<u64> {
        self.author_id.as_deref().and_then(|id| id.parse().ok())
    }

    pub fn sort_order(&self) -> SortOrder {
        match self.sort.as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub user_id: u64,
}
