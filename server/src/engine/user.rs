/// Sequential user identifier. The first registered user gets 1.
pub type UserId = u32;

/// How a caller wants to resolve a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup<'a> {
    Id(UserId),
    Email(&'a str),
}

/// A registered account. Never mutated or deleted once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Stored and compared as plaintext.
    pub password: String,
}

impl User {
    pub fn new(id: UserId, name: String, email: String, password: String) -> Self {
        Self {
            id,
            name,
            email,
            password,
        }
    }

    pub fn matches(&self, lookup: UserLookup<'_>) -> bool {
        match lookup {
            UserLookup::Id(id) => self.id == id,
            UserLookup::Email(email) => self.email == email,
        }
    }

    /// Exact match on both email and password.
    pub fn check_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}
