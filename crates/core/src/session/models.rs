use serde::{Deserialize, Serialize};

/// Role carried by a signed-in profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
}

/// Profile of the signed-in owner, persisted as JSON under `ownerUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub image: String,
    pub role: Role,
}

impl Profile {
    /// `Name <email>` label for headers.
    pub fn display_label(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}
