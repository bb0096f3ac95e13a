use serde::{Deserialize, Serialize};

use osdesk_core::error::{optional_text, require_text};
use osdesk_core::{ClientId, DomainResult};

/// Client (customer) record.
///
/// `tax_id` holds the CPF or CNPJ and must be unique across clients; the
/// uniqueness check belongs to the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tax_id: String,
    pub city: Option<String>,
}

/// Editable client fields, as submitted by the registration/edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub tax_id: String,
    pub city: Option<String>,
}

impl Client {
    /// Validate details and build a new client record.
    pub fn register(id: ClientId, details: ClientDetails) -> DomainResult<Self> {
        let (name, tax_id) = Self::validate(&details)?;
        Ok(Self {
            id,
            name,
            phone: optional_text(details.phone),
            email: optional_text(details.email),
            tax_id,
            city: optional_text(details.city),
        })
    }

    /// Replace the editable fields; the identity is preserved.
    pub fn update(&mut self, details: ClientDetails) -> DomainResult<()> {
        let (name, tax_id) = Self::validate(&details)?;
        self.name = name;
        self.tax_id = tax_id;
        self.phone = optional_text(details.phone);
        self.email = optional_text(details.email);
        self.city = optional_text(details.city);
        Ok(())
    }

    /// Case-insensitive substring match on name, tax id or email.
    ///
    /// An empty term matches everything.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.tax_id.to_lowercase().contains(&term)
            || self
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&term))
    }

    fn validate(details: &ClientDetails) -> DomainResult<(String, String)> {
        let name = require_text("name", &details.name)?;
        let tax_id = require_text("tax_id", &details.tax_id)?;
        Ok((name, tax_id))
    }
}

/// Alphabetical listing order used by the client screens.
pub fn sort_by_name(clients: &mut [Client]) {
    clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
