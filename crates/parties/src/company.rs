use serde::{Deserialize, Serialize};

use osdesk_core::DomainResult;
use osdesk_core::error::{optional_text, require_text};

/// The business's own company profile (single row), printed on documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cnpj: Option<String>,
    pub notes: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    #[serde(default)]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cnpj: Option<String>,
    pub notes: Option<String>,
    pub website: Option<String>,
}

impl CompanyProfile {
    pub fn from_details(details: CompanyDetails) -> DomainResult<Self> {
        Ok(Self {
            name: require_text("name", &details.name)?,
            address: optional_text(details.address),
            phone: optional_text(details.phone),
            email: optional_text(details.email),
            cnpj: optional_text(details.cnpj),
            notes: optional_text(details.notes),
            website: optional_text(details.website),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        assert!(CompanyProfile::from_details(CompanyDetails::default()).is_err());
    }

    #[test]
    fn blank_optionals_become_none() {
        let profile = CompanyProfile::from_details(CompanyDetails {
            name: "Oficina Central".into(),
            website: Some(" ".into()),
            cnpj: Some("12.345.678/0001-90".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(profile.website, None);
        assert_eq!(profile.cnpj.as_deref(), Some("12.345.678/0001-90"));
    }
}
