use serde::{Deserialize, Serialize};

use billbook_core::{ClientId, DomainError, DomainResult, Entity};

/// Contact information for a client. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ContactInfo {
    /// Trim every field and turn blank strings into `None`.
    fn normalized(self) -> Self {
        Self {
            address: non_blank(self.address),
            phone: non_blank(self.phone),
            email: non_blank(self.email),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client input as entered on the maintenance form (create and edit share it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
}

impl ClientDetails {
    /// Validate and normalize the details.
    pub fn validated(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let contact = self.contact.normalized();
        if let Some(email) = &contact.email {
            if !email.contains('@') {
                return Err(DomainError::validation(format!(
                    "email '{email}' is not a valid address"
                )));
            }
        }

        Ok(Self { name, contact })
    }
}

/// Entity: Client.
///
/// Invoices reference clients by id; the invoice core only ever checks that a client
/// exists and never mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    name: String,
    contact: ContactInfo,
}

impl Client {
    /// Register a new client from validated details.
    pub fn register(id: ClientId, details: ClientDetails) -> DomainResult<Self> {
        let details = details.validated()?;
        Ok(Self {
            id,
            name: details.name,
            contact: details.contact,
        })
    }

    /// Rebuild a client from stored columns (no validation; the row was validated on write).
    pub fn from_parts(id: ClientId, name: String, contact: ContactInfo) -> Self {
        Self { id, name, contact }
    }

    /// Replace name and contact details.
    pub fn update(&mut self, details: ClientDetails) -> DomainResult<()> {
        let details = details.validated()?;
        self.name = details.name;
        self.contact = details.contact;
        Ok(())
    }

    pub fn id_typed(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> ClientId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str) -> ClientDetails {
        ClientDetails {
            name: name.to_string(),
            contact: ContactInfo {
                address: Some("  Av. Siempre Viva 742 ".to_string()),
                phone: Some("".to_string()),
                email: Some("ana@example.com".to_string()),
            },
        }
    }

    #[test]
    fn register_trims_and_drops_blank_contact_fields() {
        let client = Client::register(ClientId::new(), details("  Ana  ")).unwrap();
        assert_eq!(client.name(), "Ana");
        assert_eq!(client.contact().address.as_deref(), Some("Av. Siempre Viva 742"));
        assert_eq!(client.contact().phone, None);
        assert_eq!(client.contact().email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn register_rejects_empty_name() {
        let err = Client::register(ClientId::new(), details("   ")).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn register_rejects_malformed_email() {
        let mut d = details("Ana");
        d.contact.email = Some("not-an-email".to_string());
        let err = Client::register(ClientId::new(), d).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("not-an-email")));
    }

    #[test]
    fn update_replaces_details_but_keeps_identity() {
        let id = ClientId::new();
        let mut client = Client::register(id, details("Ana")).unwrap();

        client
            .update(ClientDetails {
                name: "Ana María".to_string(),
                contact: ContactInfo::default(),
            })
            .unwrap();

        assert_eq!(client.id(), id);
        assert_eq!(client.name(), "Ana María");
        assert_eq!(client.contact(), &ContactInfo::default());
    }

    #[test]
    fn failed_update_leaves_client_untouched() {
        let mut client = Client::register(ClientId::new(), details("Ana")).unwrap();
        let before = client.clone();

        assert!(client.update(details("")).is_err());
        assert_eq!(client, before);
    }
}
