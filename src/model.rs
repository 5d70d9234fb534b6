pub type PlantId = String;

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Position of the plant within the account's plant list, starting at 0.
    pub plant_index: usize,
}

/* The plaintext password stays out of debug output */
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("plant_index", &self.plant_index)
            .finish()
    }
}

/// Session of the client with the Growatt cloud.
///
/// A plant id only exists together with an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated { plant_id: PlantId },
}

impl Default for Session {
    fn default() -> Self {
        Session::Unauthenticated
    }
}

impl Session {
    pub fn plant_id(&self) -> Option<&str> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated { plant_id } => Some(plant_id),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Credentials, Session};

    #[test]
    fn password_not_in_debug_output() {
        let credentials = Credentials {
            email: "user@example.com".to_string(),
            password: "password123".to_string(),
            plant_index: 1,
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("password123"));
    }

    #[test]
    fn plant_id_only_when_authenticated() {
        assert_eq!(None, Session::default().plant_id());
        let session = Session::Authenticated {
            plant_id: "AB123".to_string(),
        };
        assert_eq!(Some("AB123"), session.plant_id());
    }
}
