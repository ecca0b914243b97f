use std::fmt;

use uuid::Uuid;

/// Per-connection id carried on the session span, e.g. `sess_0190...`.
/// Backed by a UUID v7.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("sess_{}", Uuid::now_v7()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_has_prefix() {
        let id = SessionId::new().to_string();
        assert!(id.starts_with("sess_"), "got: {id}");
        assert!(Uuid::parse_str(&id["sess_".len()..]).is_ok());
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
