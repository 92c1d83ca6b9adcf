/// Authentication state for the connection: `access_token` is set exactly
/// once, on a successful `Auth` response, and attached to every subsequent
/// private request thereafter.
#[derive(Debug, Default)]
pub struct Session {
    access_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }
}
