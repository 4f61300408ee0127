use client::{Landing, Session};

/// Pages of the client, addressed by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Welcome,
    Login,
    Register,
    RequestReset,
    ResetPassword { token: String },
    Analyzer,
    Profile,
    Admin,
}

impl Route {
    /// A reset link carries its token in the query string.
    pub fn parse(path: &str, token: Option<String>) -> Self {
        match path.trim_end_matches('/').to_lowercase().as_str() {
            "/login" => Route::Login,
            "/registro" => Route::Register,
            "/reset-password" => match token.filter(|t| !t.is_empty()) {
                Some(token) => Route::ResetPassword { token },
                None => Route::RequestReset,
            },
            "/usuario" => Route::Analyzer,
            "/perfil" => Route::Profile,
            "/admin" => Route::Admin,
            _ => Route::Welcome,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Welcome => "/".into(),
            Route::Login => "/login".into(),
            Route::Register => "/registro".into(),
            Route::RequestReset => "/reset-password".into(),
            Route::ResetPassword { token } => {
                format!("/reset-password?token={}", urlencoding::encode(token))
            }
            Route::Analyzer => "/Usuario".into(),
            Route::Profile => "/perfil".into(),
            Route::Admin => "/Admin".into(),
        }
    }

    pub fn for_landing(landing: Landing) -> Self {
        match landing {
            Landing::UserWorkspace => Route::Analyzer,
            Landing::AdminDashboard => Route::Admin,
        }
    }

    /// Protected pages fall back to the login page.
    pub fn guard(self, session: &Session) -> Self {
        let allowed = match &self {
            Route::Analyzer => Landing::UserWorkspace.admits(session),
            Route::Admin => Landing::AdminDashboard.admits(session),
            Route::Profile => session.token().is_some(),
            _ => true,
        };
        if allowed {
            self
        } else {
            log::info!("{:?} requires signing in with the right role", self);
            Route::Login
        }
    }

    pub fn current() -> Self {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Route::Welcome;
        };
        let path = location.pathname().unwrap_or_default();
        let token = location
            .search()
            .ok()
            .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
            .and_then(|params| params.get("token"));
        Route::parse(&path, token)
    }

    pub fn push(&self) {
        self.write_address(false);
    }

    /// Rewrites the current entry, e.g. after a redirect to the login page.
    pub fn replace(&self) {
        self.write_address(true);
    }

    fn write_address(&self, replace: bool) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        let data = wasm_bindgen::JsValue::NULL;
        let path = self.path();
        let result = if replace {
            history.replace_state_with_url(&data, "", Some(&path))
        } else {
            history.push_state_with_url(&data, "", Some(&path))
        };
        if let Err(e) = result {
            log::warn!("Could not update the address bar: {:?}", e);
        }
    }
}
