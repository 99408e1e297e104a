use super::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    ShowLoading,
    Render,
    /// `from` is the path the user tried to open, to return to after login.
    RedirectToLogin { from: String },
    AccessDenied,
}

/// Decides what a protected view shows for the current session.
pub fn decide(state: &SessionState, require_admin: bool, from: &str) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::ShowLoading,
        SessionState::Unauthenticated => GuardDecision::RedirectToLogin {
            from: from.to_string(),
        },
        SessionState::Authenticated(user) if require_admin && !user.is_admin() => {
            GuardDecision::AccessDenied
        }
        SessionState::Authenticated(_) => GuardDecision::Render,
    }
}
