//! Session-based routing: who may open which screen.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Calendar,
    Subjects,
    Profile,
}

impl Route {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    RedirectToLogin,
    RedirectToDashboard,
}

pub fn guard(route: Route, has_session: bool) -> GuardDecision {
    match (route, has_session) {
        (route, false) if route.is_protected() => GuardDecision::RedirectToLogin,
        (Route::Login, true) => GuardDecision::RedirectToDashboard,
        _ => GuardDecision::Proceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_routes_need_a_session() {
        for route in [
            Route::Dashboard,
            Route::Calendar,
            Route::Subjects,
            Route::Profile,
        ] {
            assert_eq!(guard(route, false), GuardDecision::RedirectToLogin);
            assert_eq!(guard(route, true), GuardDecision::Proceed);
        }
    }

    #[test]
    fn login_redirects_when_signed_in() {
        assert_eq!(guard(Route::Login, true), GuardDecision::RedirectToDashboard);
        assert_eq!(guard(Route::Login, false), GuardDecision::Proceed);
        assert_eq!(guard(Route::Register, true), GuardDecision::Proceed);
        assert_eq!(guard(Route::Register, false), GuardDecision::Proceed);
    }
}
