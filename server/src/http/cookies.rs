//! Refresh-Token-Cookie
//!
//! Name `refresh_token`, HttpOnly, Pfad `/`. Geloescht wird mit Max-Age -1.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use time::Duration;

pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie mit dem Refresh-Token
pub fn refresh_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Loesch-Cookie fuer Abmeldung und ungueltige Tokens
pub fn refresh_cookie_loeschen() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(-1))
        .build()
}

/// Wert des Refresh-Cookies, sofern vorhanden und nicht leer
pub fn refresh_aus_jar(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Verbleibende Lebensdauer bis `laeuft_ab`, mindestens 0
pub fn restlaufzeit(laeuft_ab: DateTime<Utc>) -> Duration {
    Duration::seconds((laeuft_ab - Utc::now()).num_seconds().max(0))
}

/// Umrechnung chrono → time fuer die Cookie-API
pub fn max_age(dauer: chrono::Duration) -> Duration {
    Duration::seconds(dauer.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_attribute() {
        let cookie = refresh_cookie("abc".into(), Duration::days(7), false);
        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn loesch_cookie_negatives_max_age() {
        let cookie = refresh_cookie_loeschen();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(-1)));
    }

    #[test]
    fn leerer_cookie_zaehlt_nicht() {
        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE, ""));
        assert_eq!(refresh_aus_jar(&jar), None);

        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE, "t"));
        assert_eq!(refresh_aus_jar(&jar).as_deref(), Some("t"));
    }

    #[test]
    fn restlaufzeit_nie_negativ() {
        let vorbei = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(restlaufzeit(vorbei), Duration::ZERO);

        let spaeter = Utc::now() + chrono::Duration::hours(1);
        assert!(restlaufzeit(spaeter) > Duration::minutes(59));
    }
}
