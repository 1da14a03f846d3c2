//! Server-rendered pages.
//!
//! Templates are compiled into the binary and rendered with minijinja.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;
use stayhaven_common::ApiError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("unauthorized.html", include_str!("../templates/unauthorized.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("admin.html", include_str!("../templates/admin.html")),
    ("super.html", include_str!("../templates/super.html")),
];

pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, name: &str, ctx: impl Serialize) -> Result<Html<String>, ApiError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| ApiError::Internal(format!("template {name}: {e}")))?;
        template
            .render(ctx)
            .map(Html)
            .map_err(|e| ApiError::Internal(format!("render {name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_compile() {
        let pages = Pages::new().unwrap();
        for (name, _) in TEMPLATES {
            assert!(pages.env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_login_keeps_callback() {
        let pages = Pages::new().unwrap();
        let Html(body) = pages
            .render("login.html", context! { callback_url => "/admin", error => "InvalidCredentials" })
            .unwrap();
        assert!(body.contains(r#"name="callbackUrl""#));
        assert!(body.contains("InvalidCredentials"));
    }

    #[test]
    fn test_html_is_escaped() {
        let pages = Pages::new().unwrap();
        let Html(body) = pages
            .render("super.html", context! { email => "<script>@x.io", role => "SUPERUSER" })
            .unwrap();
        assert!(!body.contains("<script>@x.io"));
    }
}
