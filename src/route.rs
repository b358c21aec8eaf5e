//! Named routes and reverse URL generation.

use std::fmt::Display;

/// A registered route: the pattern it was added under, its registry name,
/// and a URL template with parameter modifiers stripped.
///
/// Routes are created by the registration methods on
/// [`Router`](crate::router::Router) and [`RouteGroup`](crate::group::RouteGroup)
/// and looked up by name through [`Router::route`](crate::router::Router::route)
/// for reverse routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: String,
    name: String,
    template: String,
}

impl Route {
    pub(crate) fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        let path = path.into();
        let template = build_template(&path);
        Self {
            path,
            name: name.into(),
            template,
        }
    }

    pub(crate) fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            path: self.path.clone(),
            name: name.into(),
            template: self.template.clone(),
        }
    }

    /// The pattern the route was registered under, group prefix included.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The registry name. Defaults to the registered pattern until
    /// overridden.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The URL template: the pattern with regex constraints and `?`/`*`
    /// modifiers stripped from each parameter.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Generate a URL from the template, substituting `{name}` with the
    /// query-escaped string form of each supplied value.
    ///
    /// Placeholders with no supplied value are left in the output
    /// untouched, which makes partially applied templates visible to the
    /// caller instead of silently producing a broken path.
    pub fn url<'a, I, V>(&self, pairs: I) -> String
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let mut url = self.template.clone();
        for (name, value) in pairs {
            let placeholder = format!("{{{name}}}");
            let encoded = urlencoding::encode(&value.to_string()).into_owned();
            url = url.replace(&placeholder, &encoded);
        }
        url
    }
}

/// Strip parameter modifiers from a pattern, leaving plain `{name}`
/// placeholders.
///
/// `/users/{id:[0-9]+}/files/{path*}` becomes `/users/{id}/files/{path}`.
fn build_template(path: &str) -> String {
    let mut template = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let close = open + close;
        let token = &rest[open + 1..close];
        let name = token.split(':').next().unwrap_or("");
        let name = name.trim_start_matches('*');
        let name = name.trim_end_matches(['?', '*']);
        template.push_str(&rest[..open]);
        template.push('{');
        template.push_str(name);
        template.push('}');
        rest = &rest[close + 1..];
    }
    template.push_str(rest);
    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_strips_regex_and_modifiers() {
        let route = Route::new("/users/{id:[0-9]+}/posts/{slug}", "x");
        assert_eq!(route.template(), "/users/{id}/posts/{slug}");

        let route = Route::new("/files/{path*}", "x");
        assert_eq!(route.template(), "/files/{path}");

        let route = Route::new("/post/{id?}", "x");
        assert_eq!(route.template(), "/post/{id}");
    }

    #[test]
    fn template_keeps_literal_paths() {
        let route = Route::new("/about/team", "x");
        assert_eq!(route.template(), "/about/team");
    }

    #[test]
    fn url_substitutes_and_escapes() {
        let route = Route::new("/users/{id}/posts/{slug}", "x");
        assert_eq!(
            route.url([("id", "42"), ("slug", "a b")]),
            "/users/42/posts/a%20b"
        );
    }

    #[test]
    fn url_accepts_display_values() {
        let route = Route::new("/users/{id}", "x");
        assert_eq!(route.url([("id", 42)]), "/users/42");
    }

    #[test]
    fn url_leaves_missing_placeholders() {
        let route = Route::new("/users/{id}/posts/{slug}", "x");
        assert_eq!(route.url([("id", 7)]), "/users/7/posts/{slug}");
    }

    #[test]
    fn anonymous_catch_all_template() {
        let route = Route::new("/static/{:.*}", "x");
        assert_eq!(route.template(), "/static/{}");
    }
}
