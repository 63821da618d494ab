//! Absolute and media URL construction for responses.

use actix_web::HttpRequest;
use url::Url;

use crate::domain::{Error, RecipeId};

/// Default prefix under which stored media is served.
pub const DEFAULT_MEDIA_PREFIX: &str = "/media/";

/// URL settings needed to render links in response bodies.
#[derive(Debug, Clone)]
pub struct PublicLinks {
    media_prefix: String,
    public_base: Option<Url>,
}

impl Default for PublicLinks {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_PREFIX, None)
    }
}

impl PublicLinks {
    /// Build link settings. A trailing slash is added to `media_prefix` when
    /// missing.
    ///
    /// # Examples
    /// ```
    /// use foodgram::inbound::http::links::PublicLinks;
    ///
    /// let links = PublicLinks::new("/media", None);
    /// assert_eq!(links.media_url("users/a.png"), "/media/users/a.png");
    /// ```
    pub fn new(media_prefix: impl Into<String>, public_base: Option<Url>) -> Self {
        let mut media_prefix = media_prefix.into();
        if !media_prefix.ends_with('/') {
            media_prefix.push('/');
        }
        Self {
            media_prefix,
            public_base,
        }
    }

    /// URL clients use to fetch a stored media file.
    pub fn media_url(&self, path: &str) -> String {
        format!("{}{}", self.media_prefix, path.trim_start_matches('/'))
    }

    /// Scheme and host for absolute links: the configured public URL, or the
    /// request's own origin.
    pub fn base(&self, req: &HttpRequest) -> Result<Url, Error> {
        if let Some(base) = &self.public_base {
            return Ok(base.clone());
        }
        let info = req.connection_info();
        Url::parse(&format!("{}://{}/", info.scheme(), info.host()))
            .map_err(|err| Error::internal(format!("invalid request origin: {err}")))
    }

    /// Absolute URL of the current request, query string included.
    pub fn request_url(&self, req: &HttpRequest) -> Result<Url, Error> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
        self.base(req)?
            .join(path_and_query.trim_start_matches('/'))
            .map_err(|err| Error::internal(format!("invalid request URL: {err}")))
    }

    /// Short link for a recipe, `<base>/s/<id>/`.
    pub fn short_link(&self, req: &HttpRequest, id: RecipeId) -> Result<String, Error> {
        self.base(req)?
            .join(&format!("s/{}/", id.value()))
            .map(String::from)
            .map_err(|err| Error::internal(format!("invalid short link: {err}")))
    }
}

/// Canonical front-end path of a recipe, the short-link redirect target.
pub fn recipe_path(id: RecipeId) -> String {
    format!("/recipes/{}/", id.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn recipe(raw: i64) -> RecipeId {
        RecipeId::new(raw).expect("recipe id")
    }

    #[rstest]
    #[case("/media", "users/a.png", "/media/users/a.png")]
    #[case("https://cdn.example.org/m/", "/recipes/images/b.jpg", "https://cdn.example.org/m/recipes/images/b.jpg")]
    fn media_urls_join_prefix_and_path(
        #[case] prefix: &str,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(PublicLinks::new(prefix, None).media_url(path), expected);
    }

    #[rstest]
    fn short_link_uses_request_origin_without_public_base() {
        let req = TestRequest::default()
            .uri("/api/recipes/7/get-link/")
            .insert_header(("Host", "food.example.org"))
            .to_http_request();

        let link = PublicLinks::default()
            .short_link(&req, recipe(7))
            .expect("link");

        assert_eq!(link, "http://food.example.org/s/7/");
    }

    #[rstest]
    fn short_link_prefers_public_base() {
        let req = TestRequest::default().to_http_request();
        let base = Url::parse("https://foodgram.example.com/").expect("base");

        let link = PublicLinks::new("/media/", Some(base))
            .short_link(&req, recipe(3))
            .expect("link");

        assert_eq!(link, "https://foodgram.example.com/s/3/");
    }

    #[rstest]
    fn request_url_keeps_query() {
        let req = TestRequest::default()
            .uri("/api/recipes/?author=2&limit=3")
            .insert_header(("Host", "localhost:8080"))
            .to_http_request();

        let url = PublicLinks::default().request_url(&req).expect("url");

        assert_eq!(url.as_str(), "http://localhost:8080/api/recipes/?author=2&limit=3");
    }

    #[rstest]
    fn recipe_path_is_front_end_route() {
        assert_eq!(recipe_path(recipe(12)), "/recipes/12/");
    }
}
