//! HTML shell for the terminal SPA with per-route SEO tags.

use folio_core::config::SiteProfile;

/// Title, description and keywords for one SPA route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

/// Paths with their own metadata. Anything else renders as `/`.
pub const KNOWN_ROUTES: &[&str] = &[
    "/",
    "/about",
    "/skills",
    "/projects",
    "/experience",
    "/contact",
];

pub fn route_meta(site: &SiteProfile, path: &str) -> RouteMeta {
    let owner = &site.owner;
    let headline = &site.headline;
    let base_keywords =
        format!("{owner}, {headline}, Interactive Resume, Terminal Resume, Portfolio");

    let (title, description, extra_keywords) = match path {
        "/about" => (
            format!("About {owner} - {headline}"),
            format!("Learn about {owner}: background, career journey and what drives the work."),
            "About, Biography, Career Journey",
        ),
        "/skills" => (
            format!("Technical Skills - {owner}"),
            format!("Explore {owner}'s technical expertise, tools and day-to-day practices."),
            "Technical Skills, Languages, Frameworks",
        ),
        "/projects" => (
            format!("Projects & Work - {owner} | Portfolio"),
            format!("Discover the projects {owner} has designed, built and shipped."),
            "Projects, Portfolio, Case Studies",
        ),
        "/experience" => (
            format!("Professional Experience - {owner} | Career Timeline"),
            format!("Explore {owner}'s professional journey and roles over time."),
            "Work Experience, Career, Timeline",
        ),
        "/contact" => (
            format!("Contact {owner} - {headline}"),
            format!("Get in touch with {owner} for opportunities, consulting or collaboration."),
            "Contact, Hire, Remote Work, Collaboration",
        ),
        _ => (
            format!("{owner} - {headline}"),
            format!("{owner}, {headline}. Explore the interactive terminal resume."),
            "",
        ),
    };

    let keywords = if extra_keywords.is_empty() {
        base_keywords
    } else {
        format!("{base_keywords}, {extra_keywords}")
    };

    RouteMeta {
        title,
        description,
        keywords,
    }
}

/// Escape text for use inside HTML attributes and element bodies.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the SPA shell for `path`.
pub fn render_shell(site: &SiteProfile, path: &str) -> String {
    let meta = route_meta(site, path);
    let title = escape_html(&meta.title);
    let description = escape_html(&meta.description);
    let keywords = escape_html(&meta.keywords);
    let owner = escape_html(&site.owner);
    let headline = escape_html(&site.headline);
    let base = escape_html(&site.base_url);
    let canonical = format!("{base}{}", escape_html(path));
    // serde_json gives a correctly quoted JSON string; `</` must not close the script tag.
    let ld_json = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "Person",
        "name": site.owner,
        "jobTitle": site.headline,
        "description": meta.description,
        "url": site.base_url,
    })
    .to_string()
    .replace("</", "<\\/");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <meta name="description" content="{description}" />
  <meta name="keywords" content="{keywords}" />
  <meta name="author" content="{owner}" />
  <meta name="robots" content="index, follow" />
  <link rel="canonical" href="{canonical}" />
  <meta property="og:type" content="website" />
  <meta property="og:title" content="{title}" />
  <meta property="og:description" content="{description}" />
  <meta property="og:url" content="{canonical}" />
  <meta property="og:site_name" content="{owner} - Interactive Resume" />
  <meta name="twitter:card" content="summary_large_image" />
  <meta name="twitter:title" content="{title}" />
  <meta name="twitter:description" content="{description}" />
  <script type="application/ld+json">{ld_json}</script>
  <link rel="icon" type="image/x-icon" href="/favicon.ico" />
  <meta name="theme-color" content="#000000" />
  <meta name="format-detection" content="telephone=no" />
  <meta name="application-name" content="{owner} - {headline}" />
</head>
<body>
  <div id="root"></div>
  <script type="module" src="/assets/index.js"></script>
</body>
</html>
"##
    )
}
