use scraper::{Html, Node, Selector};

/// Tags whose subtrees carry no recipe-relevant text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "noscript", "svg", "iframe"];

/// Cheap sniff used to decide whether a fetched body is worth cleaning.
pub fn looks_like_html(body: &str) -> bool {
    let start = body.trim_start().to_lowercase();
    start.starts_with("<!doctype html") || start.starts_with("<html") || body.contains("<body")
}

/// Reduce a page to its visible text so the LLM prompt stays small.
/// Markup, scripts and styles are dropped; whitespace is collapsed.
pub fn clean_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_text(*document.root_element(), &mut parts);
    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text(node: ego_tree::NodeRef<'_, Node>, out: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
        Node::Element(element) => {
            if SKIPPED_TAGS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Pull the page's Open Graph image, the de facto cover photo on
/// recipe sites.
pub fn find_cover_image_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("meta[property='og:image']").expect("Invalid selector");
    document
        .select(&selector)
        .find_map(|element| element.value().attr("content"))
        .map(|content| content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_collapses_whitespace() {
        let html = r#"<html><head><title>x</title><style>p{}</style></head>
            <body><h1>Carbonara</h1><script>var x = 1;</script>
            <p>Boil   the
            pasta.</p></body></html>"#;
        let text = clean_html(html);
        assert_eq!(text, "Carbonara Boil the pasta.");
    }

    #[test]
    fn finds_og_image() {
        let html = r#"<html><head>
            <meta property="og:title" content="Carbonara" />
            <meta property="og:image" content="https://example.com/cover.jpg" />
            </head><body></body></html>"#;
        assert_eq!(
            find_cover_image_url(html),
            Some("https://example.com/cover.jpg".to_string())
        );
    }

    #[test]
    fn missing_og_image_is_none() {
        assert_eq!(find_cover_image_url("<html><body></body></html>"), None);
    }

    #[test]
    fn html_sniffing() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  <html lang=\"en\">"));
        assert!(!looks_like_html("{\"title\": \"not html\"}"));
    }
}
