//! Markdown helpers: front matter, heading extraction and HTML export

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Markdown extensions enabled for lessons
fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Split YAML front matter from the body, if present
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    if !content.starts_with("---") {
        return (None, content);
    }

    if let Some(end) = content[3..].find("\n---") {
        let front = &content[3..3 + end];
        let after = 3 + end + 4;
        let body = content.get(after..).unwrap_or_default();
        return (Some(front.trim()), body.trim_start());
    }

    (None, content)
}

/// `title:` value from front matter
pub fn front_matter_title(front: &str) -> Option<String> {
    front.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "title" {
            return None;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Text of the first level-1 heading
pub fn first_heading(markdown: &str) -> Option<String> {
    let mut in_heading = false;
    let mut text = String::new();

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_heading = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let title = text.trim();
                if !title.is_empty() {
                    return Some(title.to_string());
                }
                in_heading = false;
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if in_heading => text.push_str(&t),
            _ => {}
        }
    }

    None
}

/// Render lesson markdown to an HTML fragment
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render lesson markdown to a standalone HTML page
pub fn to_html_page(title: &str, markdown: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>body {{ max-width: 48em; margin: 2em auto; font-family: sans-serif; line-height: 1.5; }} \
         pre {{ background: #f4f4f4; padding: 1em; overflow-x: auto; }}</style>\n\
         </head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        to_html(markdown)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_front_matter() {
        let content = "---\ntitle: \"Stateful Widgets\"\ntags: [flutter]\n---\n\n# Body\n";
        let (front, body) = split_front_matter(content);
        assert_eq!(front_matter_title(front.unwrap()), Some("Stateful Widgets".to_string()));
        assert_eq!(body, "# Body\n");

        let (front, body) = split_front_matter("# Plain\n");
        assert!(front.is_none());
        assert_eq!(body, "# Plain\n");
    }

    #[test]
    fn test_first_heading() {
        let md = "Intro text\n\n## Sub\n\n# Hot `Reload`\n\n# Second";
        assert_eq!(first_heading(md), Some("Hot Reload".to_string()));
        assert_eq!(first_heading("no headings"), None);
    }

    #[test]
    fn test_html_page() {
        let page = to_html_page("A <b> lesson", "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(page.contains("<title>A &lt;b&gt; lesson</title>"));
        assert!(page.contains("<h1>Title</h1>"));
        assert!(page.contains("<table>"));
    }
}
