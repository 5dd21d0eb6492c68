use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r#"https?://[^\s<>"']+[^\s<>"'.,;:!?)\]]"#).expect("valid url regex"))
}

/// Markdown to sanitized HTML for assistant replies
pub struct MarkdownRenderer {
    sanitizer: ammonia::Builder<'static>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut sanitizer = ammonia::Builder::default();
        sanitizer
            .add_tag_attributes("code", &["class"])
            .link_rel(Some("noopener noreferrer"))
            .url_schemes(HashSet::from(["http", "https", "mailto"]));

        Self { sanitizer }
    }

    /// Render Markdown (tables, strikethrough, fenced code, bare URLs) and sanitize the result
    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        // Escapes and entities split a text run into several events; URLs must see the whole run
        let events = rewrite_events(TextMergeStream::new(Parser::new_ext(markdown, options)));

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());

        self.sanitizer.clean(&out).to_string()
    }
}

/// Replace code blocks with trimmed `<pre><code>` HTML and autolink bare URLs in text
fn rewrite_events<'a>(parser: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;
    let mut link_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|lang| !lang.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, body)) = code.take() {
                    events.push(Event::Html(CowStr::from(code_block_html(
                        language.as_deref(),
                        &body,
                    ))));
                }
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, body)) = code.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::Start(Tag::Link { .. }) => {
                link_depth += 1;
                events.push(event);
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                events.push(event);
            }
            Event::Text(text) if link_depth == 0 && url_pattern().is_match(&text) => {
                events.extend(autolink(&text));
            }
            other => events.push(other),
        }
    }

    events
}

fn code_block_html(language: Option<&str>, body: &str) -> String {
    let formatted = body
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let class = language
        .map(|lang| format!(" class=\"language-{}\"", escape_html(lang)))
        .unwrap_or_default();

    format!("<pre><code{}>{}</code></pre>\n", class, escape_html(formatted.trim()))
}

fn autolink(text: &str) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    let mut last = 0;

    for found in url_pattern().find_iter(text) {
        if found.start() > last {
            events.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }
        let url = escape_html(found.as_str());
        events.push(Event::Html(CowStr::from(format!("<a href=\"{}\">{}</a>", url, url))));
        last = found.end();
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }

    events
}

/// Escape the five HTML-significant characters
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    // Writing into a String cannot fail
    let _ = pulldown_cmark_escape::escape_html(&mut escaped, input);
    escaped
}
