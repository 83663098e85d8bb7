//! Markdown → plain lines.
//!
//! Flattens the `pulldown_cmark` event stream of a custom section into text
//! lines for the plain-text and PDF writers. Emphasis is dropped, list items
//! keep a marker, links keep their target in parentheses.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

pub(crate) fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Renders Markdown as a list of lines. Blank strings separate blocks.
pub fn to_lines(content: &str) -> Vec<String> {
    let mut w = Writer::default();
    for event in Parser::new_ext(content, options()) {
        w.handle(event);
    }
    while w.lines.last().is_some_and(|l| l.is_empty()) {
        w.lines.pop();
    }
    w.lines
}

#[derive(Default)]
struct Writer {
    lines: Vec<String>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    link_url: Option<String>,
    needs_blank: bool,
}

impl Writer {
    fn push_line(&mut self, line: String) {
        self.lines.push(line);
    }

    fn push_text(&mut self, text: &str) {
        match self.lines.last_mut() {
            Some(line) => line.push_str(text),
            None => self.lines.push(text.to_string()),
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_blank {
            self.push_line(String::new());
            self.needs_blank = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) | Event::Code(t) => self.text(t),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_line(String::new()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line("─".repeat(20));
                self.needs_blank = true;
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }
            _ => {} // raw HTML, footnotes, math
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::Heading { .. } | Tag::BlockQuote(_) | Tag::CodeBlock(_) => {
                // List item paragraphs continue the marker line
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                    self.push_line(String::new());
                }
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                let marker = match self.list_indices.last_mut() {
                    Some(Some(n)) => {
                        let s = format!("{indent}{n}. ");
                        *n += 1;
                        s
                    }
                    _ => format!("{indent}- "),
                };
                self.push_line(marker);
            }
            Tag::Link { dest_url, .. } => self.link_url = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::BlockQuote(_) | TagEnd::CodeBlock => {
                if self.list_indices.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                if self.list_indices.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Link => {
                if let Some(url) = self.link_url.take() {
                    self.push_text(&format!(" ({url})"));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        let mut parts = cow.split('\n');
        if let Some(first) = parts.next() {
            self.push_text(first);
        }
        for rest in parts {
            self.push_line(rest.to_string());
        }
    }
}
