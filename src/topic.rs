use std::fmt;

/// Pattern over `/`-separated topic names.
///
/// `*` matches exactly one segment and `#` matches everything that follows.
/// Empty segments are ignored, so `/a/b` and `a/b` are the same topic path.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TopicFilter {
    pattern: String,
    segments: Vec<String>,
}

impl TopicFilter {
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    pub fn matches(&self, topic: &str) -> bool {
        let mut topic_segments = topic.split('/').filter(|s| !s.is_empty());

        for segment in &self.segments {
            match segment.as_str() {
                "#" => return true,
                "*" => {
                    if topic_segments.next().is_none() {
                        return false;
                    }
                }
                literal => {
                    if topic_segments.next() != Some(literal) {
                        return false;
                    }
                }
            }
        }

        topic_segments.next().is_none()
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
