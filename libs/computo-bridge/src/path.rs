use std::fmt;

enum Segment {
    Index(i64),
    Key(String),
}

/// Location of the value being converted, rendered as `script.steps[2].op`.
pub(crate) struct ValuePath {
    root: &'static str,
    segments: Vec<Segment>,
}

impl ValuePath {
    pub(crate) fn new(root: &'static str) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    pub(crate) fn push_index(&mut self, index: i64) {
        self.segments.push(Segment::Index(index));
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        self.segments.push(Segment::Key(key.to_owned()));
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root)?;
        for segment in &self.segments {
            match segment {
                Segment::Index(i) => write!(f, "[{i}]")?,
                Segment::Key(k) if is_identifier(k) => write!(f, ".{k}")?,
                Segment::Key(k) => write!(f, "[{k:?}]")?,
            }
        }
        Ok(())
    }
}
