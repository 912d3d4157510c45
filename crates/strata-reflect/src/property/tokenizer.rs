//! Property path tokenizer
//!
//! Grammar:
//!
//! ```text
//! segment := name ( '[' index ']' )?
//! path    := segment ( '.' path )?
//! ```
//!
//! A tokenizer only looks at the first segment; the remainder is kept as
//! `children` and tokenized again when navigation descends. Dots inside
//! brackets belong to the index, so map keys may contain dots.

/// First segment of a property path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyTokenizer<'a> {
    name: &'a str,
    indexed_name: &'a str,
    index: Option<&'a str>,
    children: Option<&'a str>,
}

impl<'a> PropertyTokenizer<'a> {
    /// Tokenize the first segment of `path`
    pub fn new(path: &'a str) -> Self {
        let (indexed_name, children) = match find_delimiter(path) {
            Some(dot) => (&path[..dot], Some(&path[dot + 1..])),
            None => (path, None),
        };
        let (name, index) = match indexed_name.find('[') {
            Some(open) if indexed_name.ends_with(']') => (
                &indexed_name[..open],
                Some(&indexed_name[open + 1..indexed_name.len() - 1]),
            ),
            _ => (indexed_name, None),
        };
        Self {
            name,
            indexed_name,
            index,
            children,
        }
    }

    /// Property name without index
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Raw index between the brackets
    pub fn index(&self) -> Option<&'a str> {
        self.index
    }

    /// Name including the index suffix
    pub fn indexed_name(&self) -> &'a str {
        self.indexed_name
    }

    /// Remainder of the path after the first segment
    pub fn children(&self) -> Option<&'a str> {
        self.children
    }

    /// True unless this is the last segment
    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// Tokenizer over the remainder
    pub fn next_segment(&self) -> Option<PropertyTokenizer<'a>> {
        self.children.map(PropertyTokenizer::new)
    }

    /// Iterate over this segment and every following one
    pub fn segments(self) -> Segments<'a> {
        Segments { next: Some(self) }
    }
}

/// Iterator over the segments of a path
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    next: Option<PropertyTokenizer<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = PropertyTokenizer<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next_segment();
        Some(current)
    }
}

/// Byte offset of the first '.' outside brackets
fn find_delimiter(path: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in path.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'.' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_segment_with_children() {
        let prop = PropertyTokenizer::new("list[1].age");
        assert_eq!(prop.name(), "list");
        assert_eq!(prop.index(), Some("1"));
        assert_eq!(prop.indexed_name(), "list[1]");
        assert_eq!(prop.children(), Some("age"));
        assert!(prop.has_next());
    }

    #[test]
    fn test_last_segment() {
        let prop = PropertyTokenizer::new("age");
        assert_eq!(prop.name(), "age");
        assert_eq!(prop.index(), None);
        assert_eq!(prop.children(), None);
        assert!(!prop.has_next());
        assert!(prop.next_segment().is_none());
    }

    #[test]
    fn test_multi_index_remainder() {
        let prop = PropertyTokenizer::new("a.b[2][3]");
        assert_eq!(prop.name(), "a");
        assert_eq!(prop.index(), None);
        assert_eq!(prop.children(), Some("b[2][3]"));

        let child = prop.next_segment().unwrap();
        assert_eq!(child.name(), "b");
        assert_eq!(child.index(), Some("2][3"));
    }

    #[test]
    fn test_dot_inside_brackets() {
        let prop = PropertyTokenizer::new("map[a.b].c");
        assert_eq!(prop.indexed_name(), "map[a.b]");
        assert_eq!(prop.index(), Some("a.b"));
        assert_eq!(prop.children(), Some("c"));
    }

    #[test]
    fn test_bare_index() {
        let prop = PropertyTokenizer::new("[0]");
        assert_eq!(prop.name(), "");
        assert_eq!(prop.index(), Some("0"));
    }

    #[test]
    fn test_unterminated_bracket_is_plain_name() {
        let prop = PropertyTokenizer::new("items[2");
        assert_eq!(prop.name(), "items[2");
        assert_eq!(prop.index(), None);
    }

    #[test]
    fn test_segments_iterator() {
        let names: Vec<_> = PropertyTokenizer::new("orders[0].customer.name")
            .segments()
            .map(|s| s.indexed_name())
            .collect();
        assert_eq!(names, vec!["orders[0]", "customer", "name"]);
    }
}
