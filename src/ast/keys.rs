/// How an object-template key is treated, decided once per key.
///
/// Array versus object scoping (`name[expr]` / `name{expr}`) is part of the
/// key's expression and is reported by the resolver as a [`Shape`].
///
/// [`Shape`]: super::Shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind<'a> {
    /// `@path`: repoints the local scope
    ReservedPath,

    /// `@root`: repoints the root scope
    ReservedRoot,

    /// `!expr`: the nested result is merged into the parent level
    Merge(&'a str),

    /// Any other key; the expression names the destination path
    Plain(&'a str),
}

pub const PATH_KEY: &str = "@path";
pub const ROOT_KEY: &str = "@root";

impl<'a> KeyKind<'a> {
    pub fn classify(key: &'a str) -> Self {
        match key {
            PATH_KEY => KeyKind::ReservedPath,
            ROOT_KEY => KeyKind::ReservedRoot,
            _ => match key.strip_prefix('!') {
                Some(rest) => KeyKind::Merge(rest),
                None => KeyKind::Plain(key),
            },
        }
    }

    /// The expression naming the destination, if the key has one.
    pub fn expression(&self) -> Option<&'a str> {
        match self {
            KeyKind::Merge(expr) | KeyKind::Plain(expr) => Some(expr),
            KeyKind::ReservedPath | KeyKind::ReservedRoot => None,
        }
    }
}

#[test]
fn test_classify_keys() {
    assert_eq!(KeyKind::classify("@path"), KeyKind::ReservedPath);
    assert_eq!(KeyKind::classify("@root"), KeyKind::ReservedRoot);
    assert_eq!(KeyKind::classify("!'colors'"), KeyKind::Merge("'colors'"));
    assert_eq!(KeyKind::classify("colors[variants]"), KeyKind::Plain("colors[variants]"));
    assert_eq!(KeyKind::classify("@other").expression(), Some("@other"));
    assert_eq!(KeyKind::ReservedPath.expression(), None);
}
