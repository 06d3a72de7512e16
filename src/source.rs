/// A lookup from a field's hierarchical key to a raw string value.
///
/// Each source derives whatever name it needs from the key (flag name, env
/// name, dotted path). `None` means "not provided here"; the resolver then
/// falls through to the next source.
pub trait Source {
    fn get(&self, key: &[String]) -> Option<String>;

    /// Short label used in diagnostics.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Source for F
where
    F: Fn(&[String]) -> Option<String>,
{
    fn get(&self, key: &[String]) -> Option<String> {
        self(key)
    }
}
