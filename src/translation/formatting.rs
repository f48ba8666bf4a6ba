/*!
 * Whitespace framing for translated spans.
 *
 * Runs often carry the space that separates them from the next run
 * (`"Hello "` + bold `"World"`). Backends tend to trim their output, which
 * would glue the runs together, so the surrounding whitespace is split off
 * before dispatch and put back afterwards.
 */

/// A span split into leading whitespace, content, and trailing whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitespaceFrame<'a> {
    pub leading: &'a str,
    pub core: &'a str,
    pub trailing: &'a str,
}

impl<'a> WhitespaceFrame<'a> {
    /// Split `text` around its non-whitespace content
    pub fn split(text: &'a str) -> Self {
        let without_leading = text.trim_start();
        let leading = &text[..text.len() - without_leading.len()];
        let core = without_leading.trim_end();
        let trailing = &without_leading[core.len()..];

        Self {
            leading,
            core,
            trailing,
        }
    }

    /// Re-attach the original framing to a translation of `core`
    pub fn wrap(&self, translated: &str) -> String {
        let translated = translated.trim();
        let mut framed =
            String::with_capacity(self.leading.len() + translated.len() + self.trailing.len());
        framed.push_str(self.leading);
        framed.push_str(translated);
        framed.push_str(self.trailing);
        framed
    }
}
