//! Assembly of retrieved documents into a bounded prompt context.

/// Default context budget in characters.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 15_000;

/// Separator placed between documents.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Join `documents` in the given order and keep at most `max_chars` characters.
///
/// Truncation is positional: the tail is dropped even if that cuts a document
/// in half. Characters are Unicode scalar values, so multi-byte Hangul is
/// never split.
pub fn assemble_context<S: AsRef<str>>(documents: &[S], max_chars: usize) -> String {
    let mut joined =
        documents.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(DOCUMENT_SEPARATOR);
    if let Some((cut, _)) = joined.char_indices().nth(max_chars) {
        joined.truncate(cut);
    }
    joined
}
