/// Parse a source text into a [`MainChunk`].
///
/// This is the main public entrypoint for parsing.
///
/// ## Errors
/// Returns the first [`ParseError`]; there is no error recovery.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<MainChunk, ParseError> {
    Parser::new(source).parse()
}

/// Parse a standalone type annotation, as written after `:` in source (`(a: number) => string`).
///
/// Used for declarations supplied from outside a chunk, such as the signatures of standard-library globals.
///
/// ## Errors
/// Returns a [`ParseError`] if the text is not exactly one typing.
pub fn parse_typing(source: &str) -> Result<ParsedTyping, ParseError> {
    let mut parser = Parser::new(source);
    let typing = parser.expect_typing()?;
    parser.trim()?;
    if parser.pos < parser.source.len() {
        return parser.fail("Unexpected symbol");
    }
    Ok(typing)
}
