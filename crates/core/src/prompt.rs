use crate::models::Passage;

/// Renders retrieved passages as a citation-annotated context block:
/// each passage under a `[Source: ..., Page: ...]` header, blank line
/// between passages, retrieval order preserved.
pub fn format_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|passage| {
            format!(
                "[Source: {}, Page: {}]\n{}",
                passage.source_id, passage.page_number, passage.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The fixed answer template. Sent as-is even when the context block is
/// empty; the model is expected to say it cannot find an answer then.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the context below to answer the question.\n\
         Cite sources using the [Source: ..., Page: ...] information when relevant.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n"
    )
}

/// Fixed judge template for the relevance filter: one YES/NO call per
/// candidate passage.
pub fn relevance_prompt(question: &str, context: &str) -> String {
    format!(
        "Given the following question and context, return YES if the context is \
         relevant to the question and NO if it isn't.\n\
         \n\
         > Question: {question}\n\
         > Context:\n\
         >>>\n\
         {context}\n\
         >>>\n\
         > Relevant (YES / NO):"
    )
}

/// A reply counts as relevant only when it leads with YES (any casing).
pub fn parse_relevance_verdict(reply: &str) -> bool {
    reply.trim_start().to_ascii_uppercase().starts_with("YES")
}
