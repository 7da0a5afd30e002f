use blockmark_syntax::{Token, TokenContent};

use super::range::DecorationRange;
use crate::document::BlockId;

/// Appends a range for every typed token in `tokens`, starting at `offset`,
/// and returns the offset just past the last token.
///
/// A token holding a nested stream yields a range covering the whole stream
/// followed by the ranges of its children. Zero-length tokens yield nothing.
pub fn flatten(
    tokens: &[Token],
    block: BlockId,
    offset: usize,
    out: &mut Vec<DecorationRange>,
) -> usize {
    tokens
        .iter()
        .fold(offset, |at, token| flatten_token(token, block, at, out))
}

fn flatten_token(
    token: &Token,
    block: BlockId,
    offset: usize,
    out: &mut Vec<DecorationRange>,
) -> usize {
    let Token::Typed(typed) = token else {
        return offset + token.text_len();
    };
    let len = typed.content.text_len();
    if len == 0 {
        return offset;
    }
    out.push(DecorationRange::new(block, offset, offset + len, typed.tags()));
    match &typed.content {
        TokenContent::Text(_) => {}
        TokenContent::Token(inner) => {
            flatten_token(inner, block, offset, out);
        }
        TokenContent::Stream(stream) => {
            flatten(stream, block, offset, out);
        }
    }
    offset + len
}
