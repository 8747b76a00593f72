#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyntaxKind {
    HASH,
    IDENT,
    NUMBER,
    EQ,
    SEMI,

    VAL_KW,
    IF_KW,
    END_KW,

    UNKNOWN,
    EOF,

    MODULE,
    BINDING,
    LITERAL,
    ERROR,

    DIRECTIVE,
    DOC_COMMENT,
    SKIPPED_TOKENS,
}
