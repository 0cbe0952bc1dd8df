//! Declaration analyzer for doc and return-type coverage
//!
//! Walks one file's token stream and records, per function/method
//! declaration, whether a documentation comment precedes it and whether its
//! signature carries a return-type annotation. A single forward pass with
//! two bounded lookahead sub-scans: one to resolve the declaration name,
//! one to skip the parameter list (by parenthesis depth, never a fixed
//! window) and detect the return type. Closures are recorded but flagged
//! anonymous, and a doc comment pending when a closure resolves is dropped
//! so it can never attach to a later named declaration.

use crate::token::{Token, TokenKind, TokenizationError};
use std::collections::HashSet;
use std::fmt;

/// How much a declaration needs in order to count as covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Report nothing; analysis short-circuits to an empty result.
    None,
    /// A documentation comment alone counts as covered.
    Basic,
    /// Both a documentation comment and a return-type annotation are required.
    #[default]
    Strict,
}

impl Strictness {
    /// Parse a level from its configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Strictness::None),
            "basic" => Some(Strictness::Basic),
            "strict" => Some(Strictness::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::None => "none",
            Strictness::Basic => "basic",
            Strictness::Strict => "strict",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function or method declaration found in a token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared name; `None` for closures/anonymous functions.
    pub name: Option<String>,
    /// An eligible doc comment precedes the declaration.
    pub has_doc: bool,
    /// The signature carries a return-type annotation. Only computed at
    /// [`Strictness::Strict`]; stays `false` otherwise.
    pub has_return_type: bool,
    /// Closure/lambda with no bound name.
    pub is_anonymous: bool,
    /// 1-indexed source line of the `function` keyword.
    pub line: Option<usize>,
}

impl Declaration {
    /// Whether this declaration counts as covered at the given level.
    /// Anonymous declarations never count toward coverage.
    pub fn is_covered(&self, level: Strictness) -> bool {
        if self.is_anonymous {
            return false;
        }
        match level {
            Strictness::None => false,
            Strictness::Basic => self.has_doc,
            Strictness::Strict => self.has_doc && self.has_return_type,
        }
    }
}

/// Rolling state threaded through the scan loop.
#[derive(Default)]
struct ScanState {
    /// A doc comment has been seen and is waiting to attach to the next
    /// named declaration. Invalidated by any declaration-context
    /// resolution, anonymous included; ordinary tokens in between are
    /// tolerated (blank lines, attributes, modifiers).
    pending_doc: bool,
    current_line: usize,
}

/// Analyze one file's token stream.
///
/// Pure function of its inputs: no I/O, no shared state, deterministic.
/// Records come out in source order, at most one per `function` keyword.
/// Names in `excluded` are resolved and then silently dropped.
pub fn analyze(
    tokens: &[Token],
    level: Strictness,
    excluded: &HashSet<String>,
) -> Result<Vec<Declaration>, TokenizationError> {
    if level == Strictness::None {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    let mut state = ScanState {
        pending_doc: false,
        current_line: 1,
    };

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if let Some(line) = token.line {
            state.current_line = line;
        }

        match token.kind {
            TokenKind::DocComment => {
                state.pending_doc = true;
                i += 1;
            }
            TokenKind::Function => {
                i = resolve_declaration(tokens, i, level, excluded, &mut state, &mut records)?;
            }
            _ => i += 1,
        }
    }

    Ok(records)
}

/// Resolve the declaration context opened by the `function` keyword at
/// `at`. Returns the index to resume the outer scan from, always past the
/// keyword and past the parameter list when one was found. Bodies are left
/// for the outer loop, so declarations nested in bodies get their own
/// records.
fn resolve_declaration(
    tokens: &[Token],
    at: usize,
    level: Strictness,
    excluded: &HashSet<String>,
    state: &mut ScanState,
    records: &mut Vec<Declaration>,
) -> Result<usize, TokenizationError> {
    let keyword_line = tokens[at].line;

    // First significant token after the keyword decides named vs anonymous.
    let mut j = at + 1;
    while j < tokens.len() && tokens[j].is_trivia() {
        j += 1;
    }

    let name: Option<String> = match tokens.get(j) {
        Some(t) if t.kind == TokenKind::Identifier => Some(t.text.clone()),
        _ => None,
    };
    let is_anonymous = name.is_none();

    if is_anonymous {
        // A doc comment sitting before a closure belongs to the closure;
        // drop it now so it cannot attach to a later named declaration.
        state.pending_doc = false;
    }

    // Locate the opening parenthesis of the parameter list. For named
    // declarations it must be the next significant token; for anonymous
    // ones a by-ref `&` marker may sit in front of it.
    let mut k = if is_anonymous { j } else { j + 1 };
    while k < tokens.len()
        && (tokens[k].is_trivia() || (is_anonymous && tokens[k].kind == TokenKind::Punct('&')))
    {
        k += 1;
    }

    let line = keyword_line.or_else(|| tokens.get(j).and_then(|t| t.line));
    let has_doc = !is_anonymous && state.pending_doc;

    let mut record = Declaration {
        name,
        has_doc,
        has_return_type: false,
        is_anonymous,
        line,
    };

    let resume = if tokens.get(k).map(|t| t.kind) == Some(TokenKind::Punct('(')) {
        // Skip the parameter list by depth counting. A fixed-size window
        // would be fooled by closures or grouped expressions in default
        // values; depth counting is not.
        let mut depth = 0usize;
        let mut p = k;
        let close = loop {
            let Some(token) = tokens.get(p) else {
                return Err(TokenizationError::UnbalancedParens {
                    name: record.name.clone().unwrap_or_else(|| "{closure}".into()),
                    line: line.unwrap_or(state.current_line),
                });
            };
            match token.kind {
                TokenKind::Punct('(') => depth += 1,
                TokenKind::Punct(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break p;
                    }
                }
                _ => {}
            }
            p += 1;
        };

        if level == Strictness::Strict {
            record.has_return_type = return_type_follows(tokens, close + 1);
        }

        close + 1
    } else {
        // No parameter list before end-of-stream or the next construct:
        // still emit a best-effort record rather than fail.
        k.max(at + 1)
    };

    let keep = match &record.name {
        Some(name) => !excluded.contains(name),
        None => true,
    };
    if keep {
        records.push(record);
    }

    // The declaration consumed any pending doc, attached or not.
    state.pending_doc = false;

    Ok(resume)
}

/// After the parameter list's closing parenthesis: `:` followed by a
/// type-like token (identifier, `?` nullable marker, or `\` namespace
/// separator) is a return-type annotation. A `;`, `{`, or anything else
/// is not; abstract signatures ending in `;` simply have no annotation.
fn return_type_follows(tokens: &[Token], from: usize) -> bool {
    let mut i = from;
    while i < tokens.len() && tokens[i].is_trivia() {
        i += 1;
    }
    if tokens.get(i).map(|t| t.kind) != Some(TokenKind::Punct(':')) {
        return false;
    }
    i += 1;
    while i < tokens.len() && tokens[i].is_trivia() {
        i += 1;
    }
    matches!(
        tokens.get(i).map(|t| t.kind),
        Some(TokenKind::Identifier) | Some(TokenKind::Punct('?')) | Some(TokenKind::Punct('\\'))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn run(source: &str, level: Strictness) -> Vec<Declaration> {
        analyze(&tokenize(source).unwrap(), level, &HashSet::new()).unwrap()
    }

    #[test]
    fn empty_stream_yields_no_records() {
        assert_eq!(
            analyze(&[], Strictness::Strict, &HashSet::new()).unwrap(),
            Vec::new()
        );
    }

    #[test]
    fn stream_without_declarations_yields_no_records() {
        let records = run("<?php $x = 1; echo $x;", Strictness::Strict);
        assert!(records.is_empty());
    }

    #[test]
    fn level_none_short_circuits() {
        let records = run("<?php /** D */ function foo(): int {}", Strictness::None);
        assert!(records.is_empty());
    }

    #[test]
    fn named_declaration_with_doc() {
        let records = run("<?php\n/** Does a thing. */\nfunction foo() {}", Strictness::Basic);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("foo"));
        assert!(records[0].has_doc);
        assert!(!records[0].is_anonymous);
        assert_eq!(records[0].line, Some(3));
    }

    #[test]
    fn doc_does_not_leak_past_a_closure() {
        let source = "<?php\n/** doc */\n$x = function () {};\nfunction foo() {}\n";
        let records = run(source, Strictness::Basic);
        assert_eq!(records.len(), 2);
        assert!(records[0].is_anonymous);
        assert!(!records[0].has_doc);
        assert_eq!(records[1].name.as_deref(), Some("foo"));
        assert!(!records[1].has_doc, "closure must not hand the doc onward");
    }

    #[test]
    fn doc_attaches_through_modifiers_and_attributes() {
        let source = "<?php\n/** D */\n#[Deprecated]\npublic static function foo() {}\n";
        let records = run(source, Strictness::Basic);
        assert_eq!(records.len(), 1);
        assert!(records[0].has_doc);
    }

    #[test]
    fn doc_attaches_to_at_most_one_declaration() {
        let source = "<?php /** a */ function a() {} function b() {}";
        let records = run(source, Strictness::Basic);
        assert_eq!(records.len(), 2);
        assert!(records[0].has_doc);
        assert!(!records[1].has_doc);
    }

    #[test]
    fn plain_comment_is_not_documentation() {
        let records = run("<?php /* not a doc */ function foo() {}", Strictness::Basic);
        assert!(!records[0].has_doc);
    }

    #[test]
    fn return_type_detected_at_strict() {
        let records = run("<?php function foo(): string {}", Strictness::Strict);
        assert!(records[0].has_return_type);

        let records = run("<?php function foo() {}", Strictness::Strict);
        assert!(!records[0].has_return_type);
    }

    #[test]
    fn nullable_and_namespaced_return_types_count() {
        let records = run("<?php function a(): ?int {}", Strictness::Strict);
        assert!(records[0].has_return_type);

        let records = run("<?php function b(): \\App\\Models\\User {}", Strictness::Strict);
        assert!(records[0].has_return_type);
    }

    #[test]
    fn return_type_not_computed_below_strict() {
        let records = run("<?php function foo(): string {}", Strictness::Basic);
        assert!(!records[0].has_return_type);
    }

    #[test]
    fn abstract_signature_still_gets_a_record() {
        let records = run(
            "<?php abstract protected function bar(int $x): int;",
            Strictness::Strict,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("bar"));
        assert!(records[0].has_return_type);
    }

    #[test]
    fn closure_in_default_value_does_not_split_the_parameter_list() {
        let source =
            "<?php function foo(callable $cb = function (): int { return 1; }): string {}";
        let records = run(source, Strictness::Strict);
        assert_eq!(records.len(), 1, "inner closure is part of the parameter list");
        assert_eq!(records[0].name.as_deref(), Some("foo"));
        assert!(records[0].has_return_type, "must find foo's own `: string`");
    }

    #[test]
    fn nested_body_declarations_get_their_own_records() {
        let source = "<?php function outer() { function inner(): int {} }";
        let records = run(source, Strictness::Strict);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("outer"));
        assert_eq!(records[1].name.as_deref(), Some("inner"));
        assert!(records[1].has_return_type);
    }

    #[test]
    fn excluded_names_are_dropped() {
        let source = "<?php /** C */ function __construct() {} function foo() {}";
        let excluded: HashSet<String> = ["__construct".to_string()].into();
        let records = analyze(&tokenize(source).unwrap(), Strictness::Basic, &excluded).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("foo"));
        assert!(
            !records[0].has_doc,
            "the excluded declaration still consumes the pending doc"
        );
    }

    #[test]
    fn records_keep_source_order() {
        let source = "<?php function a() {}\nfunction b() {}\nfunction c() {}";
        let records = run(source, Strictness::Basic);
        let names: Vec<_> = records.iter().map(|r| r.name.as_deref().unwrap()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        let lines: Vec<_> = records.iter().map(|r| r.line.unwrap()).collect();
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn analysis_is_deterministic() {
        let tokens = tokenize("<?php /** d */ function a(): int {} $f = function () {};").unwrap();
        let first = analyze(&tokens, Strictness::Strict, &HashSet::new()).unwrap();
        let second = analyze(&tokens, Strictness::Strict, &HashSet::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unbalanced_parameter_list_is_an_error() {
        let tokens = tokenize("<?php function foo(int $x {}").unwrap();
        let result = analyze(&tokens, Strictness::Strict, &HashSet::new());
        assert_eq!(
            result,
            Err(TokenizationError::UnbalancedParens {
                name: "foo".into(),
                line: 1,
            })
        );
    }

    #[test]
    fn truncated_declaration_degrades_to_a_best_effort_record() {
        let records = run("<?php function foo", Strictness::Strict);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("foo"));
        assert!(!records[0].has_return_type);

        let records = run("<?php function", Strictness::Strict);
        assert_eq!(records.len(), 1);
        assert!(records[0].is_anonymous);
    }

    #[test]
    fn tolerates_tokens_without_line_info() {
        let tokens = vec![
            Token {
                kind: TokenKind::DocComment,
                text: "/** D */".into(),
                line: None,
            },
            Token {
                kind: TokenKind::Function,
                text: "function".into(),
                line: None,
            },
            Token {
                kind: TokenKind::Identifier,
                text: "foo".into(),
                line: None,
            },
            Token {
                kind: TokenKind::Punct('('),
                text: "(".into(),
                line: None,
            },
            Token {
                kind: TokenKind::Punct(')'),
                text: ")".into(),
                line: None,
            },
        ];
        let records = analyze(&tokens, Strictness::Basic, &HashSet::new()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].has_doc);
        assert_eq!(records[0].line, None);
    }

    #[test]
    fn strictness_round_trips_through_strings() {
        for level in [Strictness::None, Strictness::Basic, Strictness::Strict] {
            assert_eq!(Strictness::parse(level.as_str()), Some(level));
        }
        assert_eq!(Strictness::parse("paranoid"), None);
    }
}
