//! Parameter collection and name inference (spec §4.F steps 2 and 4).
//!
//! Three source dialects feed one model: PostgreSQL `$N`, standard
//! positional `?`/`?N`, and named `:name`, plus the `sqlc.arg`/`sqlc.narg`/
//! `sqlc.slice` macros. A numbered `?N` or bare `?` sequence inside
//! `IN (...)` collapses into a single variadic parameter.

use crate::token::{Keyword, Token, TokenKind};

use super::position::PositionIndex;
use super::Verb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    Positional,
    Named,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub style: ParamStyle,
    pub order: u32,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub is_variadic: bool,
    pub variadic_count: u32,
}

#[derive(Debug, Clone)]
struct RawParam {
    style: ParamStyle,
    order: Option<u32>,
    name: Option<String>,
    line: usize,
    column: usize,
    start: usize,
    end: usize,
    is_variadic: bool,
    variadic_count: u32,
    anchor_token_index: usize,
}

const ARITHMETIC_OPERATORS: &[&str] = &["+", "-", "*", "/", "%"];
const BACKWARD_WALK_STOP_KEYWORDS: &[Keyword] = &[
    Keyword::Where,
    Keyword::And,
    Keyword::Or,
    Keyword::Values,
    Keyword::Having,
    Keyword::Order,
    Keyword::Group,
    Keyword::By,
    Keyword::Limit,
    Keyword::Offset,
    Keyword::Select,
    Keyword::From,
    Keyword::Insert,
    Keyword::Update,
    Keyword::Delete,
];

pub fn collect_params(tokens: &[Token], pos: &PositionIndex, verb: Verb) -> Vec<Param> {
    let mut raw = collect_raw(tokens, pos);
    dedup_raw(&mut raw);
    assign_positional_orders(&mut raw);
    infer_names(tokens, verb, &mut raw);
    finalize(raw)
}

fn collect_raw(tokens: &[Token], pos: &PositionIndex) -> Vec<RawParam> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.is_eof() {
            break;
        }

        if is_sqlc_macro_start(tokens, i) {
            let macro_kind = tokens[i + 2].text.to_ascii_lowercase();
            let arg_name = strip_string_literal(&tokens[i + 4].text);
            out.push(RawParam {
                style: ParamStyle::Named,
                order: None,
                name: Some(arg_name),
                line: tok.line,
                column: tok.column,
                start: pos.offset_of(tok),
                end: pos.end_offset_of(&tokens[i + 5]),
                is_variadic: macro_kind == "slice",
                variadic_count: 0,
                anchor_token_index: i,
            });
            i += 6;
            continue;
        }

        if tok.is_keyword(Keyword::In)
            && tokens.get(i + 1).is_some_and(|t| t.is_symbol("("))
            && let Some((param, consumed)) = try_collapse_variadic_in(tokens, i, pos)
        {
            out.push(param);
            i += consumed;
            continue;
        }

        match tok.kind {
            TokenKind::Param => {
                let order: u32 = tok.text[1..].parse().unwrap_or(0);
                out.push(RawParam {
                    style: ParamStyle::Positional,
                    order: Some(order),
                    name: None,
                    line: tok.line,
                    column: tok.column,
                    start: pos.offset_of(tok),
                    end: pos.end_offset_of(tok),
                    is_variadic: false,
                    variadic_count: 0,
                    anchor_token_index: i,
                });
                i += 1;
            }
            TokenKind::Symbol if tok.text == "?" => {
                if let Some(num_tok) = tokens.get(i + 1)
                    && num_tok.kind == TokenKind::Number
                    && num_tok.line == tok.line
                    && num_tok.column == tok.column + 1
                    && num_tok.text.chars().all(|c| c.is_ascii_digit())
                {
                    let order: u32 = num_tok.text.parse().unwrap_or(0);
                    out.push(RawParam {
                        style: ParamStyle::Positional,
                        order: Some(order),
                        name: None,
                        line: tok.line,
                        column: tok.column,
                        start: pos.offset_of(tok),
                        end: pos.end_offset_of(num_tok),
                        is_variadic: false,
                        variadic_count: 0,
                        anchor_token_index: i,
                    });
                    i += 2;
                    continue;
                }
                out.push(RawParam {
                    style: ParamStyle::Positional,
                    order: None,
                    name: None,
                    line: tok.line,
                    column: tok.column,
                    start: pos.offset_of(tok),
                    end: pos.end_offset_of(tok),
                    is_variadic: false,
                    variadic_count: 0,
                    anchor_token_index: i,
                });
                i += 1;
            }
            TokenKind::Symbol if tok.text == ":" => {
                if let Some(ident_tok) = tokens.get(i + 1)
                    && ident_tok.kind == TokenKind::Identifier
                {
                    out.push(RawParam {
                        style: ParamStyle::Named,
                        order: None,
                        name: Some(ident_tok.normalized_identifier()),
                        line: tok.line,
                        column: tok.column,
                        start: pos.offset_of(tok),
                        end: pos.end_offset_of(ident_tok),
                        is_variadic: false,
                        variadic_count: 0,
                        anchor_token_index: i,
                    });
                    i += 2;
                    continue;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

fn is_sqlc_macro_start(tokens: &[Token], i: usize) -> bool {
    let Some(a) = tokens.get(i) else { return false };
    let Some(dot) = tokens.get(i + 1) else { return false };
    let Some(method) = tokens.get(i + 2) else { return false };
    let Some(open) = tokens.get(i + 3) else { return false };
    let Some(arg) = tokens.get(i + 4) else { return false };
    let Some(close) = tokens.get(i + 5) else { return false };
    a.kind == TokenKind::Identifier
        && a.text.eq_ignore_ascii_case("sqlc")
        && dot.is_symbol(".")
        && method.kind == TokenKind::Identifier
        && matches!(method.text.to_ascii_lowercase().as_str(), "arg" | "narg" | "slice")
        && open.is_symbol("(")
        && arg.kind == TokenKind::String
        && close.is_symbol(")")
}

fn strip_string_literal(text: &str) -> String {
    text.trim_matches('\'').replace("''", "'")
}

enum ElementShape {
    Bare,
    Numbered(u32),
}

fn try_collapse_variadic_in(
    tokens: &[Token],
    in_idx: usize,
    pos: &PositionIndex,
) -> Option<(RawParam, usize)> {
    let open_idx = in_idx + 1;
    let mut idx = open_idx + 1;
    let mut depth = 1i32;
    let mut elements: Vec<(usize, usize)> = Vec::new();
    let mut elem_start = idx;
    loop {
        let tok = tokens.get(idx)?;
        if tok.is_eof() {
            return None;
        }
        if tok.is_symbol("(") {
            depth += 1;
        } else if tok.is_symbol(")") {
            depth -= 1;
            if depth == 0 {
                if idx > elem_start {
                    elements.push((elem_start, idx - 1));
                }
                break;
            }
        } else if depth == 1 && tok.is_symbol(",") {
            elements.push((elem_start, idx - 1));
            elem_start = idx + 1;
        }
        idx += 1;
    }
    let close_idx = idx;
    if elements.len() < 2 {
        return None;
    }

    let mut shapes = Vec::with_capacity(elements.len());
    for &(s, e) in &elements {
        if s == e && tokens[s].is_symbol("?") {
            shapes.push(ElementShape::Bare);
        } else if e == s + 1
            && tokens[s].is_symbol("?")
            && tokens[e].kind == TokenKind::Number
            && tokens[e].line == tokens[s].line
            && tokens[e].column == tokens[s].column + 1
        {
            shapes.push(ElementShape::Numbered(tokens[e].text.parse().ok()?));
        } else {
            return None;
        }
    }

    let all_bare = shapes.iter().all(|s| matches!(s, ElementShape::Bare));
    let numbered: Vec<u32> = shapes
        .iter()
        .filter_map(|s| match s {
            ElementShape::Numbered(n) => Some(*n),
            ElementShape::Bare => None,
        })
        .collect();
    let all_numbered_contig = numbered.len() == shapes.len()
        && numbered[0] >= 1
        && numbered.windows(2).all(|w| w[1] == w[0] + 1);

    if !all_bare && !all_numbered_contig {
        return None;
    }

    let first = &tokens[elements[0].0];
    let last = &tokens[elements.last().unwrap().1];
    let order = if all_numbered_contig { Some(numbered[0]) } else { None };

    let param = RawParam {
        style: ParamStyle::Positional,
        order,
        name: None,
        line: first.line,
        column: first.column,
        start: pos.offset_of(first),
        end: pos.end_offset_of(last),
        is_variadic: true,
        variadic_count: elements.len() as u32,
        anchor_token_index: in_idx,
    };
    Some((param, close_idx - in_idx + 1))
}

/// Merges repeated occurrences of the same source parameter (`$1` reused
/// twice in one query, `:id` bound more than once) into a single logical
/// `Param`, keeping the first occurrence's span. Bare, not-yet-numbered
/// positionals (`?` without an explicit index) are never merged here —
/// each occurrence is a distinct parameter until orders are assigned.
fn dedup_raw(raw: &mut Vec<RawParam>) {
    let mut seen: ahash::AHashMap<(u8, String), ()> = ahash::AHashMap::new();
    raw.retain(|p| {
        if p.is_variadic {
            return true;
        }
        let key = match p.style {
            ParamStyle::Positional => match p.order {
                Some(o) => (0u8, o.to_string()),
                None => return true,
            },
            ParamStyle::Named => match &p.name {
                Some(n) => (1u8, n.clone()),
                None => return true,
            },
        };
        if seen.contains_key(&key) {
            false
        } else {
            seen.insert(key, ());
            true
        }
    });
}

fn assign_positional_orders(raw: &mut [RawParam]) {
    let mut used: std::collections::BTreeSet<u32> = raw
        .iter()
        .filter_map(|p| if p.style == ParamStyle::Positional { p.order } else { None })
        .collect();
    let mut next = 1u32;
    for p in raw.iter_mut() {
        if p.style == ParamStyle::Positional && p.order.is_none() {
            while used.contains(&next) {
                next += 1;
            }
            p.order = Some(next);
            used.insert(next);
            next += 1;
        }
    }
}

fn infer_names(tokens: &[Token], verb: Verb, raw: &mut [RawParam]) {
    if verb == Verb::Insert {
        apply_insert_values_names(tokens, raw);
    }
    if verb == Verb::Update {
        apply_update_set_names(tokens, raw);
    }
    apply_limit_offset_names(tokens, raw);
    for p in raw.iter_mut() {
        if p.name.is_none() {
            p.name = backward_walk_name(tokens, p.anchor_token_index);
        }
    }
}

fn apply_limit_offset_names(tokens: &[Token], raw: &mut [RawParam]) {
    for (idx, tok) in tokens.iter().enumerate() {
        let label = if tok.is_keyword(Keyword::Limit) {
            "limit"
        } else if tok.is_keyword(Keyword::Offset) {
            "offset"
        } else {
            continue;
        };
        if let Some(p) = raw
            .iter_mut()
            .find(|p| p.name.is_none() && p.anchor_token_index == idx + 1)
        {
            p.name = Some(label.to_string());
        }
    }
}

fn apply_insert_values_names(tokens: &[Token], raw: &mut [RawParam]) {
    let Some((cols, slots)) = locate_insert_values_slots(tokens) else {
        return;
    };
    for (slot_idx, (s, e)) in slots.iter().enumerate() {
        let Some(col) = cols.get(slot_idx) else { continue };
        for p in raw.iter_mut() {
            if p.name.is_none() && p.anchor_token_index >= *s && p.anchor_token_index <= *e {
                p.name = Some(col.clone());
            }
        }
    }
}

fn locate_insert_values_slots(tokens: &[Token]) -> Option<(Vec<String>, Vec<(usize, usize)>)> {
    let insert_idx = tokens.iter().position(|t| t.is_keyword(Keyword::Insert))?;
    let mut i = insert_idx + 1;
    if !tokens.get(i)?.is_keyword(Keyword::Into) {
        return None;
    }
    i += 1; // INTO
    i += 1; // table name
    if !tokens.get(i)?.is_symbol("(") {
        return None;
    }
    i += 1;
    let mut cols = Vec::new();
    loop {
        let tok = tokens.get(i)?;
        if tok.is_symbol(")") {
            i += 1;
            break;
        }
        if tok.kind == TokenKind::Identifier {
            cols.push(tok.normalized_identifier());
        }
        i += 1;
        if tokens.get(i).is_some_and(|t| t.is_symbol(",")) {
            i += 1;
        }
    }
    while i < tokens.len() && !tokens[i].is_keyword(Keyword::Values) {
        i += 1;
    }
    if i >= tokens.len() {
        return None;
    }
    i += 1;
    if !tokens.get(i)?.is_symbol("(") {
        return None;
    }
    i += 1;
    let mut slots = Vec::new();
    let mut slot_start = i;
    let mut depth = 1i32;
    loop {
        let tok = tokens.get(i)?;
        if tok.is_symbol("(") {
            depth += 1;
        } else if tok.is_symbol(")") {
            depth -= 1;
            if depth == 0 {
                if i > slot_start {
                    slots.push((slot_start, i - 1));
                }
                break;
            }
        } else if depth == 1 && tok.is_symbol(",") {
            slots.push((slot_start, i - 1));
            slot_start = i + 1;
        }
        i += 1;
    }
    Some((cols, slots))
}

fn apply_update_set_names(tokens: &[Token], raw: &mut [RawParam]) {
    let Some(set_idx) = tokens.iter().position(|t| t.is_keyword(Keyword::Set)) else {
        return;
    };
    let mut i = set_idx + 1;
    let mut assignments = Vec::new();
    let mut start = i;
    let mut depth = 0i32;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.is_eof() || (depth == 0 && (tok.is_keyword(Keyword::Where) || tok.is_symbol(";"))) {
            break;
        }
        if tok.is_symbol("(") {
            depth += 1;
        } else if tok.is_symbol(")") {
            depth -= 1;
        } else if depth == 0 && tok.is_symbol(",") {
            assignments.push((start, i - 1));
            start = i + 1;
        }
        i += 1;
    }
    if i > start {
        assignments.push((start, i - 1));
    }

    for (s, e) in assignments {
        if e < s + 2 || tokens[s].kind != TokenKind::Identifier || !tokens[s + 1].is_symbol("=") {
            continue;
        }
        let col_name = tokens[s].normalized_identifier();
        for p in raw.iter_mut() {
            if p.name.is_none() && p.anchor_token_index > s && p.anchor_token_index <= e {
                p.name = Some(col_name.clone());
            }
        }
    }
}

/// Walks backward from a parameter's token, skipping over tokens that
/// merely connect an identifier to its comparison (operators, `(`, `,`),
/// stopping cold at clause boundaries and arithmetic operators.
fn backward_walk_name(tokens: &[Token], anchor_idx: usize) -> Option<String> {
    let mut i = anchor_idx;
    while i > 0 {
        i -= 1;
        let tok = &tokens[i];
        if let Some(kw) = tok.as_keyword()
            && BACKWARD_WALK_STOP_KEYWORDS.contains(&kw)
        {
            return None;
        }
        if tok.kind == TokenKind::Symbol && ARITHMETIC_OPERATORS.contains(&tok.text.as_str()) {
            return None;
        }
        if tok.kind == TokenKind::Identifier {
            return Some(tok.normalized_identifier());
        }
    }
    None
}

/// Maps a `snake_case`, `kebab-case`, or already-`camelCase` source name to
/// `camelCase`. Idempotent: re-applying to its own output is a no-op,
/// since a name with no separators only has its first character folded.
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut first_segment = true;
    for part in s.split(|c: char| c == '_' || c == '-' || c.is_whitespace()) {
        if part.is_empty() {
            continue;
        }
        let mut chars = part.chars();
        let Some(c0) = chars.next() else { continue };
        if first_segment {
            result.push(c0.to_ascii_lowercase());
            first_segment = false;
        } else {
            result.push(c0.to_ascii_uppercase());
        }
        result.push_str(chars.as_str());
    }
    if result.is_empty() { s.to_string() } else { result }
}

fn finalize(raw: Vec<RawParam>) -> Vec<Param> {
    raw.into_iter()
        .map(|p| {
            let order = p.order.unwrap_or(0);
            let raw_name = p.name.unwrap_or_else(|| format!("arg{order}"));
            Param {
                name: to_camel_case(&raw_name),
                style: p.style,
                order,
                line: p.line,
                column: p.column,
                start: p.start,
                end: p.end,
                is_variadic: p.is_variadic,
                variadic_count: p.variadic_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::path::Path;

    fn run(sql: &str, verb: Verb) -> Vec<Param> {
        let tokens = tokenize(Path::new("q.sql"), sql.as_bytes(), true).unwrap();
        let pos = PositionIndex::new(sql);
        collect_params(&tokens, &pos, verb)
    }

    #[test]
    fn camel_case_is_idempotent() {
        assert_eq!(to_camel_case("user_id"), "userId");
        assert_eq!(to_camel_case("userId"), "userId");
        assert_eq!(to_camel_case("id"), "id");
    }

    #[test]
    fn postgres_style_dollar_params_keep_explicit_order() {
        let params = run("SELECT * FROM users WHERE id = $1 AND active = $2", Verb::Select);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].order, 1);
        assert_eq!(params[1].order, 2);
    }

    #[test]
    fn repeated_dollar_param_is_one_logical_parameter() {
        let params = run("SELECT * FROM users WHERE id = $1 OR parent_id = $1", Verb::Select);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn bare_question_marks_get_sequential_order() {
        let params = run("SELECT * FROM users WHERE id = ? AND active = ?", Verb::Select);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].order, 1);
        assert_eq!(params[1].order, 2);
    }

    #[test]
    fn named_param_colon_style() {
        let params = run("SELECT * FROM users WHERE id = :id", Verb::Select);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "id");
        assert!(matches!(params[0].style, ParamStyle::Named));
    }

    #[test]
    fn sqlc_arg_macro_is_a_named_param() {
        let params = run("SELECT * FROM users WHERE id = sqlc.arg('user_id')", Verb::Select);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "userId");
    }

    #[test]
    fn sqlc_slice_macro_is_variadic() {
        let params = run("SELECT * FROM users WHERE id = ANY(sqlc.slice('ids'))", Verb::Select);
        assert_eq!(params.len(), 1);
        assert!(params[0].is_variadic);
    }

    #[test]
    fn in_list_of_bare_question_marks_collapses_to_one_variadic_param() {
        let params = run("SELECT * FROM users WHERE id IN (?, ?, ?)", Verb::Select);
        assert_eq!(params.len(), 1);
        assert!(params[0].is_variadic);
        assert_eq!(params[0].variadic_count, 3);
    }

    #[test]
    fn in_list_of_non_placeholder_values_is_not_collapsed() {
        let params = run("SELECT * FROM users WHERE status IN ('a', 'b', ?)", Verb::Select);
        assert_eq!(params.len(), 1);
        assert!(!params[0].is_variadic);
    }

    #[test]
    fn insert_with_explicit_column_list_names_params_by_position() {
        let params = run("INSERT INTO users (id, name) VALUES ($1, $2)", Verb::Insert);
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "id");
        assert_eq!(params[1].name, "name");
    }

    #[test]
    fn update_set_names_params_from_assigned_column() {
        let params = run("UPDATE users SET display_name = $1 WHERE id = $2", Verb::Update);
        assert_eq!(params[0].name, "displayName");
        assert_eq!(params[1].name, "id");
    }

    #[test]
    fn limit_and_offset_params_get_fixed_names() {
        let params = run("SELECT * FROM users LIMIT $1 OFFSET $2", Verb::Select);
        assert_eq!(params[0].name, "limit");
        assert_eq!(params[1].name, "offset");
    }

    #[test]
    fn comparison_backward_walk_names_param_after_column() {
        let params = run("SELECT * FROM users WHERE email = $1", Verb::Select);
        assert_eq!(params[0].name, "email");
    }

    #[test]
    fn like_pattern_backward_walk_finds_column_through_concatenation() {
        let params = run("SELECT * FROM users WHERE name LIKE '%' || $1 || '%'", Verb::Select);
        assert_eq!(params[0].name, "name");
    }

    #[test]
    fn unresolvable_param_falls_back_to_argn() {
        let params = run("SELECT $1 + $2", Verb::Select);
        assert_eq!(params[0].name, "arg1");
        assert_eq!(params[1].name, "arg2");
    }
}
