//! SQL 템플릿 컴파일러
//!
//! 설정에 작성된 SQL 템플릿과 요청 필드를 받아 `?` 바인딩 SQL과
//! 위치 인자 목록을 생성합니다. 값은 항상 바인딩되므로 SQL 문자열에
//! 사용자 입력이 섞이지 않습니다.
//!
//! # 템플릿 문법
//!
//! - `{name}`: 필수 플레이스홀더. 스칼라는 `?`, 리스트는 `(?,?,...)`로 치환
//! - `{#name} ... {/name}`: `name` 필드가 있을 때만 남는 블록
//!
//! ```text
//! SELECT * FROM t WHERE a={a}{#b} AND b={b}{/b}
//!   {a: 1}        → SELECT * FROM t WHERE a=?          [1]
//!   {a: 1, b: 2}  → SELECT * FROM t WHERE a=? AND b=?  [1, 2]
//! ```
//!
//! 중괄호 리터럴을 위한 이스케이프는 없습니다. 이름은 유니코드 문자/숫자와
//! `_`, `.`, `-`로만 이뤄지므로 JSON 리터럴 같은 그 밖의 중괄호는 그대로 남습니다.

use std::collections::HashSet;

use crate::dialect::PlaceholderStyle;
use crate::params::{FieldValue, RequestFields, Scalar};

/// 컴파일된 SQL
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// 플레이스홀더(`?` 또는 `$n`)가 남은 SQL
    pub sql: String,

    /// 플레이스홀더 순서와 일치하는 인자
    pub args: Vec<Scalar>,
}

/// 템플릿 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("block '{name}' is opened but never closed")]
    UnclosedBlock { name: String },

    #[error("block '{name}' is closed without being opened")]
    UnmatchedClose { name: String },

    #[error("block '{name}' is nested inside itself")]
    NestedBlock { name: String },

    #[error("block '{inner}' is closed while block '{outer}' is still open")]
    MisnestedBlock { outer: String, inner: String },

    #[error("missing parameter: {name}")]
    MissingParam { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    /// `{name}`
    Placeholder,
    /// `{#name}`
    Open,
    /// `{/name}`
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    name: &'a str,
    start: usize,
    end: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// 템플릿 토큰 스캔 (등장 순서)
fn scan(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(pos) = template[i..].find('{') {
        let start = i + pos;
        let (kind, name_start) = match template.as_bytes().get(start + 1) {
            Some(b'#') => (TokenKind::Open, start + 2),
            Some(b'/') => (TokenKind::Close, start + 2),
            _ => (TokenKind::Placeholder, start + 1),
        };

        let name_len = template[name_start..]
            .find(|c: char| !is_name_char(c))
            .unwrap_or(template.len() - name_start);
        let name_end = name_start + name_len;

        if name_len > 0 && template[name_end..].starts_with('}') {
            tokens.push(Token {
                kind,
                name: &template[name_start..name_end],
                start,
                end: name_end + 1,
            });
            i = name_end + 1;
        } else {
            i = start + 1;
        }
    }

    tokens
}

/// 템플릿이 선언하는 파라미터 목록
///
/// 필수 플레이스홀더를 먼저(첫 등장 순서), 블록 이름을 그 뒤에 둡니다.
/// 같은 이름은 처음 등장한 위치에 한 번만 포함됩니다.
pub fn extract_params(template: &str) -> Vec<String> {
    let tokens = scan(template);
    let mut seen = HashSet::new();
    let mut params = Vec::new();

    let placeholders = tokens.iter().filter(|t| t.kind == TokenKind::Placeholder);
    let markers = tokens.iter().filter(|t| t.kind != TokenKind::Placeholder);

    for token in placeholders.chain(markers) {
        if seen.insert(token.name) {
            params.push(token.name.to_string());
        }
    }

    params
}

/// 블록 마커 검증
///
/// 모든 `{#name}`은 뒤따르는 `{/name}`과 짝을 이뤄야 하며, 블록은 올바르게
/// 중첩되어야 합니다. 같은 이름의 블록을 자기 안에 중첩할 수는 없습니다.
pub fn validate_template(template: &str) -> Result<(), TemplateError> {
    let mut open: Vec<&str> = Vec::new();

    for token in scan(template) {
        match token.kind {
            TokenKind::Placeholder => {}
            TokenKind::Open => {
                if open.contains(&token.name) {
                    return Err(TemplateError::NestedBlock {
                        name: token.name.to_string(),
                    });
                }
                open.push(token.name);
            }
            TokenKind::Close => match open.last() {
                Some(top) if *top == token.name => {
                    open.pop();
                }
                Some(top) if open.contains(&token.name) => {
                    return Err(TemplateError::MisnestedBlock {
                        outer: top.to_string(),
                        inner: token.name.to_string(),
                    });
                }
                _ => {
                    return Err(TemplateError::UnmatchedClose {
                        name: token.name.to_string(),
                    });
                }
            },
        }
    }

    match open.first() {
        Some(name) => Err(TemplateError::UnclosedBlock {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// `{#name}`부터 짝이 되는 `{/name}`까지 제거
///
/// 여는 마커 뒤에 닫는 마커가 없으면 아무것도 하지 않습니다.
fn strip_block(sql: &mut String, name: &str) {
    let open = format!("{{#{}}}", name);
    let close = format!("{{/{}}}", name);

    while let Some(start) = sql.find(&open) {
        let Some(offset) = sql[start + open.len()..].find(&close) else {
            break;
        };
        let end = start + open.len() + offset + close.len();
        sql.replace_range(start..end, "");
    }
}

fn push_placeholders(
    out: &mut String,
    args: &mut Vec<Scalar>,
    value: &FieldValue,
    style: PlaceholderStyle,
) {
    match value {
        FieldValue::Scalar(scalar) => {
            args.push(scalar.clone());
            style.write(out, args.len());
        }
        FieldValue::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                args.push(item.clone());
                style.write(out, args.len());
            }
            out.push(')');
        }
    }
}

/// 템플릿 컴파일
///
/// 1. 값이 없는(키 없음 또는 null) 파라미터의 블록을 마커째 제거
/// 2. 값이 있는 파라미터의 플레이스홀더를 왼쪽부터 치환하고 블록 마커만 지움
///
/// 결과 SQL의 `?` 개수는 항상 `args` 길이와 같습니다. 블록 밖에 있는
/// 플레이스홀더의 값이 없으면 `MissingParam`을 반환합니다.
pub fn compile(
    template: &str,
    fields: &RequestFields,
    params: &[String],
) -> Result<CompiledStatement, TemplateError> {
    compile_with_style(template, fields, params, PlaceholderStyle::Question)
}

/// 엔진 플레이스홀더 형식으로 컴파일
///
/// 번호는 컴파일러가 쓴 플레이스홀더에만 매겨집니다.
pub fn compile_with_style(
    template: &str,
    fields: &RequestFields,
    params: &[String],
    style: PlaceholderStyle,
) -> Result<CompiledStatement, TemplateError> {
    let mut sql = template.to_string();
    for name in params {
        if !fields.is_present(name) {
            strip_block(&mut sql, name);
        }
    }

    let declared: HashSet<&str> = params.iter().map(String::as_str).collect();
    let mut out = String::with_capacity(sql.len());
    let mut args = Vec::new();
    let mut cursor = 0;

    for token in scan(&sql) {
        if !declared.contains(token.name) {
            continue;
        }

        match (token.kind, fields.get_present(token.name)) {
            (TokenKind::Placeholder, Some(value)) => {
                out.push_str(&sql[cursor..token.start]);
                push_placeholders(&mut out, &mut args, value, style);
                cursor = token.end;
            }
            (TokenKind::Placeholder, None) => {
                return Err(TemplateError::MissingParam {
                    name: token.name.to_string(),
                });
            }
            (TokenKind::Open | TokenKind::Close, Some(_)) => {
                out.push_str(&sql[cursor..token.start]);
                cursor = token.end;
            }
            (TokenKind::Open | TokenKind::Close, None) => {}
        }
    }
    out.push_str(&sql[cursor..]);

    Ok(CompiledStatement { sql: out, args })
}
